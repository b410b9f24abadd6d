use milonga::config::{ConfigError, ConfigLoader};
use milonga::locale::Locale;
use std::{
    env, fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard, OnceLock},
};
use tempfile::TempDir;

const TOUCHED_KEYS: &[&str] = &[
    "MILONGA_PROFILE",
    "MILONGA_API_BIND_ADDR",
    "MILONGA_LOG_LEVEL",
    "MILONGA_SESSION_SECRET",
    "MILONGA_DEFAULT_LOCALE",
    "MILONGA_CORS_ALLOWED_ORIGINS",
    "MILONGA_IMAGE_HOST_CLOUD_NAME",
    "MILONGA_IMAGE_HOST_API_KEY",
    "MILONGA_IMAGE_HOST_API_SECRET",
    "MILONGA_DB_MAX_CONNECTIONS",
];

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn env_guard() -> MutexGuard<'static, ()> {
    env_lock()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

fn clear_env() {
    for key in TOUCHED_KEYS {
        unsafe {
            env::remove_var(key);
        }
    }
}

fn write_env_file(dir: &TempDir, name: &str, contents: &str) {
    let path = dir.path().join(name);
    fs::write(path, contents).unwrap();
}

fn loader_for(dir: &TempDir) -> ConfigLoader {
    ConfigLoader::with_base_dir(PathBuf::from(dir.path()))
}

#[test]
fn loads_defaults_when_no_env_present() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    let cfg = loader_for(&temp_dir).load().expect("config loads with defaults");

    assert_eq!(cfg.profile, "local");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:8080");
    assert_eq!(cfg.session_cookie_name, "__session");
    assert_eq!(cfg.default_locale, Locale::Es);
    assert!(cfg.image_host.is_none());
    cfg.bind_addr().expect("default bind addr parses");
    clear_env();
}

#[test]
fn layered_env_files_apply_in_order() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "MILONGA_API_BIND_ADDR=127.0.0.1:3000\n");
    write_env_file(
        &temp_dir,
        ".env.test",
        "MILONGA_API_BIND_ADDR=192.168.0.10:5000\nMILONGA_DEFAULT_LOCALE=de\n",
    );
    write_env_file(
        &temp_dir,
        ".env.test.local",
        "MILONGA_API_BIND_ADDR=10.0.0.5:6000\n",
    );

    // Select profile via .env.local before profile-specific files load.
    write_env_file(
        &temp_dir,
        ".env.local",
        "MILONGA_PROFILE=test\nMILONGA_API_BIND_ADDR=127.0.0.1:4000\n",
    );

    let cfg = loader_for(&temp_dir)
        .load()
        .expect("config loads with layered env files");

    assert_eq!(cfg.profile, "test");
    assert_eq!(cfg.api_bind_addr, "10.0.0.5:6000");
    assert_eq!(cfg.default_locale, Locale::De);
    clear_env();
}

#[test]
fn os_environment_has_highest_precedence() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "MILONGA_API_BIND_ADDR=127.0.0.1:3000\nMILONGA_CORS_ALLOWED_ORIGINS=https://a.example\n",
    );

    unsafe {
        env::set_var("MILONGA_API_BIND_ADDR", "0.0.0.0:9090");
        env::set_var(
            "MILONGA_CORS_ALLOWED_ORIGINS",
            "https://milonga.berlin, https://www.milonga.berlin",
        );
    }

    let cfg = loader_for(&temp_dir)
        .load()
        .expect("config loads with env override");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:9090");
    assert_eq!(
        cfg.cors_allowed_origins,
        vec!["https://milonga.berlin", "https://www.milonga.berlin"]
    );

    clear_env();
}

#[test]
fn invalid_bind_addr_returns_error() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    unsafe {
        env::set_var("MILONGA_API_BIND_ADDR", "not-an-addr");
    }
    let err = loader_for(&temp_dir)
        .load()
        .expect_err("invalid bind addr should fail");
    assert!(format!("{}", err).contains("invalid api bind address"));

    clear_env();
}

#[test]
fn production_profile_without_session_key_fails() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    unsafe {
        env::set_var("MILONGA_PROFILE", "production");
    }
    let err = loader_for(&temp_dir).load().unwrap_err();
    assert!(matches!(err, ConfigError::MissingSessionKey { .. }));

    unsafe {
        env::set_var("MILONGA_SESSION_SECRET", "prod-secret");
    }
    let cfg = loader_for(&temp_dir).load().expect("session key satisfies production");
    assert_eq!(cfg.session_secret.as_deref(), Some("prod-secret"));

    clear_env();
}

#[test]
fn unsupported_default_locale_fails() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "MILONGA_DEFAULT_LOCALE=fr\n");

    let err = loader_for(&temp_dir).load().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidLocale { .. }));

    clear_env();
}

#[test]
fn image_host_is_all_or_nothing() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "MILONGA_IMAGE_HOST_CLOUD_NAME=milonga\nMILONGA_IMAGE_HOST_API_KEY=1234\n",
    );

    let err = loader_for(&temp_dir).load().unwrap_err();
    assert!(matches!(err, ConfigError::IncompleteImageHost { .. }));

    unsafe {
        env::set_var("MILONGA_IMAGE_HOST_API_SECRET", "shh");
    }
    let cfg = loader_for(&temp_dir).load().expect("complete image host config");
    let image_host = cfg.image_host.clone().expect("image host configured");
    assert_eq!(image_host.cloud_name, "milonga");
    assert_eq!(image_host.api_base, "https://api.cloudinary.com");

    let redacted = cfg.redacted_json().unwrap();
    assert!(!redacted.contains("shh"));
    assert!(!redacted.contains("1234"));

    clear_env();
}

#[test]
fn malformed_number_is_reported() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    unsafe {
        env::set_var("MILONGA_DB_MAX_CONNECTIONS", "lots");
    }
    let err = loader_for(&temp_dir).load().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidNumber {
            key: "DB_MAX_CONNECTIONS",
            ..
        }
    ));

    clear_env();
}

#[test]
fn wildcard_cors_origin_is_rejected() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    unsafe {
        env::set_var(
            "MILONGA_CORS_ALLOWED_ORIGINS",
            "https://milonga.berlin, *",
        );
    }
    let err = loader_for(&temp_dir).load().unwrap_err();
    assert!(matches!(err, ConfigError::WildcardCorsOrigin));

    unsafe {
        env::set_var("MILONGA_CORS_ALLOWED_ORIGINS", "https://milonga.berlin");
    }
    let cfg = loader_for(&temp_dir).load().expect("explicit origins load");
    assert_eq!(cfg.cors_allowed_origins, vec!["https://milonga.berlin"]);

    clear_env();
}
