//! Test utilities for database and HTTP testing.
//!
//! Sets up in-memory SQLite databases with migrations applied, inserts
//! fixtures and mints session tokens the test router accepts.

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use migration::{Migrator, MigratorTrait};
use milonga::{
    auth::SessionClaims,
    config::AppConfig,
    images::{ImageStore, NoopImageStore},
    locale::Locale,
    models::{UserRole, UserStatus, artist, event, user},
    server::{AppState, create_app},
};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SESSION_SECRET: &str = "integration-test-session-secret";

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;

    Migrator::up(&db, None).await?;

    // Fixtures insert events for artists that may not exist
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = OFF".to_string(),
    ))
    .await?;

    Ok(db)
}

pub fn test_config() -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        session_secret: Some(TEST_SESSION_SECRET.to_string()),
        default_locale: Locale::Es,
        ..AppConfig::default()
    }
}

pub fn test_state(db: DatabaseConnection) -> AppState {
    test_state_with_images(db, Arc::new(NoopImageStore))
}

pub fn test_state_with_images(db: DatabaseConnection, images: Arc<dyn ImageStore>) -> AppState {
    let mut state = AppState::from_config(test_config(), db).expect("test state builds");
    state.images = images;
    state
}

/// Fresh database plus a router over it.
pub async fn test_app() -> (DatabaseConnection, Router) {
    let db = setup_test_db().await.expect("test database");
    let app = create_app(test_state(db.clone()));
    (db, app)
}

pub async fn insert_artist(
    db: &DatabaseConnection,
    name: &str,
    slug: &str,
    genres: &[&str],
) -> artist::Model {
    artist::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        slug: Set(slug.to_string()),
        genres: Set(json!(genres)),
        bio: Set(format!("{name} plays in Berlin")),
        origin: Set("Buenos Aires".to_string()),
        images: Set(None),
        social_links: Set(Some(json!({ "instagram": format!("https://instagram.com/{slug}") }))),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("insert artist")
}

pub struct EventFixture<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub genre: &'a str,
    pub dates: &'a [&'a str],
    pub images: Value,
}

impl<'a> EventFixture<'a> {
    pub fn new(title: &'a str, slug: &'a str) -> Self {
        Self {
            title,
            slug,
            genre: "tango",
            dates: &["2025-03-07"],
            images: json!([]),
        }
    }
}

pub async fn insert_event(
    db: &DatabaseConnection,
    artist: &artist::Model,
    fixture: EventFixture<'_>,
) -> event::Model {
    event::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(fixture.title.to_string()),
        slug: Set(fixture.slug.to_string()),
        dates: Set(json!(fixture.dates)),
        organizer: Set("Milonga Collective".to_string()),
        artist_id: Set(artist.id),
        artist_name: Set(artist.name.clone()),
        artist_slug: Set(artist.slug.clone()),
        genre: Set(fixture.genre.to_string()),
        location: Set("Kulturhaus, Kreuzberg".to_string()),
        time: Set("21:00".to_string()),
        price: Set(Some("15 €".to_string())),
        description: Set(Some("Live music and dancing".to_string())),
        images: Set(fixture.images),
        is_deleted: Set(false),
        deleted_at: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("insert event")
}

pub async fn insert_user(
    db: &DatabaseConnection,
    external_id: &str,
    status: UserStatus,
    role: UserRole,
) -> user::Model {
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        external_id: Set(external_id.to_string()),
        email: Set(format!("{external_id}@example.com")),
        first_name: Set(Some("Test".to_string())),
        last_name: Set(Some("User".to_string())),
        role: Set(role),
        status: Set(status),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("insert user")
}

pub fn claims_for(external_id: &str) -> SessionClaims {
    SessionClaims {
        sub: external_id.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
        iss: None,
        email: Some(format!("{external_id}@example.com")),
        given_name: Some("Carlos".to_string()),
        family_name: Some("Gardel".to_string()),
    }
}

pub fn mint_token(claims: &SessionClaims) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(TEST_SESSION_SECRET.as_bytes()),
    )
    .expect("mint session token")
}

pub fn token_for(external_id: &str) -> String {
    mint_token(&claims_for(external_id))
}

/// Builds a request, optionally authenticated with a bearer token.
pub fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request builds")
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("router responds")
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("body is json")
}
