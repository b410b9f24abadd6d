//! # Server Configuration
//!
//! This module contains the server setup and configuration for the Milonga API.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::FromRef,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::SessionVerifier;
use crate::config::AppConfig;
use crate::handlers;
use crate::images::{ImageStore, image_store_from_config};
use crate::telemetry::trace_context_middleware;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub session: Arc<SessionVerifier>,
    pub images: Arc<dyn ImageStore>,
}

impl AppState {
    /// Builds the session verifier and image store described by `config`.
    pub fn from_config(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<Self> {
        let session = SessionVerifier::from_config(&config)
            .context("failed to initialise session verifier")?;
        let images = image_store_from_config(config.image_host.as_ref())
            .context("failed to initialise image host client")?;

        Ok(Self {
            config: Arc::new(config),
            db,
            session: Arc::new(session),
            images,
        })
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.config)
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    let api = Router::new()
        .route("/api/artists", get(handlers::artists::list_artists))
        .route("/api/artists/{slug}", get(handlers::artists::get_artist))
        .route(
            "/api/artists/{slug}/events",
            get(handlers::artists::list_artist_events),
        )
        .route("/api/events", get(handlers::events::list_events))
        .route(
            "/api/events/deleted",
            get(handlers::events::list_deleted_events),
        )
        .route("/api/events/{id}", get(handlers::events::get_event))
        .route(
            "/api/events/{id}/delete",
            delete(handlers::events::soft_delete_event),
        )
        .route(
            "/api/events/{id}/restore",
            post(handlers::events::restore_event),
        )
        .route(
            "/api/events/{id}/permanently-delete",
            delete(handlers::events::permanently_delete_event),
        )
        .route("/api/user", get(handlers::users::current_user))
        .route("/api/sync-user", post(handlers::users::sync_user));

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .merge(api)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_context_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config
        .bind_addr()
        .with_context(|| format!("invalid server address '{}'", config.api_bind_addr))?;
    let profile = config.profile.clone();

    let state = AppState::from_config(config, db)?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

struct SessionSecurity;

impl Modify for SessionSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::readyz,
        crate::handlers::artists::list_artists,
        crate::handlers::artists::get_artist,
        crate::handlers::artists::list_artist_events,
        crate::handlers::events::list_events,
        crate::handlers::events::get_event,
        crate::handlers::events::list_deleted_events,
        crate::handlers::events::soft_delete_event,
        crate::handlers::events::restore_event,
        crate::handlers::events::permanently_delete_event,
        crate::handlers::users::current_user,
        crate::handlers::users::sync_user,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::Image,
            crate::models::UserRole,
            crate::models::UserStatus,
            crate::locale::Locale,
            crate::lifecycle::EventState,
            crate::lifecycle::Transition,
            crate::error::ApiError,
            crate::handlers::HealthStatus,
            crate::handlers::types::ArtistDto,
            crate::handlers::types::EventDto,
            crate::handlers::types::ArtistEventsDto,
            crate::handlers::types::PurgeResultDto,
            crate::handlers::types::UserDto,
        )
    ),
    modifiers(&SessionSecurity),
    tags(
        (name = "root", description = "Service information and health"),
        (name = "artists", description = "Artist listings"),
        (name = "events", description = "Event listings and soft-delete administration"),
        (name = "users", description = "Current user and identity sync"),
    ),
    info(
        title = "Milonga API",
        description = "Artists and events of the Argentine music scene in Berlin",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
