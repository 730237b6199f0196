//! Tattoo Portfolio Backend
//!
//! REST backend for a tattoo artist's portfolio with SQLite persistence, bearer-token
//! accounts and remote image hosting.

mod api;
mod auth;
mod config;
mod counts;
mod db;
mod errors;
mod media;
mod models;
mod slug;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::HeaderValue,
    http::Uri,
    middleware::map_response_with_state,
    response::{IntoResponse, Response},
    Json,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use errors::{AppError, ErrorDetail};
use media::{MediaHost, MAX_IMAGES_PER_REQUEST, MAX_IMAGE_BYTES};

/// Folder used for uploads when no media host is configured.
const DEFAULT_MEDIA_FOLDER: &str = "daniela-tattoos";

/// Origin of the local frontend dev server, always allowed by CORS.
const LOCAL_FRONTEND: &str = "http://localhost:3000";

/// Multipart overhead allowed on top of the raw image bytes.
const MULTIPART_SLACK: usize = 1024 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub media: Arc<dyn MediaHost>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Root folder for uploaded images.
    pub fn media_folder(&self) -> &str {
        self.config
            .media
            .as_ref()
            .map(|m| m.folder.as_str())
            .unwrap_or(DEFAULT_MEDIA_FOLDER)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting Tattoo Portfolio Backend");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    let media = media::create_media_host(&config);

    // Create application state
    let state = AppState {
        repo,
        media,
        config: Arc::new(config.clone()),
    };

    api::ensure_bootstrap_admin(&state).await?;

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if !config.is_production() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .frontend_url
        .iter()
        .map(String::as_str)
        .chain([LOCAL_FRONTEND])
        .filter_map(|origin| match origin.trim_end_matches('/').parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    // Static segments (`reorder`, `stats`) take precedence over `{id}`
    let api_routes = Router::new()
        // Accounts
        .route("/auth/register", post(api::register))
        .route("/auth/login", post(api::login))
        .route("/auth/profile", get(api::get_profile).put(api::update_profile))
        .route("/auth/change-password", put(api::change_password))
        .route("/auth/users", get(api::list_users))
        // Categories
        .route("/categories", get(api::list_categories).post(api::create_category))
        .route("/categories/reorder", put(api::reorder_categories))
        .route(
            "/categories/{id}",
            get(api::get_category)
                .put(api::update_category)
                .delete(api::delete_category),
        )
        // Styles
        .route("/styles", get(api::list_styles).post(api::create_style))
        .route("/styles/reorder", put(api::reorder_styles))
        .route(
            "/styles/{id}",
            get(api::get_style)
                .put(api::update_style)
                .delete(api::delete_style),
        )
        // Tattoos
        .route("/tattoos", get(api::list_tattoos).post(api::create_tattoo))
        .route("/tattoos/stats", get(api::tattoo_stats))
        .route("/tattoos/reorder", put(api::reorder_tattoos))
        .route(
            "/tattoos/{id}",
            get(api::get_tattoo)
                .put(api::update_tattoo)
                .delete(api::delete_tattoo),
        );

    let upload_routes = Router::new()
        .route("/upload", post(api::upload_images))
        .route("/upload/{*public_id}", delete(api::delete_image))
        .layer(DefaultBodyLimit::max(
            MAX_IMAGES_PER_REQUEST * MAX_IMAGE_BYTES + MULTIPART_SLACK,
        ));

    let settings_routes = Router::new()
        .route("/settings", get(api::get_settings).put(api::update_settings))
        .layer(DefaultBodyLimit::max(2 * MAX_IMAGE_BYTES + MULTIPART_SLACK));

    let public_routes = Router::new()
        .route("/", get(service_description))
        .route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes.merge(upload_routes).merge(settings_routes))
        .merge(public_routes)
        .fallback(route_not_found)
        .layer(map_response_with_state(
            state.config.clone(),
            expose_error_details,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Put the underlying error text into failed responses outside production.
async fn expose_error_details(State(config): State<Arc<Config>>, response: Response) -> Response {
    if config.is_production() {
        return response;
    }
    let Some(ErrorDetail(body)) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };
    (response.status(), Json(body)).into_response()
}

/// Unknown paths get the regular error envelope.
async fn route_not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {} does not exist", uri.path()))
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

async fn service_description() -> &'static str {
    "Tattoo Portfolio API: see /api/tattoos, /api/categories, /api/styles and /api/settings"
}

#[cfg(test)]
mod tests;
