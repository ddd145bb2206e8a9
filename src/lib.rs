use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod assembly;
pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod storage;
pub mod templates;

// Module for routing segregation (Public, Authenticated).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use config::AppConfig;
pub use credentials::{CredentialState, CredentialStore};
pub use repository::{RepositoryState, SqliteRepository};
pub use storage::{MockStorageService, S3StorageClient, StorageState};
pub use templates::{TemplateRegistry, TemplateState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation for every handler decorated with
/// `#[utoipa::path]` and every schema carrying `ToSchema`. Served at
/// `/api-docs/openapi.json`, browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::logout, handlers::get_me, handlers::list_templates,
        handlers::list_posts, handlers::get_post_detail, handlers::create_post,
        handlers::update_post, handlers::delete_post,
        handlers::add_photo, handlers::update_photo, handlers::delete_photo,
        handlers::add_video, handlers::update_video, handlers::delete_video,
        handlers::add_text_block, handlers::update_text_block, handlers::delete_text_block,
        handlers::reorder_content, handlers::upload_media,
    ),
    components(
        schemas(
            models::Role, models::PostStatus, models::ContentKind, models::BlogPost,
            models::Photo, models::Video, models::TextBlock, models::ContentRef,
            models::LoginRequest, models::LoginResponse, models::LogoutResponse,
            models::PublicProfile, models::CreatePostRequest, models::UpdatePostRequest,
            models::CreatePhotoRequest, models::UpdatePhotoRequest,
            models::CreateVideoRequest, models::UpdateVideoRequest,
            models::CreateTextBlockRequest, models::UpdateTextBlockRequest,
            models::ReorderRequest, models::Pagination, models::PostListResponse,
            models::PostContent, models::UploadResponse,
            assembly::ContentEntry, handlers::PostDetailResponse, handlers::StatusFilter,
            templates::TemplateId, templates::TemplateDescriptor,
            error::ErrorBody,
        )
    ),
    tags(
        (name = "reiseblog", description = "Private family travel blog API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding all application
/// services and configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: posts and content collections on SQLite.
    pub repo: RepositoryState,
    /// Storage Layer: media objects in the S3-compatible bucket.
    pub storage: StorageState,
    /// Credential Store: the read-only seeded user list.
    pub credentials: CredentialState,
    /// Template Registry: enum-keyed dispatch table built at startup.
    pub templates: TemplateState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These allow handlers and extractors to selectively pull components from the
// shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for CredentialState {
    fn from_ref(app_state: &AppState) -> CredentialState {
        app_state.credentials.clone()
    }
}

impl FromRef<AppState> for TemplateState {
    fn from_ref(app_state: &AppState) -> TemplateState {
        app_state.templates.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces session verification for the authenticated route group. `AuthUser`
/// implements `FromRequestParts`, so if the token is missing, malformed, or
/// expired the extractor rejects with the 401 error body before any handler
/// runs. Handlers re-extract `AuthUser` for identity and role decisions.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and
/// scoped middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // CORS: the static frontend is served from a different origin.
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no session required.
        .merge(public::public_routes())
        // Authenticated routes: behind the session verifier layer.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state);

    // Observability and correlation layers (outermost).
    base_router
        .layer(
            ServiceBuilder::new()
                // Request ID generation: a unique UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // Request tracing: wraps the request/response lifecycle in a span
                // that carries the request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes span creation for `TraceLayer`: every log line of a request is
/// correlated by the x-request-id header alongside method and URI.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
