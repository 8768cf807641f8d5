use crate::api::handler::{self, ApiState};
use crate::api::ApiConfig;
use crate::service::FileService;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{get, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the axum router with all FlashFS endpoints.
pub fn build_router(service: FileService, config: &ApiConfig) -> Router {
    let state = ApiState {
        service,
        default_ttl: config.default_ttl,
    };

    Router::new()
        .route(
            "/v1/file",
            put(handler::upload_file).options(handler::options),
        )
        .route(
            "/v1/:path",
            get(handler::download_file).options(handler::options),
        )
        .route("/health", get(handler::health).options(handler::options))
        .layer(DefaultBodyLimit::disable())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Any origin may call the API; CORS preflights are answered by this layer.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::PUT])
        .allow_headers(Any)
}
