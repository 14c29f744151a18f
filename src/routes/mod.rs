pub mod translate;

use std::any::Any;

use axum::{
    http::Method,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;

use crate::responses::JsonResponse;
use crate::state::AppState;
use translate::{translate_name, translate_search};

pub const PANIC_MESSAGE: &str = "Something went wrong, please reload";

async fn root() -> Response {
    JsonResponse::success("Utsav translation service").into_response()
}

async fn fallback() -> Response {
    JsonResponse::not_found("Not found").into_response()
}

/// The top-level error boundary: log the panic, answer with a static body.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());
    error!(%detail, "request handler panicked");
    JsonResponse::server_error(PANIC_MESSAGE).into_response()
}

/// Open to every origin; the endpoints carry no credentials.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AnyOrigin)
}

/// Everything except rate limiting, which needs the peer address and is
/// added by the binary.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/translate-name", post(translate_name))
        .route("/translate-search", post(translate_search))
        .fallback(fallback)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}
