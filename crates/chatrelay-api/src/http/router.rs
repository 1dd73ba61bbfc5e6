//! Axum router configuration with middleware.
//!
//! API routes live under `/api/`. Middleware: panic catching, CORS, tracing.
//!
//! If the configured web directory exists it is served for every other
//! path (the browser UI); otherwise only the API is served.

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use chatrelay_core::llm::gateway::CompletionGateway;

use crate::http::error::handle_panic;
use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new().route(
        "/messages",
        get(handlers::message::list_messages).post(handlers::message::create_message),
    );

    let web_dir = state.config.web_dir.clone();

    let mut router = Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .with_state(state);

    if std::path::Path::new(&web_dir).exists() {
        let index_path = format!("{web_dir}/index.html");
        let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(index_path));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %web_dir, "Static file serving enabled");
    }

    with_middleware(router)
}

/// Wrap a router in the shared middleware stack.
fn with_middleware(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// GET /health - Liveness plus gateway configuration.
async fn health_check(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    let gateway = state.conversation.gateway();
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "gateway": {
            "name": gateway.name(),
            "configured": gateway.is_configured(),
        },
    }))
}
