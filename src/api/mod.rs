pub mod handlers;

pub use handlers::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/verify", post(handlers::verify))
        .route("/api/verify/batch", post(handlers::verify_batch))
        .route("/api/discrepancies", post(handlers::detect_discrepancies))
        .route("/api/documents/parse", post(handlers::parse_document))
        .route(
            "/api/verifications",
            get(handlers::list_verifications).delete(handlers::reset_verifications),
        )
        .route("/api/verifications/:id", get(handlers::get_verification))
        .route("/api/stats", get(handlers::statistics))
        .route("/api/export", get(handlers::export_csv))
        .layer(ServiceBuilder::new())
        .with_state(state)
}
