pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::job_ad::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/job-ad/vocabulary",
            get(handlers::handle_vocabulary),
        )
        // Sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/generate",
            post(handlers::handle_generate),
        )
        .route(
            "/api/v1/sessions/:id/fields",
            patch(handlers::handle_edit_field),
        )
        .route("/api/v1/sessions/:id/reset", post(handlers::handle_reset))
        .route("/api/v1/sessions/:id/submit", post(handlers::handle_submit))
        .with_state(state)
}
