pub mod health;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::auth::authenticate;
use crate::hr::handlers as hr;
use crate::state::AppState;
use crate::upload::handlers as candidate;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Candidate workflow
        .route(
            "/api/v1/candidate/session",
            get(candidate::handle_get_session),
        )
        .route(
            "/api/v1/candidate/session/file",
            post(candidate::handle_select_file),
        )
        .route(
            "/api/v1/candidate/session/upload",
            post(candidate::handle_upload),
        )
        .route(
            "/api/v1/candidate/session/analyze",
            post(candidate::handle_analyze),
        )
        .route(
            "/api/v1/candidate/history",
            get(candidate::handle_candidate_history),
        )
        // HR review
        .route("/api/v1/hr/dashboard", get(hr::handle_dashboard))
        .route(
            "/api/v1/hr/candidates/:id/shortlist",
            post(hr::handle_shortlist),
        )
        .route("/api/v1/hr/candidates/:id/reject", post(hr::handle_reject))
        .route("/api/v1/history", get(hr::handle_list_history))
        .route(
            "/api/v1/history/:id/status",
            patch(hr::handle_update_status),
        )
        .route_layer(middleware::from_fn(authenticate));

    Router::new()
        .route("/health", get(health::health_handler))
        .merge(api)
        .with_state(state)
}
