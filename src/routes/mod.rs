use axum::http::HeaderValue;
use axum::{
    routing::{get, patch, post, put},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod applications;
pub mod deadlines;
pub mod export;
pub mod health;
pub mod notes;
pub mod scrape;

pub fn create_router(state: AppState) -> Router<()> {
    let cors = if let Some(origins) = state.config.cors_allowed_origin.as_ref() {
        let headers: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|value| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| {
                    trimmed
                        .parse::<HeaderValue>()
                        .expect("invalid CORS allowed origin")
                })
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(headers))
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
    };

    let applications_routes = Router::new()
        .route(
            "/",
            get(applications::list_applications).post(applications::create_application),
        )
        .route(
            "/:id",
            get(applications::get_application)
                .patch(applications::update_application)
                .delete(applications::delete_application),
        )
        .route("/:id/details", put(applications::upsert_job_details))
        .route(
            "/:id/notes",
            get(notes::list_notes).post(notes::create_note),
        )
        .route(
            "/:id/deadlines",
            get(deadlines::list_deadlines).post(deadlines::create_deadline),
        )
        .route("/:id/activity", get(applications::list_activity));

    Router::new()
        .nest("/api/applications", applications_routes)
        .route(
            "/api/notes/:id",
            patch(notes::update_note).delete(notes::delete_note),
        )
        .route(
            "/api/deadlines/:id",
            patch(deadlines::update_deadline).delete(deadlines::delete_deadline),
        )
        .route("/api/scrape", post(scrape::scrape_job))
        .route("/api/export", get(export::export_csv))
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
