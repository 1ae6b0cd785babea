use axum::{extract::State, Json};
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, AppResult};
use crate::extract::JobCandidate;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
}

/// Fetch a posting URL and run extraction over its clean text. Returns the
/// candidate record only; the caller decides whether to materialize it. A
/// failure here leaves manual entry open with the raw URL the user already
/// has.
pub async fn scrape_job(
    State(state): State<AppState>,
    Json(payload): Json<ScrapeRequest>,
) -> AppResult<Json<JobCandidate>> {
    let url = Url::parse(payload.url.trim())
        .map_err(|err| AppError::invalid_input(format!("invalid url: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::invalid_input("url must use http or https"));
    }

    let page = state.fetcher.fetch(&url).await?;
    tracing::debug!(
        chars = page.clean_text.len(),
        final_url = %page.final_url,
        "fetched posting page"
    );

    let candidate = state
        .extractor
        .extract(&page.clean_text, &page.final_url)
        .await?;
    tracing::info!(
        company = %candidate.company_name,
        title = %candidate.position_title,
        "extracted job candidate"
    );

    Ok(Json(candidate))
}
