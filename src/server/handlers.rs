use axum::Json;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app_state::AppState;
use crate::orchestrator;
use crate::server::errors::ConvertError;

#[derive(Deserialize)]
pub struct ConvertParams {
    pub url: String,
}

/// `GET /convert?url=...` — scrape, assemble, render, and return the PDF as
/// a download.
pub async fn convert(
    State(state): State<AppState>,
    Query(params): Query<ConvertParams>,
) -> Result<Response, ConvertError> {
    let output =
        orchestrator::convert(state.browser.as_ref(), &state.config, &params.url).await?;
    info!(
        filename = %output.filename,
        bytes = output.pdf.len(),
        "conversion complete"
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", output.filename),
            ),
        ],
        output.pdf,
    )
        .into_response())
}

/// `GET /` — the user-facing form page, embedded at compile time.
pub async fn home() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
}

/// `GET /healthz` — liveness probe.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
