use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ns_core::{AnalysisReport, Error};
use ns_scrappers::DEFAULT_ARTICLE_LIMIT;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::AppState;

fn default_article_limit() -> usize {
    DEFAULT_ARTICLE_LIMIT
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub company_name: String,
    #[serde(default = "default_article_limit")]
    pub article_limit: usize,
}

/// Maps pipeline errors onto HTTP responses.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            e if e.is_upstream() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("❌ Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisReport>, ApiError> {
    let report = state
        .manager
        .analyze(&request.company_name, request.article_limit)
        .await?;
    Ok(Json(report))
}
