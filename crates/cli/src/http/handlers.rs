use super::error::{internal_error, invalid_request, ApiError};
use super::AppState;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::StreamExt;
use repolens_analysis::RepoAnalyzer;
use repolens_explain::ExplainError;
use repolens_github::parse_github_url;
use repolens_protocol::{
    AnalyzeRequest, ExplainRequest, FileContentRequest, FileContentResponse, HealthResponse,
    RepoAnalysis,
};
use serde::de::DeserializeOwned;
use std::convert::Infallible;

type ApiResult<T> = Result<T, ApiError>;

/// Decode a JSON body. A missing body decodes as `{}`.
pub(super) fn parse_payload<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|err| invalid_request(format!("Invalid request body: {err}")))
}

fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<RepoAnalysis>> {
    let request: AnalyzeRequest = parse_payload(&body)?;
    let url = required(request.repo_url.as_deref())
        .ok_or_else(|| invalid_request("Repo URL is required"))?;
    let repo = parse_github_url(url)?;

    log::info!("Analyzing {repo}");
    let analysis = RepoAnalyzer::with_config(
        state.github(),
        state.analysis().assembler(),
        state.analysis().tree_builder(),
    )
    .analyze(&repo)
    .await
    .map_err(|err| {
        log::warn!("Analysis of {repo} failed: {err}");
        ApiError::from(err)
    })?;
    Ok(Json(analysis))
}

pub(super) async fn explain(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let request: ExplainRequest =
        parse_payload(&body).map_err(|_| invalid_request("Invalid type"))?;

    let stream = state.explainer().explain(&request).await.map_err(|err| match err {
        ExplainError::InvalidContext(detail) => {
            invalid_request(format!("Invalid context: {detail}"))
        }
        other => internal_error(other.to_string()),
    })?;

    let body = Body::from_stream(stream.map(Ok::<_, Infallible>));
    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        body,
    )
        .into_response())
}

pub(super) async fn file_content(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<FileContentResponse>> {
    let request: FileContentRequest = parse_payload(&body)?;
    let (Some(url), Some(path)) = (
        required(request.repo_url.as_deref()),
        required(request.path.as_deref()),
    ) else {
        return Err(invalid_request("Repo URL and Path are required"));
    };
    let repo = parse_github_url(url)?;

    let content = state.github().fetch_content(&repo, path).await.map_err(|err| {
        log::warn!("Content fetch {repo}:{path} failed: {err}");
        internal_error("Failed to fetch content")
    })?;
    Ok(Json(FileContentResponse { content }))
}

pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
