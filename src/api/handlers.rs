use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::api::{
    dtos::{DownloadQuery, ErrorResponse, RunResponse},
    errors::ApiError,
};
use crate::app_state::AppState;
use crate::export::ExportFormat;
use crate::runner::RunForm;
use crate::store::HistoryRecord;

#[utoipa::path(
    post,
    path = "/v1/runs",
    tag = "runs",
    request_body = RunForm,
    responses(
        (status = 200, description = "Run finished", body = RunResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 422, description = "Invalid selector or pattern", body = ErrorResponse),
        (status = 502, description = "Target could not be fetched", body = ErrorResponse)
    )
)]
pub async fn create_run(
    State(state): State<AppState>,
    payload: Result<Json<RunForm>, JsonRejection>,
) -> Result<Json<RunResponse>, ApiError> {
    let Json(form) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let output = state.runner.run(&form).await?;
    Ok(Json(RunResponse::from(output)))
}

#[utoipa::path(
    get,
    path = "/v1/runs/{token}/download",
    tag = "runs",
    params(
        ("token" = Uuid, Path, description = "Token returned by the run"),
        DownloadQuery
    ),
    responses(
        (status = 200, description = "File attachment"),
        (status = 400, description = "Unknown format", body = ErrorResponse),
        (status = 404, description = "Unknown, expired or already downloaded", body = ErrorResponse),
        (status = 500, description = "Encoding failed", body = ErrorResponse)
    )
)]
pub async fn download_run(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    // a bad format or a failed export leaves the run downloadable
    let format = query
        .format
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::parse::<ExportFormat>)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let export = state
        .runner
        .store()
        .take_export(&token, format)
        .ok_or(ApiError::NotFound(token))??;

    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    Ok((
        [
            (header::CONTENT_TYPE, export.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.bytes,
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/v1/history",
    tag = "runs",
    responses(
        (status = 200, description = "Recent runs, oldest first", body = Vec<HistoryRecord>)
    )
)]
pub async fn list_history(State(state): State<AppState>) -> Json<Vec<HistoryRecord>> {
    Json(state.runner.history().recent())
}
