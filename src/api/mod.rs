pub mod dtos;
pub mod errors;
pub mod handlers;

use axum::{
    Router,
    extract::Request,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info_span;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::app_state::AppState;
use crate::export::ExportFormat;
use crate::fetcher::Method;
use crate::health::{self, HealthResponse};
use crate::runner::{ErrorKind, RunForm, RunMetadata, RunMode};
use crate::store::HistoryRecord;

use dtos::{ErrorResponse, RunResponse};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_run,
        handlers::download_run,
        handlers::list_history,
        health::health_check
    ),
    components(schemas(
        RunForm,
        RunResponse,
        RunMetadata,
        RunMode,
        Method,
        ExportFormat,
        HistoryRecord,
        ErrorResponse,
        ErrorKind,
        HealthResponse
    )),
    tags(
        (name = "runs", description = "Fetch, extract and download"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

pub fn router(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        info_span!(
            "http",
            method = %request.method(),
            uri = %request.uri(),
            request_id
        )
    });

    Router::new()
        .route("/healthz", get(health::health_check))
        .route("/v1/runs", post(handlers::create_run))
        .route("/v1/runs/{token}/download", get(handlers::download_run))
        .route("/v1/history", get(handlers::list_history))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(trace)
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}
