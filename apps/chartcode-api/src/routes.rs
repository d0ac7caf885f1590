use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use chartcode_service::{
    CodeRequest, CodeResponse, Error as ServiceError, IngestRequest, IngestResponse, ListResponse,
    SegmentRequest, SegmentResponse,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/charts/segment", post(segment))
        .route("/v1/charts/upload", post(upload))
        .route("/v1/charts", get(list))
        .route("/v1/charts/code", post(code))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn segment(
    State(state): State<AppState>,
    payload: Result<Json<SegmentRequest>, JsonRejection>,
) -> Result<Json<SegmentResponse>, ApiError> {
    let Json(payload) = payload?;
    Ok(Json(state.service.segment(payload)))
}

async fn upload(
    State(state): State<AppState>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<IngestResponse>, ApiError> {
    let Json(payload) = payload?;
    let response = state.service.ingest(payload).await?;
    Ok(Json(response))
}

async fn list(State(state): State<AppState>) -> Result<Json<ListResponse>, ApiError> {
    let response = state.service.list_notes().await?;
    Ok(Json(response))
}

async fn code(
    State(state): State<AppState>,
    payload: Result<Json<CodeRequest>, JsonRejection>,
) -> Result<Json<CodeResponse>, ApiError> {
    let Json(payload) = payload?;
    let response = state.service.code_chart(payload).await?;
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error_code: String,
    message: String,
    fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error_code: String,
    message: String,
    fields: Option<Vec<String>>,
}

impl ApiError {
    fn new(
        status: StatusCode,
        error_code: impl Into<String>,
        message: impl Into<String>,
        fields: Option<Vec<String>>,
    ) -> Self {
        Self {
            status,
            error_code: error_code.into(),
            message: message.into(),
            fields,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::MalformedInput { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, "malformed_input", message, None)
            }
            ServiceError::MissingField { field } => ApiError::new(
                StatusCode::BAD_REQUEST,
                "missing_field",
                message,
                Some(vec![field]),
            ),
            ServiceError::NotFound { .. } => {
                ApiError::new(StatusCode::NOT_FOUND, "not_found", message, None)
            }
            ServiceError::Upstream { .. } => ApiError::new(
                StatusCode::BAD_GATEWAY,
                "upstream_unavailable",
                message,
                None,
            ),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "malformed_input",
            rejection.body_text(),
            None,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error_code: self.error_code,
            message: self.message,
            fields: self.fields,
        };
        (self.status, Json(body)).into_response()
    }
}
