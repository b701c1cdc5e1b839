use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use extract::{Envelope, Extraction, IncidentWorkflow, WorkflowError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    workflow: Option<Arc<IncidentWorkflow>>,
    uniform_ok_status: bool,
}

impl AppState {
    pub fn ready(workflow: Arc<IncidentWorkflow>, uniform_ok_status: bool) -> Self {
        Self {
            workflow: Some(workflow),
            uniform_ok_status,
        }
    }

    /// State before the workflow has been built; extraction requests fail.
    pub fn uninitialized() -> Self {
        Self {
            workflow: None,
            uniform_ok_status: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.workflow.is_some()
    }

    fn workflow(&self) -> Result<&IncidentWorkflow, ApiError> {
        self.workflow.as_deref().ok_or(ApiError::NotInitialized)
    }
}

#[derive(Deserialize)]
struct ExtractIncidentRequest {
    base_text: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    workflow_initialized: bool,
}

#[derive(Debug)]
pub enum ApiError {
    NotInitialized,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotInitialized => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Incident workflow not initialized",
            )
                .into_response(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/extract_incident", post(extract_incident))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP status for an extraction outcome; the body is the envelope either way.
pub fn status_for(result: &Result<Extraction, WorkflowError>, uniform_ok_status: bool) -> StatusCode {
    match result {
        _ if uniform_ok_status => StatusCode::OK,
        Ok(_) => StatusCode::OK,
        Err(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
        Err(_) => StatusCode::BAD_GATEWAY,
    }
}

async fn extract_incident(
    State(state): State<AppState>,
    Json(req): Json<ExtractIncidentRequest>,
) -> Result<(StatusCode, Json<Envelope>), ApiError> {
    let workflow = state.workflow()?;

    let result = workflow.extract(&req.base_text).await;
    let status = status_for(&result, state.uniform_ok_status);

    Ok((status, Json(Envelope::from(&result))))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        workflow_initialized: state.is_ready(),
    })
}
