//! HTTP API for Trust Fingerprint
//!
//! Endpoints:
//! - GET /health - Health check
//! - POST /fingerprint - Messages → rhythm + commitment
//! - POST /evaluate - Signal → verdict
//! - POST /verify - Messages + remote hash → agreement
//! - POST /report - Both pipelines, merged
//!
//! Pure computation: callers supply messages and signals in the body.
//! Computation errors come back as 422 with `{ kind, message }`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::core::adapter::filter_exchange;
use crate::core::commitment::{verify_agreement, CommitmentBuilder};
use crate::core::evaluator::TrustEvaluator;
use crate::core::pipeline::FingerprintOutcome;
use crate::core::report::ReportFormatter;
use crate::error::FingerprintError;
use crate::types::{
    Hash256, MessageRecord, ParticipantPair, Pipeline, StructuredReport, TrustSignal,
    TrustThreshold, TrustVerdict,
};

/// App state
#[derive(Debug)]
pub struct AppState {
    /// Applied when a request carries no threshold
    pub threshold: TrustThreshold,
}

/// Fingerprint request
#[derive(Debug, Clone, Deserialize)]
pub struct FingerprintRequest {
    pub participants: ParticipantPair,
    pub messages: Vec<MessageRecord>,
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
}

/// Evaluate request
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateRequest {
    pub signal: TrustSignal,
    #[serde(default)]
    pub threshold: Option<TrustThreshold>,
}

/// Verify request
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(flatten)]
    pub exchange: FingerprintRequest,
    pub remote_exchange_hash: Hash256,
}

/// Verify response
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub agreed: bool,
    pub local_exchange_hash: Hash256,
}

/// Report request; each half is optional
#[derive(Debug, Deserialize)]
pub struct ReportBody {
    #[serde(default)]
    pub fingerprint: Option<FingerprintRequest>,
    #[serde(default)]
    pub evaluation: Option<EvaluateRequest>,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub kind: String,
    pub message: String,
}

/// FingerprintError as an HTTP response
pub struct ApiError(FingerprintError);

impl From<FingerprintError> for ApiError {
    fn from(err: FingerprintError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_computation_error() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::BAD_GATEWAY
        };
        let body = ErrorResponse {
            kind: self.0.kind().to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Create the API router
pub fn create_router(threshold: TrustThreshold) -> Router {
    let state = Arc::new(AppState { threshold });

    Router::new()
        .route("/health", get(health))
        .route("/fingerprint", post(fingerprint))
        .route("/evaluate", post(evaluate))
        .route("/verify", post(verify))
        .route("/report", post(report))
        .with_state(state)
}

/// Health check endpoint
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}

async fn fingerprint(Json(req): Json<FingerprintRequest>) -> Result<Json<FingerprintOutcome>, ApiError> {
    Ok(Json(fingerprint_exchange(&req)?))
}

async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<TrustVerdict>, ApiError> {
    Ok(Json(evaluate_signal(&state, &req)?))
}

async fn verify(Json(req): Json<VerifyRequest>) -> Result<Json<VerifyResponse>, ApiError> {
    let outcome = fingerprint_exchange(&req.exchange)?;
    Ok(Json(VerifyResponse {
        agreed: verify_agreement(&outcome.commitment, &req.remote_exchange_hash),
        local_exchange_hash: outcome.commitment.exchange_hash,
    }))
}

/// Always 200: a failed half is recorded in `errors`
async fn report(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReportBody>,
) -> Json<StructuredReport> {
    let fingerprint = req.fingerprint.as_ref().map(fingerprint_exchange);
    let evaluation = req.evaluation.as_ref().map(|e| evaluate_signal(&state, e));

    let outcome = fingerprint.as_ref().and_then(|r| r.as_ref().ok());
    let verdict = evaluation.as_ref().and_then(|r| r.as_ref().ok());

    let mut report = ReportFormatter::new().format(outcome.map(|o| &o.commitment), verdict);
    if let Some(outcome) = outcome {
        report = report.with_rhythm(&outcome.rhythm);
    }
    if let Some(Err(err)) = &fingerprint {
        report = report.with_error(Pipeline::Fingerprint, err);
    }
    if let Some(Err(err)) = &evaluation {
        report = report.with_error(Pipeline::Evaluation, err);
    }
    Json(report)
}

fn fingerprint_exchange(req: &FingerprintRequest) -> Result<FingerprintOutcome, FingerprintError> {
    let pair = &req.participants;
    let messages = filter_exchange(req.messages.iter().cloned(), pair.first(), pair.second(), req.since);
    let (rhythm, commitment) = CommitmentBuilder::new().fingerprint(pair, &messages)?;
    Ok(FingerprintOutcome { rhythm, commitment })
}

fn evaluate_signal(state: &AppState, req: &EvaluateRequest) -> Result<TrustVerdict, FingerprintError> {
    let threshold = req.threshold.unwrap_or(state.threshold);
    TrustEvaluator::new().evaluate(&req.signal, &threshold)
}

/// Run the API server
pub async fn run_server(addr: &str, threshold: TrustThreshold) -> std::io::Result<()> {
    let router = create_router(threshold);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, version = crate::VERSION, "trust fingerprint API listening");
    axum::serve(listener, router).await?;
    Ok(())
}
