//! Pipelines over injected adapters
//!
//! - fingerprint: MessageStore → RhythmAnalyzer → CommitmentBuilder
//! - evaluation:  SignalReader → TrustEvaluator
//!
//! The two are independent: `report()` runs both concurrently and a
//! failure in one is recorded without blocking the other.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::core::adapter::{MessageStore, SignalReader};
use crate::core::commitment::{verify_agreement, CommitmentBuilder};
use crate::core::evaluator::TrustEvaluator;
use crate::core::report::ReportFormatter;
use crate::core::rhythm::RhythmAnalyzer;
use crate::error::FingerprintError;
use crate::types::{
    ExchangeCommitment, Hash256, ParticipantId, ParticipantPair, Pipeline,
    RhythmMetrics, StructuredReport, TrustThreshold, TrustVerdict,
};
use crate::DEFAULT_ADAPTER_TIMEOUT_SECS;

/// Output of the fingerprint pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintOutcome {
    pub rhythm: RhythmMetrics,
    pub commitment: ExchangeCommitment,
}

/// What a combined report should cover
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    /// Pair to fingerprint; skipped when absent
    pub participants: Option<(ParticipantId, ParticipantId)>,
    pub since: Option<DateTime<Utc>>,
    /// Identity to evaluate; skipped when absent
    pub identity_key: Option<String>,
}

/// Both pipelines with their adapters injected
#[derive(Clone)]
pub struct TrustPipeline {
    store: Arc<dyn MessageStore>,
    reader: Arc<dyn SignalReader>,
    threshold: TrustThreshold,
    timeout: Duration,
}

impl std::fmt::Debug for TrustPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustPipeline")
            .field("store", &self.store.name())
            .field("reader", &self.reader.name())
            .field("threshold", &self.threshold)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TrustPipeline {
    /// Create with default threshold and timeout
    pub fn new(store: Arc<dyn MessageStore>, reader: Arc<dyn SignalReader>) -> Self {
        Self {
            store,
            reader,
            threshold: TrustThreshold::default(),
            timeout: Duration::from_secs(DEFAULT_ADAPTER_TIMEOUT_SECS),
        }
    }

    /// Create with threshold and timeout from config
    pub fn from_config(
        store: Arc<dyn MessageStore>,
        reader: Arc<dyn SignalReader>,
        config: &Config,
    ) -> Self {
        Self::new(store, reader)
            .with_threshold(config.thresholds)
            .with_timeout(config.adapters.timeout())
    }

    pub fn with_threshold(mut self, threshold: TrustThreshold) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch, analyze and commit one exchange
    pub async fn fingerprint(
        &self,
        a: &ParticipantId,
        b: &ParticipantId,
        since: Option<DateTime<Utc>>,
    ) -> Result<FingerprintOutcome, FingerprintError> {
        let messages = self
            .bounded(self.store.name(), self.store.fetch_messages(a, b, since))
            .await?;

        let pair = ParticipantPair::new(a.clone(), b.clone());
        let rhythm = RhythmAnalyzer::new().compute(&messages);
        let commitment = CommitmentBuilder::new().build(&pair, &messages, &rhythm)?;

        Ok(FingerprintOutcome { rhythm, commitment })
    }

    /// Fingerprint locally and compare with the counter-party's hash
    pub async fn verify(
        &self,
        a: &ParticipantId,
        b: &ParticipantId,
        since: Option<DateTime<Utc>>,
        remote_exchange_hash: &Hash256,
    ) -> Result<bool, FingerprintError> {
        let outcome = self.fingerprint(a, b, since).await?;
        let agreed = verify_agreement(&outcome.commitment, remote_exchange_hash);
        debug!(pair = %outcome.commitment.participants, agreed, "agreement checked");
        Ok(agreed)
    }

    /// Read and evaluate one identity
    pub async fn evaluate(&self, identity_key: &str) -> Result<TrustVerdict, FingerprintError> {
        let signal = self
            .bounded(self.reader.name(), self.reader.read_identity_signal(identity_key))
            .await?;
        TrustEvaluator::new().evaluate(&signal, &self.threshold)
    }

    /// Run the requested pipelines concurrently and merge the results
    pub async fn report(&self, request: &ReportRequest) -> StructuredReport {
        let fingerprint = async {
            match &request.participants {
                Some((a, b)) => Some(self.fingerprint(a, b, request.since).await),
                None => None,
            }
        };
        let evaluation = async {
            match &request.identity_key {
                Some(key) => Some(self.evaluate(key).await),
                None => None,
            }
        };

        let (fingerprint, evaluation) = tokio::join!(fingerprint, evaluation);

        let (outcome, fingerprint_err) = split(fingerprint);
        let (verdict, evaluation_err) = split(evaluation);

        let mut report = ReportFormatter::new().format(
            outcome.as_ref().map(|o| &o.commitment),
            verdict.as_ref(),
        );
        if let Some(outcome) = &outcome {
            report = report.with_rhythm(&outcome.rhythm);
        }
        if let Some(err) = fingerprint_err {
            report = report.with_error(Pipeline::Fingerprint, &err);
        }
        if let Some(err) = evaluation_err {
            report = report.with_error(Pipeline::Evaluation, &err);
        }
        report
    }

    /// Bound an adapter call by the configured timeout
    async fn bounded<T>(
        &self,
        adapter: &'static str,
        call: impl Future<Output = Result<T, FingerprintError>>,
    ) -> Result<T, FingerprintError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                warn!(adapter, error = %err, "adapter call failed");
                Err(err)
            }
            Err(elapsed) => {
                warn!(adapter, timeout_ms = self.timeout.as_millis() as u64, "adapter call timed out");
                Err(FingerprintError::adapter(adapter, elapsed))
            }
        }
    }
}

fn split<T>(result: Option<Result<T, FingerprintError>>) -> (Option<T>, Option<FingerprintError>) {
    match result {
        Some(Ok(value)) => (Some(value), None),
        Some(Err(err)) => (None, Some(err)),
        None => (None, None),
    }
}

// =============================================================================
// TESTS
// =============================================================================
