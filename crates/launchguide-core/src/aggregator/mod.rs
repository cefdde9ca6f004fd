//! Plan aggregator: fans one submission out across the selected channels and
//! merges the per-channel plans in selection order.
//!
//! Every channel runs as its own spawned task, all in flight at once, each
//! bounded by `channel_timeout`. A channel that fails, times out or panics
//! contributes the failure sentinel instead of steps; the batch itself only
//! fails on an empty selection or invalid input.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::onboarding::{OnboardingRecord, RawOnboarding, ValidationError, validate};
use crate::plan::{AggregatedPlan, ChannelPlan, GenerationError, PlanGenerator, PlanRequest};

/// Configuration for the aggregator.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Wall time limit for one channel, retries included.
    pub channel_timeout: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            channel_timeout: Duration::from_secs(90),
        }
    }
}

/// Errors that abort a whole aggregation. Per-channel failures never do.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("no channels selected")]
    EmptySelection,

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Runs the plan generator once per selected channel and merges the results.
#[derive(Clone)]
pub struct Aggregator {
    generator: Arc<dyn PlanGenerator>,
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(generator: Arc<dyn PlanGenerator>, config: AggregatorConfig) -> Self {
        Self { generator, config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Validate a raw submission, then aggregate.
    ///
    /// Invalid input is rejected before any generator call is made.
    pub async fn submit(
        &self,
        raw: &RawOnboarding,
        channels: &[String],
    ) -> Result<AggregatedPlan, AggregateError> {
        let record = validate(raw)?;
        self.aggregate(Arc::new(record), channels).await
    }

    /// Generate every channel concurrently and merge in selection order.
    pub async fn aggregate(
        &self,
        record: Arc<OnboardingRecord>,
        channels: &[String],
    ) -> Result<AggregatedPlan, AggregateError> {
        self.aggregate_as(Uuid::new_v4(), record, channels).await
    }

    /// Like [`aggregate`](Self::aggregate), under a caller-chosen submission
    /// id so the caller can correlate logs with what it persists.
    pub async fn aggregate_as(
        &self,
        submission_id: Uuid,
        record: Arc<OnboardingRecord>,
        channels: &[String],
    ) -> Result<AggregatedPlan, AggregateError> {
        if channels.is_empty() {
            return Err(AggregateError::EmptySelection);
        }

        let timeout = self.config.channel_timeout;
        tracing::info!(
            %submission_id,
            variant = record.variant_name(),
            channels = channels.len(),
            "aggregating marketing plan"
        );

        let handles: Vec<_> = channels
            .iter()
            .map(|channel| {
                let generator = Arc::clone(&self.generator);
                let request = PlanRequest::new(Arc::clone(&record), channel.clone());
                let span = tracing::info_span!("channel_plan", %submission_id, channel = %channel);

                tokio::spawn(
                    async move {
                        match tokio::time::timeout(timeout, generator.generate(&request)).await {
                            Ok(result) => result,
                            Err(_) => Err(GenerationError::TimedOut(timeout)),
                        }
                    }
                    .instrument(span),
                )
            })
            .collect();

        // Join-all: wait for every channel, then read results in selection
        // order regardless of completion order.
        let results = join_all(handles).await;

        let mut plan = AggregatedPlan::new();
        let mut failed = 0usize;
        for (channel, joined) in channels.iter().zip(results) {
            let channel_plan = match joined {
                Ok(Ok(generated)) => ChannelPlan {
                    channel: channel.clone(),
                    steps: generated.steps,
                },
                Ok(Err(e)) => {
                    failed += 1;
                    tracing::warn!(
                        %submission_id,
                        channel = %channel,
                        error = %e,
                        "channel plan failed, substituting sentinel"
                    );
                    ChannelPlan::failed(channel.clone())
                }
                Err(join_err) => {
                    failed += 1;
                    tracing::error!(
                        %submission_id,
                        channel = %channel,
                        error = %join_err,
                        "channel task aborted, substituting sentinel"
                    );
                    ChannelPlan::failed(channel.clone())
                }
            };
            plan.push_channel(&channel_plan);
        }

        tracing::info!(
            %submission_id,
            channels = channels.len(),
            failed,
            lines = plan.len(),
            "marketing plan aggregated"
        );
        Ok(plan)
    }
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
