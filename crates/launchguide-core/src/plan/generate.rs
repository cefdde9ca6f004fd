//! Plan generation: one channel, one model call, one validated step list.
//!
//! [`PlanGenerator`] is the seam the aggregator depends on. The production
//! implementation, [`ModelPlanGenerator`], renders the prompt, calls a
//! [`ModelProvider`], validates the answer against the plan schema, and
//! normalizes step numbering. Failed attempts are retried with exponential
//! backoff; the last error is returned once retries are exhausted.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use regex::Regex;
use thiserror::Error;

use crate::provider::{ModelProvider, ProviderError, StructuredPrompt};

use super::prompt::build_structured_prompt;
use super::types::{ChannelPlan, MAX_STEPS, PlanRequest};

/// Leading ordinal such as `"3. "`, `"3) "` or `" 3 . "`. The marker must be
/// followed by whitespace or the end of the step, so `"2.5 hours"` is text.
static LEADING_ORDINAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d+\s*[.)](?:\s+|$)").expect("ordinal pattern is valid")
});

/// Why a single channel's plan could not be produced.
///
/// Callers treat every variant the same way ("generation failed"); the
/// variants exist for logging.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("generation failed: response does not match the plan schema: {0}")]
    Schema(String),

    #[error("generation failed: model returned no steps")]
    Empty,

    #[error("generation failed: no answer within {0:?}")]
    TimedOut(Duration),

    #[error("generation failed: channel name is blank")]
    BlankChannel,
}

/// Produces the plan for one record and one channel.
///
/// Object-safe so the aggregator can hold `Arc<dyn PlanGenerator>` and tests
/// can substitute canned implementations.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, request: &PlanRequest) -> Result<ChannelPlan, GenerationError>;
}

/// Bounded retry with exponential backoff and jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. `0` disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const NONE: Self = Self {
        max_retries: 0,
        backoff: Duration::ZERO,
    };

    /// Delay before retry number `retry` (0-based), plus up to 50% jitter.
    pub fn delay(&self, retry: u32) -> Duration {
        let base = self.backoff.saturating_mul(2u32.saturating_pow(retry));
        let jitter_ms = (base.as_millis() / 2) as u64;
        if jitter_ms == 0 {
            return base;
        }
        base + Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

/// [`PlanGenerator`] backed by a [`ModelProvider`].
pub struct ModelPlanGenerator {
    provider: Arc<dyn ModelProvider>,
    retry: RetryPolicy,
}

impl ModelPlanGenerator {
    pub fn new(provider: Arc<dyn ModelProvider>, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// One provider call, validated and normalized.
    async fn attempt(&self, prompt: &StructuredPrompt) -> Result<Vec<String>, GenerationError> {
        let value = self.provider.complete(prompt).await?;
        normalize_steps(parse_plan_output(&value)?)
    }
}

impl std::fmt::Debug for ModelPlanGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelPlanGenerator")
            .field("provider", &self.provider.name())
            .field("retry", &self.retry)
            .finish()
    }
}

#[async_trait]
impl PlanGenerator for ModelPlanGenerator {
    async fn generate(&self, request: &PlanRequest) -> Result<ChannelPlan, GenerationError> {
        if request.channel.trim().is_empty() {
            return Err(GenerationError::BlankChannel);
        }

        let prompt = build_structured_prompt(request);
        let mut retry = 0;
        loop {
            match self.attempt(&prompt).await {
                Ok(steps) => {
                    tracing::debug!(
                        channel = %request.channel,
                        steps = steps.len(),
                        retries = retry,
                        "channel plan generated"
                    );
                    return Ok(ChannelPlan {
                        channel: request.channel.clone(),
                        steps,
                    });
                }
                Err(e) if retry < self.retry.max_retries => {
                    let delay = self.retry.delay(retry);
                    tracing::warn!(
                        channel = %request.channel,
                        provider = %self.provider.name(),
                        error = %e,
                        retry = retry + 1,
                        delay_ms = delay.as_millis() as u64,
                        "plan generation attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        channel = %request.channel,
                        provider = %self.provider.name(),
                        error = %e,
                        "plan generation failed"
                    );
                    return Err(e);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Output validation
// ---------------------------------------------------------------------------

/// Check a model answer against `{ "planSteps": [string, ...] }`.
///
/// Extra keys are ignored; a missing key, a non-array value, or a non-string
/// element is a schema violation.
pub fn parse_plan_output(value: &serde_json::Value) -> Result<Vec<String>, GenerationError> {
    let object = value
        .as_object()
        .ok_or_else(|| GenerationError::Schema("expected a JSON object".to_string()))?;
    let steps = object
        .get("planSteps")
        .ok_or_else(|| GenerationError::Schema("missing planSteps".to_string()))?
        .as_array()
        .ok_or_else(|| GenerationError::Schema("planSteps is not an array".to_string()))?;

    steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            step.as_str().map(str::to_owned).ok_or_else(|| {
                GenerationError::Schema(format!("planSteps[{i}] is not a string"))
            })
        })
        .collect()
}

/// Number steps `1.`..`n.` in emission order.
///
/// Any ordinal the model already wrote is stripped first, so steps are never
/// double-numbered. Blank steps are dropped and the list is capped at
/// [`MAX_STEPS`]. An empty result is an error.
pub fn normalize_steps(steps: Vec<String>) -> Result<Vec<String>, GenerationError> {
    let stripped: Vec<String> = steps
        .iter()
        .map(|s| strip_ordinal(s).trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect();

    if stripped.is_empty() {
        return Err(GenerationError::Empty);
    }
    if stripped.len() > MAX_STEPS {
        tracing::debug!(
            emitted = stripped.len(),
            kept = MAX_STEPS,
            "truncating plan to step limit"
        );
    }

    Ok(stripped
        .into_iter()
        .take(MAX_STEPS)
        .enumerate()
        .map(|(i, s)| format!("{}. {s}", i + 1))
        .collect())
}

fn strip_ordinal(step: &str) -> &str {
    match LEADING_ORDINAL.find(step) {
        Some(m) => &step[m.end()..],
        None => step,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
