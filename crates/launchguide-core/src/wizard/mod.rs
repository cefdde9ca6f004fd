//! The founder's flow as a chain of immutable step values.
//!
//! ```text
//! OnboardingStep ──submit──▶ ChannelSelectionStep ──choose──▶ PrioritizationStep
//!                                                               │  move_channel
//!                                                               ▼
//!                                                   generate ──▶ PlanDisplayStep
//! ```
//!
//! Each step holds only what the next one needs; nothing is shared or
//! mutated between steps, so a step can be retried or revisited freely.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::aggregator::{AggregateError, Aggregator};
use crate::catalog::{SelectionError, SelectionPolicy};
use crate::checklist::Checklist;
use crate::onboarding::{OnboardingRecord, RawOnboarding, ValidationError, validate};
use crate::store::PlanMeta;

#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("invalid channel selection: {0}")]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// Direction for reordering a channel during prioritization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Entry point: collects the onboarding form.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnboardingStep;

impl OnboardingStep {
    pub fn submit(raw: &RawOnboarding) -> Result<ChannelSelectionStep, WizardError> {
        let record = validate(raw)?;
        tracing::debug!(variant = record.variant_name(), "onboarding accepted");
        Ok(ChannelSelectionStep {
            record: Arc::new(record),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ChannelSelectionStep {
    record: Arc<OnboardingRecord>,
}

impl ChannelSelectionStep {
    pub fn record(&self) -> &OnboardingRecord {
        &self.record
    }

    pub fn choose(
        &self,
        channels: Vec<String>,
        policy: SelectionPolicy,
    ) -> Result<PrioritizationStep, WizardError> {
        policy.check(&channels)?;
        Ok(PrioritizationStep {
            record: Arc::clone(&self.record),
            channels,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PrioritizationStep {
    record: Arc<OnboardingRecord>,
    channels: Vec<String>,
}

impl PrioritizationStep {
    /// Channels in their current priority order.
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Swap `name` with its neighbour. No-op at the edges or when `name` is
    /// not selected.
    pub fn move_channel(&self, name: &str, direction: Direction) -> Self {
        let mut channels = self.channels.clone();
        if let Some(i) = channels.iter().position(|c| c == name) {
            match direction {
                Direction::Up if i > 0 => channels.swap(i, i - 1),
                Direction::Down if i + 1 < channels.len() => channels.swap(i, i + 1),
                _ => {}
            }
        }
        Self {
            record: Arc::clone(&self.record),
            channels,
        }
    }

    /// Generate the plan for every channel in priority order.
    pub async fn generate(&self, aggregator: &Aggregator) -> Result<PlanDisplayStep, WizardError> {
        let submission_id = Uuid::new_v4();
        let plan = aggregator
            .aggregate_as(submission_id, Arc::clone(&self.record), &self.channels)
            .await?;
        Ok(PlanDisplayStep {
            meta: PlanMeta::new(submission_id, self.channels.clone()),
            checklist: Checklist::new(plan),
        })
    }
}

/// Final step: the plan as a checklist with fresh completion state.
#[derive(Debug, Clone)]
pub struct PlanDisplayStep {
    meta: PlanMeta,
    checklist: Checklist,
}

impl PlanDisplayStep {
    pub fn meta(&self) -> &PlanMeta {
        &self.meta
    }

    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    pub fn into_parts(self) -> (PlanMeta, Checklist) {
        (self.meta, self.checklist)
    }
}
