use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::onboarding::OnboardingRecord;

/// Line substituted for a channel's steps when generation fails.
pub const FAILURE_SENTINEL: &str = "Failed to generate plan.";

/// Maximum number of steps kept per channel.
pub const MAX_STEPS: usize = 10;

const HEADING_PREFIX: &str = "## ";

/// Heading line that introduces a channel in an [`AggregatedPlan`].
pub fn channel_heading(channel: &str) -> String {
    format!("{HEADING_PREFIX}{channel}")
}

/// Whether a plan line is a channel heading.
pub fn is_heading(line: &str) -> bool {
    line.starts_with(HEADING_PREFIX)
}

/// One unit of work for the plan generator: a record and one target channel.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub record: Arc<OnboardingRecord>,
    /// Target channel. Need not be in the catalog.
    pub channel: String,
}

impl PlanRequest {
    pub fn new(record: Arc<OnboardingRecord>, channel: impl Into<String>) -> Self {
        Self {
            record,
            channel: channel.into(),
        }
    }
}

/// Ordered steps generated for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPlan {
    pub channel: String,
    /// Each step carries its 1-based ordinal (`"1. ..."`).
    pub steps: Vec<String>,
}

impl ChannelPlan {
    /// The plan shown for a channel whose generation failed.
    pub fn failed(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            steps: vec![FAILURE_SENTINEL.to_string()],
        }
    }

    pub fn is_failed(&self) -> bool {
        self.steps.len() == 1 && self.steps[0] == FAILURE_SENTINEL
    }
}

/// Headings and steps of every selected channel, flattened in selection
/// order. Serializes as a plain JSON array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregatedPlan {
    lines: Vec<String>,
}

impl AggregatedPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Append a channel heading followed by the channel's steps.
    pub fn push_channel(&mut self, plan: &ChannelPlan) {
        self.lines.push(channel_heading(&plan.channel));
        self.lines.extend(plan.steps.iter().cloned());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Channel names in the order their headings appear.
    pub fn channels(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|l| l.strip_prefix(HEADING_PREFIX))
            .collect()
    }

    /// Steps listed under `channel`'s heading, or `None` if it has no heading.
    pub fn steps_for(&self, channel: &str) -> Option<&[String]> {
        let heading = channel_heading(channel);
        let start = self.lines.iter().position(|l| *l == heading)? + 1;
        let len = self.lines[start..]
            .iter()
            .position(|l| is_heading(l))
            .unwrap_or(self.lines.len() - start);
        Some(&self.lines[start..start + len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(channel: &str, steps: &[&str]) -> ChannelPlan {
        ChannelPlan {
            channel: channel.to_string(),
            steps: steps.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn push_channel_adds_heading_then_steps() {
        let mut aggregated = AggregatedPlan::new();
        aggregated.push_channel(&plan("SEO (Basic)", &["1. Pick keywords.", "2. Write."]));
        assert_eq!(
            aggregated.lines(),
            &["## SEO (Basic)", "1. Pick keywords.", "2. Write."]
        );
    }

    #[test]
    fn channels_and_steps_for() {
        let mut aggregated = AggregatedPlan::new();
        aggregated.push_channel(&plan("A", &["1. a1", "2. a2"]));
        aggregated.push_channel(&ChannelPlan::failed("B"));
        aggregated.push_channel(&plan("C", &["1. c1"]));

        assert_eq!(aggregated.channels(), vec!["A", "B", "C"]);
        assert_eq!(aggregated.steps_for("A").unwrap(), &["1. a1", "2. a2"]);
        assert_eq!(aggregated.steps_for("B").unwrap(), &[FAILURE_SENTINEL]);
        assert_eq!(aggregated.steps_for("C").unwrap(), &["1. c1"]);
        assert!(aggregated.steps_for("D").is_none());
    }

    #[test]
    fn failed_plan_is_exactly_the_sentinel() {
        let failed = ChannelPlan::failed("SEO (Basic)");
        assert!(failed.is_failed());
        assert_eq!(failed.steps, vec![FAILURE_SENTINEL]);
        assert!(!plan("x", &["1. ok"]).is_failed());
    }

    #[test]
    fn aggregated_plan_serializes_as_string_array() {
        let aggregated = AggregatedPlan::from_lines(vec!["## A".into(), "1. a".into()]);
        let json = serde_json::to_string(&aggregated).unwrap();
        assert_eq!(json, r###"["## A","1. a"]"###);
        let back: AggregatedPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, aggregated);
    }
}
