//! Shared test utilities for launchguide integration tests.
//!
//! - [`ScriptedGenerator`]: a [`PlanGenerator`] whose per-channel outcome
//!   (steps, failure, delay, hang, panic) is set up front, and which records
//!   every call and the peak number of calls in flight.
//! - [`ScriptedProvider`]: a [`ModelProvider`] replaying queued JSON answers.
//! - Onboarding fixtures in both variants.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use launchguide_core::onboarding::{
    OnboardingRecord, RawExtended, RawMinimal, RawOnboarding, validate,
};
use launchguide_core::plan::{ChannelPlan, GenerationError, PlanGenerator, PlanRequest};
use launchguide_core::provider::{ModelProvider, ProviderError, StructuredPrompt};

// ---------------------------------------------------------------------------
// ScriptedGenerator
// ---------------------------------------------------------------------------

/// What a scripted call returns once its delay has elapsed.
#[derive(Debug, Clone)]
pub enum ScriptResult {
    Steps(Vec<String>),
    Fail,
    /// Never completes.
    Hang,
    Panic,
}

/// Outcome of one channel: an optional delay, then a result.
#[derive(Debug, Clone)]
pub struct Script {
    pub delay: Duration,
    pub result: ScriptResult,
}

impl Script {
    pub fn steps(steps: &[&str]) -> Self {
        Self {
            delay: Duration::ZERO,
            result: ScriptResult::Steps(steps.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn fail() -> Self {
        Self {
            delay: Duration::ZERO,
            result: ScriptResult::Fail,
        }
    }

    pub fn hang() -> Self {
        Self {
            delay: Duration::ZERO,
            result: ScriptResult::Hang,
        }
    }

    pub fn panic() -> Self {
        Self {
            delay: Duration::ZERO,
            result: ScriptResult::Panic,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Plan generator with canned per-channel outcomes.
///
/// Channels without a script get `["1. Generic step for {channel}."]`.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, channel: &str, script: Script) -> Self {
        self.scripts.insert(channel.to_string(), script);
        self
    }

    /// Channels requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of calls observed running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlanGenerator for ScriptedGenerator {
    async fn generate(&self, request: &PlanRequest) -> Result<ChannelPlan, GenerationError> {
        self.calls.lock().unwrap().push(request.channel.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let script = self.scripts.get(&request.channel).cloned().unwrap_or_else(|| {
            let step = format!("1. Generic step for {}.", request.channel);
            Script::steps(&[step.as_str()])
        });
        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }

        let outcome = match script.result {
            ScriptResult::Steps(steps) => Ok(ChannelPlan {
                channel: request.channel.clone(),
                steps,
            }),
            ScriptResult::Fail => Err(GenerationError::Empty),
            ScriptResult::Hang => std::future::pending().await,
            ScriptResult::Panic => panic!("scripted panic for {}", request.channel),
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

// ---------------------------------------------------------------------------
// ScriptedProvider
// ---------------------------------------------------------------------------

/// Model provider that pops queued answers per prompt label (channel).
///
/// An empty queue answers `ProviderError::Unavailable`.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    answers: Mutex<HashMap<String, VecDeque<Result<Value, String>>>>,
    prompts: Mutex<Vec<StructuredPrompt>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, label: &str, value: Value) -> Self {
        self.push(label, Ok(value));
        self
    }

    pub fn fail(self, label: &str, message: &str) -> Self {
        self.push(label, Err(message.to_string()));
        self
    }

    fn push(&self, label: &str, answer: Result<Value, String>) {
        self.answers
            .lock()
            .unwrap()
            .entry(label.to_string())
            .or_default()
            .push_back(answer);
    }

    /// Every prompt received, in call order.
    pub fn prompts(&self) -> Vec<StructuredPrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &StructuredPrompt) -> Result<Value, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        let next = self
            .answers
            .lock()
            .unwrap()
            .get_mut(&prompt.label)
            .and_then(VecDeque::pop_front);
        match next {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(ProviderError::Unavailable(message)),
            None => Err(ProviderError::Unavailable(format!(
                "no scripted answer for {}",
                prompt.label
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn sample_minimal_raw() -> RawOnboarding {
    RawOnboarding::Minimal(RawMinimal {
        product_description: Some("A todo app for freelancers".into()),
        target_audience: Some("Freelance designers".into()),
        business_goal: Some("First 50 paying users".into()),
        budget_constraints: Some("Under $200/month".into()),
        marketing_knowledge: Some("Beginner".into()),
    })
}

pub fn sample_minimal_record() -> OnboardingRecord {
    validate(&sample_minimal_raw()).expect("fixture is valid")
}

pub fn sample_extended_raw() -> RawOnboarding {
    RawOnboarding::Extended(RawExtended {
        product_overview: Some("Invoice OCR for small agencies".into()),
        core_value_proposition: Some("Books closed in minutes".into()),
        audience_type: Some("Business".into()),
        business_audience: Some("Agencies with 5-20 staff".into()),
        current_awareness: Some("MVP live".into()),
        goal: Some("Waitlist signups".into()),
        budget: Some(500.0),
        preferred_channel_types: Some(vec!["SEO (Basic)".into()]),
        other_channel: Some("Podcasts".into()),
        email: Some("founder@example.com".into()),
        ..RawExtended::default()
    })
}
