//! Onboarding form validation.
//!
//! Converts a [`RawOnboarding`] payload into an [`OnboardingRecord`] and
//! checks:
//! - Minimal variant: every field is present and non-blank.
//! - Extended variant: `email` is present and looks like `local@domain.tld`.
//! - `budget` is finite and within `0..=10000`.
//! - Enumerated fields are members of their enumeration.
//!
//! Validation is pure and never touches the network.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{
    AudienceType, ExtendedRecord, MinimalRecord, OnboardingRecord, TargetAudience,
};

/// Upper bound of the budget slider.
pub const MAX_BUDGET: f64 = 10_000.0;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// Unvalidated onboarding form payload, as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum RawOnboarding {
    Minimal(RawMinimal),
    Extended(RawExtended),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMinimal {
    pub product_description: Option<String>,
    pub target_audience: Option<String>,
    pub business_goal: Option<String>,
    pub budget_constraints: Option<String>,
    pub marketing_knowledge: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawExtended {
    pub product_overview: Option<String>,
    pub core_value_proposition: Option<String>,
    /// `Consumers`, `Business` or `Government`; selects which of the three
    /// audience sub-fields is authoritative.
    pub audience_type: Option<String>,
    pub consumers_audience: Option<String>,
    pub business_audience: Option<String>,
    pub government_audience: Option<String>,
    pub current_awareness: Option<String>,
    pub goal: Option<String>,
    pub budget: Option<f64>,
    pub strengths_to_leverage: Option<String>,
    pub major_constraints: Option<String>,
    pub preferred_channel_types: Option<Vec<String>>,
    /// Free-text channel appended to `preferred_channel_types`.
    pub other_channel: Option<String>,
    pub tone_and_brand_personality: Option<String>,
    pub email: Option<String>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// One field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Form field name, as submitted (camelCase).
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_owned(),
            message: message.into(),
        }
    }
}

/// Onboarding input that does not satisfy its schema. Lists every violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid onboarding input: {}", summarize(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Whether `field` is among the rejected fields.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a raw onboarding payload.
pub fn validate(raw: &RawOnboarding) -> Result<OnboardingRecord, ValidationError> {
    match raw {
        RawOnboarding::Minimal(m) => validate_minimal(m).map(OnboardingRecord::Minimal),
        RawOnboarding::Extended(e) => validate_extended(e).map(OnboardingRecord::Extended),
    }
}

fn validate_minimal(raw: &RawMinimal) -> Result<MinimalRecord, ValidationError> {
    let mut errors = Vec::new();
    let mut required = |field: &str, value: &Option<String>| match non_blank(value) {
        Some(v) => v,
        None => {
            errors.push(FieldError::new(field, "is required"));
            String::new()
        }
    };

    let record = MinimalRecord {
        product_description: required("productDescription", &raw.product_description),
        target_audience: required("targetAudience", &raw.target_audience),
        business_goal: required("businessGoal", &raw.business_goal),
        budget_constraints: required("budgetConstraints", &raw.budget_constraints),
        marketing_knowledge: required("marketingKnowledge", &raw.marketing_knowledge),
    };

    if errors.is_empty() {
        Ok(record)
    } else {
        Err(ValidationError { errors })
    }
}

fn validate_extended(raw: &RawExtended) -> Result<ExtendedRecord, ValidationError> {
    let mut errors = Vec::new();

    // Email: mandatory, basic address pattern.
    let email = match non_blank(&raw.email) {
        Some(e) if EMAIL_PATTERN.is_match(&e) => e,
        Some(_) => {
            errors.push(FieldError::new("email", "must look like name@domain.tld"));
            String::new()
        }
        None => {
            errors.push(FieldError::new("email", "is required"));
            String::new()
        }
    };

    // Budget: optional, finite, 0..=MAX_BUDGET.
    if let Some(budget) = raw.budget {
        if !budget.is_finite() || !(0.0..=MAX_BUDGET).contains(&budget) {
            errors.push(FieldError::new(
                "budget",
                format!("must be between 0 and {MAX_BUDGET}"),
            ));
        }
    }

    let current_awareness = parse_label(&raw.current_awareness, "currentAwareness", &mut errors);
    let goal = parse_label(&raw.goal, "goal", &mut errors);
    let audience_type: Option<AudienceType> =
        parse_label(&raw.audience_type, "audienceType", &mut errors);

    // Only the sub-field matching the selected audience type counts.
    let target_audience = audience_type.map(|audience_type| {
        let description = match audience_type {
            AudienceType::Consumers => non_blank(&raw.consumers_audience),
            AudienceType::Business => non_blank(&raw.business_audience),
            AudienceType::Government => non_blank(&raw.government_audience),
        };
        TargetAudience {
            audience_type,
            description,
        }
    });

    let mut preferred_channel_types: Vec<String> = Vec::new();
    let candidates = raw
        .preferred_channel_types
        .iter()
        .flatten()
        .chain(raw.other_channel.iter());
    for name in candidates {
        let name = name.trim();
        if !name.is_empty() && !preferred_channel_types.iter().any(|c| c == name) {
            preferred_channel_types.push(name.to_owned());
        }
    }

    if !errors.is_empty() {
        return Err(ValidationError { errors });
    }

    Ok(ExtendedRecord {
        product_overview: non_blank(&raw.product_overview),
        core_value_proposition: non_blank(&raw.core_value_proposition),
        target_audience,
        current_awareness,
        goal,
        budget: raw.budget,
        strengths_to_leverage: non_blank(&raw.strengths_to_leverage),
        major_constraints: non_blank(&raw.major_constraints),
        preferred_channel_types,
        tone_and_brand_personality: non_blank(&raw.tone_and_brand_personality),
        email,
    })
}

/// Trimmed value, or `None` when absent or blank.
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Parse an optional enumerated label, recording a field error on mismatch.
fn parse_label<T>(value: &Option<String>, field: &str, errors: &mut Vec<FieldError>) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let value = non_blank(value)?;
    match value.parse::<T>() {
        Ok(v) => Some(v),
        Err(e) => {
            errors.push(FieldError::new(field, e.to_string()));
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::types::{AwarenessStage, Goal};

    fn minimal() -> RawMinimal {
        RawMinimal {
            product_description: Some("A todo app".to_string()),
            target_audience: Some("busy professionals".to_string()),
            business_goal: Some("first 10 paying customers".to_string()),
            budget_constraints: Some("<$500/month".to_string()),
            marketing_knowledge: Some("beginner".to_string()),
        }
    }

    fn extended() -> RawExtended {
        RawExtended {
            email: Some("founder@example.com".to_string()),
            ..RawExtended::default()
        }
    }

    #[test]
    fn accepts_complete_minimal_record() {
        let record = validate(&RawOnboarding::Minimal(minimal())).expect("should validate");
        let OnboardingRecord::Minimal(m) = record else {
            panic!("expected minimal record");
        };
        assert_eq!(m.product_description, "A todo app");
        assert_eq!(m.budget_constraints, "<$500/month");
    }

    #[test]
    fn rejects_empty_product_description() {
        let raw = RawMinimal {
            product_description: Some(String::new()),
            ..minimal()
        };
        let err = validate(&RawOnboarding::Minimal(raw)).unwrap_err();
        assert!(err.has_field("productDescription"));
        assert_eq!(err.errors.len(), 1);
    }

    #[test]
    fn reports_every_missing_minimal_field() {
        let err = validate(&RawOnboarding::Minimal(RawMinimal::default())).unwrap_err();
        assert_eq!(err.errors.len(), 5);
        let msg = err.to_string();
        assert!(msg.contains("targetAudience: is required"), "got: {msg}");
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let raw = RawMinimal {
            marketing_knowledge: Some("   ".to_string()),
            ..minimal()
        };
        let err = validate(&RawOnboarding::Minimal(raw)).unwrap_err();
        assert!(err.has_field("marketingKnowledge"));
    }

    #[test]
    fn extended_requires_only_email() {
        let record = validate(&RawOnboarding::Extended(extended())).expect("should validate");
        assert_eq!(record.email(), Some("founder@example.com"));
    }

    #[test]
    fn extended_rejects_missing_email() {
        let raw = RawExtended::default();
        let err = validate(&RawOnboarding::Extended(raw)).unwrap_err();
        assert!(err.has_field("email"));
    }

    #[test]
    fn extended_rejects_email_without_tld() {
        let raw = RawExtended {
            email: Some("foo@bar".to_string()),
            ..extended()
        };
        let err = validate(&RawOnboarding::Extended(raw)).unwrap_err();
        assert!(err.has_field("email"));
    }

    #[test]
    fn extended_rejects_negative_budget() {
        let raw = RawExtended {
            budget: Some(-5.0),
            ..extended()
        };
        let err = validate(&RawOnboarding::Extended(raw)).unwrap_err();
        assert!(err.has_field("budget"));
    }

    #[test]
    fn extended_budget_bounds_are_inclusive() {
        for budget in [0.0, 10_000.0] {
            let raw = RawExtended {
                budget: Some(budget),
                ..extended()
            };
            assert!(validate(&RawOnboarding::Extended(raw)).is_ok());
        }
        let raw = RawExtended {
            budget: Some(10_000.5),
            ..extended()
        };
        assert!(validate(&RawOnboarding::Extended(raw)).is_err());
    }

    #[test]
    fn extended_rejects_unknown_enum_labels() {
        let raw = RawExtended {
            goal: Some("Go viral".to_string()),
            current_awareness: Some("Stealth".to_string()),
            ..extended()
        };
        let err = validate(&RawOnboarding::Extended(raw)).unwrap_err();
        assert!(err.has_field("goal"));
        assert!(err.has_field("currentAwareness"));
    }

    #[test]
    fn extended_uses_audience_matching_selected_type() {
        let raw = RawExtended {
            audience_type: Some("Business".to_string()),
            consumers_audience: Some("students".to_string()),
            business_audience: Some("seed-stage SaaS teams".to_string()),
            current_awareness: Some("MVP live".to_string()),
            goal: Some("Waitlist signups".to_string()),
            ..extended()
        };
        let OnboardingRecord::Extended(record) = validate(&RawOnboarding::Extended(raw)).unwrap()
        else {
            panic!("expected extended record");
        };
        let audience = record.target_audience.expect("audience should be set");
        assert_eq!(audience.audience_type, AudienceType::Business);
        assert_eq!(audience.description.as_deref(), Some("seed-stage SaaS teams"));
        assert_eq!(record.current_awareness, Some(AwarenessStage::MvpLive));
        assert_eq!(record.goal, Some(Goal::WaitlistSignups));
    }

    #[test]
    fn extended_appends_other_channel_once() {
        let raw = RawExtended {
            preferred_channel_types: Some(vec![
                "SEO (Basic)".to_string(),
                "SEO (Basic)".to_string(),
                " ".to_string(),
            ]),
            other_channel: Some("Podcast guesting".to_string()),
            ..extended()
        };
        let OnboardingRecord::Extended(record) = validate(&RawOnboarding::Extended(raw)).unwrap()
        else {
            panic!("expected extended record");
        };
        assert_eq!(
            record.preferred_channel_types,
            vec!["SEO (Basic)", "Podcast guesting"]
        );
    }

    #[test]
    fn raw_payload_deserializes_from_camel_case_json() {
        let json = r#"{
            "variant": "extended",
            "email": "a@b.io",
            "budget": 250,
            "preferredChannelTypes": ["Content Marketing"]
        }"#;
        let raw: RawOnboarding = serde_json::from_str(json).unwrap();
        let RawOnboarding::Extended(e) = &raw else {
            panic!("expected extended payload");
        };
        assert_eq!(e.budget, Some(250.0));
        assert!(validate(&raw).is_ok());
    }
}
