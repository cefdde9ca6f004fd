use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How far along the product is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AwarenessStage {
    #[serde(rename = "Just an idea")]
    JustAnIdea,
    #[serde(rename = "MVP live")]
    MvpLive,
    #[serde(rename = "Some beta users")]
    SomeBetaUsers,
    #[serde(rename = "Public launch")]
    PublicLaunch,
    #[serde(rename = "Revenue generating")]
    RevenueGenerating,
}

impl AwarenessStage {
    pub const ALL: [Self; 5] = [
        Self::JustAnIdea,
        Self::MvpLive,
        Self::SomeBetaUsers,
        Self::PublicLaunch,
        Self::RevenueGenerating,
    ];
}

impl fmt::Display for AwarenessStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::JustAnIdea => "Just an idea",
            Self::MvpLive => "MVP live",
            Self::SomeBetaUsers => "Some beta users",
            Self::PublicLaunch => "Public launch",
            Self::RevenueGenerating => "Revenue generating",
        };
        f.write_str(s)
    }
}

impl FromStr for AwarenessStage {
    type Err = LabelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.to_string() == s)
            .ok_or_else(|| LabelParseError::new("current awareness", s))
    }
}

// ---------------------------------------------------------------------------

/// The outcome the founder wants from the first marketing push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Goal {
    #[serde(rename = "Awareness")]
    Awareness,
    #[serde(rename = "Waitlist signups")]
    WaitlistSignups,
    #[serde(rename = "App downloads")]
    AppDownloads,
    #[serde(rename = "Purchases/Users")]
    PurchasesUsers,
    #[serde(rename = "Feedback/Validation")]
    FeedbackValidation,
    #[serde(rename = "Brand credibility")]
    BrandCredibility,
}

impl Goal {
    pub const ALL: [Self; 6] = [
        Self::Awareness,
        Self::WaitlistSignups,
        Self::AppDownloads,
        Self::PurchasesUsers,
        Self::FeedbackValidation,
        Self::BrandCredibility,
    ];
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Awareness => "Awareness",
            Self::WaitlistSignups => "Waitlist signups",
            Self::AppDownloads => "App downloads",
            Self::PurchasesUsers => "Purchases/Users",
            Self::FeedbackValidation => "Feedback/Validation",
            Self::BrandCredibility => "Brand credibility",
        };
        f.write_str(s)
    }
}

impl FromStr for Goal {
    type Err = LabelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.to_string() == s)
            .ok_or_else(|| LabelParseError::new("goal", s))
    }
}

// ---------------------------------------------------------------------------

/// Which kind of audience the founder sells to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudienceType {
    Consumers,
    Business,
    Government,
}

impl AudienceType {
    pub const ALL: [Self; 3] = [Self::Consumers, Self::Business, Self::Government];
}

impl fmt::Display for AudienceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Consumers => "Consumers",
            Self::Business => "Business",
            Self::Government => "Government",
        };
        f.write_str(s)
    }
}

impl FromStr for AudienceType {
    type Err = LabelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.to_string() == s)
            .ok_or_else(|| LabelParseError::new("audience type", s))
    }
}

/// Error returned when a label does not belong to its enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelParseError {
    pub kind: &'static str,
    pub value: String,
}

impl LabelParseError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

impl fmt::Display for LabelParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for LabelParseError {}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// The five-question onboarding form. Every field is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimalRecord {
    pub product_description: String,
    pub target_audience: String,
    /// e.g. "first 10 paying customers", "100 beta users", "validate problem".
    pub business_goal: String,
    /// e.g. "<$500/month", "time-only".
    pub budget_constraints: String,
    /// e.g. "beginner", "some familiarity".
    pub marketing_knowledge: String,
}

/// The audience description that was authoritative for a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetAudience {
    pub audience_type: AudienceType,
    pub description: Option<String>,
}

impl fmt::Display for TargetAudience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(d) => write!(f, "{} ({d})", self.audience_type),
            None => write!(f, "{}", self.audience_type),
        }
    }
}

/// The extended onboarding form. Only `email` is mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedRecord {
    pub product_overview: Option<String>,
    pub core_value_proposition: Option<String>,
    pub target_audience: Option<TargetAudience>,
    pub current_awareness: Option<AwarenessStage>,
    pub goal: Option<Goal>,
    /// Marketing budget in dollars, `0..=10000`.
    pub budget: Option<f64>,
    pub strengths_to_leverage: Option<String>,
    pub major_constraints: Option<String>,
    /// Channel names, with the free-text "other" entry appended when given.
    #[serde(default)]
    pub preferred_channel_types: Vec<String>,
    pub tone_and_brand_personality: Option<String>,
    pub email: String,
}

/// A validated onboarding submission.
///
/// The two form generations are kept as separate variants; their field sets
/// are never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum OnboardingRecord {
    Minimal(MinimalRecord),
    Extended(ExtendedRecord),
}

impl OnboardingRecord {
    /// Short name of the schema variant (`minimal` or `extended`).
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Minimal(_) => "minimal",
            Self::Extended(_) => "extended",
        }
    }

    /// Contact email, if the variant collects one.
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Minimal(_) => None,
            Self::Extended(r) => Some(&r.email),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn awareness_labels_roundtrip() {
        for stage in AwarenessStage::ALL {
            let parsed: AwarenessStage = stage.to_string().parse().unwrap();
            assert_eq!(parsed, stage);
        }
        let err = "Launched".parse::<AwarenessStage>().unwrap_err();
        assert_eq!(err.to_string(), "invalid current awareness: \"Launched\"");
    }

    #[test]
    fn goal_serde_uses_ui_labels() {
        let json = serde_json::to_string(&Goal::PurchasesUsers).unwrap();
        assert_eq!(json, "\"Purchases/Users\"");
        let goal: Goal = serde_json::from_str("\"Feedback/Validation\"").unwrap();
        assert_eq!(goal, Goal::FeedbackValidation);
    }

    #[test]
    fn audience_type_is_case_sensitive() {
        assert_eq!("Business".parse::<AudienceType>(), Ok(AudienceType::Business));
        assert!("business".parse::<AudienceType>().is_err());
    }

    #[test]
    fn record_is_tagged_by_variant() {
        let record = OnboardingRecord::Minimal(MinimalRecord {
            product_description: "A todo app".to_string(),
            target_audience: "busy professionals".to_string(),
            business_goal: "first 10 paying customers".to_string(),
            budget_constraints: "<$500/month".to_string(),
            marketing_knowledge: "beginner".to_string(),
        });
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["variant"], "minimal");
        assert_eq!(value["productDescription"], "A todo app");
        assert_eq!(record.variant_name(), "minimal");
        assert!(record.email().is_none());
    }

    #[test]
    fn target_audience_display() {
        let audience = TargetAudience {
            audience_type: AudienceType::Government,
            description: Some("municipal IT teams".to_string()),
        };
        assert_eq!(audience.to_string(), "Government (municipal IT teams)");
    }
}
