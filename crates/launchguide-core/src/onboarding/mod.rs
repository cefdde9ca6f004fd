//! Onboarding data model: the founder's answers and their validation rules.

pub mod types;
pub mod validate;

pub use types::{
    AudienceType, AwarenessStage, ExtendedRecord, Goal, LabelParseError, MinimalRecord,
    OnboardingRecord, TargetAudience,
};
pub use validate::{
    FieldError, MAX_BUDGET, RawExtended, RawMinimal, RawOnboarding, ValidationError, validate,
};
