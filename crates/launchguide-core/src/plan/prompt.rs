//! Prompt construction for plan generation.
//!
//! Substitutes every onboarding field and the channel name into a fixed
//! instruction template, and defines the JSON Schema the model must answer
//! with. Pure logic, no I/O.

use serde_json::json;

use crate::onboarding::{ExtendedRecord, MinimalRecord, OnboardingRecord};
use crate::provider::StructuredPrompt;

use super::types::{MAX_STEPS, PlanRequest};

/// Schema identifier sent to providers that name their schemas.
pub const PLAN_SCHEMA_NAME: &str = "marketing_plan";

const NOT_PROVIDED: &str = "Not provided";

/// Output contract and formatting rules included in every prompt.
const OUTPUT_INSTRUCTIONS: &str = r#"## Output

The plan should be extremely specific and actionable, breaking each step down into the smallest feasible first action for a beginner.
Include links to simple, free external resources where they help.

Return a JSON object with a single key `planSteps`: an array of strings, one per step, in the order the founder should do them. Number every step.

Example output:

{
  "planSteps": [
    "1. Research relevant keywords using a free tool like Google Keyword Planner (https://ads.google.com/home/tools/keyword-planner/).",
    "2. Create a content calendar outlining topics and publication dates.",
    "3. Write a blog post targeting one of the chosen keywords."
  ]
}
"#;

/// JSON Schema of the model's answer: `{ "planSteps": [string, ...] }`.
pub fn plan_output_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "planSteps": {
                "type": "array",
                "description": "Step-by-step actions for the marketing plan, in order.",
                "items": { "type": "string" }
            }
        },
        "required": ["planSteps"],
        "additionalProperties": false
    })
}

/// Render the full prompt for one record and one channel.
pub fn render_prompt(record: &OnboardingRecord, channel: &str) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str("# Marketing Plan\n\n");
    prompt.push_str(
        "You are an expert marketing consultant for early-stage technical founders.\n\n",
    );
    prompt.push_str(&format!(
        "Write a step-by-step marketing plan of at most {MAX_STEPS} steps for the \
         marketing channel \"{channel}\", tailored to the founder's situation below.\n\n"
    ));

    prompt.push_str("## Founder Context\n\n");
    match record {
        OnboardingRecord::Minimal(r) => push_minimal_context(&mut prompt, r),
        OnboardingRecord::Extended(r) => push_extended_context(&mut prompt, r),
    }
    push_field(&mut prompt, "Marketing Channel", channel);
    prompt.push('\n');

    prompt.push_str(OUTPUT_INSTRUCTIONS);
    prompt
}

/// Bundle the rendered prompt with the output schema for a provider call.
pub fn build_structured_prompt(request: &PlanRequest) -> StructuredPrompt {
    StructuredPrompt {
        label: request.channel.clone(),
        prompt: render_prompt(&request.record, &request.channel),
        schema_name: PLAN_SCHEMA_NAME.to_string(),
        schema: plan_output_schema(),
    }
}

fn push_minimal_context(prompt: &mut String, r: &MinimalRecord) {
    push_field(prompt, "Product Description", &r.product_description);
    push_field(prompt, "Target Audience", &r.target_audience);
    push_field(prompt, "Business Goal", &r.business_goal);
    push_field(prompt, "Budget Constraints", &r.budget_constraints);
    push_field(prompt, "Marketing Knowledge", &r.marketing_knowledge);
}

fn push_extended_context(prompt: &mut String, r: &ExtendedRecord) {
    push_optional(prompt, "Product Overview", r.product_overview.as_deref());
    push_optional(
        prompt,
        "Core Value Proposition",
        r.core_value_proposition.as_deref(),
    );
    push_optional(
        prompt,
        "Target Audience",
        r.target_audience.as_ref().map(|a| a.to_string()).as_deref(),
    );
    push_optional(
        prompt,
        "Current Awareness",
        r.current_awareness.map(|a| a.to_string()).as_deref(),
    );
    push_optional(prompt, "Goal", r.goal.map(|g| g.to_string()).as_deref());
    push_optional(
        prompt,
        "Budget",
        r.budget.map(|b| format!("${b:.0}")).as_deref(),
    );
    push_optional(
        prompt,
        "Strengths to Leverage",
        r.strengths_to_leverage.as_deref(),
    );
    push_optional(prompt, "Major Constraints", r.major_constraints.as_deref());
    let preferred = r.preferred_channel_types.join(", ");
    push_optional(
        prompt,
        "Preferred Channel Types",
        Some(preferred.as_str()).filter(|p| !p.is_empty()),
    );
    push_optional(
        prompt,
        "Tone and Brand Personality",
        r.tone_and_brand_personality.as_deref(),
    );
}

fn push_field(prompt: &mut String, label: &str, value: &str) {
    prompt.push_str(&format!("- **{label}:** {value}\n"));
}

fn push_optional(prompt: &mut String, label: &str, value: Option<&str>) {
    push_field(prompt, label, value.unwrap_or(NOT_PROVIDED));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::onboarding::{AudienceType, Goal, TargetAudience};

    fn minimal() -> OnboardingRecord {
        OnboardingRecord::Minimal(MinimalRecord {
            product_description: "A todo app".to_string(),
            target_audience: "busy professionals".to_string(),
            business_goal: "first 10 paying customers".to_string(),
            budget_constraints: "<$500/month".to_string(),
            marketing_knowledge: "beginner".to_string(),
        })
    }

    fn extended() -> OnboardingRecord {
        OnboardingRecord::Extended(ExtendedRecord {
            product_overview: Some("Invoice OCR for freelancers".to_string()),
            core_value_proposition: None,
            target_audience: Some(TargetAudience {
                audience_type: AudienceType::Consumers,
                description: Some("freelance designers".to_string()),
            }),
            current_awareness: None,
            goal: Some(Goal::BrandCredibility),
            budget: Some(300.0),
            strengths_to_leverage: None,
            major_constraints: None,
            preferred_channel_types: vec!["SEO (Basic)".to_string(), "Podcasts".to_string()],
            tone_and_brand_personality: None,
            email: "a@b.io".to_string(),
        })
    }

    #[test]
    fn minimal_prompt_substitutes_every_field() {
        let prompt = render_prompt(&minimal(), "Content Marketing");
        for expected in [
            "A todo app",
            "busy professionals",
            "first 10 paying customers",
            "<$500/month",
            "beginner",
            "- **Marketing Channel:** Content Marketing",
        ] {
            assert!(prompt.contains(expected), "prompt missing {expected:?}");
        }
    }

    #[test]
    fn prompt_states_step_limit_and_numbering() {
        let prompt = render_prompt(&minimal(), "SEO (Basic)");
        assert!(prompt.contains("at most 10 steps"));
        assert!(prompt.contains("Number every step"));
        assert!(prompt.contains("planSteps"));
    }

    #[test]
    fn extended_prompt_marks_missing_fields() {
        let prompt = render_prompt(&extended(), "Podcasts");
        assert!(prompt.contains("- **Core Value Proposition:** Not provided"));
        assert!(prompt.contains("- **Target Audience:** Consumers (freelance designers)"));
        assert!(prompt.contains("- **Goal:** Brand credibility"));
        assert!(prompt.contains("- **Budget:** $300"));
        assert!(prompt.contains("- **Preferred Channel Types:** SEO (Basic), Podcasts"));
        assert!(!prompt.contains("a@b.io"), "email is not marketing context");
    }

    #[test]
    fn schema_requires_plan_steps_array_of_strings() {
        let schema = plan_output_schema();
        assert_eq!(schema["required"][0], "planSteps");
        assert_eq!(schema["properties"]["planSteps"]["type"], "array");
        assert_eq!(schema["properties"]["planSteps"]["items"]["type"], "string");
    }

    #[test]
    fn structured_prompt_carries_channel_label() {
        let request = PlanRequest::new(Arc::new(minimal()), "SEO (Basic)");
        let structured = build_structured_prompt(&request);
        assert_eq!(structured.label, "SEO (Basic)");
        assert_eq!(structured.schema_name, PLAN_SCHEMA_NAME);
        assert!(structured.prompt.contains("\"SEO (Basic)\""));
    }
}
