//! Plan generation: prompt templating, the generator seam, and plan types.

pub mod generate;
pub mod prompt;
pub mod types;

pub use generate::{
    GenerationError, ModelPlanGenerator, PlanGenerator, RetryPolicy, normalize_steps,
    parse_plan_output,
};
pub use prompt::{PLAN_SCHEMA_NAME, build_structured_prompt, plan_output_schema, render_prompt};
pub use types::{
    AggregatedPlan, ChannelPlan, FAILURE_SENTINEL, MAX_STEPS, PlanRequest, channel_heading,
    is_heading,
};
