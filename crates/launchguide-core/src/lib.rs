//! Core library for launchguide.
//!
//! Turns a founder's onboarding answers into a per-channel marketing action
//! plan. The pipeline is:
//!
//! ```text
//! RawOnboarding --validate--> OnboardingRecord
//!     |
//!     v  (selected channels, selection order kept)
//! Aggregator --spawn x N--> PlanGenerator::generate(record, channel)
//!     |                          |
//!     |                          v
//!     |                     ModelProvider::complete(prompt, schema)
//!     v
//! AggregatedPlan ("## channel" + numbered steps) --> Checklist / KeyValueStore
//! ```

pub mod aggregator;
pub mod catalog;
pub mod checklist;
pub mod onboarding;
pub mod plan;
pub mod provider;
pub mod store;
pub mod wizard;
