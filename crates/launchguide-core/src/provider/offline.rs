//! Network-free provider that answers with a generic starter checklist.
//!
//! Used when no model endpoint is configured, and for demos. The answer has
//! the same shape a real model returns, so it goes through the same
//! validation path.

use async_trait::async_trait;
use serde_json::json;

use super::trait_def::{ModelProvider, ProviderError, StructuredPrompt};

/// [`ModelProvider`] that never leaves the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProvider;

impl OfflineProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModelProvider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    async fn complete(&self, prompt: &StructuredPrompt) -> Result<serde_json::Value, ProviderError> {
        let channel = prompt.label.as_str();
        Ok(json!({
            "planSteps": [
                format!("1. Write down one measurable 30-day goal for {channel}."),
                format!("2. Look at how three similar products use {channel} and note what gets engagement."),
                format!("3. Set up the accounts and free tools {channel} needs."),
                format!("4. Draft your first {channel} piece around your product's core value proposition."),
                format!("5. Publish it, then block 30 minutes each week to review results and adjust."),
            ]
        }))
    }
}
