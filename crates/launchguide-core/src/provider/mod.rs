//! Model provider interface for structured text generation.
//!
//! ```text
//! ModelPlanGenerator
//!     |
//!     v
//! ProviderRegistry --get("openai")--> Arc<dyn ModelProvider>
//!     |                                    |
//!     |   complete(StructuredPrompt) ------+--> serde_json::Value
//! ```

pub mod offline;
pub mod openai;
pub mod registry;
pub mod trait_def;

pub use offline::OfflineProvider;
pub use openai::{OpenAiCompatibleProvider, OpenAiSettings};
pub use registry::ProviderRegistry;
pub use trait_def::{ModelProvider, ProviderError, StructuredPrompt};
