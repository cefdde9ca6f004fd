//! `launchguide generate`: run the whole flow for one onboarding record.
//!
//! record file -> validate -> check selection -> aggregate -> store -> print

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use launchguide_core::catalog::SelectionPolicy;
use launchguide_core::onboarding::RawOnboarding;
use launchguide_core::store::{save_plan, save_plan_meta};
use launchguide_core::wizard::OnboardingStep;

use crate::config::LaunchguideConfig;

pub struct GenerateOptions {
    pub record: PathBuf,
    pub channels: Vec<String>,
    pub policy: SelectionPolicy,
    pub offline: bool,
}

/// Read an onboarding record from a `.toml` or `.json` file.
pub fn load_record(path: &Path) -> Result<RawOnboarding> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read record file {}", path.display()))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&contents)
            .with_context(|| format!("failed to parse TOML record {}", path.display())),
        Some("json") => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON record {}", path.display())),
        _ => bail!(
            "unsupported record file {} (expected .toml or .json)",
            path.display()
        ),
    }
}

pub async fn run_generate(config: &LaunchguideConfig, options: GenerateOptions) -> Result<()> {
    let raw = load_record(&options.record)?;

    // Validate and check the selection before building any provider.
    let prioritized = OnboardingStep::submit(&raw)?.choose(options.channels, options.policy)?;

    let aggregator = config.build_aggregator(options.offline)?;
    let store = config.open_store()?;

    println!(
        "Generating plans for {} channel(s)...",
        prioritized.channels().len()
    );
    let display = prioritized.generate(&aggregator).await?;
    let (meta, checklist) = display.into_parts();

    save_plan(&store, checklist.plan()).context("failed to store plan")?;
    save_plan_meta(&store, &meta).context("failed to store plan metadata")?;
    tracing::info!(
        submission_id = %meta.submission_id,
        store = %store.dir().display(),
        "plan stored"
    );

    println!();
    print!("{}", checklist.render_text());
    Ok(())
}
