//! CLI handlers for `launchguide plan` subcommands.
//!
//! Implements:
//! - `launchguide plan show`  -- print the stored plan as a fresh checklist
//! - `launchguide plan clear` -- remove the stored plan and its metadata

use anyhow::{Context, Result};

use launchguide_core::checklist::Checklist;
use launchguide_core::store::{KeyValueStore, clear_plan, load_plan, load_plan_meta};

use crate::PlanCommands;

/// Dispatch a `PlanCommands` variant to the appropriate handler.
pub fn run_plan_command(command: PlanCommands, store: &dyn KeyValueStore) -> Result<()> {
    match command {
        PlanCommands::Show => {
            print!("{}", render_show(store)?);
            Ok(())
        }
        PlanCommands::Clear => {
            clear_plan(store).context("failed to clear stored plan")?;
            println!("Stored plan removed.");
            Ok(())
        }
    }
}

fn render_show(store: &dyn KeyValueStore) -> Result<String> {
    let plan = load_plan(store).context("failed to load stored plan")?;
    if plan.is_empty() {
        return Ok("No plan stored. Run `launchguide generate` first.\n".to_string());
    }

    let mut out = String::new();
    if let Some(meta) = load_plan_meta(store).context("failed to load plan metadata")? {
        let generated = meta.generated_at.with_timezone(&chrono::Local);
        out.push_str(&format!(
            "Plan {} (generated {})\n\n",
            meta.submission_id,
            generated.format("%Y-%m-%d %H:%M")
        ));
    }
    // Completion is not persisted; a reloaded plan starts unchecked.
    out.push_str(&Checklist::new(plan).render_text());
    Ok(out)
}
