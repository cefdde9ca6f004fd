//! Checklist view of an aggregated plan with per-line completion state.
//!
//! Completion is index-aligned with the plan's lines and is never carried
//! across plans: loading or replacing a plan resets every line to not done.

use serde::Serialize;
use thiserror::Error;

use crate::plan::{AggregatedPlan, is_heading};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChecklistError {
    #[error("step {index} out of range (plan has {len} lines)")]
    OutOfRange { index: usize, len: usize },
}

/// One rendered checklist line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem<'a> {
    pub index: usize,
    pub text: &'a str,
    pub heading: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checklist {
    plan: AggregatedPlan,
    completed: Vec<bool>,
}

impl Checklist {
    pub fn new(plan: AggregatedPlan) -> Self {
        let completed = vec![false; plan.len()];
        Self { plan, completed }
    }

    /// Swap in a new plan. Completion starts over at all-false.
    pub fn replace_plan(&mut self, plan: AggregatedPlan) {
        *self = Self::new(plan);
    }

    /// Flip completion of line `index` and return its new value.
    pub fn toggle(&mut self, index: usize) -> Result<bool, ChecklistError> {
        let len = self.completed.len();
        let slot = self
            .completed
            .get_mut(index)
            .ok_or(ChecklistError::OutOfRange { index, len })?;
        *slot = !*slot;
        Ok(*slot)
    }

    pub fn is_heading(&self, index: usize) -> bool {
        self.plan
            .lines()
            .get(index)
            .is_some_and(|line| is_heading(line))
    }

    pub fn items(&self) -> Vec<ChecklistItem<'_>> {
        self.plan
            .lines()
            .iter()
            .zip(&self.completed)
            .enumerate()
            .map(|(index, (text, &completed))| ChecklistItem {
                index,
                text,
                heading: is_heading(text),
                completed,
            })
            .collect()
    }

    /// `(done, total)` over step lines; headings are not counted.
    pub fn progress(&self) -> (usize, usize) {
        self.items()
            .iter()
            .filter(|item| !item.heading)
            .fold((0, 0), |(done, total), item| {
                (done + usize::from(item.completed), total + 1)
            })
    }

    pub fn plan(&self) -> &AggregatedPlan {
        &self.plan
    }

    pub fn completed(&self) -> &[bool] {
        &self.completed
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    /// Plain-text rendering: headings as-is, steps prefixed `[x]` / `[ ]`
    /// along with the index used to toggle them.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for item in self.items() {
            if item.heading {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(item.text);
                out.push('\n');
            } else {
                let mark = if item.completed { 'x' } else { ' ' };
                out.push_str(&format!("[{mark}] {:>3}  {}\n", item.index, item.text));
            }
        }
        let (done, total) = self.progress();
        out.push_str(&format!("\n{done}/{total} steps done\n"));
        out
    }
}
