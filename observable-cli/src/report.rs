//! Run report
//!
//! Outcome of a script run, rendered as text for the console or as JSON.

use anyhow::{Context, Result};
use observable_registry::{ObserverId, SubjectKind};
use serde::Serialize;
use std::fmt;

use crate::config::ObserverType;

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: String,
    pub ok: bool,
    pub detail: String,
}

impl StepOutcome {
    pub fn success(step: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            ok: true,
            detail: detail.into(),
        }
    }

    pub fn failure(step: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            ok: false,
            detail: detail.into(),
        }
    }

    pub fn undeclared(step: impl Into<String>, name: &str) -> Self {
        Self::failure(step, format!("observer '{}' is not declared", name))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ObserverSummary {
    pub name: String,
    pub kind: ObserverType,
    pub id: Option<ObserverId>,
    pub released: bool,
    /// Notices printed (console) or counted (tally)
    pub received: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub kind: SubjectKind,
    pub capacity: usize,
    pub steps: Vec<StepOutcome>,
    pub observers: Vec<ObserverSummary>,
    pub custom_action_runs: usize,
}

impl RunReport {
    pub fn new(kind: SubjectKind, capacity: usize) -> Self {
        Self {
            kind,
            capacity,
            steps: Vec::new(),
            observers: Vec::new(),
            custom_action_runs: 0,
        }
    }

    /// Number of failed steps
    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|step| !step.ok).count()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize run report")
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "═══════════════════════════════════════════════")?;
        writeln!(f, "  Observable Demo - {} ({} slots)", self.kind, self.capacity)?;
        writeln!(f, "═══════════════════════════════════════════════")?;

        for step in &self.steps {
            let mark = if step.ok { "✓" } else { "✗" };
            writeln!(f, "  {} {}: {}", mark, step.step, step.detail)?;
        }

        writeln!(f, "\nObservers:")?;
        for observer in &self.observers {
            let id = observer
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            let state = if observer.released { "released" } else { "live" };
            writeln!(
                f,
                "  {:<12} {:>4}  {:<8} received {}",
                observer.name, id, state, observer.received
            )?;
        }

        writeln!(f, "\nCustom action runs: {}", self.custom_action_runs)?;
        write!(f, "Failed steps: {}", self.failures())
    }
}
