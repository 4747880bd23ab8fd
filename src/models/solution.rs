//! Solution and trace models.
//!
//! A `Solution` is the optimizer's output: an ordered activity list with
//! its makespan and final stock. A `SimulationResult` is the simulator's
//! output: an auditable execution history. Both are plain data with no
//! embedded formatting or I/O.

use serde::{Deserialize, Serialize};

use super::Stock;

/// One scheduled run of a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledActivity {
    /// Process name.
    pub name: String,
    /// Start tick.
    pub start: i64,
    /// Finish tick (start + delay).
    pub finish: i64,
}

impl ScheduledActivity {
    /// Creates a scheduled activity.
    pub fn new(name: impl Into<String>, start: i64, finish: i64) -> Self {
        Self {
            name: name.into(),
            start,
            finish,
        }
    }
}

/// A candidate or final schedule produced by construction and local search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Solution {
    /// Activities ordered by start tick.
    pub activities: Vec<ScheduledActivity>,
    /// Stock after all activities complete.
    pub stocks: Stock,
}

impl Solution {
    /// Creates an empty solution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makespan: latest finish tick (0 if empty).
    pub fn makespan(&self) -> i64 {
        self.activities.iter().map(|a| a.finish).max().unwrap_or(0)
    }

    /// Number of scheduled activities.
    pub fn activity_count(&self) -> usize {
        self.activities.len()
    }

    /// Finds the activity for a given process name.
    pub fn activity(&self, name: &str) -> Option<&ScheduledActivity> {
        self.activities.iter().find(|a| a.name == name)
    }
}

/// A completed process run recorded by the simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    /// Start tick.
    pub start: i64,
    /// Completion tick.
    pub end: i64,
    /// Process name.
    pub process: String,
    /// Stock snapshot immediately after outputs were added.
    pub stocks_after: Stock,
}

/// Outcome of a simulation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Completed executions in completion order.
    pub history: Vec<Execution>,
    /// Final stock.
    pub stocks: Stock,
    /// Total elapsed ticks.
    pub elapsed: i64,
    /// False when the run was halted by the cycle ceiling.
    pub completed: bool,
}
