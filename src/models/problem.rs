//! Problem model: initial stock plus an ordered process list.
//!
//! Supplied by an external parser; immutable once built. All engines
//! treat the process list's input order as the deterministic tie-break.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Process, Stock};

/// A resource-constrained scheduling problem instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Problem {
    /// Initial stock.
    pub stocks: Stock,
    /// Processes in input order.
    pub processes: Vec<Process>,
}

impl Problem {
    /// Creates an empty problem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an initial stock quantity.
    pub fn with_stock(mut self, resource: impl Into<String>, quantity: i64) -> Self {
        self.stocks = std::mem::take(&mut self.stocks).with(resource, quantity);
        self
    }

    /// Adds a process (input order is preserved).
    pub fn with_process(mut self, process: Process) -> Self {
        self.processes.push(process);
        self
    }

    /// Looks up a process by name.
    pub fn process(&self, name: &str) -> Option<&Process> {
        self.processes.iter().find(|p| p.name == name)
    }

    /// Processes producing `resource`, in input order.
    pub fn producers_of(&self, resource: &str) -> Vec<&Process> {
        self.processes
            .iter()
            .filter(|p| p.produces_resource(resource))
            .collect()
    }

    /// Number of processes that consume each resource.
    ///
    /// Used by rank-positional-weight scoring: an output wanted by many
    /// processes carries more weight.
    pub fn consumer_counts(&self) -> HashMap<String, usize> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for process in &self.processes {
            for resource in process.requisites.keys() {
                *counts.entry(resource.clone()).or_insert(0) += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_problem() -> Problem {
        Problem::new()
            .with_stock("ore", 10)
            .with_process(
                Process::new("mine")
                    .with_product("ore", 1)
                    .with_delay(3),
            )
            .with_process(
                Process::new("forge")
                    .with_requisite("ore", 4)
                    .with_product("ingot", 1)
                    .with_delay(10),
            )
    }

    #[test]
    fn test_lookup_by_name() {
        let problem = sample_problem();
        assert!(problem.process("mine").is_some());
        assert!(problem.process("missing").is_none());
    }

    #[test]
    fn test_producers_of() {
        let problem = sample_problem();
        let producers = problem.producers_of("ore");
        assert_eq!(producers.len(), 1);
        assert_eq!(producers[0].name, "mine");
        assert!(problem.producers_of("wood").is_empty());
    }

    #[test]
    fn test_consumer_counts() {
        let problem = sample_problem();
        let counts = problem.consumer_counts();
        assert_eq!(counts.get("ore"), Some(&1));
        assert_eq!(counts.get("ingot"), None);
    }
}
