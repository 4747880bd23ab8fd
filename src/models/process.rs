//! Production process model.
//!
//! A process consumes a set of stock quantities atomically at start and
//! releases its products atomically exactly `delay` ticks later. Processes
//! are immutable after load; the parser supplies them in input order and
//! that order is a documented tie-break throughout the crate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A production process: named, with requisites, products, and a delay.
///
/// Quantity maps are ordered (`BTreeMap`) so iteration is deterministic —
/// producer selection and propagation order must be repeatable run to run.
///
/// Empty requisite or product maps are legal: a source process consumes
/// nothing, a sink process produces nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    /// Unique process name.
    pub name: String,
    /// Resources consumed at start (resource → quantity).
    pub requisites: BTreeMap<String, i64>,
    /// Resources released at completion (resource → quantity).
    pub produces: BTreeMap<String, i64>,
    /// Ticks between start and completion.
    pub delay: i64,
}

impl Process {
    /// Creates a process with no requisites, no products, and zero delay.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requisites: BTreeMap::new(),
            produces: BTreeMap::new(),
            delay: 0,
        }
    }

    /// Adds a requisite (resource consumed at start).
    pub fn with_requisite(mut self, resource: impl Into<String>, quantity: i64) -> Self {
        self.requisites.insert(resource.into(), quantity);
        self
    }

    /// Adds a product (resource released at completion).
    pub fn with_product(mut self, resource: impl Into<String>, quantity: i64) -> Self {
        self.produces.insert(resource.into(), quantity);
        self
    }

    /// Sets the delay in ticks.
    pub fn with_delay(mut self, delay: i64) -> Self {
        self.delay = delay;
        self
    }

    /// Whether this process produces the given resource.
    pub fn produces_resource(&self, resource: &str) -> bool {
        self.produces.contains_key(resource)
    }

    /// Quantity of `resource` produced per run (0 if not produced).
    pub fn output_of(&self, resource: &str) -> i64 {
        self.produces.get(resource).copied().unwrap_or(0)
    }

    /// Quantity of `resource` consumed per run (0 if not consumed).
    pub fn input_of(&self, resource: &str) -> i64 {
        self.requisites.get(resource).copied().unwrap_or(0)
    }

    /// Sum of all produced quantities.
    pub fn total_output(&self) -> i64 {
        self.produces.values().sum()
    }

    /// Sum of all consumed quantities.
    pub fn total_input(&self) -> i64 {
        self.requisites.values().sum()
    }

    /// Number of distinct products.
    pub fn output_count(&self) -> usize {
        self.produces.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_builder() {
        let p = Process::new("forge")
            .with_requisite("ore", 4)
            .with_requisite("coal", 1)
            .with_product("ingot", 2)
            .with_delay(10);

        assert_eq!(p.name, "forge");
        assert_eq!(p.input_of("ore"), 4);
        assert_eq!(p.input_of("coal"), 1);
        assert_eq!(p.output_of("ingot"), 2);
        assert_eq!(p.delay, 10);
        assert!(p.produces_resource("ingot"));
        assert!(!p.produces_resource("ore"));
    }

    #[test]
    fn test_totals() {
        let p = Process::new("p")
            .with_requisite("a", 3)
            .with_requisite("b", 2)
            .with_product("c", 1)
            .with_product("d", 4);

        assert_eq!(p.total_input(), 5);
        assert_eq!(p.total_output(), 5);
        assert_eq!(p.output_count(), 2);
    }

    #[test]
    fn test_empty_maps_are_legal() {
        let p = Process::new("tick");
        assert_eq!(p.total_input(), 0);
        assert_eq!(p.total_output(), 0);
        assert_eq!(p.output_of("anything"), 0);
    }

    #[test]
    fn test_serde_round_trip() {
        let p = Process::new("forge")
            .with_requisite("ore", 4)
            .with_product("ingot", 2)
            .with_delay(10);
        let json = serde_json::to_string(&p).unwrap();
        let back: Process = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
