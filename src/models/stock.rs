//! Stock state model.
//!
//! A stock maps resource names to integer quantities. Absent resources
//! read as zero. Deductions are unconditional — eligibility is the
//! caller's check, so the construction engine's precedence proxy can
//! drive a quantity below zero without the map erroring.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resource → quantity mapping.
///
/// Ordered internally so serialization and debug output are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    quantities: BTreeMap<String, i64>,
}

impl Stock {
    /// Creates an empty stock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an initial quantity (builder style).
    pub fn with(mut self, resource: impl Into<String>, quantity: i64) -> Self {
        self.quantities.insert(resource.into(), quantity);
        self
    }

    /// Available quantity of a resource (0 if absent).
    pub fn available(&self, resource: &str) -> i64 {
        self.quantities.get(resource).copied().unwrap_or(0)
    }

    /// Adds `quantity` to a resource.
    pub fn add(&mut self, resource: &str, quantity: i64) {
        *self.quantities.entry(resource.to_string()).or_insert(0) += quantity;
    }

    /// Removes `quantity` from a resource. May go negative; the caller
    /// guards eligibility.
    pub fn consume(&mut self, resource: &str, quantity: i64) {
        *self.quantities.entry(resource.to_string()).or_insert(0) -= quantity;
    }

    /// Whether every entry of `requirements` is covered by current stock.
    pub fn satisfies<'a, I>(&self, requirements: I) -> bool
    where
        I: IntoIterator<Item = (&'a String, &'a i64)>,
    {
        requirements
            .into_iter()
            .all(|(resource, &quantity)| self.available(resource) >= quantity)
    }

    /// Iterates over (resource, quantity) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &i64)> {
        self.quantities.iter()
    }

    /// Number of tracked resources.
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    /// Whether no resource is tracked.
    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }
}

impl FromIterator<(String, i64)> for Stock {
    fn from_iter<T: IntoIterator<Item = (String, i64)>>(iter: T) -> Self {
        Self {
            quantities: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_absent_reads_zero() {
        let stock = Stock::new();
        assert_eq!(stock.available("ore"), 0);
    }

    #[test]
    fn test_add_and_consume() {
        let mut stock = Stock::new().with("ore", 10);
        stock.consume("ore", 4);
        assert_eq!(stock.available("ore"), 6);
        stock.add("ore", 2);
        assert_eq!(stock.available("ore"), 8);
    }

    #[test]
    fn test_consume_can_go_negative() {
        let mut stock = Stock::new();
        stock.consume("ore", 3);
        assert_eq!(stock.available("ore"), -3);
    }

    #[test]
    fn test_satisfies() {
        let stock = Stock::new().with("ore", 5).with("coal", 1);
        let mut need = BTreeMap::new();
        need.insert("ore".to_string(), 5);
        need.insert("coal".to_string(), 1);
        assert!(stock.satisfies(&need));

        need.insert("coal".to_string(), 2);
        assert!(!stock.satisfies(&need));
    }

    #[test]
    fn test_empty_requirements_always_satisfied() {
        let stock = Stock::new();
        let need: BTreeMap<String, i64> = BTreeMap::new();
        assert!(stock.satisfies(&need));
    }
}
