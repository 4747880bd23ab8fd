//! Dependency graph analyzer.
//!
//! Converts a target resource and quantity into per-resource demand,
//! availability, criticality, and priority data, plus per-process CPM
//! timing (earliest/latest start and finish, slack). Four phases, strictly
//! ordered — each consumes the previous phase's output:
//!
//! 1. Backward quantity propagation (BFS from the target)
//! 2. Forward timing (earliest times, topological order)
//! 3. Backward timing (latest times and slack, reverse topological order)
//! 4. Composite priority scoring
//!
//! `analyze` recomputes everything wholesale and returns an immutable
//! [`AnalysisSnapshot`]; nothing is incrementally updated between calls,
//! so identical inputs yield identical snapshots.
//!
//! # Reference
//! Kelley & Walker (1959), "Critical-Path Planning and Scheduling"

mod graph;

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Process, Stock};

pub(crate) use graph::topological_sort;

/// Distance sentinel for resources the quantity phase never reached.
const UNTRACKED_DISTANCE: i64 = 9999;
/// Availability ratio sentinel when nothing is needed.
const AMPLE_RATIO: f64 = 999.0;
/// Fallback project deadline when the target has no producer chain.
const DEFAULT_DEADLINE: i64 = 10_000;

/// Derived per-resource data. Recomputed wholesale per analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceStats {
    /// Graph hops from this resource to the target.
    pub distance_to_target: i64,
    /// Accumulated demand across the full production closure.
    pub total_needed: i64,
    /// Quantity available in the analyzed stock.
    pub available_in_stock: i64,
    /// available / needed; [`AMPLE_RATIO`] sentinel when nothing is needed.
    pub availability_ratio: f64,
    /// Scarce relative to demand and graph position.
    pub is_bottleneck: bool,
    /// Processes producing this resource, in input order.
    pub produced_by: Vec<String>,
    /// Delay of the last producer seen in topological order.
    pub time_to_produce: i64,
    /// Estimated time to produce the full needed quantity.
    pub time_to_produce_needed: i64,
    /// Longest delay-weighted path from this resource down to the target.
    pub critical_path_length: i64,
    /// Earliest tick a producer can deliver this resource. `None` until the
    /// forward-timing phase writes it; base resources keep `None`.
    pub earliest_available: Option<i64>,
    /// Touched by a zero-slack process.
    pub is_on_critical_path: bool,
    /// Composite integer priority.
    pub priority: i64,
}

impl Default for ResourceStats {
    fn default() -> Self {
        Self {
            distance_to_target: UNTRACKED_DISTANCE,
            total_needed: 0,
            available_in_stock: 0,
            availability_ratio: 0.0,
            is_bottleneck: false,
            produced_by: Vec::new(),
            time_to_produce: 0,
            time_to_produce_needed: 0,
            critical_path_length: 0,
            earliest_available: None,
            is_on_critical_path: false,
            priority: 0,
        }
    }
}

/// Derived per-process CPM timing. Same lifetime as [`ResourceStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStats {
    /// Earliest start tick.
    pub earliest_start: i64,
    /// Earliest finish tick (earliest_start + delay).
    pub earliest_finish: i64,
    /// Latest start tick without delaying the project.
    pub latest_start: i64,
    /// Latest finish tick without delaying the project.
    pub latest_finish: i64,
    /// latest_start − earliest_start.
    pub slack: i64,
    /// slack <= 0.
    pub is_critical: bool,
}

/// Immutable result of one `analyze` call.
///
/// All lookups are pure reads. Querying a resource or process absent from
/// the snapshot returns a neutral default (priority 0, ratio 1.0, slack
/// 999, not critical, not bottleneck) rather than erroring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    resources: HashMap<String, ResourceStats>,
    processes: HashMap<String, ProcessStats>,
}

impl AnalysisSnapshot {
    /// Full stats for a resource, if tracked.
    pub fn resource(&self, name: &str) -> Option<&ResourceStats> {
        self.resources.get(name)
    }

    /// Full stats for a process, if timed.
    pub fn process(&self, name: &str) -> Option<&ProcessStats> {
        self.processes.get(name)
    }

    /// Composite priority (0 for unknown resources).
    pub fn resource_priority(&self, name: &str) -> i64 {
        self.resources.get(name).map_or(0, |s| s.priority)
    }

    /// Whether the resource is a bottleneck (false for unknown).
    pub fn is_bottleneck(&self, name: &str) -> bool {
        self.resources.get(name).is_some_and(|s| s.is_bottleneck)
    }

    /// Accumulated demand (0 for unknown).
    pub fn total_needed(&self, name: &str) -> i64 {
        self.resources.get(name).map_or(0, |s| s.total_needed)
    }

    /// Availability ratio (1.0 for unknown).
    pub fn availability_ratio(&self, name: &str) -> f64 {
        self.resources.get(name).map_or(1.0, |s| s.availability_ratio)
    }

    /// Whether the resource lies on the critical path (false for unknown).
    pub fn is_on_critical_path(&self, name: &str) -> bool {
        self.resources.get(name).is_some_and(|s| s.is_on_critical_path)
    }

    /// Delay-weighted distance to the target (0 for unknown).
    pub fn critical_path_length(&self, name: &str) -> i64 {
        self.resources.get(name).map_or(0, |s| s.critical_path_length)
    }

    /// Delay of the resource's producer (0 for unknown).
    pub fn time_to_produce(&self, name: &str) -> i64 {
        self.resources.get(name).map_or(0, |s| s.time_to_produce)
    }

    /// Estimated ticks to produce the full needed quantity (0 for unknown).
    pub fn time_to_produce_needed(&self, name: &str) -> i64 {
        self.resources
            .get(name)
            .map_or(0, |s| s.time_to_produce_needed)
    }

    /// Earliest tick the resource can be delivered (0 for unknown or base).
    pub fn earliest_available_time(&self, name: &str) -> i64 {
        self.resources
            .get(name)
            .and_then(|s| s.earliest_available)
            .unwrap_or(0)
    }

    /// Whether a process has zero slack (false for unknown).
    pub fn is_process_critical(&self, name: &str) -> bool {
        self.processes.get(name).is_some_and(|s| s.is_critical)
    }

    /// Process slack (999 for unknown).
    pub fn process_slack(&self, name: &str) -> i64 {
        self.processes.get(name).map_or(999, |s| s.slack)
    }

    /// Earliest start tick of a process (0 for unknown).
    pub fn earliest_start_time(&self, name: &str) -> i64 {
        self.processes.get(name).map_or(0, |s| s.earliest_start)
    }
}

/// Analyzes the full production chain toward `target`.
///
/// Never fails: a target with no producer chain degrades to a single
/// base-resource lookup.
pub fn analyze(
    target: &str,
    quantity: i64,
    stocks: &Stock,
    processes: &[Process],
) -> AnalysisSnapshot {
    let mut analysis = Analysis::default();
    analysis.propagate_quantities(target, quantity, stocks, processes);
    analysis.forward_timing(processes);
    analysis.backward_timing(target, processes);
    analysis.score_priorities(stocks);

    debug!(
        target,
        quantity,
        resources = analysis.resources.len(),
        processes = analysis.processes.len(),
        "analysis complete"
    );

    AnalysisSnapshot {
        resources: analysis.resources,
        processes: analysis.processes,
    }
}

/// Mutable working state for one analysis pass.
#[derive(Debug, Default)]
struct Analysis {
    resources: HashMap<String, ResourceStats>,
    processes: HashMap<String, ProcessStats>,
}

impl Analysis {
    /// Phase 1: breadth-first backward propagation of needed quantities.
    fn propagate_quantities(
        &mut self,
        target: &str,
        quantity: i64,
        stocks: &Stock,
        processes: &[Process],
    ) {
        let mut queue: VecDeque<(String, i64)> = VecDeque::new();
        queue.push_back((target.to_string(), quantity));
        {
            let stats = self.resources.entry(target.to_string()).or_default();
            stats.distance_to_target = 0;
            stats.total_needed = quantity;
        }

        while let Some((resource, needed)) = queue.pop_front() {
            let distance = self.resources[&resource].distance_to_target;

            let producers: Vec<&Process> = processes
                .iter()
                .filter(|p| p.produces_resource(&resource))
                .collect();
            self.resources
                .get_mut(&resource)
                .expect("queued resources are tracked")
                .produced_by = producers.iter().map(|p| p.name.clone()).collect();

            if producers.is_empty() {
                // Base resource: availability comes from stock, chain stops.
                self.resources
                    .get_mut(&resource)
                    .expect("queued resources are tracked")
                    .available_in_stock = stocks.available(&resource);
                continue;
            }

            let best = graph::choose_best_producer(&producers, |r| self.resources.contains_key(r))
                .expect("producers is non-empty");
            let per_run = best.output_of(&resource).max(1);
            let runs = (needed + per_run - 1) / per_run;

            // Scale the chosen producer's requisites and accumulate demand;
            // newly discovered resources are enqueued exactly once.
            for (requisite, req_quantity) in &best.requisites {
                let total = req_quantity * runs;
                if let Some(stats) = self.resources.get_mut(requisite) {
                    stats.total_needed += total;
                } else {
                    let stats = self.resources.entry(requisite.clone()).or_default();
                    stats.distance_to_target = distance + 1;
                    stats.total_needed = total;
                    queue.push_back((requisite.clone(), total));
                }
            }

            // By-products of the chosen producer optimistically offset
            // demand already discovered elsewhere, floored at zero.
            for (product, quantity_per_run) in &best.produces {
                if product == &resource {
                    continue;
                }
                if let Some(stats) = self.resources.get_mut(product) {
                    stats.total_needed =
                        (stats.total_needed - quantity_per_run * runs).max(0);
                }
            }
        }
    }

    /// Phase 2: earliest start/finish per process, in topological order.
    fn forward_timing(&mut self, processes: &[Process]) {
        for name in topological_sort(processes) {
            let Some(process) = processes.iter().find(|p| p.name == name) else {
                continue;
            };

            let earliest_start = process
                .requisites
                .keys()
                .map(|r| {
                    self.resources
                        .get(r)
                        .and_then(|s| s.earliest_available)
                        .unwrap_or(0)
                })
                .max()
                .unwrap_or(0);
            let earliest_finish = earliest_start + process.delay;

            let stats = self.processes.entry(name.clone()).or_default();
            stats.earliest_start = earliest_start;
            stats.earliest_finish = earliest_finish;

            for (product, quantity) in &process.produces {
                let stats = self.resources.entry(product.clone()).or_default();
                stats.earliest_available = Some(match stats.earliest_available {
                    None => earliest_finish,
                    Some(current) => current.min(earliest_finish),
                });
                if stats.total_needed > 0 && *quantity > 0 {
                    let runs = (stats.total_needed + quantity - 1) / quantity;
                    stats.time_to_produce_needed = earliest_finish * runs;
                }
                stats.time_to_produce = process.delay;
            }
        }
    }

    /// Phase 3: latest start/finish and slack, in reverse topological order,
    /// then critical-path lengths back from the target.
    fn backward_timing(&mut self, target: &str, processes: &[Process]) {
        let deadline = match self.resources.get(target) {
            Some(stats) => stats.earliest_available.unwrap_or(0),
            None => DEFAULT_DEADLINE,
        };

        let mut order = topological_sort(processes);
        order.reverse();

        for name in &order {
            let Some(process) = processes.iter().find(|p| &p.name == name) else {
                continue;
            };

            // Latest finish = min over downstream consumers' latest starts.
            // Reverse topological order guarantees consumers are final.
            let mut latest_finish = deadline;
            for product in process.produces.keys() {
                for consumer in processes {
                    if consumer.requisites.contains_key(product) {
                        if let Some(stats) = self.processes.get(&consumer.name) {
                            latest_finish = latest_finish.min(stats.latest_start);
                        }
                    }
                }
            }

            let is_critical;
            {
                let stats = self
                    .processes
                    .get_mut(name)
                    .expect("timed in forward phase");
                stats.latest_finish = latest_finish;
                stats.latest_start = latest_finish - process.delay;
                stats.slack = stats.latest_start - stats.earliest_start;
                stats.is_critical = stats.slack <= 0;
                is_critical = stats.is_critical;
            }

            if is_critical {
                for resource in process.produces.keys().chain(process.requisites.keys()) {
                    self.resources
                        .entry(resource.clone())
                        .or_default()
                        .is_on_critical_path = true;
                }
            }
        }

        self.propagate_critical_lengths(target, processes);
    }

    /// Relaxes critical-path lengths backward from the target (seed 0),
    /// adding each producer's delay, taking the maximum per resource.
    fn propagate_critical_lengths(&mut self, target: &str, processes: &[Process]) {
        let mut queue = VecDeque::new();
        let mut visited = std::collections::HashSet::new();

        if let Some(stats) = self.resources.get_mut(target) {
            stats.critical_path_length = 0;
            queue.push_back(target.to_string());
        }

        while let Some(resource) = queue.pop_front() {
            if !visited.insert(resource.clone()) {
                continue;
            }
            let current = self.resources[&resource].critical_path_length;
            let producers = self.resources[&resource].produced_by.clone();

            for producer_name in producers {
                if !self.processes.contains_key(&producer_name) {
                    continue;
                }
                let Some(process) = processes.iter().find(|p| p.name == producer_name) else {
                    continue;
                };
                let length = current + process.delay;

                for requisite in process.requisites.keys() {
                    let relax = self
                        .resources
                        .get(requisite)
                        .is_none_or(|s| s.critical_path_length < length);
                    if relax {
                        self.resources
                            .entry(requisite.clone())
                            .or_default()
                            .critical_path_length = length;
                        queue.push_back(requisite.clone());
                    }
                }
            }
        }
    }

    /// Phase 4: availability ratios, bottleneck flags, composite priorities.
    ///
    /// Availability is computed here, after timing, so resources first seen
    /// as phase-2 outputs get the ample-ratio sentinel instead of a stale
    /// zero ratio.
    fn score_priorities(&mut self, stocks: &Stock) {
        for (resource, stats) in self.resources.iter_mut() {
            stats.available_in_stock = stocks.available(resource);
            stats.availability_ratio = if stats.total_needed > 0 {
                stats.available_in_stock as f64 / stats.total_needed as f64
            } else {
                AMPLE_RATIO
            };
            stats.is_bottleneck = stats.availability_ratio < 0.5
                || (stats.availability_ratio < 1.0 && stats.distance_to_target > 3);

            let mut priority = 0i64;
            if stats.distance_to_target < UNTRACKED_DISTANCE {
                priority += 1000 / (1 << stats.distance_to_target.min(10));
            }
            if stats.is_on_critical_path {
                priority += 10_000;
            }
            priority += stats.critical_path_length * 10;
            if stats.time_to_produce > 0 {
                priority += (stats.time_to_produce * 5).min(5000);
            }
            if stats.is_bottleneck {
                priority += 5000;
            }
            if stats.availability_ratio < 0.1 {
                priority += 3000;
            } else if stats.availability_ratio < 0.5 {
                priority += 1000;
            } else if stats.availability_ratio < 1.0 {
                priority += 500;
            }
            priority += stats.total_needed.min(1000);

            stats.priority = priority;
        }
    }
}
