//! Process graph utilities: topological ordering and producer selection.
//!
//! The producer→consumer edge set treats a process P as a predecessor of Q
//! whenever P produces a resource Q consumes. Processes caught in cycles
//! (including self-feeding converters) never reach zero in-degree and are
//! simply absent from the returned order; timing analysis skips them.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Kahn)

use std::collections::{HashMap, VecDeque};

use crate::models::Process;

/// Topological order of processes via Kahn's algorithm.
///
/// Zero in-degree seeds are taken in input order, so the result is
/// deterministic for a given process list.
pub(crate) fn topological_sort(processes: &[Process]) -> Vec<String> {
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();

    for process in processes {
        in_degree.insert(&process.name, 0);
        adjacency.insert(&process.name, Vec::new());
    }

    for consumer in processes {
        for resource in consumer.requisites.keys() {
            for producer in processes {
                if producer.produces_resource(resource) {
                    adjacency
                        .get_mut(producer.name.as_str())
                        .expect("producer registered above")
                        .push(&consumer.name);
                    *in_degree
                        .get_mut(consumer.name.as_str())
                        .expect("consumer registered above") += 1;
                }
            }
        }
    }

    let mut queue: VecDeque<&str> = processes
        .iter()
        .filter(|p| in_degree[p.name.as_str()] == 0)
        .map(|p| p.name.as_str())
        .collect();

    let mut order = Vec::with_capacity(processes.len());
    while let Some(name) = queue.pop_front() {
        order.push(name.to_string());
        for &successor in &adjacency[name] {
            let degree = in_degree
                .get_mut(successor)
                .expect("successor registered above");
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(successor);
            }
        }
    }

    order
}

/// Picks the most efficient producer among candidates.
///
/// Efficiency = total output quantity / (delay + requisite cost + 1), where
/// a requisite unit costs 1 if the resource is already tracked by the current
/// analysis and 10 otherwise — this biases selection toward reusing chains
/// the analysis has already discovered. Ties keep the first producer in
/// input order (strict-improvement scan; tests depend on this).
pub(crate) fn choose_best_producer<'a>(
    producers: &[&'a Process],
    is_tracked: impl Fn(&str) -> bool,
) -> Option<&'a Process> {
    let mut best: Option<&Process> = None;
    let mut best_efficiency = -1.0f64;

    for process in producers {
        let production = process.total_output() as f64;
        let mut cost = process.delay as f64;
        for (resource, quantity) in &process.requisites {
            let unit = if is_tracked(resource) { 1.0 } else { 10.0 };
            cost += *quantity as f64 * unit;
        }
        let efficiency = production / (cost + 1.0);
        if efficiency > best_efficiency {
            best_efficiency = efficiency;
            best = Some(process);
        }
    }

    best
}
