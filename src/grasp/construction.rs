//! Serial schedule generation with a restricted candidate list.
//!
//! Advances a discrete clock one tick at a time. Each tick finalizes any
//! finished processes, scores the eligible set under the active rule, and
//! starts at most one process drawn uniformly from the RCL. Requisites are
//! deducted the moment a process starts, so eligibility checks later in
//! the run observe the deduction.
//!
//! # Reference
//! Feo & Resende (1995), "Greedy Randomized Adaptive Search Procedures"

use std::collections::HashSet;

use rand::rngs::SmallRng;
use rand::Rng;
use tracing::trace;

use crate::models::{Problem, ScheduledActivity, Solution, Stock};

use super::rules::{ConstructionContext, ConstructionRule};

/// Tolerance for RCL membership on floating-point scores.
const SCORE_EPSILON: f64 = 1e-9;

/// A process started during construction, not yet finished.
struct Running {
    index: usize,
    finish: i64,
}

/// Builds one candidate schedule. Each process is scheduled exactly once.
///
/// Exhausting `max_time` with processes unplaced returns the partial
/// schedule; the enclosing GRASP loop treats that as a weak candidate,
/// never as an error.
pub(crate) fn construct(
    problem: &Problem,
    rule: &dyn ConstructionRule,
    alpha: f64,
    max_time: i64,
    rng: &mut SmallRng,
) -> Solution {
    let mut stocks = problem.stocks.clone();
    let mut unscheduled: Vec<usize> = (0..problem.processes.len()).collect();
    let mut scheduled_outputs: HashSet<String> = HashSet::new();
    let mut running: Vec<Running> = Vec::new();
    let mut activities: Vec<ScheduledActivity> = Vec::new();

    let consumer_counts = problem.consumer_counts();
    let mut time = 0i64;

    while !unscheduled.is_empty() && time < max_time {
        finish_due(problem, &mut running, &mut stocks, time);

        let eligible: Vec<usize> = unscheduled
            .iter()
            .copied()
            .filter(|&i| is_eligible(problem, i, &stocks, &scheduled_outputs))
            .collect();

        if !eligible.is_empty() {
            let context = ConstructionContext {
                current_time: time,
                max_time,
                consumer_counts: consumer_counts.clone(),
            };
            let scores: Vec<f64> = eligible
                .iter()
                .map(|&i| rule.score(&problem.processes[i], &context, rng))
                .collect();

            let pick = eligible[restricted_pick(&scores, alpha, rng)];
            let process = &problem.processes[pick];
            trace!(tick = time, process = %process.name, rule = rule.name(), "start");

            for (resource, quantity) in &process.requisites {
                stocks.consume(resource, *quantity);
            }
            for resource in process.produces.keys() {
                scheduled_outputs.insert(resource.clone());
            }

            activities.push(ScheduledActivity::new(
                &process.name,
                time,
                time + process.delay,
            ));
            if process.delay == 0 {
                for (resource, quantity) in &process.produces {
                    stocks.add(resource, *quantity);
                }
            } else {
                running.push(Running {
                    index: pick,
                    finish: time + process.delay,
                });
            }
            unscheduled.retain(|&i| i != pick);
        }

        time += 1;
    }

    // Drain: still-running processes complete tick by tick.
    while !running.is_empty() {
        finish_due(problem, &mut running, &mut stocks, time);
        time += 1;
    }

    Solution { activities, stocks }
}

fn finish_due(problem: &Problem, running: &mut Vec<Running>, stocks: &mut Stock, time: i64) {
    let mut index = 0;
    while index < running.len() {
        if running[index].finish <= time {
            let done = running.swap_remove(index);
            for (resource, quantity) in &problem.processes[done.index].produces {
                stocks.add(resource, *quantity);
            }
        } else {
            index += 1;
        }
    }
}

/// Eligibility: every requisite is covered by current stock, or — when the
/// stock reads empty — has been produced by some already-scheduled process.
///
/// The second clause is a precedence proxy, not a timing check: it can
/// admit schedules that are precedence-correct in scheduling order but not
/// timing-correct. Local search re-validates full feasibility.
fn is_eligible(
    problem: &Problem,
    index: usize,
    stocks: &Stock,
    scheduled_outputs: &HashSet<String>,
) -> bool {
    problem.processes[index]
        .requisites
        .iter()
        .all(|(resource, &quantity)| {
            let available = stocks.available(resource);
            available >= quantity || (available <= 0 && scheduled_outputs.contains(resource))
        })
}

/// Draws uniformly from the restricted candidate list.
///
/// RCL = { candidates with score >= best − alpha × (best − worst) }:
/// alpha = 0 keeps only the best-scoring candidate, alpha = 1 keeps all.
fn restricted_pick(scores: &[f64], alpha: f64, rng: &mut SmallRng) -> usize {
    let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let worst = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let threshold = best - alpha * (best - worst);

    let rcl: Vec<usize> = (0..scores.len())
        .filter(|&i| scores[i] >= threshold - SCORE_EPSILON)
        .collect();

    rcl[rng.random_range(0..rcl.len())]
}
