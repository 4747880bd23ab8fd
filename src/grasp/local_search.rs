//! Repair and forward/backward improvement over a constructed schedule.
//!
//! Construction's precedence proxy can emit schedules whose scheduling
//! order is right but whose timing is not, so improvement starts with a
//! repair pass: each activity is pushed to its earliest fully feasible
//! tick, in start order. The forward pass then pulls starts as early as
//! resource feasibility allows, closing idle gaps without increasing
//! makespan, and the backward pass pushes activities as late as feasible
//! within the current makespan, freeing stock early in the timeline for
//! the next forward pass. Passes alternate until neither moves anything or
//! the pass cap is reached; every tentative move is re-validated in full
//! before it is kept.
//!
//! # Reference
//! Valls et al. (2005), "Justification and RCPSP: A Technique That Pays"

use tracing::trace;

use crate::models::{Problem, ScheduledActivity, Solution};

/// Alternating forward/backward passes are capped; convergence is usually
/// much earlier.
const MAX_PASSES: usize = 5;

/// Repairs then improves a solution; never worsens a feasible input.
///
/// A timing-infeasible input (the construction proxy can produce one) is
/// first re-timed by [`repair`]; an unrepairable input is returned
/// unchanged.
pub(crate) fn improve(solution: &Solution, problem: &Problem) -> Solution {
    let mut activities = solution.activities.clone();
    if !is_feasible(&activities, problem) {
        match repair(&activities, problem) {
            Some(retimed) => activities = retimed,
            None => return solution.clone(),
        }
    }
    let before = activities.iter().map(|a| a.finish).max().unwrap_or(0);

    for pass in 0..MAX_PASSES {
        let forward = forward_pass(&mut activities, problem);
        let backward = backward_pass(&mut activities, problem);
        if !forward && !backward {
            trace!(pass, "local search converged");
            break;
        }
    }

    activities.sort_by_key(|a| (a.start, a.finish));
    let improved = Solution {
        activities,
        // Conservation: shifting starts never changes the final stock.
        stocks: solution.stocks.clone(),
    };
    debug_assert!(improved.makespan() <= before);
    improved
}

/// Re-times an order-feasible schedule by placing each activity, in start
/// order, at its earliest tick where the placed prefix validates in full.
/// Returns `None` when some activity fits nowhere within the horizon.
fn repair(activities: &[ScheduledActivity], problem: &Problem) -> Option<Vec<ScheduledActivity>> {
    let horizon: i64 = activities.iter().map(|a| a.finish - a.start).sum::<i64>()
        + activities.iter().map(|a| a.finish).max().unwrap_or(0)
        + 1;
    let mut order: Vec<usize> = (0..activities.len()).collect();
    order.sort_by_key(|&i| activities[i].start);

    let mut placed: Vec<ScheduledActivity> = Vec::with_capacity(activities.len());
    for &i in &order {
        let duration = activities[i].finish - activities[i].start;
        let mut found = false;
        for tick in 0..=horizon {
            placed.push(ScheduledActivity::new(
                activities[i].name.clone(),
                tick,
                tick + duration,
            ));
            if is_feasible(&placed, problem) {
                found = true;
                break;
            }
            placed.pop();
        }
        if !found {
            trace!(activity = %activities[i].name, "repair failed");
            return None;
        }
    }
    Some(placed)
}

/// Moves each activity to its earliest feasible start. Returns whether
/// anything moved.
fn forward_pass(activities: &mut Vec<ScheduledActivity>, problem: &Problem) -> bool {
    let mut moved = false;
    let mut order: Vec<usize> = (0..activities.len()).collect();
    order.sort_by_key(|&i| activities[i].start);

    for &i in &order {
        let current = activities[i].start;
        let duration = activities[i].finish - activities[i].start;
        for tick in 0..current {
            let mut trial = activities.clone();
            trial[i].start = tick;
            trial[i].finish = tick + duration;
            if is_feasible(&trial, problem) {
                *activities = trial;
                moved = true;
                break;
            }
        }
    }
    moved
}

/// Delays each activity as late as feasibility allows without increasing
/// the current makespan. Returns whether anything moved.
fn backward_pass(activities: &mut Vec<ScheduledActivity>, problem: &Problem) -> bool {
    let makespan = activities.iter().map(|a| a.finish).max().unwrap_or(0);
    let mut moved = false;
    let mut order: Vec<usize> = (0..activities.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(activities[i].start));

    for &i in &order {
        let current = activities[i].start;
        let duration = activities[i].finish - activities[i].start;
        let latest = makespan - duration;
        for tick in (current + 1..=latest).rev() {
            let mut trial = activities.clone();
            trial[i].start = tick;
            trial[i].finish = tick + duration;
            if is_feasible(&trial, problem) {
                *activities = trial;
                moved = true;
                break;
            }
        }
    }
    moved
}

/// Full resource-feasibility replay of a tentative schedule.
///
/// Walks event ticks in order; at each tick, completions (end <= tick)
/// release outputs before any same-tick start checks and deducts its
/// requisites. Zero-delay activities release outputs at their start tick,
/// matching construction and simulation semantics.
pub(crate) fn is_feasible(activities: &[ScheduledActivity], problem: &Problem) -> bool {
    let mut stocks = problem.stocks.clone();
    let mut ticks: Vec<i64> = activities
        .iter()
        .flat_map(|a| [a.start, a.finish])
        .collect();
    ticks.sort_unstable();
    ticks.dedup();

    for &tick in &ticks {
        for activity in activities {
            if activity.finish == tick && activity.start < tick {
                let Some(process) = problem.process(&activity.name) else {
                    return false;
                };
                for (resource, quantity) in &process.produces {
                    stocks.add(resource, *quantity);
                }
            }
        }
        for activity in activities {
            if activity.start == tick {
                let Some(process) = problem.process(&activity.name) else {
                    return false;
                };
                if !stocks.satisfies(&process.requisites) {
                    return false;
                }
                for (resource, quantity) in &process.requisites {
                    stocks.consume(resource, *quantity);
                }
                if activity.finish == tick {
                    for (resource, quantity) in &process.produces {
                        stocks.add(resource, *quantity);
                    }
                }
            }
        }
    }
    true
}
