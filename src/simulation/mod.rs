//! Tick-synchronous production simulation.
//!
//! Each process has a single instance cycling Pending → Executing →
//! Completed and back to Pending, so a process re-runs as long as stock
//! allows. Every tick, completions land before any start is considered,
//! and each start's deduction commits immediately so later eligibility
//! checks within the same tick observe it.
//!
//! Candidate ordering is a policy: `Fifo` keeps declaration order, `Smart`
//! ranks by a composite score over a fresh analyzer snapshot.
//!
//! # Reference
//! Law & Kelton, "Simulation Modeling and Analysis" (discrete-event
//! clock advance)

use tracing::{debug, trace};

use crate::analysis::{self, AnalysisSnapshot};
use crate::models::{Execution, Problem, SimulationResult, Stock};

/// How the simulator orders executable processes within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimulationPolicy {
    /// Declaration order.
    #[default]
    Fifo,
    /// Analyzer-driven ranking toward the configured target.
    Smart,
}

/// Discrete-tick simulator over one problem instance.
///
/// # Usage
///
/// ```
/// use prodflow::models::{Problem, Process};
/// use prodflow::simulation::{SimulationPolicy, Simulator};
///
/// let problem = Problem::new()
///     .with_stock("wood", 4)
///     .with_process(
///         Process::new("saw")
///             .with_requisite("wood", 2)
///             .with_product("plank", 1)
///             .with_delay(2),
///     );
/// let result = Simulator::new(problem)
///     .with_policy(SimulationPolicy::Fifo)
///     .run();
/// assert!(result.completed);
/// assert_eq!(result.stocks.available("plank"), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Simulator {
    problem: Problem,
    policy: SimulationPolicy,
    max_cycles: i64,
    target: Option<(String, i64)>,
}

impl Simulator {
    /// Creates a simulator with the default Fifo policy and a 10000-tick
    /// ceiling.
    pub fn new(problem: Problem) -> Self {
        Self {
            problem,
            policy: SimulationPolicy::default(),
            max_cycles: 10_000,
            target: None,
        }
    }

    /// Sets the ordering policy.
    pub fn with_policy(mut self, policy: SimulationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the tick ceiling.
    pub fn with_max_cycles(mut self, max_cycles: i64) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Sets the production target the Smart policy steers toward. Once the
    /// target quantity is in stock, contributing processes are
    /// de-prioritized but not excluded.
    pub fn with_target(mut self, resource: impl Into<String>, quantity: i64) -> Self {
        self.target = Some((resource.into(), quantity));
        self
    }

    /// Runs the simulation to quiescence or the tick ceiling.
    ///
    /// `completed` is false only when the ceiling halted a run that still
    /// had work pending or executing.
    pub fn run(&self) -> SimulationResult {
        let mut stocks = self.problem.stocks.clone();
        // One instance per process: Some(start) while executing.
        let mut executing: Vec<Option<i64>> = vec![None; self.problem.processes.len()];
        let mut history: Vec<Execution> = Vec::new();
        let mut time = 0i64;
        let mut completed = true;

        loop {
            if time >= self.max_cycles {
                completed = false;
                break;
            }

            for index in 0..executing.len() {
                let Some(start) = executing[index] else {
                    continue;
                };
                let process = &self.problem.processes[index];
                if time - start == process.delay {
                    for (resource, quantity) in &process.produces {
                        stocks.add(resource, *quantity);
                    }
                    history.push(Execution {
                        start,
                        end: time,
                        process: process.name.clone(),
                        stocks_after: stocks.clone(),
                    });
                    executing[index] = None;
                    trace!(tick = time, process = %process.name, "completed");
                }
            }

            let mut candidates: Vec<usize> = (0..self.problem.processes.len())
                .filter(|&i| {
                    executing[i].is_none()
                        && stocks.satisfies(&self.problem.processes[i].requisites)
                })
                .collect();

            if candidates.is_empty() && executing.iter().all(Option::is_none) {
                break;
            }

            if self.policy == SimulationPolicy::Smart && candidates.len() > 1 {
                let snapshot = self.snapshot(&stocks);
                let mut scored: Vec<(usize, f64)> = candidates
                    .iter()
                    .map(|&i| (i, self.smart_score(i, &snapshot, &stocks)))
                    .collect();
                scored.sort_by(|a, b| b.1.total_cmp(&a.1));
                candidates = scored.into_iter().map(|(i, _)| i).collect();
            }

            for index in candidates {
                let process = &self.problem.processes[index];
                // Earlier starts this tick may have drained the stock; a
                // start that no longer fits is silently skipped and
                // retried on a later tick.
                if !stocks.satisfies(&process.requisites) {
                    continue;
                }
                for (resource, quantity) in &process.requisites {
                    stocks.consume(resource, *quantity);
                }
                trace!(tick = time, process = %process.name, "started");
                if process.delay == 0 {
                    for (resource, quantity) in &process.produces {
                        stocks.add(resource, *quantity);
                    }
                    history.push(Execution {
                        start: time,
                        end: time,
                        process: process.name.clone(),
                        stocks_after: stocks.clone(),
                    });
                } else {
                    executing[index] = Some(time);
                }
            }

            time += 1;
        }

        debug!(
            elapsed = time,
            executions = history.len(),
            completed,
            "simulation finished"
        );
        SimulationResult {
            history,
            stocks,
            elapsed: time,
            completed,
        }
    }

    fn snapshot(&self, stocks: &Stock) -> AnalysisSnapshot {
        let (target, quantity) = match &self.target {
            Some((name, quantity)) => (name.as_str(), *quantity),
            None => ("", 0),
        };
        analysis::analyze(target, quantity, stocks, &self.problem.processes)
    }

    /// Composite urgency of one executable process under the Smart policy.
    fn smart_score(&self, index: usize, snapshot: &AnalysisSnapshot, stocks: &Stock) -> f64 {
        let process = &self.problem.processes[index];
        let critical = snapshot.is_process_critical(&process.name);
        let produces_critical = process
            .produces
            .keys()
            .any(|resource| snapshot.is_on_critical_path(resource));

        let mut score = 0.0;
        if critical {
            score += 20_000.0;
        }
        score += 1000.0 - 10.0 * snapshot.process_slack(&process.name) as f64;

        for (resource, &quantity) in &process.produces {
            let quantity = quantity as f64;
            score += snapshot.resource_priority(resource) as f64 * quantity;
            if snapshot.is_on_critical_path(resource) {
                score += 5000.0 * quantity;
            }
            if snapshot.time_to_produce(resource) > 50 {
                score += 2000.0 * quantity;
            }
            score += 20.0 * snapshot.critical_path_length(resource) as f64;
            if snapshot.is_bottleneck(resource) {
                score += 2000.0 * quantity;
            }
            if snapshot.availability_ratio(resource) < 0.5 {
                score += 1000.0 * quantity;
            }
        }

        for (resource, &quantity) in &process.requisites {
            let quantity = quantity as f64;
            if snapshot.is_on_critical_path(resource) && !produces_critical {
                score -= 3000.0 * quantity;
            }
            let ratio = snapshot.availability_ratio(resource);
            if ratio < 1.0 {
                score -= 500.0 * quantity / (ratio + 0.1);
            }
            if snapshot.is_bottleneck(resource) {
                score -= 1000.0 * quantity;
            }
        }

        if !critical {
            score -= 10.0 * process.delay as f64;
        }

        if let Some((target, quantity)) = &self.target {
            if stocks.available(target) >= *quantity {
                score /= 10.0;
            }
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Process;

    fn sawmill() -> Problem {
        Problem::new()
            .with_stock("wood", 4)
            .with_process(
                Process::new("saw")
                    .with_requisite("wood", 2)
                    .with_product("plank", 1)
                    .with_delay(2),
            )
    }

    #[test]
    fn test_process_reruns_until_stock_exhausted() {
        let result = Simulator::new(sawmill()).run();

        assert!(result.completed);
        assert_eq!(result.history.len(), 2);
        assert_eq!(result.elapsed, 4);
        assert_eq!(result.stocks.available("wood"), 0);
        assert_eq!(result.stocks.available("plank"), 2);

        let first = &result.history[0];
        assert_eq!((first.start, first.end), (0, 2));
        let second = &result.history[1];
        assert_eq!((second.start, second.end), (2, 4));
    }

    #[test]
    fn test_completion_visible_to_same_tick_start() {
        let problem = Problem::new()
            .with_stock("wood", 2)
            .with_process(
                Process::new("saw")
                    .with_requisite("wood", 2)
                    .with_product("plank", 1)
                    .with_delay(2),
            )
            .with_process(
                Process::new("join")
                    .with_requisite("plank", 1)
                    .with_product("table", 1)
                    .with_delay(3),
            );
        let result = Simulator::new(problem).run();

        // join could not start at tick 0 (no plank); it starts the very
        // tick saw completes.
        assert!(result.completed);
        let join = result.history.iter().find(|e| e.process == "join").unwrap();
        assert_eq!(join.start, 2);
        assert_eq!(result.stocks.available("table"), 1);
        assert_eq!(result.elapsed, 5);
    }

    #[test]
    fn test_ceiling_halt_marks_incomplete() {
        // A free zero-delay producer re-runs every tick forever; only the
        // ceiling stops it.
        let problem = Problem::new().with_process(Process::new("spring").with_product("water", 1));
        let result = Simulator::new(problem).with_max_cycles(5).run();

        assert!(!result.completed);
        assert_eq!(result.elapsed, 5);
        assert_eq!(result.history.len(), 5);
        assert_eq!(result.stocks.available("water"), 5);
    }

    #[test]
    fn test_zero_delay_completes_at_start() {
        let problem = Problem::new()
            .with_stock("flint", 1)
            .with_process(
                Process::new("spark")
                    .with_requisite("flint", 1)
                    .with_product("fire", 1),
            );
        let result = Simulator::new(problem).run();

        assert!(result.completed);
        assert_eq!(result.history.len(), 1);
        assert_eq!((result.history[0].start, result.history[0].end), (0, 0));
        assert_eq!(result.stocks.available("fire"), 1);
    }

    #[test]
    fn test_smart_policy_routes_contested_stock_to_target_chain() {
        let problem = Problem::new()
            .with_stock("wood", 1)
            .with_process(
                Process::new("burn")
                    .with_requisite("wood", 1)
                    .with_product("ash", 1)
                    .with_delay(1),
            )
            .with_process(
                Process::new("craft")
                    .with_requisite("wood", 1)
                    .with_product("table", 1)
                    .with_delay(1),
            );

        // Fifo spends the only wood on the first-declared process.
        let fifo = Simulator::new(problem.clone()).run();
        assert_eq!(fifo.history[0].process, "burn");

        // Smart steers it to the table chain.
        let smart = Simulator::new(problem)
            .with_policy(SimulationPolicy::Smart)
            .with_target("table", 1)
            .run();
        assert_eq!(smart.history[0].process, "craft");
        assert_eq!(smart.stocks.available("table"), 1);
        assert_eq!(smart.stocks.available("ash"), 0);
    }

    #[test]
    fn test_same_tick_deductions_gate_later_starts() {
        // Both want the same 3 ore; only one can start at tick 0, the
        // other is silently skipped and retried.
        let problem = Problem::new()
            .with_stock("ore", 3)
            .with_process(
                Process::new("a")
                    .with_requisite("ore", 2)
                    .with_product("ingot", 1)
                    .with_delay(1),
            )
            .with_process(
                Process::new("b")
                    .with_requisite("ore", 2)
                    .with_product("ingot", 1)
                    .with_delay(1),
            );
        let result = Simulator::new(problem).run();

        assert!(result.completed);
        assert_eq!(result.history.len(), 1);
        assert_eq!(result.history[0].process, "a");
        assert_eq!(result.stocks.available("ore"), 1);
    }

    #[test]
    fn test_conservation_over_history() {
        let problem = Problem::new()
            .with_stock("wood", 6)
            .with_process(
                Process::new("saw")
                    .with_requisite("wood", 2)
                    .with_product("plank", 2)
                    .with_delay(1),
            )
            .with_process(
                Process::new("join")
                    .with_requisite("plank", 3)
                    .with_product("table", 1)
                    .with_delay(2),
            );
        let result = Simulator::new(problem.clone()).run();
        assert!(result.completed);

        let mut expected = problem.stocks.clone();
        for execution in &result.history {
            let process = problem.process(&execution.process).unwrap();
            for (resource, quantity) in &process.requisites {
                expected.consume(resource, *quantity);
            }
            for (resource, quantity) in &process.produces {
                expected.add(resource, *quantity);
            }
        }
        assert_eq!(result.stocks, expected);
    }

    #[test]
    fn test_empty_problem_halts_immediately() {
        let result = Simulator::new(Problem::new()).run();
        assert!(result.completed);
        assert_eq!(result.elapsed, 0);
        assert!(result.history.is_empty());
    }

    #[test]
    fn test_history_snapshots_are_cumulative() {
        let result = Simulator::new(sawmill()).run();
        assert_eq!(result.history[0].stocks_after.available("plank"), 1);
        assert_eq!(result.history[1].stocks_after.available("plank"), 2);
        assert_eq!(result.history[1].stocks_after, result.stocks);
    }
}
