//! GRASP optimizer: randomized-greedy construction plus local search.
//!
//! Each iteration picks a priority rule round-robin, constructs a candidate
//! schedule with a restricted candidate list, improves it with forward/
//! backward passes, and keeps the best solution by strict makespan
//! improvement (first found wins ties). Iterations are independent — each
//! draws from its own seeded random stream — so the loop is trivially
//! parallelizable by guarding the best-solution update.
//!
//! # Usage
//!
//! ```
//! use prodflow::grasp::{GraspConfig, GraspOptimizer};
//! use prodflow::models::{Problem, Process};
//!
//! let problem = Problem::new()
//!     .with_stock("ore", 8)
//!     .with_process(
//!         Process::new("smelt")
//!             .with_requisite("ore", 4)
//!             .with_product("ingot", 1)
//!             .with_delay(10),
//!     );
//! let optimizer = GraspOptimizer::new(problem, GraspConfig::default());
//! let outcome = optimizer.solve();
//! assert_eq!(outcome.best.activity_count(), 1);
//! ```
//!
//! # Reference
//! Feo & Resende (1995), "Greedy Randomized Adaptive Search Procedures"

mod construction;
mod local_search;
pub mod rules;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::debug;

use crate::models::{Problem, Solution};

pub(crate) use local_search::is_feasible;

/// Optimizer parameters.
#[derive(Debug, Clone)]
pub struct GraspConfig {
    /// Construction + improvement iterations.
    pub iterations: usize,
    /// RCL greediness: 0.0 = pure greedy, 1.0 = pure random.
    pub alpha: f64,
    /// Construction clock ceiling in ticks.
    pub max_time: i64,
    /// Base seed; iteration `i` uses `seed + i`.
    pub seed: u64,
}

impl Default for GraspConfig {
    fn default() -> Self {
        Self {
            iterations: 30,
            alpha: 0.3,
            max_time: 1000,
            seed: 0,
        }
    }
}

impl GraspConfig {
    /// Sets the iteration count.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the RCL parameter, clamped to [0, 1].
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Sets the construction tick ceiling.
    pub fn with_max_time(mut self, max_time: i64) -> Self {
        self.max_time = max_time;
        self
    }

    /// Sets the base random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Result of a GRASP run.
#[derive(Debug, Clone)]
pub struct GraspOutcome {
    /// Best solution found.
    pub best: Solution,
    /// Best-so-far makespan after each iteration (non-increasing).
    pub best_makespan_per_iteration: Vec<i64>,
}

/// Multi-start optimizer over one problem instance.
#[derive(Debug, Clone)]
pub struct GraspOptimizer {
    problem: Problem,
    config: GraspConfig,
}

impl GraspOptimizer {
    /// Creates an optimizer.
    pub fn new(problem: Problem, config: GraspConfig) -> Self {
        Self { problem, config }
    }

    /// Runs all iterations and returns the best solution found.
    ///
    /// Nothing here is fatal: iterations that exhaust their tick budget
    /// contribute a partial (weak) candidate and the loop moves on.
    pub fn solve(&self) -> GraspOutcome {
        let rules = rules::default_rules();
        let mut best: Option<Solution> = None;
        let mut history = Vec::with_capacity(self.config.iterations);

        for iteration in 0..self.config.iterations {
            let rule = &rules[iteration % rules.len()];
            let mut rng = SmallRng::seed_from_u64(self.config.seed.wrapping_add(iteration as u64));

            let candidate = construction::construct(
                &self.problem,
                rule.as_ref(),
                self.config.alpha,
                self.config.max_time,
                &mut rng,
            );
            let improved = local_search::improve(&candidate, &self.problem);

            let makespan = improved.makespan();
            debug!(
                iteration,
                rule = rule.name(),
                makespan,
                scheduled = improved.activity_count(),
                "iteration finished"
            );

            // Strict makespan improvement only; the first solution at a
            // given makespan is kept. Coverage is not compared — callers
            // wanting a full schedule check activity_count themselves.
            let replace = best
                .as_ref()
                .is_none_or(|current| makespan < current.makespan());
            if replace {
                best = Some(improved);
            }
            history.push(best.as_ref().map(|s| s.makespan()).unwrap_or(0));
        }

        GraspOutcome {
            best: best.unwrap_or_default(),
            best_makespan_per_iteration: history,
        }
    }
}
