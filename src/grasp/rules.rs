//! Priority rules for greedy construction.
//!
//! Each GRASP iteration scores eligible processes under one rule; the
//! optimizer cycles through all rules round-robin so no single heuristic
//! dominates the search.
//!
//! # Score Convention
//! **Higher score = more urgent.** The restricted candidate list keeps the
//! top alpha-band of scores.
//!
//! # References
//! - Kolisch (1996), "Serial and Parallel Resource-Constrained Project
//!   Scheduling Methods Revisited"
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::collections::HashMap;
use std::fmt::Debug;

use rand::rngs::SmallRng;
use rand::Rng;

use crate::models::Process;

/// Construction state visible to priority rules.
#[derive(Debug, Clone, Default)]
pub struct ConstructionContext {
    /// Current construction clock tick.
    pub current_time: i64,
    /// Construction tick ceiling.
    pub max_time: i64,
    /// Number of processes consuming each resource.
    pub consumer_counts: HashMap<String, usize>,
}

impl ConstructionContext {
    /// Creates a context at the given tick.
    pub fn at_time(current_time: i64, max_time: i64) -> Self {
        Self {
            current_time,
            max_time,
            ..Default::default()
        }
    }

    /// Sets the consumer count for a resource.
    pub fn with_consumer_count(mut self, resource: impl Into<String>, count: usize) -> Self {
        self.consumer_counts.insert(resource.into(), count);
        self
    }
}

/// A priority rule scoring candidate processes during construction.
pub trait ConstructionRule: Send + Sync + Debug {
    /// Rule name (e.g., "LFT", "SPT").
    fn name(&self) -> &'static str;

    /// Scores a candidate; higher = more urgent.
    fn score(&self, process: &Process, context: &ConstructionContext, rng: &mut SmallRng) -> f64;
}

/// Latest Finish Time: the less room a process has before the horizon,
/// the more urgent it is.
#[derive(Debug, Clone, Copy)]
pub struct LatestFinishTime;

impl ConstructionRule for LatestFinishTime {
    fn name(&self) -> &'static str {
        "LFT"
    }

    fn score(&self, process: &Process, context: &ConstructionContext, _rng: &mut SmallRng) -> f64 {
        -((context.max_time - context.current_time - process.delay) as f64)
    }
}

/// Minimum Total Slack, on a coarse remaining-horizon estimate — not the
/// CPM slack. A process feeding many outputs gets a proportionally tighter
/// estimate.
#[derive(Debug, Clone, Copy)]
pub struct MinimumTotalSlack;

impl ConstructionRule for MinimumTotalSlack {
    fn name(&self) -> &'static str {
        "MTS"
    }

    fn score(&self, process: &Process, context: &ConstructionContext, _rng: &mut SmallRng) -> f64 {
        let fanout = process.output_count().max(1) as i64;
        let slack = (context.max_time - context.current_time) - process.delay * fanout;
        -(slack as f64)
    }
}

/// Greatest Rank Positional Weight: outputs wanted by many downstream
/// processes weigh more; consumed inputs and delay weigh slightly against.
#[derive(Debug, Clone, Copy)]
pub struct GreatestRankPositionalWeight;

impl ConstructionRule for GreatestRankPositionalWeight {
    fn name(&self) -> &'static str {
        "GRPW"
    }

    fn score(&self, process: &Process, context: &ConstructionContext, _rng: &mut SmallRng) -> f64 {
        let mut weight = 0.0;
        for (resource, quantity) in &process.produces {
            let consumers = context
                .consumer_counts
                .get(resource)
                .copied()
                .unwrap_or(0);
            let mut per_unit = 1.0 + 0.5 * consumers as f64;
            if consumers > 5 {
                per_unit *= 2.0;
            }
            weight += *quantity as f64 * per_unit;
        }
        weight - 0.3 * process.total_input() as f64 + 0.1 * process.delay as f64
    }
}

/// Shortest Processing Time.
#[derive(Debug, Clone, Copy)]
pub struct ShortestProcessingTime;

impl ConstructionRule for ShortestProcessingTime {
    fn name(&self) -> &'static str {
        "SPT"
    }

    fn score(&self, process: &Process, _context: &ConstructionContext, _rng: &mut SmallRng) -> f64 {
        -(process.delay as f64)
    }
}

/// Uniform random scores; pure diversification.
#[derive(Debug, Clone, Copy)]
pub struct RandomRule;

impl ConstructionRule for RandomRule {
    fn name(&self) -> &'static str {
        "RANDOM"
    }

    fn score(&self, _process: &Process, _context: &ConstructionContext, rng: &mut SmallRng) -> f64 {
        rng.random_range(0.0..1000.0)
    }
}

/// The round-robin rule roster used by the optimizer.
pub(crate) fn default_rules() -> Vec<Box<dyn ConstructionRule>> {
    vec![
        Box::new(LatestFinishTime),
        Box::new(MinimumTotalSlack),
        Box::new(GreatestRankPositionalWeight),
        Box::new(ShortestProcessingTime),
        Box::new(RandomRule),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn test_lft_prefers_longer_delay() {
        let ctx = ConstructionContext::at_time(0, 100);
        let long = Process::new("long").with_delay(20);
        let short = Process::new("short").with_delay(2);
        let mut rng = rng();
        assert!(LatestFinishTime.score(&long, &ctx, &mut rng) > LatestFinishTime.score(&short, &ctx, &mut rng));
    }

    #[test]
    fn test_mts_fanout_tightens_slack() {
        let ctx = ConstructionContext::at_time(0, 100);
        let wide = Process::new("wide")
            .with_product("a", 1)
            .with_product("b", 1)
            .with_delay(10);
        let narrow = Process::new("narrow").with_product("a", 1).with_delay(10);
        let mut rng = rng();
        // wide: slack 100 - 20 = 80; narrow: 100 - 10 = 90 → wide more urgent.
        assert!(MinimumTotalSlack.score(&wide, &ctx, &mut rng) > MinimumTotalSlack.score(&narrow, &ctx, &mut rng));
    }

    #[test]
    fn test_grpw_values_demanded_outputs() {
        let ctx = ConstructionContext::at_time(0, 100).with_consumer_count("gear", 3);
        let wanted = Process::new("wanted").with_product("gear", 2);
        let unwanted = Process::new("unwanted").with_product("scrap", 2);
        let mut rng = rng();
        assert!(GreatestRankPositionalWeight.score(&wanted, &ctx, &mut rng)
            > GreatestRankPositionalWeight.score(&unwanted, &ctx, &mut rng));
    }

    #[test]
    fn test_grpw_doubles_heavy_fanout() {
        let ctx_heavy = ConstructionContext::at_time(0, 100).with_consumer_count("gear", 6);
        let ctx_light = ConstructionContext::at_time(0, 100).with_consumer_count("gear", 5);
        let p = Process::new("p").with_product("gear", 1);
        let mut rng = rng();
        let heavy = GreatestRankPositionalWeight.score(&p, &ctx_heavy, &mut rng);
        let light = GreatestRankPositionalWeight.score(&p, &ctx_light, &mut rng);
        // 6 consumers: (1 + 3.0) * 2 = 8; 5 consumers: 1 + 2.5 = 3.5.
        assert!(heavy > 2.0 * light);
    }

    #[test]
    fn test_spt_prefers_short() {
        let ctx = ConstructionContext::at_time(0, 100);
        let long = Process::new("long").with_delay(20);
        let short = Process::new("short").with_delay(2);
        let mut rng = rng();
        assert!(ShortestProcessingTime.score(&short, &ctx, &mut rng)
            > ShortestProcessingTime.score(&long, &ctx, &mut rng));
    }

    #[test]
    fn test_random_in_range_and_seeded() {
        let ctx = ConstructionContext::at_time(0, 100);
        let p = Process::new("p");
        let a = RandomRule.score(&p, &ctx, &mut SmallRng::seed_from_u64(3));
        let b = RandomRule.score(&p, &ctx, &mut SmallRng::seed_from_u64(3));
        assert_eq!(a, b);
        assert!((0.0..1000.0).contains(&a));
    }

    #[test]
    fn test_roster_order() {
        let names: Vec<&str> = default_rules().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["LFT", "MTS", "GRPW", "SPT", "RANDOM"]);
    }
}
