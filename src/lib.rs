//! Production-chain scheduling: analysis, optimization, and simulation.
//!
//! Models resource-constrained production chains — processes that consume
//! stocked resources with a delay and produce others — and answers two
//! questions about them: what is a good schedule (GRASP optimizer) and
//! what actually happens when the chain runs (tick simulator).
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Process`, `Stock`, `Problem`,
//!   `Solution`, `Execution`, `SimulationResult`
//! - **`analysis`**: Dependency-graph analyzer — per-resource demand,
//!   criticality, and priority; per-process CPM timing and slack
//! - **`grasp`**: Multi-start optimizer — randomized-greedy construction
//!   under priority rules, forward/backward local search
//! - **`simulation`**: Tick-synchronous execution engine with Fifo and
//!   analyzer-driven Smart ordering policies
//! - **`validation`**: Input integrity checks (duplicate names, negative
//!   delays, unreachable targets)
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Feo & Resende (1995), "Greedy Randomized Adaptive Search Procedures"
//! - Kolisch (1996), "Serial and Parallel Resource-Constrained Project
//!   Scheduling Methods Revisited"

pub mod analysis;
pub mod grasp;
pub mod models;
pub mod simulation;
pub mod validation;
