//! Production scheduling domain models.
//!
//! Core data types shared by the analyzer, the GRASP optimizer, and the
//! simulation engine. Everything here is plain data: processes and stock
//! come in from the parser, solutions and traces go out to the caller.
//!
//! # Domain Mappings
//!
//! | prodflow | Manufacturing | Supply Chain | Crafting Games |
//! |----------|---------------|--------------|----------------|
//! | Process | Operation | Production Step | Recipe |
//! | Stock | Inventory | Warehouse State | Item Counts |
//! | Solution | Production Plan | Build Plan | Craft Order |
//! | Execution | Work Order Log | Shipment Record | Craft Event |

mod problem;
mod process;
mod solution;
mod stock;

pub use problem::Problem;
pub use process::Process;
pub use solution::{Execution, ScheduledActivity, SimulationResult, Solution};
pub use stock::Stock;
