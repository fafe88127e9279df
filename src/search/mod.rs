//! Planners searching the joint policy space with the exact evaluator.
//!
//! - `BruteForce`: enumerate every joint policy
//! - `Jesp`: alternating exhaustive best responses
//! - `JespDp`: alternating best responses by dynamic programming over
//!   augmented beliefs

mod belief;
mod bruteforce;
mod cancel;
mod dynamic;
mod jesp;
mod planner;
mod progress;

pub use belief::*;
pub use bruteforce::*;
pub use cancel::*;
pub use dynamic::*;
pub use jesp::*;
pub use planner::*;
pub use progress::*;
