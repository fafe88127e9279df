mod evaluator;
mod simulation;
mod table;

pub use evaluator::*;
pub use simulation::*;
pub use table::*;
