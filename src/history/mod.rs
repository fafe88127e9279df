mod indexer;
mod local;

pub use indexer::*;
pub use local::*;
