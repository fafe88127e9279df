//! The discrete decision process consumed by evaluation and search.
//!
//! [`DecisionProcess`] is the read-only query surface. [`DecPomdp`] is the
//! in-memory implementation, assembled through [`DecPomdpBuilder`] with its
//! probability tables stored behind the [`Kernel`] trait.

mod builder;
mod decpomdp;
mod dense;
mod kernel;
mod observation;
mod process;
mod space;
mod sparse;

pub use builder::*;
pub use decpomdp::*;
pub use dense::*;
pub use kernel::*;
pub use observation::*;
pub use process::*;
pub use space::*;
pub use sparse::*;
