//! Pure joint policies in vector form.
//!
//! Every agent maps each of its observation histories to one action. The
//! whole joint policy is one mixed-radix number, so enumeration is counting.

mod individual;
mod joint;
mod odometer;

pub use individual::*;
pub use joint::*;
pub use odometer::*;
