//! Property module
//!
//! Bookable listings owned by a host.

mod model;

pub use model::*;
