//! User module
//!
//! Accounts, roles and the public projections of a user record.

mod model;

pub use model::*;
