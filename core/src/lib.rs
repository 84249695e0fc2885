//! Core library for the rental marketplace
//!
//! This crate contains the domain model and storage, including:
//! - Users and roles
//! - Property listings
//! - Bookings and the availability checker
//! - The file-backed market store

pub mod booking;
pub mod error;
pub mod market;
pub mod property;
pub mod user;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
