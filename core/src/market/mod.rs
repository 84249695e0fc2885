//! Market storage
//!
//! The three document collections (users, properties, bookings) live in a
//! single store so that cascading deletes can commit atomically.

mod file_store;
mod repository;

pub use file_store::{FileMarketStore, MarketStats};
pub use repository::{
    BookingRepository, PropertyDeletion, PropertyRepository, UserDeletion, UserRepository,
};
