//! Repository traits
//!
//! Defines the interface for market storage operations.

use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::{Booking, BookingUpdate, NewBooking};
use crate::property::{NewProperty, Property, PropertyUpdate};
use crate::user::{NewUser, User, UserUpdate};
use crate::Result;

/// What a user deletion removed
#[derive(Debug, Clone)]
pub struct UserDeletion {
    pub user: User,
    pub properties_removed: usize,
    pub bookings_removed: usize,
}

/// What a property deletion removed
#[derive(Debug, Clone)]
pub struct PropertyDeletion {
    pub property: Property,
    pub bookings_removed: usize,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user; username and email must be unused
    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn list_users(&self) -> Result<Vec<User>>;

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<User>;

    /// Delete a user together with their listings, the bookings on those
    /// listings, and the bookings they made
    async fn delete_user(&self, id: Uuid) -> Result<UserDeletion>;
}

#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Create a listing owned by `host`
    async fn create_property(&self, host: Uuid, property: NewProperty) -> Result<Property>;

    async fn get_property(&self, id: Uuid) -> Result<Option<Property>>;

    /// All listings, newest first, optionally restricted to one host
    async fn list_properties(&self, host: Option<Uuid>) -> Result<Vec<Property>>;

    async fn latest_properties(&self, limit: usize) -> Result<Vec<Property>>;

    async fn update_property(&self, id: Uuid, update: PropertyUpdate) -> Result<Property>;

    /// Delete a listing together with its bookings
    async fn delete_property(&self, id: Uuid) -> Result<PropertyDeletion>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Create a pending booking for `guest`; rejects unknown references,
    /// guest counts above the listing's limit and occupied dates
    async fn create_booking(&self, guest: Uuid, booking: NewBooking) -> Result<Booking>;

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>>;

    async fn list_bookings(&self) -> Result<Vec<Booking>>;

    async fn bookings_for_property(&self, property: Uuid) -> Result<Vec<Booking>>;

    async fn bookings_for_guest(&self, guest: Uuid) -> Result<Vec<Booking>>;

    /// Bookings on any listing hosted by `host`
    async fn bookings_for_host(&self, host: Uuid) -> Result<Vec<Booking>>;

    async fn update_booking(&self, id: Uuid, update: BookingUpdate) -> Result<Booking>;

    async fn delete_booking(&self, id: Uuid) -> Result<bool>;
}
