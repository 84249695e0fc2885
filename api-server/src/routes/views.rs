//! Response shapes with references resolved
//!
//! Documents store ids only; handlers populate hosts, listings and guests
//! here before responding. Password hashes never leave this module.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rental_core::booking::{day, Booking, BookingStatus};
use rental_core::market::{FileMarketStore, PropertyRepository, UserRepository};
use rental_core::property::{Location, Property};
use rental_core::user::{HostSummary, User, UserSummary};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiResult;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price_per_night: f64,
    pub location: Location,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub max_guests: u32,
    pub rating: u8,
    pub reviews: Vec<String>,
    /// `None` only if the host record vanished underneath the listing
    pub host: Option<HostSummary>,
    pub host_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PropertyView {
    pub fn new(property: Property, host: Option<&User>) -> Self {
        Self {
            id: property.id,
            title: property.title,
            description: property.description,
            price_per_night: property.price_per_night,
            location: property.location,
            images: property.images,
            amenities: property.amenities,
            max_guests: property.max_guests,
            rating: property.rating,
            reviews: property.reviews,
            host: host.map(HostSummary::from),
            host_id: property.host,
            created_at: property.created_at,
            updated_at: property.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub id: Uuid,
    pub property: Option<PropertyView>,
    pub property_id: Uuid,
    pub user: Option<UserSummary>,
    pub user_id: Uuid,
    #[serde(with = "day")]
    pub start_date: NaiveDate,
    #[serde(with = "day")]
    pub end_date: NaiveDate,
    pub nights: i64,
    pub guests: u32,
    pub total_price: f64,
    pub special_requests: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Public profile: no role, no credential
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub bio: String,
    pub profile_picture: Option<String>,
    pub properties: Vec<Uuid>,
}

impl From<&User> for ProfileView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            bio: user.bio.clone(),
            profile_picture: user.profile_picture.clone(),
            properties: user.properties.clone(),
        }
    }
}

/// Snapshot of users and listings used to populate references
pub struct Lookup {
    users: HashMap<Uuid, User>,
    properties: HashMap<Uuid, Property>,
}

impl Lookup {
    /// Users only; enough to populate listings
    pub async fn hosts(store: &FileMarketStore) -> ApiResult<Self> {
        Ok(Self {
            users: load_users(store).await?,
            properties: HashMap::new(),
        })
    }

    pub async fn load(store: &FileMarketStore) -> ApiResult<Self> {
        let users = load_users(store).await?;
        let properties = store
            .list_properties(None)
            .await?
            .into_iter()
            .map(|property| (property.id, property))
            .collect();
        Ok(Self { users, properties })
    }

    pub fn property(&self, property: Property) -> PropertyView {
        let host = self.users.get(&property.host);
        PropertyView::new(property, host)
    }

    pub fn properties(&self, properties: Vec<Property>) -> Vec<PropertyView> {
        properties
            .into_iter()
            .map(|property| self.property(property))
            .collect()
    }

    pub fn booking(&self, booking: Booking) -> BookingView {
        let nights = booking.range().nights();
        BookingView {
            id: booking.id,
            property: self
                .properties
                .get(&booking.property)
                .cloned()
                .map(|property| self.property(property)),
            property_id: booking.property,
            user: self.users.get(&booking.user).map(UserSummary::from),
            user_id: booking.user,
            start_date: booking.start_date,
            end_date: booking.end_date,
            nights,
            guests: booking.guests,
            total_price: booking.total_price,
            special_requests: booking.special_requests,
            status: booking.status,
            created_at: booking.created_at,
        }
    }

    pub fn bookings(&self, bookings: Vec<Booking>) -> Vec<BookingView> {
        bookings
            .into_iter()
            .map(|booking| self.booking(booking))
            .collect()
    }
}

async fn load_users(store: &FileMarketStore) -> ApiResult<HashMap<Uuid, User>> {
    Ok(store
        .list_users()
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect())
}

/// Populate one listing without loading the whole market
pub async fn property_view(store: &FileMarketStore, property: Property) -> ApiResult<PropertyView> {
    let host = store.get_user(property.host).await?;
    Ok(PropertyView::new(property, host.as_ref()))
}
