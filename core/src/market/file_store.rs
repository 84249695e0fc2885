//! File-based market storage implementation
//!
//! Keeps users, properties and bookings in memory and stores all three
//! collections as one JSON document on disk. Every write runs as a
//! transaction: changes are applied to a copy, the copy is written to disk,
//! and only then does it replace the live collections. A failed step leaves
//! both memory and disk as they were.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::repository::{
    BookingRepository, PropertyDeletion, PropertyRepository, UserDeletion, UserRepository,
};
use crate::booking::{availability, Booking, BookingUpdate, NewBooking};
use crate::property::{NewProperty, Property, PropertyUpdate};
use crate::user::{NewUser, User, UserUpdate};
use crate::{Error, Result};

#[derive(Debug, Default, Clone)]
struct Collections {
    users: HashMap<Uuid, User>,
    properties: HashMap<Uuid, Property>,
    bookings: HashMap<Uuid, Booking>,
}

impl Collections {
    fn ensure_unique_identity(
        &self,
        username: &str,
        email: &str,
        except: Option<Uuid>,
    ) -> Result<()> {
        for user in self.users.values().filter(|user| Some(user.id) != except) {
            if user.email == email {
                return Err(Error::Conflict(format!("Email '{}' is already registered", email)));
            }
            if user.username == username {
                return Err(Error::Conflict(format!("Username '{}' is already taken", username)));
            }
        }
        Ok(())
    }

    fn bookings_of(&self, property: Uuid) -> Vec<Booking> {
        self.bookings
            .values()
            .filter(|booking| booking.property == property)
            .cloned()
            .collect()
    }

    /// Remove bookings matching `predicate`, returning how many went
    fn remove_bookings(&mut self, predicate: impl Fn(&Booking) -> bool) -> usize {
        let before = self.bookings.len();
        self.bookings.retain(|_, booking| !predicate(booking));
        before - self.bookings.len()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredCollections {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    properties: Vec<Property>,
    #[serde(default)]
    bookings: Vec<Booking>,
}

impl From<StoredCollections> for Collections {
    fn from(value: StoredCollections) -> Self {
        Self {
            users: value.users.into_iter().map(|item| (item.id, item)).collect(),
            properties: value
                .properties
                .into_iter()
                .map(|item| (item.id, item))
                .collect(),
            bookings: value
                .bookings
                .into_iter()
                .map(|item| (item.id, item))
                .collect(),
        }
    }
}

impl From<&Collections> for StoredCollections {
    fn from(value: &Collections) -> Self {
        Self {
            users: value.users.values().cloned().collect(),
            properties: value.properties.values().cloned().collect(),
            bookings: value.bookings.values().cloned().collect(),
        }
    }
}

/// Document counts for the admin dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStats {
    pub total_users: usize,
    pub total_properties: usize,
    pub total_bookings: usize,
}

/// File-based market store using JSON
pub struct FileMarketStore {
    /// Path to the JSON document
    path: PathBuf,
    state: RwLock<Collections>,
}

impl FileMarketStore {
    /// Open the store at `path`.
    ///
    /// A missing or empty file starts an empty market.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = load(&path).await?;
        info!(
            path = %path.display(),
            users = state.users.len(),
            properties = state.properties.len(),
            bookings = state.bookings.len(),
            "market store opened"
        );
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub async fn stats(&self) -> MarketStats {
        let state = self.state.read().await;
        MarketStats {
            total_users: state.users.len(),
            total_properties: state.properties.len(),
            total_bookings: state.bookings.len(),
        }
    }

    /// Run `apply` against a copy of the collections and commit it.
    ///
    /// The write lock is held until the copy is on disk, so transactions
    /// are serialized and readers never observe a half-applied change.
    async fn transaction<T, F>(&self, apply: F) -> Result<T>
    where
        F: FnOnce(&mut Collections) -> Result<T>,
    {
        let mut state = self.state.write().await;
        let mut draft = state.clone();
        let value = apply(&mut draft)?;
        persist(&self.path, &draft).await?;
        *state = draft;
        Ok(value)
    }
}

#[async_trait]
impl UserRepository for FileMarketStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let user = user.into_user()?;
        let created = self
            .transaction(move |state| {
                state.ensure_unique_identity(&user.username, &user.email, None)?;
                state.users.insert(user.id, user.clone());
                Ok(user)
            })
            .await?;
        info!(
            user_id = %created.id,
            username = %created.username,
            role = %created.role,
            "user created"
        );
        Ok(created)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.trim().to_lowercase();
        let state = self.state.read().await;
        Ok(state.users.values().find(|user| user.email == email).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let username = username.trim();
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<User> {
        self.transaction(move |state| {
            let mut user = state
                .users
                .get(&id)
                .cloned()
                .ok_or_else(|| Error::UserNotFound(id.to_string()))?;
            update.apply(&mut user)?;
            state.ensure_unique_identity(&user.username, &user.email, Some(id))?;
            state.users.insert(id, user.clone());
            Ok(user)
        })
        .await
    }

    async fn delete_user(&self, id: Uuid) -> Result<UserDeletion> {
        let deletion = self
            .transaction(move |state| {
                let user = state
                    .users
                    .remove(&id)
                    .ok_or_else(|| Error::UserNotFound(id.to_string()))?;
                let hosted: HashSet<Uuid> = state
                    .properties
                    .values()
                    .filter(|property| property.host == id)
                    .map(|property| property.id)
                    .collect();
                state.properties.retain(|property_id, _| !hosted.contains(property_id));
                let bookings_removed = state.remove_bookings(|booking| {
                    booking.user == id || hosted.contains(&booking.property)
                });
                Ok(UserDeletion {
                    user,
                    properties_removed: hosted.len(),
                    bookings_removed,
                })
            })
            .await?;
        info!(
            user_id = %id,
            properties = deletion.properties_removed,
            bookings = deletion.bookings_removed,
            "user deleted with dependent records"
        );
        Ok(deletion)
    }
}

#[async_trait]
impl PropertyRepository for FileMarketStore {
    async fn create_property(&self, host: Uuid, property: NewProperty) -> Result<Property> {
        let property = property.into_property(host)?;
        let created = self
            .transaction(move |state| {
                let owner = state
                    .users
                    .get_mut(&host)
                    .ok_or_else(|| Error::UserNotFound(host.to_string()))?;
                owner.properties.push(property.id);
                state.properties.insert(property.id, property.clone());
                Ok(property)
            })
            .await?;
        info!(property_id = %created.id, host = %host, "property created");
        Ok(created)
    }

    async fn get_property(&self, id: Uuid) -> Result<Option<Property>> {
        let state = self.state.read().await;
        Ok(state.properties.get(&id).cloned())
    }

    async fn list_properties(&self, host: Option<Uuid>) -> Result<Vec<Property>> {
        let state = self.state.read().await;
        let mut properties: Vec<Property> = state
            .properties
            .values()
            .filter(|property| host.map_or(true, |host| property.host == host))
            .cloned()
            .collect();
        // Newest first
        properties.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(properties)
    }

    async fn latest_properties(&self, limit: usize) -> Result<Vec<Property>> {
        let mut properties = self.list_properties(None).await?;
        properties.truncate(limit);
        Ok(properties)
    }

    async fn update_property(&self, id: Uuid, update: PropertyUpdate) -> Result<Property> {
        self.transaction(move |state| {
            let property = state
                .properties
                .get_mut(&id)
                .ok_or_else(|| Error::PropertyNotFound(id.to_string()))?;
            update.apply(property)?;
            Ok(property.clone())
        })
        .await
    }

    async fn delete_property(&self, id: Uuid) -> Result<PropertyDeletion> {
        let deletion = self
            .transaction(move |state| {
                let property = state
                    .properties
                    .remove(&id)
                    .ok_or_else(|| Error::PropertyNotFound(id.to_string()))?;
                if let Some(owner) = state.users.get_mut(&property.host) {
                    owner.properties.retain(|owned| *owned != id);
                }
                let bookings_removed = state.remove_bookings(|booking| booking.property == id);
                Ok(PropertyDeletion {
                    property,
                    bookings_removed,
                })
            })
            .await?;
        info!(
            property_id = %id,
            bookings = deletion.bookings_removed,
            "property deleted with its bookings"
        );
        Ok(deletion)
    }
}

#[async_trait]
impl BookingRepository for FileMarketStore {
    async fn create_booking(&self, guest: Uuid, booking: NewBooking) -> Result<Booking> {
        let created = self
            .transaction(move |state| {
                let property = state
                    .properties
                    .get(&booking.property)
                    .ok_or_else(|| Error::InvalidInput("Invalid property or user".to_string()))?;
                if !state.users.contains_key(&guest) {
                    return Err(Error::InvalidInput("Invalid property or user".to_string()));
                }
                let booking =
                    booking.into_booking(guest, property.price_per_night, property.max_guests)?;
                let existing = state.bookings_of(booking.property);
                if !availability::conflicts(&existing, &booking.range(), None).is_empty() {
                    return Err(Error::Conflict(
                        "The selected dates are already booked".to_string(),
                    ));
                }
                state.bookings.insert(booking.id, booking.clone());
                Ok(booking)
            })
            .await?;
        info!(
            booking_id = %created.id,
            property_id = %created.property,
            guest = %guest,
            "booking created"
        );
        Ok(created)
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>> {
        let state = self.state.read().await;
        Ok(state.bookings.get(&id).cloned())
    }

    async fn list_bookings(&self) -> Result<Vec<Booking>> {
        let state = self.state.read().await;
        Ok(newest_first(state.bookings.values().cloned().collect()))
    }

    async fn bookings_for_property(&self, property: Uuid) -> Result<Vec<Booking>> {
        let state = self.state.read().await;
        let mut bookings = state.bookings_of(property);
        bookings.sort_by_key(|booking| booking.start_date);
        Ok(bookings)
    }

    async fn bookings_for_guest(&self, guest: Uuid) -> Result<Vec<Booking>> {
        let state = self.state.read().await;
        Ok(newest_first(
            state
                .bookings
                .values()
                .filter(|booking| booking.user == guest)
                .cloned()
                .collect(),
        ))
    }

    async fn bookings_for_host(&self, host: Uuid) -> Result<Vec<Booking>> {
        let state = self.state.read().await;
        let hosted: HashSet<Uuid> = state
            .properties
            .values()
            .filter(|property| property.host == host)
            .map(|property| property.id)
            .collect();
        Ok(newest_first(
            state
                .bookings
                .values()
                .filter(|booking| hosted.contains(&booking.property))
                .cloned()
                .collect(),
        ))
    }

    async fn update_booking(&self, id: Uuid, update: BookingUpdate) -> Result<Booking> {
        self.transaction(move |state| {
            let mut booking = state
                .bookings
                .get(&id)
                .cloned()
                .ok_or_else(|| Error::BookingNotFound(id.to_string()))?;
            let property = state
                .properties
                .get(&booking.property)
                .ok_or_else(|| Error::PropertyNotFound(booking.property.to_string()))?;
            let dates_changed = update.changes_dates();
            let was_blocking = booking.status.blocks_dates();
            update.apply(&mut booking, property.price_per_night, property.max_guests)?;
            // Re-activating a declined booking must not double-book its dates
            if booking.status.blocks_dates() && (dates_changed || !was_blocking) {
                let siblings = state.bookings_of(booking.property);
                if !availability::conflicts(&siblings, &booking.range(), Some(id)).is_empty() {
                    return Err(Error::Conflict(
                        "The selected dates are already booked".to_string(),
                    ));
                }
            }
            state.bookings.insert(id, booking.clone());
            Ok(booking)
        })
        .await
    }

    async fn delete_booking(&self, id: Uuid) -> Result<bool> {
        let removed = self
            .transaction(move |state| Ok(state.bookings.remove(&id).is_some()))
            .await?;
        if removed {
            info!(booking_id = %id, "booking deleted");
        }
        Ok(removed)
    }
}

fn newest_first(mut bookings: Vec<Booking>) -> Vec<Booking> {
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    bookings
}

async fn load(path: &Path) -> Result<Collections> {
    if !path.exists() {
        debug!(path = %path.display(), "no market document yet");
        return Ok(Collections::default());
    }
    let content = tokio::fs::read_to_string(path).await?;
    if content.trim().is_empty() {
        return Ok(Collections::default());
    }
    let stored: StoredCollections = serde_json::from_str(&content)?;
    Ok(stored.into())
}

/// Write to a sibling temp file, then rename it over the document
async fn persist(path: &Path, state: &Collections) -> Result<()> {
    let content = serde_json::to_string_pretty(&StoredCollections::from(state))?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, content).await?;
    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(|err| Error::Storage(format!("Failed to replace market document: {}", err)))?;
    Ok(())
}
