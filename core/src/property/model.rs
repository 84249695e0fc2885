//! Property model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

pub const DEFAULT_RATING: u8 = 3;
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Location {
    pub country: String,
    pub city: String,
}

impl Location {
    fn validate(&self) -> Result<Self> {
        let country = self.country.trim();
        let city = self.city.trim();
        if country.is_empty() || city.is_empty() {
            return Err(Error::InvalidInput(
                "Please provide a valid location".to_string(),
            ));
        }
        Ok(Self {
            country: country.to_string(),
            city: city.to_string(),
        })
    }
}

/// A listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price_per_night: f64,
    pub location: Location,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub max_guests: u32,
    #[serde(default = "default_rating")]
    pub rating: u8,
    #[serde(default)]
    pub reviews: Vec<String>,
    /// Id of the owning user
    pub host: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_rating() -> u8 {
    DEFAULT_RATING
}

impl Property {
    pub fn is_hosted_by(&self, user_id: Uuid) -> bool {
        self.host == user_id
    }
}

/// Fields supplied when a host creates a listing
#[derive(Debug, Clone)]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub price_per_night: f64,
    pub location: Location,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub max_guests: u32,
    pub rating: Option<u8>,
}

impl NewProperty {
    /// Validate and produce the stored listing owned by `host`
    pub fn into_property(self, host: Uuid) -> Result<Property> {
        let now = Utc::now();
        Ok(Property {
            id: Uuid::new_v4(),
            title: required_text("Title", &self.title)?,
            description: required_text("Description", &self.description)?,
            price_per_night: validate_price(self.price_per_night)?,
            location: self.location.validate()?,
            images: clean_list(self.images),
            amenities: clean_list(self.amenities),
            max_guests: validate_max_guests(self.max_guests)?,
            rating: validate_rating(self.rating.unwrap_or(DEFAULT_RATING))?,
            reviews: Vec::new(),
            host,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial edit of a listing. The host reference is not editable.
#[derive(Debug, Clone, Default)]
pub struct PropertyUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_per_night: Option<f64>,
    pub location: Option<Location>,
    pub images: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    pub max_guests: Option<u32>,
    pub rating: Option<u8>,
}

impl PropertyUpdate {
    pub fn apply(self, property: &mut Property) -> Result<()> {
        if let Some(title) = self.title {
            property.title = required_text("Title", &title)?;
        }
        if let Some(description) = self.description {
            property.description = required_text("Description", &description)?;
        }
        if let Some(price) = self.price_per_night {
            property.price_per_night = validate_price(price)?;
        }
        if let Some(location) = self.location {
            property.location = location.validate()?;
        }
        if let Some(images) = self.images {
            property.images = clean_list(images);
        }
        if let Some(amenities) = self.amenities {
            property.amenities = clean_list(amenities);
        }
        if let Some(max_guests) = self.max_guests {
            property.max_guests = validate_max_guests(max_guests)?;
        }
        if let Some(rating) = self.rating {
            property.rating = validate_rating(rating)?;
        }
        property.updated_at = Utc::now();
        Ok(())
    }
}

fn required_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}

fn validate_price(price: f64) -> Result<f64> {
    if !price.is_finite() || price <= 0.0 {
        return Err(Error::InvalidInput(
            "Price per night must be a positive number".to_string(),
        ));
    }
    Ok(price)
}

fn validate_max_guests(max_guests: u32) -> Result<u32> {
    if max_guests == 0 {
        return Err(Error::InvalidInput(
            "Max guests must be at least 1".to_string(),
        ));
    }
    Ok(max_guests)
}

fn validate_rating(rating: u8) -> Result<u8> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(Error::InvalidInput(format!(
            "Rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }
    Ok(rating)
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}
