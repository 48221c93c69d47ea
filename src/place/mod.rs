//! Place records
//!
//! A place is what the user saves: a name, a free-text location, a category,
//! an optional photo and a star rating. `PlaceFields` is the editable part;
//! `PlaceRecord` adds the identity and timestamps the catalog assigns.

pub mod photo;

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Highest star rating
pub const MAX_RATING: f64 = 5.0;

/// Editable fields of a place, as the editor submits them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceFields {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Raw photo bytes
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "photo::base64_bytes"
    )]
    pub image: Option<Vec<u8>>,

    #[serde(default)]
    pub rating: f64,
}

impl PlaceFields {
    /// Create fields with just a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the free-text location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the category label
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the photo bytes
    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }

    /// Set the star rating
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    /// Whether the editor may save these fields
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Check every invariant a stored record must hold
    pub fn validate(&self) -> Result<()> {
        if !self.is_complete() {
            return Err(Error::InvalidPlace("name must not be empty".to_string()));
        }
        validate_rating(self.rating)?;
        if let Some(bytes) = &self.image {
            photo::validate(bytes)?;
        }
        Ok(())
    }

    /// Blank optional text fields are stored as absent
    pub(crate) fn normalized(mut self) -> Self {
        self.location = self.location.filter(|s| !s.trim().is_empty());
        self.category = self.category.filter(|s| !s.trim().is_empty());
        self
    }
}

/// Ratings are whole or fractional stars in [0, 5]
pub fn validate_rating(rating: f64) -> Result<()> {
    if rating.is_nan() || !(0.0..=MAX_RATING).contains(&rating) {
        return Err(Error::InvalidRating(rating));
    }
    Ok(())
}

/// A persisted place
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub id: Uuid,

    #[serde(flatten)]
    pub fields: PlaceFields,

    pub created_at: DateTime<Utc>,

    /// Insertion ordinal, breaks ties between equal sort keys
    pub seq: u64,
}

impl PlaceRecord {
    pub(crate) fn new(fields: PlaceFields, seq: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            fields,
            created_at: Utc::now(),
            seq,
        }
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn location(&self) -> Option<&str> {
        self.fields.location.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.fields.category.as_deref()
    }

    pub fn rating(&self) -> f64 {
        self.fields.rating
    }

    pub fn has_image(&self) -> bool {
        self.fields.image.is_some()
    }

    /// Case-insensitive substring match on name or location
    ///
    /// `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.fields.name.to_lowercase().contains(needle)
            || self
                .fields
                .location
                .as_ref()
                .is_some_and(|l| l.to_lowercase().contains(needle))
    }
}

/// Selection equality is identity, never field values
impl PartialEq for PlaceRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PlaceRecord {}

/// JSON shape of a record without the image bytes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceSummary {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub rating: f64,
    pub has_image: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&PlaceRecord> for PlaceSummary {
    fn from(record: &PlaceRecord) -> Self {
        Self {
            id: record.id,
            name: record.fields.name.clone(),
            location: record.fields.location.clone(),
            category: record.fields.category.clone(),
            rating: record.fields.rating,
            has_image: record.has_image(),
            created_at: record.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_complete() {
        assert!(!PlaceFields::default().is_complete());
        assert!(!PlaceFields::new("   ").is_complete());
        assert!(PlaceFields::new("Cafe A").is_complete());
    }

    #[test]
    fn test_validate_rating_bounds() {
        assert!(validate_rating(0.0).is_ok());
        assert!(validate_rating(3.5).is_ok());
        assert!(validate_rating(5.0).is_ok());
        assert!(validate_rating(5.01).is_err());
        assert!(validate_rating(-0.5).is_err());
        assert!(validate_rating(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let err = PlaceFields::new("").with_rating(3.0).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidPlace(_)));
    }

    #[test]
    fn test_validate_rejects_garbage_image() {
        let fields = PlaceFields::new("Cafe").with_image(vec![1, 2, 3, 4]);
        assert!(matches!(fields.validate(), Err(Error::ImageDecode(_))));
    }

    #[test]
    fn test_normalized_drops_blank_text() {
        let fields = PlaceFields::new("Cafe")
            .with_location("  ")
            .with_category("Coffee")
            .normalized();
        assert!(fields.location.is_none());
        assert_eq!(fields.category.as_deref(), Some("Coffee"));
    }

    #[test]
    fn test_matches_name_or_location() {
        let record = PlaceRecord::new(PlaceFields::new("Cafe A").with_location("1 Main St"), 0);
        assert!(record.matches("cafe a"));
        assert!(record.matches("main"));
        assert!(!record.matches("elm"));

        let no_location = PlaceRecord::new(PlaceFields::new("Bar"), 1);
        assert!(!no_location.matches("main"));
    }

    #[test]
    fn test_identity_equality() {
        let a = PlaceRecord::new(PlaceFields::new("Same"), 0);
        let b = PlaceRecord::new(PlaceFields::new("Same"), 0);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_record_serialization_flattens_fields() {
        let record = PlaceRecord::new(
            PlaceFields::new("Cafe").with_location("1 Main St").with_rating(4.0),
            7,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "Cafe");
        assert_eq!(json["location"], "1 Main St");
        assert_eq!(json["seq"], 7);
        assert!(json.get("image").is_none());
    }
}
