//! Listings - the published rental records and their schema.
//!
//! A [`Listing`] is what the publish flow hands to the store. Its JSON shape
//! (camelCase keys, `type` on images) is the on-disk and backup-file format.

mod data_url;
mod draft;
mod patch;
mod validate;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub use data_url::{DataUrl, INLINE_IMAGE_BUDGET};
pub use draft::ListingDraft;
pub use patch::ListingPatch;
pub use validate::{validate, ValidationError};

/// A published, rentable board-game record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    pub category: String,
    pub images: Vec<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<f64>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    /// Daily rental price, strictly positive.
    pub price_per_day: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit: Option<f64>,
    pub condition: Condition,
    pub visibility: Visibility,
    /// RFC 3339 timestamp, kept verbatim so records round-trip byte-for-byte.
    pub created_at: String,
}

impl Listing {
    /// Check this record against the listing schema.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut value = serde_json::to_value(self)
            .map_err(|err| ValidationError::new(vec![err.to_string()]))?;

        // serde_json writes NaN and infinities as null, which reads as "absent".
        flag_non_finite(value.get_mut("pricePerDay"), Some(self.price_per_day));
        flag_non_finite(value.get_mut("deposit"), self.deposit);
        flag_non_finite(value.get_mut("rating"), self.rating);
        flag_non_finite(value.get_mut("reviews"), self.reviews);
        if let Some(images) = value.get_mut("images").and_then(Value::as_array_mut) {
            for (image, slot) in self.images.iter().zip(images.iter_mut()) {
                flag_non_finite(slot.get_mut("width"), image.width);
                flag_non_finite(slot.get_mut("height"), image.height);
            }
        }

        validate(&value).map(|_| ())
    }

    /// The cover image: the first one labelled hero, else the first image.
    pub fn hero_image(&self) -> Option<&Image> {
        self.images
            .iter()
            .find(|image| image.kind == ImageKind::Hero)
            .or_else(|| self.images.first())
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }
}

/// Parse an ISO-8601 timestamp. Values without an offset are taken as UTC.
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn flag_non_finite(slot: Option<&mut Value>, number: Option<f64>) {
    if let (Some(slot), Some(number)) = (slot, number) {
        if !number.is_finite() {
            *slot = Value::String(number.to_string());
        }
    }
}

/// A listing photo. `url` is usually an inline `data:` URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ImageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl Image {
    pub fn new(url: impl Into<String>, kind: ImageKind) -> Self {
        Self {
            url: url.into(),
            kind,
            width: None,
            height: None,
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Decoded payload size when the image is stored inline as a base64 data URL.
    pub fn inline_size(&self) -> Option<usize> {
        DataUrl::parse(&self.url).map(|data| data.decoded_len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Hero,
    Gallery,
}

impl ImageKind {
    pub const NAMES: [&'static str; 2] = ["hero", "gallery"];
}

/// Physical condition of the rented copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    New,
    #[default]
    LikeNew,
    Good,
    Fair,
    Worn,
}

impl Condition {
    pub const NAMES: [&'static str; 5] = ["new", "like_new", "good", "fair", "worn"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::LikeNew => "like_new",
            Condition::Good => "good",
            Condition::Fair => "fair",
            Condition::Worn => "worn",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub const NAMES: [&'static str; 2] = ["public", "private"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
