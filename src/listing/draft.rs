//! ListingDraft - the publish form's payload before it becomes a Listing.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Condition, Image, ImageKind, Listing, Visibility};

/// Form state collected while publishing a game.
///
/// Free-text optional fields are plain strings here; blank ones are dropped
/// when the draft is published. The image list keeps its first entry labelled
/// hero and the rest gallery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingDraft {
    pub title: String,
    pub publisher: String,
    pub category: String,
    pub players: String,
    pub duration: String,
    pub difficulty: String,
    pub description: String,
    pub condition: Condition,
    pub price_per_day: f64,
    pub deposit: Option<f64>,
    pub visibility: Visibility,
    images: Vec<Image>,
}

impl ListingDraft {
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        price_per_day: f64,
    ) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            description: description.into(),
            price_per_day,
            ..Self::default()
        }
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Append an image; the first one added becomes the hero.
    pub fn push_image(&mut self, url: impl Into<String>, size: Option<(f64, f64)>) {
        let kind = if self.images.is_empty() {
            ImageKind::Hero
        } else {
            ImageKind::Gallery
        };
        let mut image = Image::new(url, kind);
        if let Some((width, height)) = size {
            image = image.with_size(width, height);
        }
        self.images.push(image);
    }

    pub fn remove_image(&mut self, index: usize) -> Option<Image> {
        if index >= self.images.len() {
            return None;
        }
        let removed = self.images.remove(index);
        self.relabel_images();
        Some(removed)
    }

    /// Move the image at `index` to the front, making it the hero.
    pub fn make_hero(&mut self, index: usize) -> bool {
        if index >= self.images.len() {
            return false;
        }
        let image = self.images.remove(index);
        self.images.insert(0, image);
        self.relabel_images();
        true
    }

    fn relabel_images(&mut self) {
        for (idx, image) in self.images.iter_mut().enumerate() {
            image.kind = if idx == 0 {
                ImageKind::Hero
            } else {
                ImageKind::Gallery
            };
        }
    }

    /// Build a listing with a fresh UUIDv4 and the current time.
    pub fn publish(&self) -> Listing {
        self.publish_at(Uuid::new_v4(), Utc::now())
    }

    pub fn publish_at(&self, id: Uuid, created_at: DateTime<Utc>) -> Listing {
        let deposit = self
            .deposit
            .filter(|deposit| deposit.is_finite())
            .unwrap_or(0.0);

        Listing {
            id: id.to_string(),
            title: self.title.clone(),
            publisher: non_blank(&self.publisher),
            category: self.category.clone(),
            images: self.images.clone(),
            rating: None,
            reviews: None,
            description: self.description.clone(),
            duration: non_blank(&self.duration),
            players: non_blank(&self.players),
            difficulty: non_blank(&self.difficulty),
            price_per_day: self.price_per_day,
            deposit: Some(deposit),
            condition: self.condition,
            visibility: self.visibility,
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
