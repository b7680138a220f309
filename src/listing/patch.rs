//! Partial listing updates.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{Condition, Image, Listing, ValidationError, Visibility};

/// A set of top-level listing fields to overwrite.
///
/// Keys are wire names (`pricePerDay`, not `price_per_day`). A `null` value
/// removes the field from the merged record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingPatch(Map<String, Value>);

impl ListingPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a patch from an arbitrary JSON object.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            _ => Err(ValidationError::new(vec![
                "patch must be a JSON object".to_string(),
            ])),
        }
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Drop `field` from the merged record.
    pub fn unset(self, field: impl Into<String>) -> Self {
        self.set(field, Value::Null)
    }

    pub fn title(self, title: impl Into<String>) -> Self {
        self.set("title", Value::String(title.into()))
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        self.set("description", Value::String(description.into()))
    }

    pub fn category(self, category: impl Into<String>) -> Self {
        self.set("category", Value::String(category.into()))
    }

    pub fn price_per_day(self, price: f64) -> Self {
        self.set("pricePerDay", price)
    }

    pub fn deposit(self, deposit: f64) -> Self {
        self.set("deposit", deposit)
    }

    pub fn condition(self, condition: Condition) -> Self {
        self.set("condition", condition.as_str())
    }

    pub fn visibility(self, visibility: Visibility) -> Self {
        self.set("visibility", visibility.as_str())
    }

    pub fn images(self, images: &[Image]) -> Self {
        self.set("images", json!(images))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Shallow-merge this patch over `base`, returning the unvalidated result.
    pub fn apply_to(&self, base: &Listing) -> Result<Value, serde_json::Error> {
        let mut merged = match serde_json::to_value(base)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        for (field, value) in &self.0 {
            if value.is_null() {
                merged.remove(field);
            } else {
                merged.insert(field.clone(), value.clone());
            }
        }
        Ok(Value::Object(merged))
    }
}
