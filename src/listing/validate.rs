//! Schema validation for untyped listing candidates.
//!
//! Every check runs, so a rejected candidate reports all of its problems at
//! once. Messages are prefixed with the JSON path of the offending field.

use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::{parse_timestamp, Condition, ImageKind, Listing, Visibility};

/// Aggregated schema violations for one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .messages.join(", "))]
pub struct ValidationError {
    messages: Vec<String>,
}

impl ValidationError {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

/// Validate `candidate` against the listing schema.
///
/// Unknown keys are stripped and `null` on an optional field counts as absent.
pub fn validate(candidate: &Value) -> Result<Listing, ValidationError> {
    let Some(fields) = candidate.as_object() else {
        return Err(ValidationError::new(vec![
            "listing must be a JSON object".to_string(),
        ]));
    };

    let mut issues = Issues::default();

    if let Some(id) = issues.string(fields, "id", "id is required") {
        if !is_uuid(id) {
            issues.push("id", "must be a valid UUID");
        }
    }
    issues.non_empty(fields, "title", "title is required");
    issues.optional_string(fields, "publisher");
    issues.non_empty(fields, "category", "category is required");
    check_images(fields, &mut issues);
    issues.optional_number(fields, "rating");
    issues.optional_number(fields, "reviews");
    issues.non_empty(fields, "description", "description is required");
    issues.optional_string(fields, "duration");
    issues.optional_string(fields, "players");
    issues.optional_string(fields, "difficulty");

    if let Some(price) = issues.number(fields, "pricePerDay") {
        if price <= 0.0 {
            issues.push("pricePerDay", "price per day must be greater than 0");
        }
    }
    if let Some(deposit) = issues.optional_number(fields, "deposit") {
        if deposit < 0.0 {
            issues.push("deposit", "deposit cannot be negative");
        }
    }

    issues.one_of(fields, "condition", &Condition::NAMES);
    issues.one_of(fields, "visibility", &Visibility::NAMES);

    if let Some(created_at) = issues.string(fields, "createdAt", "createdAt is required") {
        if parse_timestamp(created_at).is_none() {
            issues.push("createdAt", "must be an ISO-8601 timestamp");
        }
    }

    if !issues.is_empty() {
        return Err(issues.into_error());
    }

    serde_json::from_value(candidate.clone())
        .map_err(|err| ValidationError::new(vec![err.to_string()]))
}

fn check_images(fields: &Map<String, Value>, issues: &mut Issues) {
    let images = match fields.get("images") {
        None | Some(Value::Null) => {
            issues.push("images", "at least one image is required");
            return;
        }
        Some(Value::Array(images)) => images,
        Some(_) => {
            issues.push("images", "expected an array");
            return;
        }
    };

    if images.is_empty() {
        issues.push("images", "at least one image is required");
    }

    for (idx, image) in images.iter().enumerate() {
        let Some(image) = image.as_object() else {
            issues.push(&format!("images[{}]", idx), "expected an object");
            continue;
        };
        let mut nested = Issues::nested(format!("images[{}].", idx));
        nested.non_empty(image, "url", "image url is required");
        nested.one_of(image, "type", &ImageKind::NAMES);
        nested.optional_number(image, "width");
        nested.optional_number(image, "height");
        issues.extend(nested);
    }
}

/// Hyphenated 8-4-4-4-12 hex form only.
fn is_uuid(value: &str) -> bool {
    value.len() == 36 && Uuid::try_parse(value).is_ok()
}

#[derive(Default)]
struct Issues {
    prefix: String,
    messages: Vec<String>,
}

impl Issues {
    fn nested(prefix: String) -> Self {
        Self {
            prefix,
            messages: Vec::new(),
        }
    }

    fn push(&mut self, field: &str, message: &str) {
        self.messages
            .push(format!("{}{}: {}", self.prefix, field, message));
    }

    fn extend(&mut self, other: Issues) {
        self.messages.extend(other.messages);
    }

    fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn into_error(self) -> ValidationError {
        ValidationError::new(self.messages)
    }

    fn string<'a>(
        &mut self,
        fields: &'a Map<String, Value>,
        field: &str,
        missing: &str,
    ) -> Option<&'a str> {
        match fields.get(field) {
            None | Some(Value::Null) => {
                self.push(field, missing);
                None
            }
            Some(Value::String(value)) => Some(value.as_str()),
            Some(_) => {
                self.push(field, "expected a string");
                None
            }
        }
    }

    fn non_empty(&mut self, fields: &Map<String, Value>, field: &str, missing: &str) {
        if let Some(value) = self.string(fields, field, missing) {
            if value.is_empty() {
                self.push(field, missing);
            }
        }
    }

    fn optional_string(&mut self, fields: &Map<String, Value>, field: &str) {
        match fields.get(field) {
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(_) => self.push(field, "expected a string"),
        }
    }

    fn number(&mut self, fields: &Map<String, Value>, field: &str) -> Option<f64> {
        match fields.get(field) {
            None | Some(Value::Null) => {
                self.push(field, "is required");
                None
            }
            Some(value) => self.finite(field, value),
        }
    }

    fn optional_number(&mut self, fields: &Map<String, Value>, field: &str) -> Option<f64> {
        match fields.get(field) {
            None | Some(Value::Null) => None,
            Some(value) => self.finite(field, value),
        }
    }

    fn finite(&mut self, field: &str, value: &Value) -> Option<f64> {
        match value.as_f64() {
            Some(number) if number.is_finite() => Some(number),
            _ => {
                self.push(field, "expected a number");
                None
            }
        }
    }

    fn one_of(&mut self, fields: &Map<String, Value>, field: &str, allowed: &[&str]) {
        let valid = matches!(
            fields.get(field),
            Some(Value::String(value)) if allowed.contains(&value.as_str())
        );
        if !valid {
            self.push(field, &format!("must be one of {}", allowed.join(", ")));
        }
    }
}
