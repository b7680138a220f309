//! Inline `data:` image URLs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Upper bound the publish flow aims for per inline image (1.5 MiB decoded).
pub const INLINE_IMAGE_BUDGET: usize = 1536 * 1024;

/// A borrowed view of a `data:<media type>;base64,<payload>` URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUrl<'a> {
    media_type: &'a str,
    payload: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Parse a base64 data URL. Returns None for remote URLs and for data URLs
    /// that are not base64-encoded.
    pub fn parse(url: &'a str) -> Option<Self> {
        let rest = url.strip_prefix("data:")?;
        let (header, payload) = rest.split_once(',')?;
        let media_type = header.strip_suffix(";base64")?;
        Some(Self {
            media_type,
            payload,
        })
    }

    pub fn media_type(&self) -> &'a str {
        self.media_type
    }

    pub fn payload(&self) -> &'a str {
        self.payload
    }

    /// Decoded byte length, computed from the payload length without decoding.
    pub fn decoded_len(&self) -> usize {
        let payload = self.payload.trim_end();
        let padding = payload.chars().rev().take_while(|c| *c == '=').count();
        (payload.len() * 3 / 4).saturating_sub(padding)
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.payload.trim_end())
    }

    pub fn exceeds_budget(&self) -> bool {
        self.decoded_len() > INLINE_IMAGE_BUDGET
    }
}
