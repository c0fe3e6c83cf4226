//! Decoding of on-chain token metadata.
//!
//! Squiggle renders its art on chain and returns `tokenURI` as a
//! `data:application/json;base64,` URI whose `image` field is itself a
//! base64-encoded SVG data URI.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::GatewayError;

const JSON_BASE64_PREFIX: &str = "data:application/json;base64,";
const JSON_UTF8_PREFIX: &str = "data:application/json;utf8,";
const SVG_BASE64_PREFIX: &str = "data:image/svg+xml;base64,";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("token URI is not an inline JSON data URI")]
    UnsupportedScheme,
    #[error("token URI payload is not valid base64: {0}")]
    Base64(String),
    #[error("token URI payload is not valid UTF-8")]
    Utf8,
    #[error("token URI payload is not valid metadata JSON: {0}")]
    Json(String),
}

impl From<MetadataError> for GatewayError {
    fn from(e: MetadataError) -> Self {
        GatewayError::invalid_input(e.to_string())
    }
}

/// ERC-721 metadata JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image: String,
}

impl TokenMetadata {
    /// Decode a `tokenURI` return value.
    pub fn from_token_uri(uri: &str) -> Result<Self, MetadataError> {
        let json = if let Some(payload) = uri.strip_prefix(JSON_BASE64_PREFIX) {
            let bytes = STANDARD
                .decode(payload.trim())
                .map_err(|e| MetadataError::Base64(e.to_string()))?;
            String::from_utf8(bytes).map_err(|_| MetadataError::Utf8)?
        } else if let Some(payload) = uri.strip_prefix(JSON_UTF8_PREFIX) {
            payload.to_string()
        } else {
            return Err(MetadataError::UnsupportedScheme);
        };

        serde_json::from_str(&json).map_err(|e| MetadataError::Json(e.to_string()))
    }

    /// The SVG document, when `image` is an inline base64 SVG.
    pub fn svg(&self) -> Option<String> {
        let payload = self.image.strip_prefix(SVG_BASE64_PREFIX)?;
        let bytes = STANDARD.decode(payload.trim()).ok()?;
        String::from_utf8(bytes).ok()
    }
}
