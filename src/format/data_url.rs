//! `data:<mime>;base64,<payload>` strings.

use std::fmt;

use base64::{Engine as _, engine::general_purpose};

use crate::format::error::FormatError;

const PREFIX: &str = "data:";
const BASE64_MARKER: &str = "base64";

/// A decoded base64 data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// Media type, e.g. `image/png`. May be empty.
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// Parse a base64 data URL.
    ///
    /// Parameters between the media type and `;base64` are accepted and
    /// dropped. URL-encoded (non-base64) payloads are rejected.
    pub fn parse(url: &str) -> Result<Self, FormatError> {
        let rest = url
            .strip_prefix(PREFIX)
            .ok_or_else(|| FormatError::invalid_data_url("missing 'data:' prefix"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| FormatError::invalid_data_url("missing ',' separator"))?;

        let mut params = header.split(';');
        let mime = params.next().unwrap_or_default().trim().to_ascii_lowercase();
        if !params.any(|p| p.trim().eq_ignore_ascii_case(BASE64_MARKER)) {
            return Err(FormatError::invalid_data_url("payload is not base64 encoded"));
        }

        let bytes = general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| FormatError::invalid_data_url(format!("bad base64 payload: {}", e)))?;

        Ok(Self { mime, bytes })
    }

    /// Render as `data:<mime>;base64,<payload>`.
    pub fn encode(mime: &str, bytes: &[u8]) -> String {
        format!(
            "{}{};{},{}",
            PREFIX,
            mime,
            BASE64_MARKER,
            general_purpose::STANDARD.encode(bytes)
        )
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Self::encode(&self.mime, &self.bytes))
    }
}
