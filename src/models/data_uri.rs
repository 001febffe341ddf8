use base64::{engine::general_purpose::STANDARD, Engine as _};

const PNG_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DataUriError {
    #[error("not a base64 data URI")]
    NotBase64DataUri,
    #[error("invalid base64 payload: {0}")]
    InvalidPayload(String),
}

/// Wraps a base64 PNG payload as a data URI.
pub fn png_from_base64(payload: &str) -> String {
    format!("{}{}", PNG_PREFIX, payload)
}

/// Encodes raw PNG bytes as a data URI.
pub fn png_from_bytes(bytes: &[u8]) -> String {
    png_from_base64(&STANDARD.encode(bytes))
}

/// Decodes the bytes carried by a `data:<mime>;base64,<payload>` URI.
pub fn decode(uri: &str) -> Result<Vec<u8>, DataUriError> {
    let rest = uri.strip_prefix("data:").ok_or(DataUriError::NotBase64DataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUriError::NotBase64DataUri)?;
    if !header.ends_with(";base64") {
        return Err(DataUriError::NotBase64DataUri);
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| DataUriError::InvalidPayload(e.to_string()))
}
