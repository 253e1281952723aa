use base64::{
    Engine as _,
    alphabet,
    engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD},
    engine::DecodePaddingMode,
};

use thiserror::Error;

/// URL-safe alphabet, padded input, unused trailing bits tolerated.
const URL_SAFE_PADDED: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical)
        .with_decode_allow_trailing_bits(true),
);

/// Decodes URL-safe base64 text with or without `=` padding.
///
/// Missing padding is reinserted up to the next multiple of four before
/// decoding. Text that would need three padding characters, or that contains
/// anything outside `A-Z a-z 0-9 - _` (plus trailing `=`), is rejected as a
/// whole; no partial output is ever returned.
pub fn base64url_decode(input: &str) -> Result<Vec<u8>, UtilError> {
    let missing = (4 - input.len() % 4) % 4;
    if missing == 3 {
        return Err(UtilError::Format(format!(
            "Invalid base64url length: {}",
            input.len()
        )));
    }

    let mut padded = String::with_capacity(input.len() + missing);
    padded.push_str(input);
    padded.extend(std::iter::repeat_n('=', missing));

    URL_SAFE_PADDED
        .decode(padded.as_bytes())
        .map_err(|e| UtilError::Format(format!("Failed to decode base64url: {e}")))
}

/// Encodes bytes as URL-safe base64 text without padding.
pub fn base64url_encode(input: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UtilError {
    #[error("Invalid format: {0}")]
    Format(String),
}
