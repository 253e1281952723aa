use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors a passkey ceremony can end with.
///
/// This is a closed set. The `Display` form of each variant is its stable
/// string code, which is what the host bridge hands back to callers.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The platform does not offer this kind of ceremony
    #[error("NotSupported")]
    NotSupported,

    /// The authenticator failed, or reported success without a usable payload
    #[error("RequestFailed")]
    RequestFailed,

    /// The user dismissed the authenticator UI
    #[error("UserCancelled")]
    UserCancelled,

    /// The challenge is not valid base64url
    #[error("InvalidChallenge")]
    InvalidChallenge,

    /// The user id is not valid base64url
    #[error("InvalidUserId")]
    InvalidUserId,

    /// The relying party is not set up in the platform configuration
    #[error("NotConfigured")]
    NotConfigured,

    /// A platform failure code with no known mapping
    #[error("UnknownError")]
    UnknownError,
}

impl ErrorKind {
    /// Every variant, in declaration order.
    pub const ALL: [ErrorKind; 7] = [
        Self::NotSupported,
        Self::RequestFailed,
        Self::UserCancelled,
        Self::InvalidChallenge,
        Self::InvalidUserId,
        Self::NotConfigured,
        Self::UnknownError,
    ];

    /// Stable string code surfaced to callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotSupported => "NotSupported",
            Self::RequestFailed => "RequestFailed",
            Self::UserCancelled => "UserCancelled",
            Self::InvalidChallenge => "InvalidChallenge",
            Self::InvalidUserId => "InvalidUserId",
            Self::NotConfigured => "NotConfigured",
            Self::UnknownError => "UnknownError",
        }
    }

    /// Whether repeating the same call can succeed without an external fix.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::UserCancelled | Self::RequestFailed => true,
            Self::NotSupported
            | Self::InvalidChallenge
            | Self::InvalidUserId
            | Self::NotConfigured
            | Self::UnknownError => false,
        }
    }

    /// Log the error and return self
    pub fn log(self) -> Self {
        match self {
            Self::UserCancelled => tracing::info!("Ceremony ended: {}", self),
            Self::InvalidChallenge | Self::InvalidUserId => {
                tracing::warn!("Ceremony rejected before submission: {}", self)
            }
            Self::NotSupported
            | Self::RequestFailed
            | Self::NotConfigured
            | Self::UnknownError => tracing::error!("Ceremony failed: {}", self),
        }
        self
    }
}

impl FromStr for ErrorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.code() == s)
            .ok_or_else(|| format!("Unknown error code: {s}"))
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Platform failure codes with a known meaning.
///
/// These values belong to the platform and may move between OS releases.
/// Revisit the table against the platform's error domain before changing it.
pub mod platform_codes {
    /// The user cancelled the authorization UI.
    pub const CANCELED: i64 = 1001;
    /// The authorization request failed.
    pub const FAILED: i64 = 1004;
    /// The relying party is not associated with the application.
    pub const NOT_CONFIGURED: i64 = 4004;
}

/// Translates a platform failure code into an [`ErrorKind`].
///
/// Total over all integers; anything outside the table is `UnknownError` and
/// the raw code is logged so new platform values can be identified.
pub fn map_platform_error(code: i64) -> ErrorKind {
    match code {
        platform_codes::CANCELED => ErrorKind::UserCancelled,
        platform_codes::FAILED => ErrorKind::RequestFailed,
        platform_codes::NOT_CONFIGURED => ErrorKind::NotConfigured,
        other => {
            tracing::warn!(platform_code = other, "Unmapped platform error code");
            ErrorKind::UnknownError
        }
    }
}
