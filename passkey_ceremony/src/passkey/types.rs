use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::ErrorKind;
use crate::utils::base64url_encode;

/// The kind of ceremony. Fixed for the lifetime of one ceremony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasskeyOperation {
    /// Create a new credential
    Registration,
    /// Prove possession of an existing credential
    Assertion,
}

impl fmt::Display for PasskeyOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registration => write!(f, "registration"),
            Self::Assertion => write!(f, "assertion"),
        }
    }
}

/// Which authenticator class a ceremony targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialMode {
    /// The device's built-in credential provider
    Platform,
    /// An external hardware security key
    SecurityKey,
}

impl CredentialMode {
    /// Mode selected by the boundary operations' `use_security_key` flag.
    pub fn from_use_security_key(use_security_key: bool) -> Self {
        if use_security_key {
            Self::SecurityKey
        } else {
            Self::Platform
        }
    }
}

impl fmt::Display for CredentialMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Platform => write!(f, "platform"),
            Self::SecurityKey => write!(f, "security-key"),
        }
    }
}

/// What happens when a ceremony begins while another is still submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Resolve the prior caller with `RequestFailed` and ignore its platform completion
    Replace,
    /// Fail the new call with `RequestFailed` without submitting it
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserVerification {
    Required,
    Preferred,
    Discouraged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttestationPreference {
    None,
    Indirect,
    Direct,
    Enterprise,
}

/// Credential material returned by a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistrationResult {
    pub credential_id: Vec<u8>,
    pub attestation_object: Vec<u8>,
    pub client_data_json: Vec<u8>,
}

impl RegistrationResult {
    /// Encodes every binary field as unpadded base64url.
    pub fn to_response(&self) -> RegistrationResponse {
        let id = base64url_encode(&self.credential_id);
        RegistrationResponse {
            raw_id: id.clone(),
            id,
            type_: PUBLIC_KEY_TYPE.to_string(),
            response: AuthenticatorAttestationResponse {
                client_data_json: base64url_encode(&self.client_data_json),
                attestation_object: base64url_encode(&self.attestation_object),
            },
        }
    }
}

/// Credential material returned by a successful assertion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssertionResult {
    pub credential_id: Vec<u8>,
    pub user_id: Vec<u8>,
    pub authenticator_data: Vec<u8>,
    pub client_data_json: Vec<u8>,
    pub signature: Vec<u8>,
}

impl AssertionResult {
    /// Encodes every binary field as unpadded base64url.
    pub fn to_response(&self) -> AssertionResponse {
        let id = base64url_encode(&self.credential_id);
        AssertionResponse {
            raw_id: id.clone(),
            id,
            type_: PUBLIC_KEY_TYPE.to_string(),
            response: AuthenticatorAssertionResponse {
                client_data_json: base64url_encode(&self.client_data_json),
                authenticator_data: base64url_encode(&self.authenticator_data),
                signature: base64url_encode(&self.signature),
                user_handle: base64url_encode(&self.user_id),
            },
        }
    }
}

pub(crate) const PUBLIC_KEY_TYPE: &str = "public-key";

/// Registration result in WebAuthn JSON form, all binary fields base64url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub id: String,
    pub raw_id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub response: AuthenticatorAttestationResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorAttestationResponse {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    pub attestation_object: String,
}

/// Assertion result in WebAuthn JSON form, all binary fields base64url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionResponse {
    pub id: String,
    pub raw_id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub response: AuthenticatorAssertionResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorAssertionResponse {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    pub authenticator_data: String,
    pub signature: String,
    pub user_handle: String,
}

/// Credential material handed back by the platform on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialPayload {
    Registration(RegistrationResult),
    Assertion(AssertionResult),
}

impl CredentialPayload {
    pub fn operation(&self) -> PasskeyOperation {
        match self {
            Self::Registration(_) => PasskeyOperation::Registration,
            Self::Assertion(_) => PasskeyOperation::Assertion,
        }
    }

    /// A payload without a credential id carries nothing usable.
    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Self::Registration(r) => r.credential_id.is_empty(),
            Self::Assertion(a) => a.credential_id.is_empty(),
        }
    }
}

/// The single completion a platform authenticator delivers for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCompletion {
    /// The platform reports success. The payload may be missing.
    Success(Option<CredentialPayload>),
    /// The platform reports failure with its own error code.
    Failure(i64),
}

/// Terminal result of one ceremony: exactly one payload or one error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CeremonyOutcome {
    Registered(RegistrationResult),
    Asserted(AssertionResult),
    Failed(ErrorKind),
}

/// Snapshot of the ceremony currently in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CeremonyInfo {
    pub id: Uuid,
    pub operation: PasskeyOperation,
    pub mode: CredentialMode,
    pub started_at: DateTime<Utc>,
}
