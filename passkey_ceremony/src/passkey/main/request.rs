use crate::passkey::config::{PASSKEY_ATTESTATION, PASSKEY_USER_VERIFICATION};
use crate::passkey::errors::ErrorKind;
use crate::passkey::types::{
    AttestationPreference, CredentialMode, PUBLIC_KEY_TYPE, PasskeyOperation, UserVerification,
};
use crate::utils::base64url_decode;

/// COSE algorithm identifier for ECDSA P-256 with SHA-256.
pub const COSE_ALG_ES256: i32 = -7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubKeyCredParam {
    pub type_: String,
    pub alg: i32,
}

impl PubKeyCredParam {
    fn es256() -> Self {
        Self {
            type_: PUBLIC_KEY_TYPE.to_string(),
            alg: COSE_ALG_ES256,
        }
    }
}

/// A credential the authenticator may use for an assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialDescriptor {
    pub type_: String,
    pub id: Vec<u8>,
}

/// Preferences copied into every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPreferences {
    pub user_verification: UserVerification,
    pub attestation: AttestationPreference,
}

impl RequestPreferences {
    /// Preferences from `PASSKEY_USER_VERIFICATION` and `PASSKEY_ATTESTATION`.
    pub fn from_env() -> Self {
        Self {
            user_verification: *PASSKEY_USER_VERIFICATION,
            attestation: *PASSKEY_ATTESTATION,
        }
    }
}

impl Default for RequestPreferences {
    fn default() -> Self {
        Self {
            user_verification: UserVerification::Preferred,
            attestation: AttestationPreference::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub rp_id: String,
    pub challenge: Vec<u8>,
    pub user_id: Vec<u8>,
    pub display_name: String,
    /// Empty means the authenticator picks from its own supported algorithms.
    pub pub_key_cred_params: Vec<PubKeyCredParam>,
    pub user_verification: UserVerification,
    pub attestation: AttestationPreference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionRequest {
    pub rp_id: String,
    pub challenge: Vec<u8>,
    /// Empty means any credential for `rp_id` may answer.
    pub allow_credentials: Vec<CredentialDescriptor>,
    pub user_verification: UserVerification,
}

/// Everything the authenticator needs for one ceremony.
///
/// One variant per (operation, mode) pair. The variant alone decides which
/// platform request gets issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestDescriptor {
    PlatformRegistration(RegistrationRequest),
    SecurityKeyRegistration(RegistrationRequest),
    PlatformAssertion(AssertionRequest),
    SecurityKeyAssertion(AssertionRequest),
}

impl RequestDescriptor {
    pub fn operation(&self) -> PasskeyOperation {
        match self {
            Self::PlatformRegistration(_) | Self::SecurityKeyRegistration(_) => {
                PasskeyOperation::Registration
            }
            Self::PlatformAssertion(_) | Self::SecurityKeyAssertion(_) => {
                PasskeyOperation::Assertion
            }
        }
    }

    pub fn mode(&self) -> CredentialMode {
        match self {
            Self::PlatformRegistration(_) | Self::PlatformAssertion(_) => CredentialMode::Platform,
            Self::SecurityKeyRegistration(_) | Self::SecurityKeyAssertion(_) => {
                CredentialMode::SecurityKey
            }
        }
    }

    pub fn rp_id(&self) -> &str {
        match self {
            Self::PlatformRegistration(r) | Self::SecurityKeyRegistration(r) => &r.rp_id,
            Self::PlatformAssertion(a) | Self::SecurityKeyAssertion(a) => &a.rp_id,
        }
    }

    pub fn challenge(&self) -> &[u8] {
        match self {
            Self::PlatformRegistration(r) | Self::SecurityKeyRegistration(r) => &r.challenge,
            Self::PlatformAssertion(a) | Self::SecurityKeyAssertion(a) => &a.challenge,
        }
    }
}

/// Caller-supplied strings for one request. Binary fields are base64url.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestInput<'a> {
    /// Relying-party identifier, passed through unchanged
    pub identifier: &'a str,
    pub challenge: &'a str,
    pub display_name: Option<&'a str>,
    pub user_id: Option<&'a str>,
    pub allowed_credential_id: Option<&'a str>,
}

/// Builds the request descriptor for `operation` in `mode`.
///
/// Pure and synchronous. Registration without a user id or display name is
/// reported as `InvalidUserId`, since the user entity cannot be formed.
pub fn build(
    operation: PasskeyOperation,
    mode: CredentialMode,
    input: &RequestInput<'_>,
    preferences: &RequestPreferences,
) -> Result<RequestDescriptor, ErrorKind> {
    match operation {
        PasskeyOperation::Registration => {
            let challenge = decode_challenge(input.challenge)?;
            let user_id = input.user_id.ok_or(ErrorKind::InvalidUserId)?;
            let display_name = input.display_name.ok_or(ErrorKind::InvalidUserId)?;
            registration(mode, input.identifier, challenge, display_name, user_id, preferences)
        }
        PasskeyOperation::Assertion => {
            let challenge = decode_challenge(input.challenge)?;
            Ok(assertion(
                mode,
                input.identifier,
                challenge,
                input.allowed_credential_id,
                preferences,
            ))
        }
    }
}

/// Registration descriptor from validated caller strings.
pub fn build_registration(
    mode: CredentialMode,
    identifier: &str,
    challenge: &str,
    display_name: &str,
    user_id: &str,
    preferences: &RequestPreferences,
) -> Result<RequestDescriptor, ErrorKind> {
    let challenge = decode_challenge(challenge)?;
    registration(mode, identifier, challenge, display_name, user_id, preferences)
}

/// Assertion descriptor from validated caller strings.
pub fn build_assertion(
    mode: CredentialMode,
    identifier: &str,
    challenge: &str,
    allowed_credential_id: Option<&str>,
    preferences: &RequestPreferences,
) -> Result<RequestDescriptor, ErrorKind> {
    let challenge = decode_challenge(challenge)?;
    Ok(assertion(
        mode,
        identifier,
        challenge,
        allowed_credential_id,
        preferences,
    ))
}

fn decode_challenge(challenge: &str) -> Result<Vec<u8>, ErrorKind> {
    base64url_decode(challenge).map_err(|e| {
        tracing::debug!("Rejecting challenge: {}", e);
        ErrorKind::InvalidChallenge
    })
}

fn registration(
    mode: CredentialMode,
    identifier: &str,
    challenge: Vec<u8>,
    display_name: &str,
    user_id: &str,
    preferences: &RequestPreferences,
) -> Result<RequestDescriptor, ErrorKind> {
    let user_id = base64url_decode(user_id).map_err(|e| {
        tracing::debug!("Rejecting user id: {}", e);
        ErrorKind::InvalidUserId
    })?;

    let mut request = RegistrationRequest {
        rp_id: identifier.to_string(),
        challenge,
        user_id,
        display_name: display_name.to_string(),
        pub_key_cred_params: Vec::new(),
        user_verification: preferences.user_verification,
        attestation: preferences.attestation,
    };

    let descriptor = match mode {
        CredentialMode::Platform => RequestDescriptor::PlatformRegistration(request),
        CredentialMode::SecurityKey => {
            // Security keys get exactly one algorithm, no negotiation
            request.pub_key_cred_params = vec![PubKeyCredParam::es256()];
            RequestDescriptor::SecurityKeyRegistration(request)
        }
    };

    tracing::debug!(
        rp_id = identifier,
        mode = %mode,
        challenge_len = descriptor.challenge().len(),
        "Built registration request"
    );

    Ok(descriptor)
}

fn assertion(
    mode: CredentialMode,
    identifier: &str,
    challenge: Vec<u8>,
    allowed_credential_id: Option<&str>,
    preferences: &RequestPreferences,
) -> RequestDescriptor {
    let mut request = AssertionRequest {
        rp_id: identifier.to_string(),
        challenge,
        allow_credentials: Vec::new(),
        user_verification: preferences.user_verification,
    };

    match mode {
        CredentialMode::Platform => {
            if let Some(id) = allowed_credential_id {
                // An undecodable id is treated as absent, not as a failure
                match base64url_decode(id) {
                    Ok(id) => request.allow_credentials.push(CredentialDescriptor {
                        type_: PUBLIC_KEY_TYPE.to_string(),
                        id,
                    }),
                    Err(e) => tracing::warn!("Ignoring allowed credential id: {}", e),
                }
            }
        }
        CredentialMode::SecurityKey => {
            if allowed_credential_id.is_some() {
                tracing::debug!("Security key assertions take no allowed credential list");
            }
        }
    }

    tracing::debug!(
        rp_id = identifier,
        mode = %mode,
        allow_credentials = request.allow_credentials.len(),
        challenge_len = request.challenge.len(),
        "Built assertion request"
    );

    match mode {
        CredentialMode::Platform => RequestDescriptor::PlatformAssertion(request),
        CredentialMode::SecurityKey => RequestDescriptor::SecurityKeyAssertion(request),
    }
}
