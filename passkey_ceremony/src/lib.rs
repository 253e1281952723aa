//! passkey-ceremony - Passkey and security-key ceremonies on a platform authenticator
//!
//! This crate builds WebAuthn-style registration and assertion requests for
//! either the platform authenticator or an external security key, hands them
//! to a [`PlatformAuthenticator`] implementation, and turns its single
//! completion into a result or an [`ErrorKind`]. All binary values cross the
//! public surface as unpadded base64url text.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use passkey_ceremony::{CeremonyController, PlatformAuthenticator};
//! # async fn run(platform: Arc<dyn PlatformAuthenticator>) -> Result<(), passkey_ceremony::ErrorKind> {
//! let controller = CeremonyController::new(platform);
//! let credential = controller
//!     .register("example.com", "Y2hhbGxlbmdl", "Alice", "dXNlci0x", false)
//!     .await?;
//! println!("{}", credential.id);
//! # Ok(())
//! # }
//! ```

mod passkey;
mod utils;

#[cfg(test)]
mod test_utils;

pub use passkey::{
    AssertionRequest, AssertionResponse, AssertionResult, AttestationPreference,
    AuthenticatorAssertionResponse, AuthenticatorAttestationResponse, COSE_ALG_ES256,
    CeremonyController, CeremonyInfo, CeremonyOutcome, CompletionHandle, ConflictPolicy,
    CredentialDescriptor, CredentialMode, CredentialPayload, ErrorKind, PasskeyOperation,
    PlatformAuthenticator, PlatformCompletion, PubKeyCredParam, RegistrationRequest,
    RegistrationResponse, RegistrationResult, RequestDescriptor, RequestInput, RequestPreferences,
    UserVerification, build, build_assertion, build_registration, map_platform_error,
    platform_codes,
};

pub use utils::{UtilError, base64url_decode, base64url_encode};
