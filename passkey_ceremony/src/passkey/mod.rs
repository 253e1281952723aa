mod config;
mod errors;
mod main;
mod types;

pub use errors::{ErrorKind, map_platform_error, platform_codes};

pub use main::{
    AssertionRequest, COSE_ALG_ES256, CeremonyController, CompletionHandle, CredentialDescriptor,
    PlatformAuthenticator, PubKeyCredParam, RegistrationRequest, RequestDescriptor, RequestInput,
    RequestPreferences, build, build_assertion, build_registration,
};

pub use types::{
    AssertionResponse, AssertionResult, AttestationPreference, AuthenticatorAssertionResponse,
    AuthenticatorAttestationResponse, CeremonyInfo, CeremonyOutcome, ConflictPolicy,
    CredentialMode, CredentialPayload, PasskeyOperation, PlatformCompletion, RegistrationResponse,
    RegistrationResult, UserVerification,
};
