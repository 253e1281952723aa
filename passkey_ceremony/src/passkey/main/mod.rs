mod auth;
mod authenticator;
mod controller;
mod register;
mod request;

pub use authenticator::{CompletionHandle, PlatformAuthenticator};
pub use controller::CeremonyController;
pub use request::{
    AssertionRequest, COSE_ALG_ES256, CredentialDescriptor, PubKeyCredParam, RegistrationRequest,
    RequestDescriptor, RequestInput, RequestPreferences, build, build_assertion,
    build_registration,
};
