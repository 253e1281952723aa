use super::controller::CeremonyController;
use super::request::build_registration;
use crate::passkey::errors::ErrorKind;
use crate::passkey::types::{CeremonyOutcome, CredentialMode, RegistrationResponse};

impl CeremonyController {
    /// Creates a new credential for `identifier`.
    ///
    /// `challenge` and `user_id` are base64url text. Malformed input fails with
    /// `InvalidChallenge` / `InvalidUserId` before the platform is involved.
    /// With `use_security_key` the request targets an external security key
    /// and is restricted to ES256.
    pub async fn register(
        &self,
        identifier: &str,
        challenge: &str,
        display_name: &str,
        user_id: &str,
        use_security_key: bool,
    ) -> Result<RegistrationResponse, ErrorKind> {
        let mode = CredentialMode::from_use_security_key(use_security_key);
        let request = build_registration(
            mode,
            identifier,
            challenge,
            display_name,
            user_id,
            self.preferences(),
        )
        .map_err(ErrorKind::log)?;

        match self.begin(request).await {
            CeremonyOutcome::Registered(result) => Ok(result.to_response()),
            CeremonyOutcome::Failed(kind) => Err(kind),
            CeremonyOutcome::Asserted(_) => {
                tracing::error!("Registration ceremony resolved with an assertion");
                Err(ErrorKind::RequestFailed)
            }
        }
    }
}
