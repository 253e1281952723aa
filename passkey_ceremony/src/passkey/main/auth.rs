use super::controller::CeremonyController;
use super::request::build_assertion;
use crate::passkey::errors::ErrorKind;
use crate::passkey::types::{AssertionResponse, CeremonyOutcome, CredentialMode};

impl CeremonyController {
    /// Asks the platform for an assertion over `challenge` for `identifier`.
    ///
    /// For platform credentials, `allowed_credential_id` narrows the candidates
    /// to that one credential. An id that does not decode is ignored rather
    /// than failing the call. Security keys never take the narrowing list.
    pub async fn authenticate(
        &self,
        identifier: &str,
        challenge: &str,
        use_security_key: bool,
        allowed_credential_id: Option<&str>,
    ) -> Result<AssertionResponse, ErrorKind> {
        let mode = CredentialMode::from_use_security_key(use_security_key);
        let request = build_assertion(
            mode,
            identifier,
            challenge,
            allowed_credential_id,
            self.preferences(),
        )
        .map_err(ErrorKind::log)?;

        match self.begin(request).await {
            CeremonyOutcome::Asserted(result) => Ok(result.to_response()),
            CeremonyOutcome::Failed(kind) => Err(kind),
            CeremonyOutcome::Registered(_) => {
                tracing::error!("Assertion ceremony resolved with a registration");
                Err(ErrorKind::RequestFailed)
            }
        }
    }
}
