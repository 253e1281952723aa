use std::time::Duration;

use async_trait::async_trait;
use passkey_ceremony::{
    AssertionResult, CompletionHandle, CredentialMode, CredentialPayload, PasskeyOperation,
    PlatformAuthenticator, PlatformCompletion, RegistrationResult, RequestDescriptor,
    base64url_encode,
};

/// Stand-in for the OS credential provider.
///
/// It "asks the user" by sleeping, then answers with fixed credential
/// material. With `failure_code` set it fails every request with that
/// platform code instead.
pub(crate) struct SimulatedPlatform {
    pub(crate) security_keys: bool,
    pub(crate) failure_code: Option<i64>,
    pub(crate) delay: Duration,
}

impl SimulatedPlatform {
    fn answer(&self, request: &RequestDescriptor) -> PlatformCompletion {
        if let Some(code) = self.failure_code {
            return PlatformCompletion::Failure(code);
        }

        let origin = format!("https://{}", request.rp_id());
        let client_data = |type_: &str| {
            serde_json::json!({
                "type": type_,
                "challenge": base64url_encode(request.challenge()),
                "origin": origin,
            })
            .to_string()
            .into_bytes()
        };

        let payload = match request {
            RequestDescriptor::PlatformRegistration(r)
            | RequestDescriptor::SecurityKeyRegistration(r) => {
                CredentialPayload::Registration(RegistrationResult {
                    credential_id: r.user_id.iter().rev().copied().collect(),
                    // CBOR map {"fmt": "none"}
                    attestation_object: vec![
                        0xa1, 0x63, 0x66, 0x6d, 0x74, 0x64, 0x6e, 0x6f, 0x6e, 0x65,
                    ],
                    client_data_json: client_data("webauthn.create"),
                })
            }
            RequestDescriptor::PlatformAssertion(a) | RequestDescriptor::SecurityKeyAssertion(a) => {
                CredentialPayload::Assertion(AssertionResult {
                    credential_id: a
                        .allow_credentials
                        .first()
                        .map(|c| c.id.clone())
                        .unwrap_or_else(|| b"demo-credential".to_vec()),
                    user_id: b"demo-user".to_vec(),
                    authenticator_data: vec![0; 37],
                    client_data_json: client_data("webauthn.get"),
                    signature: vec![0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01],
                })
            }
        };

        PlatformCompletion::Success(Some(payload))
    }
}

#[async_trait]
impl PlatformAuthenticator for SimulatedPlatform {
    async fn is_available(&self, _operation: PasskeyOperation, mode: CredentialMode) -> bool {
        mode == CredentialMode::Platform || self.security_keys
    }

    fn submit(&self, request: RequestDescriptor, completion: CompletionHandle) {
        let answer = self.answer(&request);
        let delay = self.delay;

        tracing::info!(
            ceremony_id = %completion.ceremony_id(),
            "Simulated authenticator prompting user"
        );
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            completion.complete(answer);
        });
    }
}
