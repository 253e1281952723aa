//! Integration tests for passkey-ceremony
//!
//! These tests drive the public API against a simulated platform that answers
//! from a separate task, the way a real authenticator calls back from its own
//! thread once the user has finished with the system UI.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use passkey_ceremony::{
    AssertionResult, CeremonyController, CompletionHandle, ConflictPolicy, CredentialMode,
    CredentialPayload, ErrorKind, PasskeyOperation, PlatformAuthenticator, PlatformCompletion,
    RegistrationResult, RequestDescriptor, RequestPreferences, UserVerification,
    base64url_decode, base64url_encode,
};

const RP_ID: &str = "example.com";

/// Simulated platform that answers after a short delay.
///
/// Registration requests receive a credential whose id is the user id,
/// assertion requests a signature over the challenge. Security keys are
/// reported unavailable when `security_keys` is false. When `echo_twice` is
/// set every answer is delivered twice.
struct SimulatedPlatform {
    security_keys: bool,
    echo_twice: bool,
    second_delivery: Arc<Mutex<Vec<bool>>>,
    seen: Mutex<Vec<RequestDescriptor>>,
}

impl SimulatedPlatform {
    fn new(security_keys: bool) -> Self {
        Self {
            security_keys,
            echo_twice: false,
            second_delivery: Arc::new(Mutex::new(Vec::new())),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn answer(request: &RequestDescriptor) -> PlatformCompletion {
        match request {
            RequestDescriptor::PlatformRegistration(r)
            | RequestDescriptor::SecurityKeyRegistration(r) => {
                PlatformCompletion::Success(Some(CredentialPayload::Registration(
                    RegistrationResult {
                        credential_id: r.user_id.clone(),
                        attestation_object: vec![0xa3, 0x63, 0x66, 0x6d, 0x74],
                        client_data_json: client_data("webauthn.create", &r.challenge),
                    },
                )))
            }
            RequestDescriptor::PlatformAssertion(a) | RequestDescriptor::SecurityKeyAssertion(a) => {
                let credential_id = a
                    .allow_credentials
                    .first()
                    .map(|c| c.id.clone())
                    .unwrap_or_else(|| vec![9, 9, 9]);
                PlatformCompletion::Success(Some(CredentialPayload::Assertion(AssertionResult {
                    credential_id,
                    user_id: b"user-1".to_vec(),
                    authenticator_data: vec![0; 37],
                    client_data_json: client_data("webauthn.get", &a.challenge),
                    signature: a.challenge.iter().rev().copied().collect(),
                })))
            }
        }
    }
}

fn client_data(type_: &str, challenge: &[u8]) -> Vec<u8> {
    serde_json::json!({
        "type": type_,
        "challenge": base64url_encode(challenge),
        "origin": format!("https://{RP_ID}"),
    })
    .to_string()
    .into_bytes()
}

#[async_trait]
impl PlatformAuthenticator for SimulatedPlatform {
    async fn is_available(&self, _operation: PasskeyOperation, mode: CredentialMode) -> bool {
        match mode {
            CredentialMode::Platform => true,
            CredentialMode::SecurityKey => self.security_keys,
        }
    }

    fn submit(&self, request: RequestDescriptor, completion: CompletionHandle) {
        self.seen.lock().unwrap().push(request.clone());
        let echo_twice = self.echo_twice;
        let second_delivery = self.second_delivery.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            let answer = SimulatedPlatform::answer(&request);
            completion.complete(answer.clone());
            if echo_twice {
                let delivered = completion.complete(answer);
                second_delivery.lock().unwrap().push(delivered);
            }
        });
    }
}

fn controller(platform: SimulatedPlatform) -> (Arc<SimulatedPlatform>, CeremonyController) {
    let platform = Arc::new(platform);
    let controller = CeremonyController::with_policy(platform.clone(), ConflictPolicy::Replace);
    (platform, controller)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_register_then_authenticate() {
    let (platform, controller) = controller(SimulatedPlatform::new(true));
    let challenge = base64url_encode(b"registration-challenge");
    let user_id = base64url_encode(b"user-1");

    let registration = controller
        .register(RP_ID, &challenge, "Alice", &user_id, false)
        .await
        .expect("registration should succeed");

    assert_eq!(registration.type_, "public-key");
    assert_eq!(registration.id, user_id);
    let client_data = base64url_decode(&registration.response.client_data_json).unwrap();
    let client_data: serde_json::Value = serde_json::from_slice(&client_data).unwrap();
    assert_eq!(client_data["type"], "webauthn.create");
    assert_eq!(client_data["challenge"], challenge);

    let challenge = base64url_encode(b"assertion-challenge");
    let assertion = controller
        .authenticate(RP_ID, &challenge, false, Some(registration.id.as_str()))
        .await
        .expect("assertion should succeed");

    assert_eq!(assertion.id, registration.id);
    assert_eq!(assertion.response.user_handle, user_id);
    let signature = base64url_decode(&assertion.response.signature).unwrap();
    assert_eq!(signature, b"egnellahc-noitressa".to_vec());

    assert_eq!(platform.seen.lock().unwrap().len(), 2);
    assert!(controller.current().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_security_key_registration_is_es256_only() {
    let (platform, controller) = controller(SimulatedPlatform::new(true));

    controller
        .register(RP_ID, "Y2hhbGxlbmdl", "Alice", "dXNlci0x", true)
        .await
        .expect("registration should succeed");

    let seen = platform.seen.lock().unwrap();
    match &seen[..] {
        [RequestDescriptor::SecurityKeyRegistration(r)] => {
            assert_eq!(r.pub_key_cred_params.len(), 1);
            assert_eq!(r.pub_key_cred_params[0].alg, passkey_ceremony::COSE_ALG_ES256);
        }
        other => panic!("Expected one security key registration, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_security_key_unavailable() {
    let (platform, controller) = controller(SimulatedPlatform::new(false));

    assert!(
        !controller
            .is_supported(PasskeyOperation::Assertion, CredentialMode::SecurityKey)
            .await
    );

    let result = controller
        .authenticate(RP_ID, "Y2hhbGxlbmdl", true, None)
        .await;

    assert_eq!(result, Err(ErrorKind::NotSupported));
    assert!(platform.seen.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_double_delivery_from_platform_thread() {
    let mut platform = SimulatedPlatform::new(true);
    platform.echo_twice = true;
    let (platform, controller) = controller(platform);

    let result = controller
        .authenticate(RP_ID, "Y2hhbGxlbmdl", false, None)
        .await;
    assert!(result.is_ok());

    // Give the platform task time to attempt its second delivery
    for _ in 0..50 {
        if !platform.second_delivery.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(*platform.second_delivery.lock().unwrap(), vec![false]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_validation_errors_surface_as_codes() {
    let (platform, controller) = controller(SimulatedPlatform::new(true));

    let err = controller
        .register(RP_ID, "AB~~", "Alice", "dXNlci0x", false)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "InvalidChallenge");

    let err = controller
        .register(RP_ID, "Y2hhbGxlbmdl", "Alice", "dX!l", false)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "InvalidUserId");

    assert!(platform.seen.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_preferences_flow_into_requests() {
    let platform = Arc::new(SimulatedPlatform::new(true));
    let controller = CeremonyController::with_policy(platform.clone(), ConflictPolicy::Reject)
        .with_preferences(RequestPreferences {
            user_verification: UserVerification::Required,
            ..RequestPreferences::default()
        });

    controller
        .authenticate(RP_ID, "Y2hhbGxlbmdl", false, None)
        .await
        .unwrap();

    let seen = platform.seen.lock().unwrap();
    match &seen[..] {
        [RequestDescriptor::PlatformAssertion(a)] => {
            assert_eq!(a.user_verification, UserVerification::Required);
            assert!(a.allow_credentials.is_empty());
        }
        other => panic!("Expected one platform assertion, got {other:?}"),
    }
}
