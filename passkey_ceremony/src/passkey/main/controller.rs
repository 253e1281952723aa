use std::sync::{Arc, Mutex, PoisonError, Weak};

use chrono::Utc;
use uuid::Uuid;

use super::authenticator::{CompletionHandle, CompletionSlot, PlatformAuthenticator, Resolution};
use super::request::{RequestDescriptor, RequestPreferences};
use crate::passkey::config::PASSKEY_CEREMONY_CONFLICT_POLICY;
use crate::passkey::errors::{ErrorKind, map_platform_error};
use crate::passkey::types::{
    CeremonyInfo, CeremonyOutcome, ConflictPolicy, CredentialMode, CredentialPayload,
    PasskeyOperation, PlatformCompletion,
};

struct ActiveCeremony {
    info: CeremonyInfo,
    // Owned by the platform's handles only
    slot: Weak<CompletionSlot>,
}

/// Runs passkey ceremonies against a platform authenticator, one at a time.
///
/// A ceremony moves `Idle -> Submitted -> Completed`. The controller owns the
/// only slot for the submitted ceremony and guarantees its caller sees exactly
/// one outcome, however many times the platform fires the completion. What
/// happens to a ceremony still in flight when another one begins is set by
/// [`ConflictPolicy`]. Nothing is retried and no timeout is imposed; a caller
/// that stops waiting just drops the future.
pub struct CeremonyController {
    authenticator: Arc<dyn PlatformAuthenticator>,
    policy: ConflictPolicy,
    preferences: RequestPreferences,
    active: Mutex<Option<ActiveCeremony>>,
}

impl CeremonyController {
    /// Controller with policy and preferences taken from the environment.
    pub fn new(authenticator: Arc<dyn PlatformAuthenticator>) -> Self {
        Self::with_policy(authenticator, *PASSKEY_CEREMONY_CONFLICT_POLICY)
    }

    pub fn with_policy(
        authenticator: Arc<dyn PlatformAuthenticator>,
        policy: ConflictPolicy,
    ) -> Self {
        Self {
            authenticator,
            policy,
            preferences: RequestPreferences::from_env(),
            active: Mutex::new(None),
        }
    }

    /// Replaces the preferences copied into requests built by this controller.
    pub fn with_preferences(mut self, preferences: RequestPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    pub fn preferences(&self) -> &RequestPreferences {
        &self.preferences
    }

    /// Whether the platform can run `operation` in `mode`.
    pub async fn is_supported(&self, operation: PasskeyOperation, mode: CredentialMode) -> bool {
        self.authenticator.is_available(operation, mode).await
    }

    /// The ceremony currently submitted, if any.
    pub fn current(&self) -> Option<CeremonyInfo> {
        self.lock_active().as_ref().map(|active| active.info.clone())
    }

    /// Submits `request` and waits for its single outcome.
    pub async fn begin(&self, request: RequestDescriptor) -> CeremonyOutcome {
        let operation = request.operation();
        let mode = request.mode();

        if !self.authenticator.is_available(operation, mode).await {
            tracing::debug!(%operation, %mode, "Platform capability unavailable");
            return CeremonyOutcome::Failed(ErrorKind::NotSupported.log());
        }

        let info = CeremonyInfo {
            id: Uuid::new_v4(),
            operation,
            mode,
            started_at: Utc::now(),
        };
        let (slot, receiver) = CompletionSlot::new(info.id);

        let _guard = match self.install(info.clone(), Arc::downgrade(&slot)) {
            Ok(guard) => guard,
            Err(kind) => return CeremonyOutcome::Failed(kind.log()),
        };

        tracing::info!(
            ceremony_id = %info.id,
            %operation,
            %mode,
            rp_id = request.rp_id(),
            "Submitting ceremony"
        );
        self.authenticator.submit(request, CompletionHandle::new(slot));

        let outcome = match receiver.await {
            Ok(Resolution::Platform(completion)) => resolve_completion(operation, completion),
            Ok(Resolution::Superseded) => {
                tracing::warn!(ceremony_id = %info.id, "Ceremony superseded by a newer one");
                CeremonyOutcome::Failed(ErrorKind::RequestFailed)
            }
            Err(_) => {
                tracing::warn!(
                    ceremony_id = %info.id,
                    "Platform released the ceremony without completing it"
                );
                CeremonyOutcome::Failed(ErrorKind::RequestFailed)
            }
        };

        let elapsed = Utc::now() - info.started_at;
        match &outcome {
            CeremonyOutcome::Failed(kind) => {
                kind.log();
            }
            CeremonyOutcome::Registered(_) | CeremonyOutcome::Asserted(_) => {
                tracing::info!(
                    ceremony_id = %info.id,
                    elapsed_ms = elapsed.num_milliseconds(),
                    "Ceremony completed"
                );
            }
        }

        outcome
    }

    /// Puts a new ceremony into the active slot according to the policy.
    fn install(
        &self,
        info: CeremonyInfo,
        slot: Weak<CompletionSlot>,
    ) -> Result<ActiveGuard<'_>, ErrorKind> {
        let mut active = self.lock_active();

        if let Some(previous) = active.as_ref() {
            match self.policy {
                ConflictPolicy::Reject => {
                    tracing::warn!(
                        in_flight = %previous.info.id,
                        "Rejecting ceremony, another one is in flight"
                    );
                    return Err(ErrorKind::RequestFailed);
                }
                ConflictPolicy::Replace => {
                    tracing::warn!(
                        previous = %previous.info.id,
                        next = %info.id,
                        "Replacing ceremony still in flight"
                    );
                    if let Some(previous_slot) = previous.slot.upgrade() {
                        previous_slot.resolve(Resolution::Superseded);
                    }
                }
            }
        }

        let id = info.id;
        *active = Some(ActiveCeremony { info, slot });

        Ok(ActiveGuard {
            active: &self.active,
            id,
        })
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<ActiveCeremony>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the active slot when its ceremony ends or its caller goes away.
struct ActiveGuard<'a> {
    active: &'a Mutex<Option<ActiveCeremony>>,
    id: Uuid,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        // A newer ceremony may already own the slot
        if active.as_ref().is_some_and(|a| a.info.id == self.id) {
            *active = None;
        }
    }
}

/// Turns the platform's completion into the ceremony outcome.
fn resolve_completion(
    operation: PasskeyOperation,
    completion: PlatformCompletion,
) -> CeremonyOutcome {
    match completion {
        PlatformCompletion::Failure(code) => {
            tracing::debug!(platform_code = code, "Platform reported failure");
            CeremonyOutcome::Failed(map_platform_error(code))
        }
        PlatformCompletion::Success(None) => {
            tracing::warn!(%operation, "Platform reported success without a credential");
            CeremonyOutcome::Failed(ErrorKind::RequestFailed)
        }
        PlatformCompletion::Success(Some(payload)) if payload.is_empty() => {
            tracing::warn!(%operation, "Platform reported success with an empty credential");
            CeremonyOutcome::Failed(ErrorKind::RequestFailed)
        }
        PlatformCompletion::Success(Some(payload)) => match (operation, payload) {
            (PasskeyOperation::Registration, CredentialPayload::Registration(result)) => {
                tracing::debug!(
                    credential_id_len = result.credential_id.len(),
                    attestation_object_len = result.attestation_object.len(),
                    "Received registration credential"
                );
                CeremonyOutcome::Registered(result)
            }
            (PasskeyOperation::Assertion, CredentialPayload::Assertion(result)) => {
                tracing::debug!(
                    credential_id_len = result.credential_id.len(),
                    signature_len = result.signature.len(),
                    "Received assertion credential"
                );
                CeremonyOutcome::Asserted(result)
            }
            (operation, payload) => {
                tracing::warn!(
                    expected = %operation,
                    received = %payload.operation(),
                    "Platform returned a credential for the wrong operation"
                );
                CeremonyOutcome::Failed(ErrorKind::RequestFailed)
            }
        },
    }
}
