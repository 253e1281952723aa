use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::oneshot;
use uuid::Uuid;

use super::request::RequestDescriptor;
use crate::passkey::types::{CredentialMode, PasskeyOperation, PlatformCompletion};

/// The platform's credential provider, seen as an opaque capability.
///
/// Implementations bridge to whatever the OS offers (a system passkey
/// manager, a security-key transport, a test double). Key generation, user
/// verification UI and attestation signing all happen behind this trait.
#[async_trait]
pub trait PlatformAuthenticator: Send + Sync + 'static {
    /// Whether this platform can run `operation` in `mode` at all.
    async fn is_available(&self, operation: PasskeyOperation, mode: CredentialMode) -> bool;

    /// Starts the platform request and returns immediately.
    ///
    /// The outcome is reported later, from any thread, through `completion`.
    /// Dropping every clone of `completion` without calling
    /// [`CompletionHandle::complete`] fails the ceremony with `RequestFailed`.
    fn submit(&self, request: RequestDescriptor, completion: CompletionHandle);
}

pub(crate) enum Resolution {
    Platform(PlatformCompletion),
    /// Another ceremony took over the controller
    Superseded,
}

/// One-shot delivery slot shared between a waiting ceremony and the platform.
pub(crate) struct CompletionSlot {
    ceremony_id: Uuid,
    sender: Mutex<Option<oneshot::Sender<Resolution>>>,
}

impl CompletionSlot {
    pub(crate) fn new(ceremony_id: Uuid) -> (Arc<Self>, oneshot::Receiver<Resolution>) {
        let (sender, receiver) = oneshot::channel();
        let slot = Self {
            ceremony_id,
            sender: Mutex::new(Some(sender)),
        };
        (Arc::new(slot), receiver)
    }

    /// Delivers `resolution` if nothing was delivered before.
    ///
    /// Returns true only for the call that reached a waiting ceremony.
    pub(crate) fn resolve(&self, resolution: Resolution) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(sender) = sender else {
            tracing::warn!(
                ceremony_id = %self.ceremony_id,
                "Ignoring completion for a ceremony that is already resolved"
            );
            return false;
        };

        match sender.send(resolution) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!(
                    ceremony_id = %self.ceremony_id,
                    "Dropping completion, caller is no longer waiting"
                );
                false
            }
        }
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// Completion callback handed to [`PlatformAuthenticator::submit`].
///
/// Cloneable so it can cross into platform callbacks, but only the first
/// [`complete`](Self::complete) across all clones has any effect.
#[derive(Clone)]
pub struct CompletionHandle {
    slot: Arc<CompletionSlot>,
}

impl CompletionHandle {
    pub(crate) fn new(slot: Arc<CompletionSlot>) -> Self {
        Self { slot }
    }

    /// Identifier of the ceremony this handle completes.
    pub fn ceremony_id(&self) -> Uuid {
        self.slot.ceremony_id
    }

    /// Reports the platform's result.
    ///
    /// Returns false when the ceremony was already resolved, was superseded,
    /// or its caller stopped waiting; the completion is discarded then.
    pub fn complete(&self, completion: PlatformCompletion) -> bool {
        self.slot.resolve(Resolution::Platform(completion))
    }

    pub fn is_resolved(&self) -> bool {
        self.slot.is_resolved()
    }
}

impl fmt::Debug for CompletionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionHandle")
            .field("ceremony_id", &self.slot.ceremony_id)
            .field("resolved", &self.slot.is_resolved())
            .finish()
    }
}
