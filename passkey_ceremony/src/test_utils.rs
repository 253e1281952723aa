//! Test utilities shared by the unit tests of this crate
//!
//! `MockAuthenticator` stands in for the platform. Depending on how it is
//! built it answers every submission at once (possibly more than once, to
//! exercise the single-shot guard), holds the completion handle for the test
//! to fire later, or drops it without answering.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::passkey::{
    CompletionHandle, CredentialMode, PasskeyOperation, PlatformAuthenticator, PlatformCompletion,
    RequestDescriptor,
};

enum Behavior {
    /// Fire these completions, in order, from inside `submit`
    Complete(Vec<PlatformCompletion>),
    /// Queue the handle for `next_submission`
    Hold,
    /// Drop the handle without completing
    Drop,
}

pub(crate) struct MockAuthenticator {
    available: bool,
    behavior: Behavior,
    requests: Mutex<Vec<RequestDescriptor>>,
    pending: Mutex<VecDeque<(RequestDescriptor, CompletionHandle)>>,
    deliveries: Mutex<Vec<bool>>,
    submitted: Notify,
}

impl MockAuthenticator {
    fn with_behavior(available: bool, behavior: Behavior) -> Self {
        Self {
            available,
            behavior,
            requests: Mutex::new(Vec::new()),
            pending: Mutex::new(VecDeque::new()),
            deliveries: Mutex::new(Vec::new()),
            submitted: Notify::new(),
        }
    }

    /// Answers each submission with `completions`, all of them, in order
    pub(crate) fn completing(completions: Vec<PlatformCompletion>) -> Self {
        Self::with_behavior(true, Behavior::Complete(completions))
    }

    pub(crate) fn holding() -> Self {
        Self::with_behavior(true, Behavior::Hold)
    }

    pub(crate) fn dropping() -> Self {
        Self::with_behavior(true, Behavior::Drop)
    }

    pub(crate) fn unavailable() -> Self {
        Self::with_behavior(false, Behavior::Hold)
    }

    pub(crate) fn submission_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests.lock().unwrap().clone()
    }

    /// Return values of every `complete` call made from inside `submit`
    pub(crate) fn deliveries(&self) -> Vec<bool> {
        self.deliveries.lock().unwrap().clone()
    }

    /// Waits for the next held submission
    pub(crate) async fn next_submission(&self) -> (RequestDescriptor, CompletionHandle) {
        loop {
            let notified = self.submitted.notified();
            if let Some(submission) = self.pending.lock().unwrap().pop_front() {
                return submission;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl PlatformAuthenticator for MockAuthenticator {
    async fn is_available(&self, _operation: PasskeyOperation, _mode: CredentialMode) -> bool {
        self.available
    }

    fn submit(&self, request: RequestDescriptor, completion: CompletionHandle) {
        self.requests.lock().unwrap().push(request.clone());

        match &self.behavior {
            Behavior::Complete(completions) => {
                for c in completions {
                    let delivered = completion.complete(c.clone());
                    self.deliveries.lock().unwrap().push(delivered);
                }
            }
            Behavior::Hold => {
                self.pending
                    .lock()
                    .unwrap()
                    .push_back((request, completion));
                self.submitted.notify_one();
            }
            Behavior::Drop => drop(completion),
        }
    }
}
