//! Scripted backend — replays canned outcomes instead of showing anything.
//!
//! Meant for tests. Clones share the same script and invocation counter,
//! so a test can keep one handle while the dialog owns another. Only the
//! most recent [`PRESENTED_LIMIT`] descriptors are remembered.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{Backend, BackendError};
use crate::dialog::descriptor::{ButtonKind, DialogDescriptor};
use crate::dialog::result::Activation;

/// Number of presented descriptors kept for inspection.
pub const PRESENTED_LIMIT: usize = 64;

#[derive(Default)]
struct Script {
    outcomes: VecDeque<Result<Activation, BackendError>>,
    invocations: usize,
    presented: VecDeque<DialogDescriptor>,
}

/// Backend that returns pre-recorded outcomes in order.
///
/// Once the script is exhausted every call reports
/// [`BackendError::CreationFailed`].
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome to the script.
    pub fn then(self, outcome: Result<Activation, BackendError>) -> Self {
        self.lock().outcomes.push_back(outcome);
        self
    }

    /// Append a button activation.
    pub fn then_button(self, kind: ButtonKind) -> Self {
        self.then(Ok(Activation::Button(kind)))
    }

    /// Append a surface creation failure.
    pub fn then_failure(self, reason: &str) -> Self {
        self.then(Err(BackendError::CreationFailed(reason.to_string())))
    }

    /// Number of times `present` has been called.
    pub fn invocations(&self) -> usize {
        self.lock().invocations
    }

    /// The last [`PRESENTED_LIMIT`] descriptors passed to `present`,
    /// oldest first.
    pub fn presented(&self) -> Vec<DialogDescriptor> {
        self.lock().presented.iter().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        // The script holds no invariant a panic could break.
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Backend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn present(&self, descriptor: &DialogDescriptor) -> Result<Activation, BackendError> {
        let mut script = self.lock();
        script.invocations += 1;
        if script.presented.len() == PRESENTED_LIMIT {
            script.presented.pop_front();
        }
        script.presented.push_back(descriptor.clone());
        script
            .outcomes
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::CreationFailed("script exhausted".into())))
    }
}
