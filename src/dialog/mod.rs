//! Dialog lifecycle — create, initialize, show, destroy.
//!
//! A [`Dialog`] moves through `Uninitialized → Ready → Destroyed`.
//! Validation happens once, in [`Dialog::initialize`]; [`Dialog::show`]
//! only hands the stored descriptor to the bound backend and normalizes
//! what comes back. All transitions are pure state changes apart from the
//! backend call inside `show`.

pub mod descriptor;
pub mod result;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::backend::{self, Backend, BackendError};
use descriptor::{Category, DialogDescriptor};
use result::{UserResult, normalize};

/// Process-unique dialog identifier, used as a logging field.
///
/// Monotonically increasing counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DialogId(u64);

impl DialogId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dlg-{}", self.0)
    }
}

/// Observable lifecycle state of a [`Dialog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Uninitialized,
    Ready,
    Destroyed,
}

impl fmt::Display for DialogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DialogState::Uninitialized => "uninitialized",
            DialogState::Ready => "ready",
            DialogState::Destroyed => "destroyed",
        })
    }
}

/// Outcome of [`Dialog::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitResult {
    Success,
    Failure,
}

/// Why initialization failed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("message text is required")]
    MissingMessage,
    #[error("primary button label is required")]
    MissingPrimaryLabel,
    #[error("dialog has been destroyed")]
    Destroyed,
}

/// Why a dialog could not be shown.
#[derive(Debug, thiserror::Error)]
pub enum ShowError {
    #[error("dialog is {0}, not ready")]
    NotReady(DialogState),
    #[error("backend: {0}")]
    Backend(#[from] BackendError),
}

enum State {
    Uninitialized,
    Ready(DialogDescriptor),
    Destroyed,
}

/// A modal message dialog owned by the caller.
///
/// Lifecycle transitions take `&mut self`, so a dialog is exclusively
/// owned by whichever thread drives it; no internal locking is done.
/// Showing the same dialog from several threads at once is the caller's
/// responsibility.
pub struct Dialog {
    id: DialogId,
    state: State,
    backend: Box<dyn Backend>,
}

impl Dialog {
    /// Create an uninitialized dialog bound to the platform default
    /// backend (see [`backend::default_backend`]).
    pub fn new() -> Self {
        Self::from_boxed(backend::default_backend())
    }

    /// Create an uninitialized dialog bound to `backend`.
    pub fn with_backend(backend: impl Backend + 'static) -> Self {
        Self::from_boxed(Box::new(backend))
    }

    fn from_boxed(backend: Box<dyn Backend>) -> Self {
        let id = DialogId::next();
        tracing::debug!(dialog = %id, backend = backend.name(), "dialog created");
        Self {
            id,
            state: State::Uninitialized,
            backend,
        }
    }

    pub fn id(&self) -> DialogId {
        self.id
    }

    pub fn state(&self) -> DialogState {
        match self.state {
            State::Uninitialized => DialogState::Uninitialized,
            State::Ready(_) => DialogState::Ready,
            State::Destroyed => DialogState::Destroyed,
        }
    }

    /// The validated configuration, if the dialog is ready.
    pub fn descriptor(&self) -> Option<&DialogDescriptor> {
        match &self.state {
            State::Ready(descriptor) => Some(descriptor),
            _ => None,
        }
    }

    /// Initialize the dialog. See [`Dialog::try_initialize`] for the rules;
    /// this collapses the error into [`InitResult::Failure`].
    pub fn initialize(
        &mut self,
        title: Option<&str>,
        message: Option<&str>,
        primary_label: Option<&str>,
        cancel_label: Option<&str>,
        alternate_label: Option<&str>,
        category: Category,
    ) -> InitResult {
        match self.try_initialize(
            title,
            message,
            primary_label,
            cancel_label,
            alternate_label,
            category,
        ) {
            Ok(()) => InitResult::Success,
            Err(_) => InitResult::Failure,
        }
    }

    /// Validate the inputs and move the dialog to `Ready`.
    ///
    /// May be called again on a ready dialog; each call is a fresh
    /// attempt. Inputs are validated before anything changes. On success
    /// the previous descriptor (if any) is replaced whole; on failure it is
    /// released and the dialog returns to `Uninitialized`. A destroyed
    /// dialog stays destroyed.
    pub fn try_initialize(
        &mut self,
        title: Option<&str>,
        message: Option<&str>,
        primary_label: Option<&str>,
        cancel_label: Option<&str>,
        alternate_label: Option<&str>,
        category: Category,
    ) -> Result<(), ConfigError> {
        if matches!(self.state, State::Destroyed) {
            tracing::debug!(dialog = %self.id, "initialize on destroyed dialog");
            return Err(ConfigError::Destroyed);
        }

        match DialogDescriptor::new(
            title,
            message,
            primary_label,
            cancel_label,
            alternate_label,
            category,
        ) {
            Ok(descriptor) => {
                tracing::debug!(
                    dialog = %self.id,
                    %category,
                    buttons = descriptor.buttons().len(),
                    "dialog initialized"
                );
                self.state = State::Ready(descriptor);
                Ok(())
            }
            Err(e) => {
                tracing::debug!(dialog = %self.id, error = %e, "dialog initialization failed");
                self.state = State::Uninitialized;
                Err(e)
            }
        }
    }

    /// Show the dialog through its bound backend and block until the user
    /// dismisses it.
    ///
    /// Returns [`UserResult::NoResponse`] without touching the backend if
    /// the dialog is not ready, and when the backend cannot present it.
    pub fn show(&self) -> UserResult {
        self.show_with(self.backend.as_ref())
    }

    /// Like [`Dialog::show`], but through an explicit backend.
    pub fn show_with(&self, backend: &dyn Backend) -> UserResult {
        self.try_show_with(backend).unwrap_or(UserResult::NoResponse)
    }

    /// Show through the bound backend, reporting why nothing was shown.
    pub fn try_show(&self) -> Result<UserResult, ShowError> {
        self.try_show_with(self.backend.as_ref())
    }

    /// Show through `backend`, reporting why nothing was shown.
    ///
    /// A user dismissal with no cancel button configured is still
    /// `Ok(UserResult::NoResponse)`; only failures to present are errors.
    pub fn try_show_with(&self, backend: &dyn Backend) -> Result<UserResult, ShowError> {
        let descriptor = match &self.state {
            State::Ready(descriptor) => descriptor,
            _ => {
                tracing::debug!(dialog = %self.id, state = %self.state(), "show on dialog that is not ready");
                return Err(ShowError::NotReady(self.state()));
            }
        };

        tracing::debug!(dialog = %self.id, backend = backend.name(), "presenting dialog");
        match backend.present(descriptor) {
            Ok(activation) => {
                let result = normalize(activation, descriptor);
                tracing::debug!(dialog = %self.id, ?activation, %result, "dialog dismissed");
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(
                    dialog = %self.id,
                    backend = backend.name(),
                    error = %e,
                    "backend could not present dialog"
                );
                Err(ShowError::Backend(e))
            }
        }
    }

    /// Release the descriptor and move to `Destroyed`.
    ///
    /// Safe on an uninitialized dialog. Calling it again is a no-op.
    /// Dropping the dialog releases the same resources.
    pub fn destroy(&mut self) {
        if matches!(self.state, State::Destroyed) {
            tracing::debug!(dialog = %self.id, "destroy on destroyed dialog ignored");
            return;
        }
        self.state = State::Destroyed;
        tracing::debug!(dialog = %self.id, "dialog destroyed");
    }
}

impl Default for Dialog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialog")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("descriptor", &self.descriptor())
            .field("backend", &self.backend.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::scripted::ScriptedBackend;
    use crate::dialog::descriptor::ButtonKind;
    use crate::dialog::result::Activation;

    fn ready(backend: &ScriptedBackend) -> Dialog {
        let mut d = Dialog::with_backend(backend.clone());
        assert_eq!(
            d.initialize(
                Some("Title"),
                Some("Body"),
                Some("OK"),
                Some("Cancel"),
                Some("Other"),
                Category::Info,
            ),
            InitResult::Success
        );
        d
    }

    // -- Creation --

    #[test]
    fn new_dialog_is_uninitialized() {
        let d = Dialog::with_backend(ScriptedBackend::new());
        assert_eq!(d.state(), DialogState::Uninitialized);
        assert!(d.descriptor().is_none());
    }

    #[test]
    fn ids_are_unique() {
        let a = Dialog::with_backend(ScriptedBackend::new());
        let b = Dialog::with_backend(ScriptedBackend::new());
        assert_ne!(a.id(), b.id());
    }

    // -- Initialization --

    #[test]
    fn missing_message_fails_and_not_ready() {
        let mut d = Dialog::with_backend(ScriptedBackend::new());
        let r = d.initialize(Some("t"), None, Some("OK"), Some("c"), Some("a"), Category::Info);
        assert_eq!(r, InitResult::Failure);
        assert_ne!(d.state(), DialogState::Ready);
    }

    #[test]
    fn missing_primary_fails_regardless_of_other_fields() {
        let mut d = Dialog::with_backend(ScriptedBackend::new());
        let r = d.initialize(
            Some("t"),
            Some("Body"),
            None,
            Some("c"),
            Some("a"),
            Category::Error,
        );
        assert_eq!(r, InitResult::Failure);
        assert_eq!(d.state(), DialogState::Uninitialized);
    }

    #[test]
    fn try_initialize_names_the_problem() {
        let mut d = Dialog::with_backend(ScriptedBackend::new());
        assert!(matches!(
            d.try_initialize(None, Some("Body"), None, None, None, Category::None),
            Err(ConfigError::MissingPrimaryLabel)
        ));
    }

    #[test]
    fn reinitialize_replaces_descriptor() {
        let backend = ScriptedBackend::new();
        let mut d = ready(&backend);
        let r = d.initialize(None, Some("Second"), Some("Yes"), None, None, Category::None);
        assert_eq!(r, InitResult::Success);

        let desc = d.descriptor().unwrap();
        assert_eq!(desc.message(), "Second");
        assert_eq!(desc.title(), None);
        assert!(!desc.offers(ButtonKind::Cancel));
    }

    #[test]
    fn failed_reinitialize_drops_old_descriptor() {
        let backend = ScriptedBackend::new();
        let mut d = ready(&backend);
        let r = d.initialize(None, None, Some("Yes"), None, None, Category::None);
        assert_eq!(r, InitResult::Failure);
        assert_eq!(d.state(), DialogState::Uninitialized);
        assert!(d.descriptor().is_none());
    }

    // -- Show --

    #[test]
    fn show_uninitialized_skips_backend() {
        let backend = ScriptedBackend::new().then_button(ButtonKind::Primary);
        let d = Dialog::with_backend(backend.clone());
        assert_eq!(d.show(), UserResult::NoResponse);
        assert_eq!(backend.invocations(), 0);
        assert!(matches!(
            d.try_show(),
            Err(ShowError::NotReady(DialogState::Uninitialized))
        ));
    }

    #[test]
    fn show_destroyed_skips_backend() {
        let backend = ScriptedBackend::new().then_button(ButtonKind::Primary);
        let mut d = ready(&backend);
        d.destroy();
        assert_eq!(d.show(), UserResult::NoResponse);
        assert_eq!(backend.invocations(), 0);
    }

    #[test]
    fn repeated_shows_are_independent() {
        let backend = ScriptedBackend::new()
            .then_button(ButtonKind::Alternate)
            .then_button(ButtonKind::Primary)
            .then(Ok(Activation::Dismissed));
        let d = ready(&backend);

        assert_eq!(d.show(), UserResult::Alternate);
        assert_eq!(d.show(), UserResult::Primary);
        assert_eq!(d.show(), UserResult::Cancel);
        assert_eq!(backend.invocations(), 3);
        assert_eq!(d.descriptor().unwrap().message(), "Body");
    }

    #[test]
    fn never_alternate_without_label() {
        let backend = ScriptedBackend::new()
            .then_button(ButtonKind::Alternate)
            .then_button(ButtonKind::Cancel)
            .then(Ok(Activation::Dismissed));
        let mut d = Dialog::with_backend(backend.clone());
        d.initialize(None, Some("Body"), Some("OK"), None, None, Category::None);

        for _ in 0..3 {
            let r = d.show();
            assert_ne!(r, UserResult::Alternate);
            assert_ne!(r, UserResult::Cancel);
        }
    }

    #[test]
    fn show_with_overrides_bound_backend() {
        let bound = ScriptedBackend::new().then_button(ButtonKind::Primary);
        let other = ScriptedBackend::new().then_button(ButtonKind::Cancel);
        let d = ready(&bound);

        assert_eq!(d.show_with(&other), UserResult::Cancel);
        assert_eq!(bound.invocations(), 0);
        assert_eq!(other.invocations(), 1);
    }

    #[test]
    fn try_show_reports_backend_failure() {
        let backend = ScriptedBackend::new().then_failure("no display");
        let d = ready(&backend);
        assert!(matches!(d.try_show(), Err(ShowError::Backend(_))));
    }

    // -- Destroy --

    #[test]
    fn destroy_uninitialized_is_safe() {
        let mut d = Dialog::with_backend(ScriptedBackend::new());
        d.destroy();
        assert_eq!(d.state(), DialogState::Destroyed);
    }

    #[test]
    fn double_destroy_is_noop() {
        let backend = ScriptedBackend::new();
        let mut d = ready(&backend);
        d.destroy();
        d.destroy();
        assert_eq!(d.state(), DialogState::Destroyed);
    }

    #[test]
    fn lifecycle_after_destroy_is_rejected() {
        let backend = ScriptedBackend::new().then_button(ButtonKind::Primary);
        let mut d = ready(&backend);
        d.destroy();

        let r = d.initialize(None, Some("Body"), Some("OK"), None, None, Category::None);
        assert_eq!(r, InitResult::Failure);
        assert_eq!(d.state(), DialogState::Destroyed);
        assert!(d.descriptor().is_none());
        assert_eq!(d.show(), UserResult::NoResponse);
        assert_eq!(backend.invocations(), 0);
    }

    // -- End-to-end scenarios --

    #[test]
    fn scenario_delete_file_cancelled() {
        let backend = ScriptedBackend::new().then_button(ButtonKind::Cancel);
        let mut d = Dialog::with_backend(backend.clone());
        let r = d.initialize(
            None,
            Some("Delete file?"),
            Some("Delete"),
            Some("Cancel"),
            None,
            Category::Warning,
        );
        assert_eq!(r, InitResult::Success);
        assert_eq!(d.show(), UserResult::Cancel);
        d.destroy();
    }

    #[test]
    fn scenario_missing_message_then_show() {
        let backend = ScriptedBackend::new().then_button(ButtonKind::Primary);
        let mut d = Dialog::with_backend(backend.clone());
        let r = d.initialize(None, None, Some("OK"), None, None, Category::None);
        assert_eq!(r, InitResult::Failure);
        assert_eq!(d.show(), UserResult::NoResponse);
        assert_eq!(backend.invocations(), 0);
    }

    #[test]
    fn scenario_alternate_chosen() {
        let backend = ScriptedBackend::new().then_button(ButtonKind::Alternate);
        let mut d = Dialog::with_backend(backend.clone());
        let r = d.initialize(
            None,
            Some("Proceed?"),
            Some("Yes"),
            None,
            Some("Maybe"),
            Category::None,
        );
        assert_eq!(r, InitResult::Success);
        assert_eq!(d.show(), UserResult::Alternate);
    }

    #[test]
    fn scenario_creation_failure_then_recovery() {
        let backend = ScriptedBackend::new()
            .then_failure("surface creation failed")
            .then_button(ButtonKind::Primary);
        let d = ready(&backend);

        assert_eq!(d.show(), UserResult::NoResponse);
        assert_eq!(d.state(), DialogState::Ready);
        assert_eq!(d.show(), UserResult::Primary);
        assert_eq!(backend.invocations(), 2);
    }
}
