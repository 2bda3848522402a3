//! Result normalization — backend activations onto [`UserResult`].
//!
//! Backends speak their own vocabulary (exit codes, button indices,
//! window-manager close requests). Each converts it into an
//! [`Activation`]; [`normalize`] then applies the cross-backend rules so
//! that a result is never reported for a button that was not configured.

use std::fmt;

use super::descriptor::{ButtonKind, DialogDescriptor};

/// Which button the user chose, independent of the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserResult {
    /// The primary (ok/action) button.
    Primary,
    /// The cancel button, or a close-equivalent dismissal when a cancel
    /// button was offered.
    Cancel,
    /// The alternate button.
    Alternate,
    /// The dialog could not be shown, or was dismissed with no cancel
    /// button configured.
    NoResponse,
}

impl UserResult {
    /// Lowercase name, as printed by the command-line front end.
    pub fn as_str(self) -> &'static str {
        match self {
            UserResult::Primary => "primary",
            UserResult::Cancel => "cancel",
            UserResult::Alternate => "alternate",
            UserResult::NoResponse => "no-response",
        }
    }
}

impl fmt::Display for UserResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ButtonKind> for UserResult {
    fn from(kind: ButtonKind) -> Self {
        match kind {
            ButtonKind::Primary => UserResult::Primary,
            ButtonKind::Cancel => UserResult::Cancel,
            ButtonKind::Alternate => UserResult::Alternate,
        }
    }
}

/// What a backend observed when the dialog closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// A labeled button was activated.
    Button(ButtonKind),
    /// The dialog was closed without a button (window close, Escape, EOF).
    Dismissed,
}

impl Activation {
    /// Map a native button index into `buttons` (the order the backend
    /// rendered them in). Out-of-range indices yield `None`.
    pub fn from_index<L>(index: usize, buttons: &[(ButtonKind, L)]) -> Option<Self> {
        buttons.get(index).map(|(kind, _)| Activation::Button(*kind))
    }
}

/// Normalize a backend activation for `descriptor`.
///
/// Backend failures never reach here; the dialog maps them to
/// [`UserResult::NoResponse`] itself.
pub fn normalize(activation: Activation, descriptor: &DialogDescriptor) -> UserResult {
    match activation {
        Activation::Button(kind) if descriptor.offers(kind) => kind.into(),
        Activation::Button(kind) => {
            tracing::warn!(?kind, "backend reported a button that was not configured");
            UserResult::NoResponse
        }
        Activation::Dismissed if descriptor.offers(ButtonKind::Cancel) => UserResult::Cancel,
        Activation::Dismissed => UserResult::NoResponse,
    }
}
