//! Backend abstraction — pluggable native dialog adapters.
//!
//! Every platform-specific way of putting a modal dialog on screen lives
//! behind the [`Backend`] trait. The dialog state machine only ever talks
//! to the trait; which adapter is used is decided at runtime by
//! [`default_backend`] or chosen explicitly by the caller.

pub mod bootstrap;
pub mod console;
pub mod scripted;
pub mod x11;
pub mod zenity;

use std::fmt;
use std::str::FromStr;

use crate::dialog::descriptor::DialogDescriptor;
use crate::dialog::result::Activation;

pub use console::ConsoleBackend;
pub use scripted::ScriptedBackend;
pub use x11::X11Backend;
pub use zenity::ZenityBackend;

/// Environment variable that overrides backend auto-detection.
pub const BACKEND_ENV: &str = "ALERTBOX_BACKEND";

/// Errors returned by backend adapters.
///
/// Every variant means "no dialog was presented"; the state machine
/// reports all of them as `NoResponse`.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The native toolkit could not be reached or bootstrapped (e.g. no
    /// X display, program not installed).
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The toolkit is up but refused to build the dialog surface.
    #[error("creation failed: {0}")]
    CreationFailed(String),

    /// The toolkit went away while the dialog was up.
    #[error("interrupted: {0}")]
    Interrupted(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A native dialog adapter.
///
/// `present` blocks the calling thread until the user dismisses the
/// dialog. Implementations render only the buttons the descriptor offers
/// and never re-validate it.
///
/// `Send + Sync` is required so a [`Dialog`](crate::Dialog) holding a
/// backend can move between threads.
pub trait Backend: Send + Sync {
    /// Short adapter name for logs.
    fn name(&self) -> &'static str;

    /// Present `descriptor` modally and report what the user did.
    ///
    /// Adapters that share a process-wide toolkit connection may run
    /// concurrent calls one after another rather than side by side.
    fn present(&self, descriptor: &DialogDescriptor) -> Result<Activation, BackendError>;

    /// Check that a dialog could be presented right now, bootstrapping
    /// the toolkit if needed, without showing anything.
    fn probe(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn present(&self, descriptor: &DialogDescriptor) -> Result<Activation, BackendError> {
        (**self).present(descriptor)
    }

    fn probe(&self) -> Result<(), BackendError> {
        (**self).probe()
    }
}

/// The native adapters selectable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    X11,
    Zenity,
    Console,
}

impl BackendKind {
    /// Pick a backend from the environment.
    ///
    /// `ALERTBOX_BACKEND` wins if it names a known backend; otherwise X11
    /// when `DISPLAY` is set, else the console.
    pub fn detect() -> Self {
        Self::select(
            std::env::var(BACKEND_ENV).ok().as_deref(),
            std::env::var_os("DISPLAY").is_some_and(|d| !d.is_empty()),
        )
    }

    fn select(requested: Option<&str>, has_display: bool) -> Self {
        if let Some(raw) = requested.filter(|r| !r.trim().is_empty()) {
            match raw.parse() {
                Ok(kind) => return kind,
                Err(e) => tracing::warn!(error = %e, "ignoring backend override"),
            }
        }
        if has_display {
            BackendKind::X11
        } else {
            BackendKind::Console
        }
    }

    /// Construct the adapter for this kind.
    pub fn build(self) -> Box<dyn Backend> {
        match self {
            BackendKind::X11 => Box::new(X11Backend::new()),
            BackendKind::Zenity => Box::new(ZenityBackend::new()),
            BackendKind::Console => Box::new(ConsoleBackend::new()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::X11 => "x11",
            BackendKind::Zenity => "zenity",
            BackendKind::Console => "console",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown backend name.
#[derive(Debug, thiserror::Error)]
#[error("unknown backend {0:?} (expected x11, zenity or console)")]
pub struct UnknownBackend(String);

impl FromStr for BackendKind {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x11" => Ok(BackendKind::X11),
            "zenity" => Ok(BackendKind::Zenity),
            "console" | "tty" => Ok(BackendKind::Console),
            _ => Err(UnknownBackend(s.to_string())),
        }
    }
}

/// The adapter for this process, per [`BackendKind::detect`].
pub fn default_backend() -> Box<dyn Backend> {
    let kind = BackendKind::detect();
    tracing::debug!(backend = %kind, "selected default backend");
    kind.build()
}
