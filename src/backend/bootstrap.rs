//! Process-wide toolkit bootstrap.
//!
//! Some toolkits need a one-time setup (a display connection, an
//! application object) before any window can exist. [`Bootstrap`] runs
//! that setup at most once per process, on first use, no matter how many
//! dialogs are shown or from how many threads. Concurrent first callers
//! block until the winner finishes. A failed setup is cached too, so a
//! broken environment is reported the same way on every show without
//! retrying.

use std::sync::OnceLock;

use super::BackendError;

/// Lazily initialized, process-lifetime toolkit state.
///
/// Intended for `static` items:
///
/// ```ignore
/// static DISPLAY: Bootstrap<Display> = Bootstrap::new("x11");
/// let display = DISPLAY.get_or_init(Display::connect)?;
/// ```
pub struct Bootstrap<T> {
    toolkit: &'static str,
    cell: OnceLock<Result<T, String>>,
}

impl<T> Bootstrap<T> {
    pub const fn new(toolkit: &'static str) -> Self {
        Self {
            toolkit,
            cell: OnceLock::new(),
        }
    }

    /// Return the toolkit state, running `init` if this is the first call
    /// in the process.
    ///
    /// Errors from `init` (and every later call after a failed init) come
    /// back as [`BackendError::Unavailable`].
    pub fn get_or_init<F>(&self, init: F) -> Result<&T, BackendError>
    where
        F: FnOnce() -> Result<T, BackendError>,
    {
        let outcome = self.cell.get_or_init(|| {
            tracing::debug!(toolkit = self.toolkit, "bootstrapping toolkit");
            match init() {
                Ok(state) => {
                    tracing::info!(toolkit = self.toolkit, "toolkit ready");
                    Ok(state)
                }
                Err(e) => {
                    tracing::warn!(toolkit = self.toolkit, error = %e, "toolkit bootstrap failed");
                    Err(e.to_string())
                }
            }
        });

        outcome
            .as_ref()
            .map_err(|e| BackendError::Unavailable(format!("{}: {e}", self.toolkit)))
    }

    /// Whether bootstrap has already run (successfully or not).
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}
