//! Native modal message dialogs behind one small contract.
//!
//! A [`Dialog`] is created empty, initialized once with its text, button
//! labels and [`Category`], then shown any number of times. Each show blocks
//! until the user dismisses the dialog and returns a [`UserResult`] that is
//! the same on every platform backend.
//!
//! ```no_run
//! use alertbox::{Category, Dialog, InitResult, UserResult};
//!
//! let mut dialog = Dialog::new();
//! let init = dialog.initialize(
//!     None,
//!     Some("Delete file?"),
//!     Some("Delete"),
//!     Some("Cancel"),
//!     None,
//!     Category::Warning,
//! );
//! assert_eq!(init, InitResult::Success);
//! if dialog.show() == UserResult::Primary {
//!     // delete it
//! }
//! dialog.destroy();
//! ```

pub mod backend;
pub mod dialog;

pub use backend::{Backend, BackendError, BackendKind};
pub use dialog::descriptor::{ButtonKind, Category, DialogDescriptor};
pub use dialog::result::{Activation, UserResult};
pub use dialog::{ConfigError, Dialog, DialogId, DialogState, InitResult, ShowError};
