//! Zenity backend — GTK dialogs through the `zenity` program.
//!
//! Runs `zenity` synchronously (`std::process::Command`) and maps its
//! exit status and stdout back onto an [`Activation`].
//!
//! Zenity only has a cancel button in `--question` mode, so a dialog that
//! offers one is always shown as a question and its category is carried by
//! `--icon-name` instead. `--question` always draws a second button, so a
//! dialog without a cancel button never uses it: a question is then shown
//! in `--info` mode with the question icon. Otherwise the category picks the
//! mode directly; `Category::None` uses `--info`, the plainest mode.
//!
//! No `--timeout` is ever passed, so zenity's timeout status (5) is treated
//! like any other unexpected status.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::{Backend, BackendError};
use crate::dialog::descriptor::{ButtonKind, Category, DialogDescriptor};
use crate::dialog::result::Activation;

/// Zenity implementation of [`Backend`].
#[derive(Debug, Clone)]
pub struct ZenityBackend {
    program: PathBuf,
}

impl ZenityBackend {
    /// Use `zenity` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("zenity")
    }

    /// Use a specific zenity-compatible executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn spawn_error(&self, e: std::io::Error) -> BackendError {
        BackendError::Unavailable(format!("failed to run {}: {e}", self.program.display()))
    }
}

impl Default for ZenityBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for ZenityBackend {
    fn name(&self) -> &'static str {
        "zenity"
    }

    fn probe(&self) -> Result<(), BackendError> {
        let status = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| self.spawn_error(e))?;

        if status.success() {
            Ok(())
        } else {
            Err(BackendError::Unavailable(format!(
                "{} --version exited with status {status}",
                self.program.display()
            )))
        }
    }

    fn present(&self, descriptor: &DialogDescriptor) -> Result<Activation, BackendError> {
        let output = Command::new(&self.program)
            .args(build_args(descriptor))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let result = interpret(output.status.code(), &stdout, descriptor);
        if let Err(e) = &result {
            tracing::debug!(
                error = %e,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "zenity failed"
            );
        }
        result
    }
}

/// Zenity dialog mode and icon override for a category when no cancel
/// button is offered. Never `--question`, which adds its own "No" button.
fn mode(category: Category) -> (&'static str, Option<&'static str>) {
    match category {
        Category::None | Category::Info => ("--info", None),
        Category::Warning => ("--warning", None),
        Category::Error => ("--error", None),
        Category::Question => ("--info", icon_name(Category::Question)),
    }
}

/// Freedesktop icon name nearest to a category.
fn icon_name(category: Category) -> Option<&'static str> {
    match category {
        Category::None => None,
        Category::Info => Some("dialog-information"),
        Category::Warning => Some("dialog-warning"),
        Category::Question => Some("dialog-question"),
        Category::Error => Some("dialog-error"),
    }
}

/// Command-line arguments for presenting `descriptor`.
fn build_args(descriptor: &DialogDescriptor) -> Vec<String> {
    let category = descriptor.category();
    let mut args = Vec::new();

    match descriptor.cancel_label() {
        Some(cancel) => {
            args.push("--question".to_string());
            if category != Category::Question
                && let Some(icon) = icon_name(category)
            {
                args.push(format!("--icon-name={icon}"));
            }
            args.push(format!("--cancel-label={cancel}"));
        }
        None => {
            let (flag, icon) = mode(category);
            args.push(flag.to_string());
            if let Some(icon) = icon {
                args.push(format!("--icon-name={icon}"));
            }
        }
    }

    args.push("--no-markup".to_string());
    if let Some(title) = descriptor.title() {
        args.push(format!("--title={title}"));
    }
    args.push(format!("--text={}", descriptor.message()));
    args.push(format!("--ok-label={}", descriptor.primary_label()));
    if let Some(alternate) = descriptor.alternate_label() {
        args.push(format!("--extra-button={alternate}"));
    }

    args
}

/// Map zenity's exit status and stdout onto an activation.
///
/// Zenity exits 1 both for the cancel button and for closing the window,
/// and prints an extra button's label before exiting 1.
fn interpret(
    code: Option<i32>,
    stdout: &str,
    descriptor: &DialogDescriptor,
) -> Result<Activation, BackendError> {
    match code {
        Some(0) => Ok(Activation::Button(ButtonKind::Primary)),
        Some(1) => {
            let printed = stdout.trim_end_matches(['\n', '\r']);
            if !printed.is_empty() && descriptor.alternate_label() == Some(printed) {
                Ok(Activation::Button(ButtonKind::Alternate))
            } else if descriptor.offers(ButtonKind::Cancel) {
                Ok(Activation::Button(ButtonKind::Cancel))
            } else {
                Ok(Activation::Dismissed)
            }
        }
        Some(other) => Err(BackendError::CreationFailed(format!(
            "zenity exited with status {other}"
        ))),
        None => Err(BackendError::Interrupted(
            "zenity terminated by signal".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(
        cancel: Option<&str>,
        alternate: Option<&str>,
        category: Category,
    ) -> DialogDescriptor {
        DialogDescriptor::new(
            Some("Title"),
            Some("Delete file?"),
            Some("Delete"),
            cancel,
            alternate,
            category,
        )
        .unwrap()
    }

    // -- Arguments --

    #[test]
    fn cancel_forces_question_mode_with_icon() {
        let args = build_args(&descriptor(Some("Keep"), None, Category::Warning));
        assert_eq!(args[0], "--question");
        assert!(args.contains(&"--icon-name=dialog-warning".to_string()));
        assert!(args.contains(&"--cancel-label=Keep".to_string()));
    }

    #[test]
    fn question_category_needs_no_icon() {
        let args = build_args(&descriptor(Some("No"), None, Category::Question));
        assert_eq!(args[0], "--question");
        assert!(!args.iter().any(|a| a.starts_with("--icon-name")));
    }

    #[test]
    fn category_selects_mode_without_cancel() {
        assert_eq!(build_args(&descriptor(None, None, Category::Error))[0], "--error");
        assert_eq!(build_args(&descriptor(None, None, Category::None))[0], "--info");
        assert_eq!(
            build_args(&descriptor(None, None, Category::Warning))[0],
            "--warning"
        );

        let question = build_args(&descriptor(None, Some("Maybe"), Category::Question));
        assert_eq!(question[0], "--info");
        assert!(question.contains(&"--icon-name=dialog-question".to_string()));
    }

    #[test]
    fn question_mode_only_with_cancel_label() {
        for category in [
            Category::None,
            Category::Info,
            Category::Warning,
            Category::Question,
            Category::Error,
        ] {
            for cancel in [None, Some("Keep")] {
                for alternate in [None, Some("Later")] {
                    let args = build_args(&descriptor(cancel, alternate, category));
                    let question = args.iter().any(|a| a == "--question");
                    let cancel_label = args.iter().any(|a| a.starts_with("--cancel-label="));
                    assert_eq!(question, cancel_label, "{category} {args:?}");
                }
            }
        }
    }

    #[test]
    fn text_and_labels_passed_literally() {
        let args = build_args(&descriptor(None, Some("Later"), Category::Info));
        assert!(args.contains(&"--no-markup".to_string()));
        assert!(args.contains(&"--title=Title".to_string()));
        assert!(args.contains(&"--text=Delete file?".to_string()));
        assert!(args.contains(&"--ok-label=Delete".to_string()));
        assert!(args.contains(&"--extra-button=Later".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--cancel-label")));
    }

    // -- Exit status --

    #[test]
    fn exit_zero_is_primary() {
        let d = descriptor(Some("Cancel"), None, Category::None);
        assert_eq!(
            interpret(Some(0), "", &d).unwrap(),
            Activation::Button(ButtonKind::Primary)
        );
    }

    #[test]
    fn extra_button_label_is_alternate() {
        let d = descriptor(Some("Cancel"), Some("Later"), Category::None);
        assert_eq!(
            interpret(Some(1), "Later\n", &d).unwrap(),
            Activation::Button(ButtonKind::Alternate)
        );
    }

    #[test]
    fn exit_one_is_cancel_or_dismissal() {
        let with_cancel = descriptor(Some("Cancel"), None, Category::None);
        assert_eq!(
            interpret(Some(1), "", &with_cancel).unwrap(),
            Activation::Button(ButtonKind::Cancel)
        );

        let without_cancel = descriptor(None, Some("Later"), Category::None);
        assert_eq!(
            interpret(Some(1), "", &without_cancel).unwrap(),
            Activation::Dismissed
        );
    }

    #[test]
    fn other_status_is_failure() {
        let d = descriptor(None, None, Category::None);
        assert!(matches!(
            interpret(Some(255), "", &d),
            Err(BackendError::CreationFailed(_))
        ));
        // 5 is zenity's timeout status; no timeout is ever requested.
        assert!(matches!(
            interpret(Some(5), "", &d),
            Err(BackendError::CreationFailed(_))
        ));
        assert!(matches!(
            interpret(None, "", &d),
            Err(BackendError::Interrupted(_))
        ));
    }

    // -- Process --

    #[test]
    fn missing_program_is_unavailable() {
        let b = ZenityBackend::with_program("/nonexistent/alertbox-zenity");
        let d = descriptor(None, None, Category::None);
        assert!(matches!(b.present(&d), Err(BackendError::Unavailable(_))));
        assert!(matches!(b.probe(), Err(BackendError::Unavailable(_))));
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_drives_activation() {
        let d = descriptor(Some("Cancel"), None, Category::Question);
        assert_eq!(
            ZenityBackend::with_program("true").present(&d).unwrap(),
            Activation::Button(ButtonKind::Primary)
        );
        assert_eq!(
            ZenityBackend::with_program("false").present(&d).unwrap(),
            Activation::Button(ButtonKind::Cancel)
        );
    }
}
