//! Dialog descriptor — the validated configuration captured at
//! initialization.
//!
//! A descriptor only exists once validation has passed, so every backend
//! can rely on a non-empty message and primary label.

use std::fmt;
use std::str::FromStr;

use super::ConfigError;

/// Severity or intent of a dialog, used to select iconography.
///
/// Backends without an exact match substitute their nearest equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    /// A blank message box.
    #[default]
    None,
    /// An information alert.
    Info,
    /// A warning.
    Warning,
    /// A question to the user.
    Question,
    /// An error report.
    Error,
}

impl Category {
    /// Lowercase name, as accepted on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::None => "none",
            Category::Info => "info",
            Category::Warning => "warning",
            Category::Question => "question",
            Category::Error => "error",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown category name.
#[derive(Debug, thiserror::Error)]
#[error("unknown category {0:?} (expected none, info, warning, question or error)")]
pub struct UnknownCategory(String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Category::None),
            "info" => Ok(Category::Info),
            "warning" | "warn" => Ok(Category::Warning),
            "question" => Ok(Category::Question),
            "error" => Ok(Category::Error),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// One of the three buttons a dialog can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonKind {
    Primary,
    Cancel,
    Alternate,
}

/// Immutable dialog configuration.
///
/// Constructed only through [`DialogDescriptor::new`], which enforces that
/// `message` and `primary_label` are present. Optional labels that are
/// absent (or empty) mean the corresponding button is not offered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogDescriptor {
    title: Option<String>,
    message: String,
    primary_label: String,
    cancel_label: Option<String>,
    alternate_label: Option<String>,
    category: Category,
}

impl DialogDescriptor {
    /// Validate the inputs and build a descriptor.
    ///
    /// Empty strings count as absent: an empty `message` or
    /// `primary_label` is rejected, an empty optional field disables its
    /// element.
    pub fn new(
        title: Option<&str>,
        message: Option<&str>,
        primary_label: Option<&str>,
        cancel_label: Option<&str>,
        alternate_label: Option<&str>,
        category: Category,
    ) -> Result<Self, ConfigError> {
        let message = present(message).ok_or(ConfigError::MissingMessage)?;
        let primary_label = present(primary_label).ok_or(ConfigError::MissingPrimaryLabel)?;

        Ok(Self {
            title: present(title),
            message,
            primary_label,
            cancel_label: present(cancel_label),
            alternate_label: present(alternate_label),
            category,
        })
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn primary_label(&self) -> &str {
        &self.primary_label
    }

    pub fn cancel_label(&self) -> Option<&str> {
        self.cancel_label.as_deref()
    }

    pub fn alternate_label(&self) -> Option<&str> {
        self.alternate_label.as_deref()
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Label of `kind`, or `None` if that button is not offered.
    pub fn label(&self, kind: ButtonKind) -> Option<&str> {
        match kind {
            ButtonKind::Primary => Some(&self.primary_label),
            ButtonKind::Cancel => self.cancel_label(),
            ButtonKind::Alternate => self.alternate_label(),
        }
    }

    /// Whether a button of `kind` is offered.
    pub fn offers(&self, kind: ButtonKind) -> bool {
        self.label(kind).is_some()
    }

    /// Offered buttons in canonical order: primary, cancel, alternate.
    ///
    /// Backends rearrange this into their own visual convention.
    pub fn buttons(&self) -> Vec<(ButtonKind, &str)> {
        [ButtonKind::Primary, ButtonKind::Cancel, ButtonKind::Alternate]
            .into_iter()
            .filter_map(|kind| self.label(kind).map(|label| (kind, label)))
            .collect()
    }
}

fn present(text: Option<&str>) -> Option<String> {
    text.filter(|t| !t.is_empty()).map(str::to_owned)
}
