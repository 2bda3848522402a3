use alertbox::{BackendKind, Category, UserResult};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "alertbox", about = "Show native modal message dialogs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show a dialog and print which button was chosen
    Show {
        /// Body text
        #[arg(long, short)]
        message: String,

        /// Primary (ok/action) button label
        #[arg(long, default_value = "OK")]
        primary: String,

        /// Window title
        #[arg(long, short)]
        title: Option<String>,

        /// Cancel button label; no cancel button if omitted
        #[arg(long)]
        cancel: Option<String>,

        /// Alternate button label; no alternate button if omitted
        #[arg(long)]
        alternate: Option<String>,

        /// none, info, warning, question or error
        #[arg(long, short, default_value = "none")]
        category: Category,

        /// x11, zenity or console (default: $ALERTBOX_BACKEND, then auto-detect)
        #[arg(long, short)]
        backend: Option<BackendKind>,
    },

    /// Check whether a backend can present dialogs
    Probe {
        /// x11, zenity or console (default: $ALERTBOX_BACKEND, then auto-detect)
        #[arg(long, short)]
        backend: Option<BackendKind>,
    },
}

/// Process exit status reported for each result.
pub fn exit_code(result: UserResult) -> i32 {
    match result {
        UserResult::Primary => 0,
        UserResult::Cancel => 1,
        UserResult::Alternate => 2,
        UserResult::NoResponse => 3,
    }
}
