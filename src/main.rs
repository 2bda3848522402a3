mod cli;

use alertbox::{BackendKind, Dialog, UserResult};
use clap::Parser;
use cli::{Cli, Command};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Show {
            message,
            primary,
            title,
            cancel,
            alternate,
            category,
            backend,
        } => {
            let kind = backend.unwrap_or_else(BackendKind::detect);
            let mut dialog = Dialog::with_backend(kind.build());

            if let Err(e) = dialog.try_initialize(
                title.as_deref(),
                Some(message.as_str()),
                Some(primary.as_str()),
                cancel.as_deref(),
                alternate.as_deref(),
                category,
            ) {
                tracing::error!(error = %e, "invalid dialog");
                eprintln!("alertbox show: {e}");
                std::process::exit(cli::exit_code(UserResult::NoResponse));
            }

            let result = match dialog.try_show() {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(backend = %kind, error = %e, "show failed");
                    eprintln!("alertbox show: {e}");
                    UserResult::NoResponse
                }
            };
            dialog.destroy();

            println!("{result}");
            std::process::exit(cli::exit_code(result));
        }
        Command::Probe { backend } => {
            let kind = backend.unwrap_or_else(BackendKind::detect);
            match kind.build().probe() {
                Ok(()) => println!("{kind}: ready"),
                Err(e) => {
                    tracing::error!(backend = %kind, error = %e, "probe failed");
                    eprintln!("alertbox probe: {kind}: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}
