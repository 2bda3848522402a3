//! Console backend — the dialog as a prompt on the controlling terminal.
//!
//! Writes the dialog to stderr (stdout stays free for the caller's own
//! output) and reads the choice from stdin. Stdin must be a terminal;
//! piped input is treated as a surface that cannot be created.

use std::io::{self, BufRead, Write};
use std::os::fd::AsFd;

use nix::sys::termios;

use super::{Backend, BackendError};
use crate::dialog::descriptor::{ButtonKind, Category, DialogDescriptor};
use crate::dialog::result::Activation;

/// Terminal prompt implementation of [`Backend`].
#[derive(Debug, Default)]
pub struct ConsoleBackend;

impl ConsoleBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for ConsoleBackend {
    fn name(&self) -> &'static str {
        "console"
    }

    fn probe(&self) -> Result<(), BackendError> {
        termios::tcgetattr(io::stdin().as_fd())
            .map(|_| ())
            .map_err(|e| BackendError::CreationFailed(format!("stdin is not a terminal: {e}")))
    }

    fn present(&self, descriptor: &DialogDescriptor) -> Result<Activation, BackendError> {
        self.probe()?;
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stderr().lock();
        converse(descriptor, &mut input, &mut output)
    }
}

/// Tag printed in front of the title; `None` has no tag.
fn category_tag(category: Category) -> Option<&'static str> {
    match category {
        Category::None => None,
        Category::Info => Some("[info]"),
        Category::Warning => Some("[warning]"),
        Category::Question => Some("[question]"),
        Category::Error => Some("[error]"),
    }
}

/// Render the prompt and read choices until one is valid or input ends.
fn converse<R: BufRead, W: Write>(
    descriptor: &DialogDescriptor,
    input: &mut R,
    output: &mut W,
) -> Result<Activation, BackendError> {
    let buttons = descriptor.buttons();

    let heading: Vec<&str> = category_tag(descriptor.category())
        .into_iter()
        .chain(descriptor.title())
        .collect();
    if !heading.is_empty() {
        writeln!(output, "{}", heading.join(" "))?;
    }
    writeln!(output, "{}", descriptor.message())?;

    let menu: Vec<String> = buttons
        .iter()
        .enumerate()
        .map(|(i, (_, label))| format!("{}) {label}", i + 1))
        .collect();
    writeln!(output, "  {}", menu.join("   "))?;

    let mut line = String::new();
    loop {
        write!(output, "Choice [1]: ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(Activation::Dismissed);
        }

        match parse_choice(&line, &buttons) {
            Some(kind) => return Ok(Activation::Button(kind)),
            None => writeln!(output, "Enter a number from 1 to {}.", buttons.len())?,
        }
    }
}

/// Interpret one line of input against the offered buttons.
///
/// An empty line picks the primary button; otherwise a 1-based number or
/// a label (case-insensitive) is accepted.
fn parse_choice(line: &str, buttons: &[(ButtonKind, &str)]) -> Option<ButtonKind> {
    let choice = line.trim();
    if choice.is_empty() {
        return Some(ButtonKind::Primary);
    }

    if let Ok(n) = choice.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| Activation::from_index(i, buttons))
            .and_then(|activation| match activation {
                Activation::Button(kind) => Some(kind),
                Activation::Dismissed => None,
            });
    }

    let choice = choice.to_lowercase();
    buttons
        .iter()
        .find(|(_, label)| label.to_lowercase() == choice)
        .map(|(kind, _)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn descriptor() -> DialogDescriptor {
        DialogDescriptor::new(
            Some("Files"),
            Some("Delete file?"),
            Some("Delete"),
            Some("Cancel"),
            None,
            Category::Warning,
        )
        .unwrap()
    }

    fn run(input: &str) -> (Activation, String) {
        let mut out = Vec::new();
        let activation = converse(&descriptor(), &mut Cursor::new(input), &mut out).unwrap();
        (activation, String::from_utf8(out).unwrap())
    }

    // -- Choice parsing --

    #[test]
    fn empty_line_is_primary() {
        let d = descriptor();
        assert_eq!(parse_choice("\n", &d.buttons()), Some(ButtonKind::Primary));
    }

    #[test]
    fn numbers_follow_menu_order() {
        let d = descriptor();
        assert_eq!(parse_choice("1", &d.buttons()), Some(ButtonKind::Primary));
        assert_eq!(parse_choice(" 2 ", &d.buttons()), Some(ButtonKind::Cancel));
        assert_eq!(parse_choice("3", &d.buttons()), None);
        assert_eq!(parse_choice("0", &d.buttons()), None);
    }

    #[test]
    fn labels_match_case_insensitively() {
        let d = descriptor();
        assert_eq!(parse_choice("cancel", &d.buttons()), Some(ButtonKind::Cancel));
        assert_eq!(parse_choice("DELETE", &d.buttons()), Some(ButtonKind::Primary));
        assert_eq!(parse_choice("maybe", &d.buttons()), None);
    }

    // -- Conversation --

    #[test]
    fn renders_heading_message_and_menu() {
        let (_, out) = run("1\n");
        assert!(out.starts_with("[warning] Files\nDelete file?\n"));
        assert!(out.contains("1) Delete   2) Cancel"));
    }

    #[test]
    fn reprompts_on_invalid_input() {
        let (activation, out) = run("7\nnope\n2\n");
        assert_eq!(activation, Activation::Button(ButtonKind::Cancel));
        assert_eq!(out.matches("Enter a number from 1 to 2.").count(), 2);
    }

    #[test]
    fn eof_is_dismissal() {
        let (activation, _) = run("");
        assert_eq!(activation, Activation::Dismissed);
    }

    #[test]
    fn no_heading_without_title_or_category() {
        let d = DialogDescriptor::new(None, Some("Hi"), Some("OK"), None, None, Category::None)
            .unwrap();
        let mut out = Vec::new();
        converse(&d, &mut Cursor::new("\n"), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("Hi\n"));
    }
}
