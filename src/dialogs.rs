//! Line-based dialogs for terminals without a full-screen toolkit.

use std::{fmt, io, iter};

use crate::console::Console;
use crate::error::MenuError;
use crate::menu::build_choice;

pub const CANCEL_LABEL: &str = "Cancel";

pub fn message_box(console: &mut dyn Console, title: &str, text: &str) -> io::Result<()> {
    console.write_line(&format!("{}: {text}", title.to_uppercase()))
}

pub fn input_dialog(console: &mut dyn Console, title: &str, text: &str) -> io::Result<String> {
    console.write_line(&title.to_uppercase())?;
    console.read_line(&format!("{text}: "))
}

/// Anything but `n` counts as yes.
pub fn confirm(console: &mut dyn Console, title: &str, text: &str) -> io::Result<bool> {
    console.write_line(&title.to_uppercase())?;
    let answer = console.read_line(&format!("{text} (Y/n): "))?;
    Ok(!answer.trim().eq_ignore_ascii_case("n"))
}

pub fn buttons_dialog<V, L, I>(
    console: &mut dyn Console,
    title: &str,
    text: &str,
    buttons: I,
) -> Result<V, MenuError>
where
    V: Clone + fmt::Display,
    L: Into<String>,
    I: IntoIterator<Item = (L, V)>,
{
    build_choice(console, title, text, buttons, None)
}

/// Like [`buttons_dialog`] with an extra cancel entry; cancelling yields `None`.
pub fn radio_dialog<V, L, I>(
    console: &mut dyn Console,
    title: &str,
    text: &str,
    buttons: I,
) -> Result<Option<V>, MenuError>
where
    L: Into<String>,
    I: IntoIterator<Item = (L, V)>,
{
    let (labels, mut values): (Vec<String>, Vec<V>) = buttons
        .into_iter()
        .map(|(label, value)| (label.into(), value))
        .unzip();
    let cancel = values.len();

    let options = labels
        .into_iter()
        .enumerate()
        .map(|(index, label)| (label, index))
        .chain(iter::once((CANCEL_LABEL.to_string(), cancel)));

    let picked = build_choice(console, title, text, options, None)?;
    if picked == cancel {
        return Ok(None);
    }
    Ok(Some(values.swap_remove(picked)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::console::LineConsole;

    type TestConsole = LineConsole<Cursor<String>, Vec<u8>>;

    fn console(input: &str) -> TestConsole {
        LineConsole::new(Cursor::new(input.to_string()), Vec::new())
    }

    fn output(console: TestConsole) -> String {
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn message_box_upper_cases_title() {
        let mut console = console("");
        message_box(&mut console, "Saved", "all done").unwrap();
        assert_eq!(output(console), "SAVED: all done\n");
    }

    #[test]
    fn input_dialog_prompts_with_text() {
        let mut console = console("alice\n");
        let name = input_dialog(&mut console, "Login", "User name").unwrap();
        assert_eq!(name, "alice");
        assert_eq!(output(console), "LOGIN\nUser name: ");
    }

    #[test]
    fn confirm_only_rejects_n() {
        for (answer, expected) in [("n", false), ("N", false), ("", true), ("y", true), ("no", true)] {
            let mut console = console(&format!("{answer}\n"));
            assert_eq!(confirm(&mut console, "Delete", "Sure?").unwrap(), expected, "{answer:?}");
        }
    }

    #[test]
    fn buttons_dialog_returns_button_value() {
        let mut console = console("2\n");
        let picked =
            buttons_dialog(&mut console, "Save", "format", [("json", 1), ("toml", 2), ("yaml", 3)])
                .unwrap();
        assert_eq!(picked, 3);
    }

    #[test]
    fn radio_dialog_appends_cancel() {
        let mut console = console("1\n");
        let picked = radio_dialog(&mut console, "Size", "pick", [("Small", 'S')]).unwrap();
        assert_eq!(picked, None);
        assert!(output(console).contains("1. Cancel"));

        let mut console = self::console("0\n");
        let picked = radio_dialog(&mut console, "Size", "pick", [("Small", 'S')]).unwrap();
        assert_eq!(picked, Some('S'));
    }
}
