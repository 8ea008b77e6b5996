use std::{cell::Cell, collections::BTreeMap, fmt, rc::Rc};

use crate::console::Console;
use crate::error::MenuError;
use crate::menu::{Action, LoopOutcome, Menu, MenuItem};

/// First id handed to generated choice items.
pub const CHOICE_ID_BASE: u32 = 100;

/// Shows `options` as a one-shot menu titled `"{title}: {text}"` and returns the
/// value paired with the picked label.
///
/// With a `default`, any non-numeric answer returns the default straight away.
///
/// ```no_run
/// use conmenu::{console::LineConsole, menu::build_choice};
///
/// let mut console = LineConsole::stdio();
/// let keep = build_choice(&mut console, "Cleanup", "Keep the logs?", [("Yes", true), ("No", false)], None)?;
/// # Ok::<(), conmenu::error::MenuError>(())
/// ```
pub fn build_choice<V, L, I>(
    console: &mut dyn Console,
    title: &str,
    text: &str,
    options: I,
    default: Option<V>,
) -> Result<V, MenuError>
where
    V: Clone + fmt::Display,
    L: Into<String>,
    I: IntoIterator<Item = (L, V)>,
{
    let mut values: BTreeMap<u32, V> = BTreeMap::new();
    let selected: Rc<Cell<Option<u32>>> = Rc::new(Cell::new(None));
    let mut menu = Menu::new(format!("{title}: {text}"));

    for (id, (label, value)) in (CHOICE_ID_BASE..).zip(options) {
        values.insert(id, value);
        let selected = Rc::clone(&selected);
        let action = Action::new(move |_, _| {
            selected.set(Some(id));
            Ok(())
        });
        menu.add_item(MenuItem::with_action(id, label, action).exit())?;
    }

    if values.is_empty() {
        return Err(MenuError::NoOptions);
    }
    if let Some(default) = default {
        menu.set_default(default);
    }

    match menu.run_loop(console)? {
        LoopOutcome::Bypassed(value) => Ok(value),
        LoopOutcome::Completed => selected
            .get()
            .and_then(|id| values.remove(&id))
            .ok_or(MenuError::NoSelection),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::console::LineConsole;

    fn console(input: &str) -> LineConsole<Cursor<String>, Vec<u8>> {
        LineConsole::new(Cursor::new(input.to_string()), Vec::new())
    }

    #[test]
    fn returns_value_of_selected_position() {
        let mut console = console("1\n");
        let picked = build_choice(&mut console, "T", "txt", [("Yes", true), ("No", false)], None)
            .unwrap();
        assert!(!picked);

        let out = String::from_utf8(console.into_output()).unwrap();
        assert!(out.starts_with("\nT: txt\n0. Yes\n1. No\n"));
    }

    #[test]
    fn default_is_returned_on_non_numeric_input() {
        let mut console = console("abc\n");
        let picked =
            build_choice(&mut console, "T", "txt", [("Yes", "yes")], Some("Yes")).unwrap();
        assert_eq!(picked, "Yes");

        let out = String::from_utf8(console.into_output()).unwrap();
        assert!(out.contains("\tDefault value is: Yes"));
        assert!(!out.contains("Invalid option"));
    }

    #[test]
    fn invalid_answers_are_reprompted_until_a_choice_is_made() {
        let mut console = console("x\n7\n0\n");
        let picked = build_choice(
            &mut console,
            "Colour",
            "pick one",
            vec![("Red".to_string(), 1), ("Blue".to_string(), 2)],
            None,
        )
        .unwrap();
        assert_eq!(picked, 1);
    }

    #[test]
    fn empty_options_fail_fast() {
        let options: Vec<(&str, u8)> = Vec::new();
        let err = build_choice(&mut console(""), "T", "txt", options, None).unwrap_err();
        assert!(matches!(err, MenuError::NoOptions));
    }
}
