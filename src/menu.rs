use std::{cell::RefCell, fmt, num::IntErrorKind, rc::Rc};

use tracing::{debug, warn};

use crate::console::Console;
use crate::error::MenuError;

mod choice;
mod definition;
mod item;

pub use choice::{build_choice, CHOICE_ID_BASE};
pub use definition::{render_args, ItemDefinition, ItemTarget, MenuDefinition};
pub use item::{Action, ActionArgs, Attachment, MenuItem, SharedMenu, Step};

pub const DEFAULT_PROMPT: &str = "Select Option: ";

/// How a call to [`Menu::run_loop`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopOutcome<V> {
    /// An exit item ran.
    Completed,
    /// Non-numeric input while a default was set.
    Bypassed(V),
}

type RefreshHook<V> = Box<dyn FnMut(&mut Menu<V>)>;

enum Selection {
    Item(usize),
    Hidden,
    Missing,
    NotANumber,
}

/// A numbered menu.
///
/// Items are listed by their position in the item list, not by id. Positions are
/// recomputed on every render, so removing or inserting items between renders
/// renumbers everything after the change. Hidden items keep their position but are
/// not printed and cannot be picked.
pub struct Menu<V> {
    title: String,
    items: Vec<MenuItem<V>>,
    default: Option<V>,
    prompt: String,
    refresh: Option<RefreshHook<V>>,
}

impl<V> Menu<V> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
            default: None,
            prompt: DEFAULT_PROMPT.to_string(),
            refresh: None,
        }
    }

    /// Creates the menu and immediately populates it with `initialise`.
    pub fn build<F>(title: impl Into<String>, initialise: F) -> Result<Self, MenuError>
    where
        F: FnOnce(&mut Self) -> Result<(), MenuError>,
    {
        let mut menu = Self::new(title);
        initialise(&mut menu)?;
        Ok(menu)
    }

    pub fn shared(self) -> SharedMenu<V> {
        Rc::new(RefCell::new(self))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn default_value(&self) -> Option<&V> {
        self.default.as_ref()
    }

    pub fn set_default(&mut self, value: V) {
        self.default = Some(value);
    }

    pub fn clear_default(&mut self) -> Option<V> {
        self.default.take()
    }

    /// Installs a hook that runs before every render and may change items or default.
    pub fn on_refresh<F>(&mut self, hook: F)
    where
        F: FnMut(&mut Menu<V>) + 'static,
    {
        self.refresh = Some(Box::new(hook));
    }

    pub fn items(&self) -> &[MenuItem<V>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self, id: u32) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn item(&self, id: u32) -> Option<&MenuItem<V>> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn item_mut(&mut self, id: u32) -> Option<&mut MenuItem<V>> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub fn add_item(&mut self, item: MenuItem<V>) -> Result<(), MenuError> {
        if self.items.contains(&item) {
            return Err(MenuError::DuplicateItem { id: item.id() });
        }
        self.items.push(item);
        Ok(())
    }

    pub fn add_hidden_item(&mut self, item: MenuItem<V>) -> Result<(), MenuError> {
        self.add_item(item.hidden())
    }

    /// Removes the item; everything after it moves up one position.
    pub fn remove_item(&mut self, id: u32) -> Option<MenuItem<V>> {
        let index = self.position(id)?;
        Some(self.items.remove(index))
    }

    /// Returns `false` (and logs) when no item has this id.
    pub fn show_item(&mut self, id: u32) -> bool {
        self.set_visible(id, true)
    }

    /// Returns `false` (and logs) when no item has this id.
    pub fn hide_item(&mut self, id: u32) -> bool {
        self.set_visible(id, false)
    }

    fn set_visible(&mut self, id: u32, visible: bool) -> bool {
        let verb = if visible { "showing" } else { "hiding" };
        let Some(item) = self.item_mut(id) else {
            warn!(
                menu = %self.title,
                id,
                "error {verb} menu item: item hasn't been added to this menu"
            );
            return false;
        };
        if visible {
            item.show();
        } else {
            item.hide();
        }
        true
    }

    fn refresh(&mut self) {
        if let Some(mut hook) = self.refresh.take() {
            hook(self);
            // the hook may have installed a replacement for itself
            if self.refresh.is_none() {
                self.refresh = Some(hook);
            }
        }
    }

    fn select(&self, input: &str) -> Selection {
        let index = match input.trim().parse::<i64>() {
            Ok(index) => index,
            // a well-formed integer, just too large to index anything
            Err(err)
                if matches!(
                    err.kind(),
                    IntErrorKind::PosOverflow | IntErrorKind::NegOverflow
                ) =>
            {
                return Selection::Missing;
            }
            Err(_) => return Selection::NotANumber,
        };
        let found = usize::try_from(index)
            .ok()
            .and_then(|position| self.items.get(position).map(|item| (position, item)));
        match found {
            None => Selection::Missing,
            Some((_, item)) if !item.is_visible() => Selection::Hidden,
            Some((position, _)) => Selection::Item(position),
        }
    }
}

impl<V: Clone + fmt::Display> Menu<V> {
    fn render(&self, console: &mut dyn Console) -> Result<(), MenuError> {
        console.write_line("")?;
        console.write_line(&self.title)?;
        if let Some(default) = &self.default {
            console.write_line(&format!("\tDefault value is: {default}"))?;
        }
        for (index, item) in self.items.iter().enumerate() {
            if item.is_visible() {
                console.write_line(&format!("{index}. {}", item.label()))?;
            }
        }
        Ok(())
    }

    /// Renders, reads and dispatches until an exit item runs or the default is taken.
    ///
    /// Bad input never ends the loop: it is reported on the console and the menu
    /// is shown again. Non-numeric input with a default set is the one exception
    /// and returns [`LoopOutcome::Bypassed`].
    pub fn run_loop(&mut self, console: &mut dyn Console) -> Result<LoopOutcome<V>, MenuError> {
        loop {
            self.refresh();
            self.render(console)?;

            let input = console.read_line(&self.prompt)?;
            let message = match self.select(&input) {
                Selection::Item(index) => {
                    let item = &mut self.items[index];
                    debug!(menu = %self.title, id = item.id(), index, "dispatching menu item");
                    match item.run(console)? {
                        Step::Continue => continue,
                        Step::Exit => return Ok(LoopOutcome::Completed),
                        Step::Bypass(value) => return Ok(LoopOutcome::Bypassed(value)),
                    }
                }
                Selection::Hidden => format!("Invalid option. Option at {input} is hidden."),
                Selection::Missing => format!("Invalid option. Option {input} doesn't exist."),
                Selection::NotANumber => {
                    if let Some(default) = &self.default {
                        debug!(menu = %self.title, "non-numeric input, taking default");
                        return Ok(LoopOutcome::Bypassed(default.clone()));
                    }
                    format!("Invalid option, you need to enter a number. {input}")
                }
            };
            console.write_line(&message)?;
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Menu<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Menu")
            .field("title", &self.title)
            .field("items", &self.items)
            .field("default", &self.default)
            .field("prompt", &self.prompt)
            .finish_non_exhaustive()
    }
}
