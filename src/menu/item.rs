use std::{
    cell::RefCell,
    fmt,
    hash::{Hash, Hasher},
    rc::Rc,
};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::console::Console;
use crate::error::MenuError;
use crate::menu::{LoopOutcome, Menu};

/// A submenu link. The item does not own the menu; several items may point at it.
pub type SharedMenu<V> = Rc<RefCell<Menu<V>>>;

/// Arguments bound to an action when the item is created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionArgs {
    pub positional: Vec<Value>,
    pub named: Map<String, Value>,
}

impl ActionArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

type Callable = Box<dyn FnMut(&mut dyn Console, &ActionArgs) -> anyhow::Result<()>>;

pub struct Action {
    callable: Callable,
    args: ActionArgs,
}

impl Action {
    pub fn new<F>(callable: F) -> Self
    where
        F: FnMut(&mut dyn Console, &ActionArgs) -> anyhow::Result<()> + 'static,
    {
        Self {
            callable: Box::new(callable),
            args: ActionArgs::default(),
        }
    }

    pub fn with_args(mut self, args: ActionArgs) -> Self {
        self.args = args;
        self
    }

    pub fn args(&self) -> &ActionArgs {
        &self.args
    }

    /// Calls the action with its bound arguments. If that fails the action gets
    /// exactly one more attempt with no arguments; only the second error is returned.
    fn invoke(&mut self, id: u32, console: &mut dyn Console) -> anyhow::Result<()> {
        match (self.callable)(console, &self.args) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(id, error = %err, "menu action failed, retrying without arguments");
                (self.callable)(console, &ActionArgs::default())
            }
        }
    }
}

pub enum Attachment<V> {
    None,
    Action(Action),
    Submenu(SharedMenu<V>),
}

impl<V> Attachment<V> {
    fn kind(&self) -> &'static str {
        match self {
            Attachment::None => "none",
            Attachment::Action(_) => "action",
            Attachment::Submenu(_) => "submenu",
        }
    }
}

/// What the owning loop should do after an item ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<V> {
    Continue,
    Exit,
    /// A nested loop gave up on input and surfaced its default.
    Bypass(V),
}

impl<V> Step<V> {
    pub fn should_continue(&self) -> bool {
        matches!(self, Step::Continue)
    }
}

pub struct MenuItem<V> {
    id: u32,
    label: String,
    visible: bool,
    is_exit: bool,
    attachment: Attachment<V>,
}

impl<V> MenuItem<V> {
    pub fn new(id: u32, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            visible: true,
            is_exit: false,
            attachment: Attachment::None,
        }
    }

    pub fn with_action(id: u32, label: impl Into<String>, action: Action) -> Self {
        Self {
            attachment: Attachment::Action(action),
            ..Self::new(id, label)
        }
    }

    pub fn with_submenu(id: u32, label: impl Into<String>, menu: SharedMenu<V>) -> Self {
        Self {
            attachment: Attachment::Submenu(menu),
            ..Self::new(id, label)
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_exit(&self) -> bool {
        self.is_exit
    }

    pub fn attachment(&self) -> &Attachment<V> {
        &self.attachment
    }

    pub fn hide(&mut self) -> &mut Self {
        self.visible = false;
        self
    }

    pub fn show(&mut self) -> &mut Self {
        self.visible = true;
        self
    }

    pub fn mark_exit(&mut self) -> &mut Self {
        self.is_exit = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hide();
        self
    }

    pub fn exit(mut self) -> Self {
        self.mark_exit();
        self
    }
}

impl<V: Clone + fmt::Display> MenuItem<V> {
    /// Runs the attached action or submenu loop and reports whether the owning
    /// loop keeps going.
    ///
    /// A submenu that is already running further up the stack cannot be opened a
    /// second time; that is reported on the console and the owning loop continues.
    pub fn run(&mut self, console: &mut dyn Console) -> Result<Step<V>, MenuError> {
        let id = self.id;
        match &mut self.attachment {
            Attachment::None => {}
            Attachment::Action(action) => {
                action
                    .invoke(id, console)
                    .map_err(|err| MenuError::Action {
                        id,
                        source: err.into(),
                    })?;
            }
            Attachment::Submenu(menu) => {
                let Ok(mut menu) = menu.try_borrow_mut() else {
                    debug!(id, "submenu already on the stack");
                    console.write_line(&format!(
                        "Invalid option. {} is already open.",
                        self.label
                    ))?;
                    return Ok(Step::Continue);
                };
                if let LoopOutcome::Bypassed(value) = menu.run_loop(console)? {
                    return Ok(Step::Bypass(value));
                }
            }
        }

        Ok(if self.is_exit { Step::Exit } else { Step::Continue })
    }
}

impl<V> PartialEq for MenuItem<V> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<V> Eq for MenuItem<V> {}

impl<V> Hash for MenuItem<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<V> fmt::Debug for MenuItem<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("visible", &self.visible)
            .field("is_exit", &self.is_exit)
            .field("attachment", &self.attachment.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, collections::HashSet, io::Cursor};

    use anyhow::bail;

    use crate::console::LineConsole;

    fn console() -> LineConsole<Cursor<String>, Vec<u8>> {
        LineConsole::new(Cursor::new(String::new()), Vec::new())
    }

    #[test]
    fn equality_and_hash_use_id_only() {
        let a: MenuItem<String> = MenuItem::new(7, "first");
        let b: MenuItem<String> = MenuItem::new(7, "second").hidden().exit();
        let c: MenuItem<String> = MenuItem::new(8, "first");
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn visibility_and_exit_toggles_are_idempotent() {
        let mut item: MenuItem<String> = MenuItem::new(1, "x");
        item.hide().hide();
        assert!(!item.is_visible());
        item.show().show().mark_exit().mark_exit();
        assert!(item.is_visible());
        assert!(item.is_exit());
    }

    #[test]
    fn item_without_attachment_is_a_noop() {
        let mut plain: MenuItem<String> = MenuItem::new(1, "plain");
        assert_eq!(plain.run(&mut console()).unwrap(), Step::Continue);

        let mut exit: MenuItem<String> = MenuItem::new(2, "quit").exit();
        let step = exit.run(&mut console()).unwrap();
        assert_eq!(step, Step::Exit);
        assert!(!step.should_continue());
    }

    #[test]
    fn action_receives_bound_arguments() {
        let seen = Rc::new(RefCell::new(ActionArgs::default()));
        let sink = Rc::clone(&seen);
        let action = Action::new(move |_, args| {
            *sink.borrow_mut() = args.clone();
            Ok(())
        })
        .with_args(ActionArgs::new().arg("a").arg(2).kwarg("flag", true));

        let mut item: MenuItem<String> = MenuItem::with_action(1, "go", action);
        item.run(&mut console()).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.positional, vec![Value::from("a"), Value::from(2)]);
        assert_eq!(seen.named.get("flag"), Some(&Value::Bool(true)));
    }

    #[test]
    fn failing_action_is_retried_without_arguments() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let action = Action::new(move |_, args| {
            counter.set(counter.get() + 1);
            if !args.is_empty() {
                bail!("cannot handle arguments");
            }
            Ok(())
        })
        .with_args(ActionArgs::new().arg(1));

        let mut item: MenuItem<String> = MenuItem::with_action(3, "retry", action);
        assert_eq!(item.run(&mut console()).unwrap(), Step::Continue);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn second_failure_propagates() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let action = Action::new(move |_, _| {
            counter.set(counter.get() + 1);
            bail!("broken")
        });

        let mut item: MenuItem<String> = MenuItem::with_action(4, "broken", action).exit();
        let err = item.run(&mut console()).unwrap_err();
        assert!(matches!(err, MenuError::Action { id: 4, .. }));
        assert_eq!(calls.get(), 2);
    }
}
