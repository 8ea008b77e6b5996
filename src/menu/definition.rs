use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MenuError;
use crate::menu::{Action, ActionArgs, Menu, MenuItem};

/// A menu tree as written in a config or menu file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MenuDefinition {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(default)]
    pub items: Vec<ItemDefinition>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItemDefinition {
    pub id: u32,
    pub label: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub exit: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ItemTarget>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemTarget {
    /// Writes its arguments to the menu's console.
    Echo {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Value>,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        kwargs: Map<String, Value>,
    },
    Submenu {
        menu: MenuDefinition,
    },
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl MenuDefinition {
    /// The menu written into a fresh config: one echo item and a quit item.
    pub fn starter() -> Self {
        Self {
            title: "Main menu".to_string(),
            default: None,
            items: vec![
                ItemDefinition {
                    id: 1,
                    label: "Say hello".to_string(),
                    hidden: false,
                    exit: false,
                    action: Some(ItemTarget::Echo {
                        args: vec![Value::from("hello")],
                        kwargs: Map::new(),
                    }),
                },
                ItemDefinition {
                    id: 2,
                    label: "Quit".to_string(),
                    hidden: false,
                    exit: true,
                    action: None,
                },
            ],
        }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Builds the live menu, recursing into submenus. `prompt` overrides the
    /// input prompt at every level.
    pub fn build(&self, prompt: Option<&str>) -> Result<Menu<String>, MenuError> {
        Menu::build(self.title.clone(), |menu| {
            if let Some(prompt) = prompt {
                menu.set_prompt(prompt);
            }
            if let Some(default) = &self.default {
                menu.set_default(default.clone());
            }
            for item in &self.items {
                menu.add_item(item.build(prompt)?)?;
            }
            Ok(())
        })
    }
}

impl ItemDefinition {
    fn build(&self, prompt: Option<&str>) -> Result<MenuItem<String>, MenuError> {
        let mut item = match &self.action {
            None => MenuItem::new(self.id, self.label.clone()),
            Some(ItemTarget::Echo { args, kwargs }) => {
                let args = ActionArgs {
                    positional: args.clone(),
                    named: kwargs.clone(),
                };
                MenuItem::with_action(self.id, self.label.clone(), echo(args))
            }
            Some(ItemTarget::Submenu { menu }) => {
                MenuItem::with_submenu(self.id, self.label.clone(), menu.build(prompt)?.shared())
            }
        };

        if self.hidden {
            item.hide();
        }
        if self.exit {
            item.mark_exit();
        }
        Ok(item)
    }
}

fn echo(args: ActionArgs) -> Action {
    Action::new(|console, args| {
        console.write_line(&render_args(args))?;
        Ok(())
    })
    .with_args(args)
}

/// Positional values first, then `name=value` pairs, space separated. Strings are
/// printed without quotes.
pub fn render_args(args: &ActionArgs) -> String {
    fn plain(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    args.positional
        .iter()
        .map(plain)
        .chain(
            args.named
                .iter()
                .map(|(name, value)| format!("{name}={}", plain(value))),
        )
        .collect::<Vec<_>>()
        .join(" ")
}
