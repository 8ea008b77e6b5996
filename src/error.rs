use std::io;

#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("menu item with id {id} already exists")]
    DuplicateItem { id: u32 },

    #[error("action of menu item {id} failed")]
    Action {
        id: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("no options to choose from")]
    NoOptions,

    #[error("menu exited without recording a selection")]
    NoSelection,

    #[error(transparent)]
    Io(#[from] io::Error),
}
