pub mod config;
pub mod console;
pub mod dialogs;
pub mod error;
pub mod menu;
