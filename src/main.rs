use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use conmenu::{
    config,
    console::LineConsole,
    dialogs,
    menu::{build_choice, LoopOutcome},
};

#[derive(Parser, Debug)]
#[command(name = "conmenu", version, about = "Numbered text-mode menus")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Runs a menu tree until an exit item is chosen.
    Run {
        /// Menu definition file. Defaults to the "menu" entry of the config.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Asks for one choice and prints its value.
    Choose {
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: String,
        /// Option as LABEL or LABEL=VALUE. Repeat for more options.
        #[arg(long = "option", required = true)]
        options: Vec<String>,
        /// Printed when the answer is not a number.
        #[arg(long)]
        default: Option<String>,
    },
    /// Asks a yes/no question and prints true or false.
    Confirm {
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: String,
    },
    /// Writes a starter config if none exists and prints its path.
    Init,
    /// Prints the config path that would be used (if any).
    ConfigPath,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run { file } => {
            let cfg = config::load_optional()?.unwrap_or_default();
            let definition = match file {
                Some(path) => config::load_menu_file(&path)?,
                None => cfg.menu.clone().ok_or_else(|| {
                    anyhow!("No menu to run: pass --file or add a \"menu\" entry to the config")
                })?,
            };
            debug!(title = %definition.title, "running menu");

            let mut menu = definition
                .build(cfg.prompt.as_deref())
                .context("build menu")?;
            let mut console = LineConsole::stdio();
            if let LoopOutcome::Bypassed(value) = menu.run_loop(&mut console)? {
                println!("{value}");
            }
        }
        Command::Choose {
            title,
            text,
            options,
            default,
        } => {
            let options = options.iter().map(|raw| parse_option(raw));
            let mut console = LineConsole::stdio();
            let value = build_choice(&mut console, &title, &text, options, default)?;
            println!("{value}");
        }
        Command::Confirm { title, text } => {
            let mut console = LineConsole::stdio();
            let yes = dialogs::confirm(&mut console, &title, &text)?;
            println!("{yes}");
        }
        Command::Init => {
            let path = config::ensure_config_file_exists()?;
            println!("{}", path.display());
        }
        Command::ConfigPath => {
            if let Some(path) = config::resolve_config_path() {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

const DEFAULT_LOG_FILTER: &str = "conmenu=warn";

/// `RUST_LOG` as given, or the quiet default when it is unset or unparsable.
fn log_filter(spec: Option<&str>) -> EnvFilter {
    spec.and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// `LABEL=VALUE` or just `LABEL`, which then doubles as the value.
fn parse_option(raw: &str) -> (String, String) {
    match raw.split_once('=') {
        Some((label, value)) => (label.to_string(), value.to_string()),
        None => (raw.to_string(), raw.to_string()),
    }
}
