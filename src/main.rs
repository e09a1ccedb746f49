//! terminus - a keyboard-driven modal file manager.
//!
//! Usage:
//!   terminus [PATH]                  Launch the file manager
//!   terminus keys [--json]           Print the keybinding table
//!   terminus check-keys FILE         Validate a keybinding table
//!   terminus resolve KEY --mode M    Show what a key does in a mode
//!   terminus --help                  Show help

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use tracing::info;
use tracing_subscriber::EnvFilter;

use terminus_core::{Mode, ModeScope};
use terminus_modal::{KeyTable, Platform, Resolution};
use terminus_tui::UserSettings;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "TERMINUS_LOG";

#[derive(Parser)]
#[command(
    name = "terminus",
    version,
    about = "A keyboard-driven modal file manager",
    long_about = "terminus browses and manages files from the keyboard.\n\n\
                  Every key is interpreted by the current mode: NORMAL, INSERT (rename), \
                  VISUAL (multi-select), FILTER and SEARCH. Press ? inside the program \
                  for the keybinding table."
)]
struct Cli {
    /// Directory to open (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Keybinding table to use instead of the configured one
    #[arg(short, long, value_name = "FILE")]
    keybinds: Option<PathBuf>,

    /// Write logs here instead of the default log file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the keybinding table
    Keys {
        /// Render modifier keys for this platform (macos, linux, windows)
        #[arg(short, long)]
        platform: Option<Platform>,

        /// Only bindings live in this mode
        #[arg(short, long)]
        mode: Option<Mode>,

        /// Output the table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a keybinding table
    CheckKeys {
        /// Table to validate
        file: PathBuf,
    },

    /// Show which action a key resolves to
    Resolve {
        /// Key as written in the table, e.g. "j", "Esc", "C-x"
        key: String,

        /// Mode to resolve in
        #[arg(short, long, default_value = "NORMAL")]
        mode: Mode,

        /// Render modifier keys for this platform
        #[arg(short, long)]
        platform: Option<Platform>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let mut settings = UserSettings::load();
    if let Some(keybinds) = cli.keybinds {
        settings.keybinds = Some(keybinds);
    }

    match cli.command {
        Some(Command::Keys {
            platform,
            mode,
            json,
        }) => {
            init_stderr_logging();
            let table = load_table(&settings)?;
            print_keys(&table, platform.unwrap_or_else(Platform::current), mode, json)?;
        }
        Some(Command::CheckKeys { file }) => {
            init_stderr_logging();
            let table = KeyTable::from_file(&file)
                .wrap_err_with(|| format!("{} is not a valid keybinding table", file.display()))?;
            let unimplemented = table.bindings().iter().filter(|b| !b.implemented).count();
            println!(
                "{}: {} bindings in {} categories ({} not implemented)",
                file.display(),
                table.bindings().len(),
                table.categories().len(),
                unimplemented
            );
        }
        Some(Command::Resolve {
            key,
            mode,
            platform,
        }) => {
            init_stderr_logging();
            let table = load_table(&settings)?;
            let platform = platform.unwrap_or_else(Platform::current);
            match table.resolve(&key, mode, platform) {
                Resolution::Matched {
                    action,
                    label,
                    desc,
                } => println!("{label} in {mode}: {action} ({desc})"),
                Resolution::Unrecognized => println!("{key} is not bound in {mode}"),
            }
        }
        None => {
            let log_path = match cli.log_file {
                Some(path) => path,
                None => default_log_path()?,
            };
            init_file_logging(&log_path)?;

            let path = cli.path.canonicalize().context("Invalid path")?;
            if !path.is_dir() {
                return Err(eyre!("{} is not a directory", path.display()));
            }
            let table = load_table(&settings)?;
            info!(path = %path.display(), log = %log_path.display(), "launching");
            terminus_tui::run(path, settings, table)?;
        }
    }

    Ok(())
}

fn load_table(settings: &UserSettings) -> Result<KeyTable> {
    settings.key_table().wrap_err_with(|| match &settings.keybinds {
        Some(path) => format!("Failed to load keybindings from {}", path.display()),
        None => "Built-in keybinding table is invalid".to_string(),
    })
}

fn print_keys(table: &KeyTable, platform: Platform, mode: Option<Mode>, json: bool) -> Result<()> {
    let live = |scope: ModeScope| mode.is_none_or(|m| scope.includes(m));

    if json {
        let bindings: Vec<_> = table.bindings().iter().filter(|b| live(b.mode)).collect();
        println!("{}", serde_json::to_string_pretty(&bindings)?);
        return Ok(());
    }

    for group in table.help_groups() {
        let items: Vec<_> = group.items.iter().filter(|b| live(b.mode)).collect();
        if items.is_empty() {
            continue;
        }
        println!("{}", group.category);
        for binding in items {
            let note = if binding.implemented {
                ""
            } else {
                "  (not implemented)"
            };
            println!(
                "  {:<24} {:<8} {}{}",
                binding.key_labels(platform),
                binding.mode.to_string(),
                binding.desc,
                note
            );
        }
        println!();
    }
    Ok(())
}

fn default_log_path() -> Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .or_else(dirs::data_dir)
        .ok_or_else(|| eyre!("No data directory on this system; pass --log-file"))?;
    Ok(dir.join("terminus").join("terminus.log"))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to a file while the TUI owns the terminal.
fn init_file_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .wrap_err_with(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}
