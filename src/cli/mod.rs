//! CLI module: Clap argument parser, prompts, output helpers, and
//! command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{ObviousError, Result};
use crate::vault;

/// Environment variable consulted before prompting for the password.
const PASSWORD_ENV: &str = "OBVIOUS_PASSWORD";

/// Environment variable holding the replacement password for `rekey`.
const NEW_PASSWORD_ENV: &str = "OBVIOUS_NEW_PASSWORD";

/// obvious: personal secret keeper.
#[derive(Parser)]
#[command(name = "obvious", about = "Personal secret keeper", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the secrets database (default: ~/.obvious)
    #[arg(long, env = "OBVIOUS_DATABASE", global = true)]
    pub database: Option<PathBuf>,

    /// Path to the config file (default: ~/.obvious.toml)
    #[arg(long, env = "OBVIOUS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new, empty database
    Init {
        /// Use the legacy (MD5 + AES-CFB) format instead of the sealed one
        #[arg(long)]
        legacy: bool,
    },

    /// List all secret names
    List,

    /// Put a secret into the database (add or overwrite)
    Put {
        /// Secret name
        name: String,
    },

    /// Get a secret from the database
    Get {
        /// Secret name
        name: String,
        /// Print to stdout instead of copying to the clipboard
        #[arg(long)]
        print: bool,
    },

    /// Delete a secret from the database
    Delete {
        /// Secret name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Upgrade a legacy database to the sealed format
    Migrate,

    /// Change the database password
    Rekey,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load settings from `--config`, else `~/.obvious.toml`, else defaults.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    match cli.config.clone().or_else(Settings::default_path) {
        Some(path) => Settings::load(&path),
        None => Ok(Settings::default()),
    }
}

/// `--database` wins over the config file, which wins over `~/.obvious`.
pub fn database_path(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    match &cli.database {
        Some(path) => Ok(path.clone()),
        None => settings.database_path(),
    }
}

/// Get the database password, trying in order:
/// 1. `OBVIOUS_PASSWORD` env var (scripts)
/// 2. Interactive prompt without echo
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env(PASSWORD_ENV) {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter password")
        .interact()
        .map_err(|e| ObviousError::Prompt(e.to_string()))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password twice; both entries must match.
///
/// Also respects `OBVIOUS_PASSWORD` for scripted usage.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    match password_from_env(PASSWORD_ENV) {
        Some(pw) => Ok(pw),
        None => confirm_new_password(),
    }
}

/// Prompt for the password that replaces the current one.
///
/// Only `OBVIOUS_NEW_PASSWORD` is consulted, never `OBVIOUS_PASSWORD`,
/// which holds the current password during `rekey`.
pub fn prompt_replacement_password() -> Result<Zeroizing<String>> {
    match password_from_env(NEW_PASSWORD_ENV) {
        Some(pw) => Ok(pw),
        None => confirm_new_password(),
    }
}

fn confirm_new_password() -> Result<Zeroizing<String>> {
    let password = Zeroizing::new(
        dialoguer::Password::new()
            .with_prompt("Enter new password")
            .interact()
            .map_err(|e| ObviousError::Prompt(e.to_string()))?,
    );
    let confirmation = Zeroizing::new(
        dialoguer::Password::new()
            .with_prompt("Confirm new password")
            .interact()
            .map_err(|e| ObviousError::Prompt(e.to_string()))?,
    );

    if *password != *confirmation {
        return Err(ObviousError::PasswordMismatch);
    }
    Ok(password)
}

fn password_from_env(var: &str) -> Option<Zeroizing<String>> {
    std::env::var(var)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

/// Read the secret value for `put`: piped stdin, or a confirmed
/// no-echo prompt on a terminal.
pub fn read_secret(name: &str) -> Result<Zeroizing<String>> {
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed_len = buf.trim_end_matches(|c: char| c == '\r' || c == '\n').len();
        buf.truncate(trimmed_len);
        return Ok(buf);
    }

    let secret = dialoguer::Password::new()
        .with_prompt(format!("Enter secret for {name}"))
        .with_confirmation("Confirm secret", "Secrets do not match, try again")
        .interact()
        .map_err(|e| ObviousError::Prompt(e.to_string()))?;
    Ok(Zeroizing::new(secret))
}

/// Unlock an existing database, or create it first if it is missing.
///
/// Returns the password that opens the database at `path`.
pub fn unlock_or_create(path: &Path, settings: &Settings) -> Result<Zeroizing<String>> {
    if path.exists() {
        return prompt_password();
    }

    output::info(&format!("Creating database at {}", path.display()));
    let password = prompt_new_password()?;
    ensure_parent_dir(path)?;
    vault::create(password.as_bytes(), path, &settings.create_options())?;
    output::success("Database created.");
    Ok(password)
}

/// Create the directory that will hold `path`, if needed.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn database_flag_overrides_settings() {
        let cli = Cli::parse_from(["obvious", "--database", "/tmp/a.db", "list"]);
        let settings = Settings {
            database: Some(PathBuf::from("/tmp/b.db")),
            ..Settings::default()
        };
        assert_eq!(
            database_path(&cli, &settings).unwrap(),
            PathBuf::from("/tmp/a.db")
        );
    }

    #[test]
    fn settings_database_used_without_flag() {
        let cli = Cli::parse_from(["obvious", "list"]);
        if cli.database.is_some() {
            // OBVIOUS_DATABASE is set in this environment.
            return;
        }
        let settings = Settings {
            database: Some(PathBuf::from("/tmp/b.db")),
            ..Settings::default()
        };
        assert_eq!(
            database_path(&cli, &settings).unwrap(),
            PathBuf::from("/tmp/b.db")
        );
    }

    #[test]
    fn get_accepts_print_flag() {
        let cli = Cli::parse_from(["obvious", "get", "email", "--print"]);
        match cli.command {
            Commands::Get { name, print } => {
                assert_eq!(name, "email");
                assert!(print);
            }
            _ => panic!("expected get"),
        }
    }
}
