//! `obvious init`: create a new, empty database.

use crate::cli::output;
use crate::cli::{database_path, ensure_parent_dir, load_settings, prompt_new_password, Cli};
use crate::errors::{ObviousError, Result};
use crate::vault::{self, Format};

/// Execute the `init` command.
pub fn execute(cli: &Cli, legacy: bool) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = database_path(cli, &settings)?;

    if path.exists() {
        output::tip("Use `obvious put <NAME>` to add secrets to the existing database.");
        return Err(ObviousError::AlreadyExists(path));
    }

    let mut options = settings.create_options();
    if legacy {
        options.format = Format::Legacy;
        output::warning("The legacy format has no integrity protection and a fast, unsalted key.");
    }

    output::info(&format!("Creating database at {}", path.display()));
    let password = prompt_new_password()?;
    ensure_parent_dir(&path)?;
    vault::create(password.as_bytes(), &path, &options)?;

    output::success(&format!(
        "Database created ({} format) at {}",
        options.format,
        path.display()
    ));
    output::tip("Run `obvious put <NAME>` to add a secret.");

    Ok(())
}
