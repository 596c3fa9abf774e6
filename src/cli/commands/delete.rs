//! `obvious delete`: remove a secret from the database.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{database_path, load_settings, prompt_password, Cli};
use crate::errors::{ObviousError, Result};
use crate::vault;

/// Execute the `delete` command.
pub fn execute(cli: &Cli, name: &str, force: bool) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = database_path(cli, &settings)?;
    if !path.exists() {
        return Err(ObviousError::NotFound(path));
    }

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete secret '{name}'?"))
            .default(false)
            .interact()
            .map_err(|e| ObviousError::Prompt(e.to_string()))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let password = prompt_password()?;
    if vault::delete(password.as_bytes(), &path, name)? {
        output::success(&format!("Deleted secret '{name}'"));
    } else {
        output::info(&format!("No secret named '{name}'; nothing to delete."));
    }

    Ok(())
}
