//! `obvious migrate`: rewrite a legacy database in the sealed format.

use crate::cli::output;
use crate::cli::{database_path, load_settings, prompt_password, Cli};
use crate::errors::Result;
use crate::vault;

/// Execute the `migrate` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = database_path(cli, &settings)?;

    let password = prompt_password()?;
    vault::migrate(password.as_bytes(), &path, &settings.argon2_params())?;

    output::success(&format!(
        "Database at {} upgraded to the sealed format.",
        path.display()
    ));
    output::tip("Your password is unchanged.");
    Ok(())
}
