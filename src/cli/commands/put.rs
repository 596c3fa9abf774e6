//! `obvious put`: add or overwrite a secret.

use crate::cli::output;
use crate::cli::{database_path, load_settings, read_secret, unlock_or_create, Cli};
use crate::errors::Result;
use crate::vault;

/// Execute the `put` command.
pub fn execute(cli: &Cli, name: &str) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = database_path(cli, &settings)?;
    let password = unlock_or_create(&path, &settings)?;

    let secret = read_secret(name)?;
    vault::put(password.as_bytes(), &path, name, secret.as_bytes())?;

    output::success(&format!("Secret '{name}' saved."));
    Ok(())
}
