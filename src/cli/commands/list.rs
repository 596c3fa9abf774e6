//! `obvious list`: print all secret names.

use crate::cli::output;
use crate::cli::{database_path, load_settings, unlock_or_create, Cli};
use crate::errors::Result;
use crate::vault;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = database_path(cli, &settings)?;
    let password = unlock_or_create(&path, &settings)?;

    let names = vault::list(password.as_bytes(), &path)?;
    output::print_secret_names(&names);

    Ok(())
}
