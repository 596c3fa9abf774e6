//! `obvious rekey`: change the database password.
//!
//! The current password comes from `OBVIOUS_PASSWORD` or a prompt, the
//! new one from `OBVIOUS_NEW_PASSWORD` or a confirmed prompt.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{database_path, load_settings, prompt_password, prompt_replacement_password, Cli};
use crate::errors::{ObviousError, Result};
use crate::vault;

/// Execute the `rekey` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = database_path(cli, &settings)?;
    if !path.exists() {
        return Err(ObviousError::NotFound(path));
    }

    let old_password: Zeroizing<String> = prompt_password()?;
    let new_password = prompt_replacement_password()?;
    if *old_password == *new_password {
        return Err(ObviousError::InvalidInput(
            "the new password is the same as the current one".into(),
        ));
    }

    vault::rekey(
        old_password.as_bytes(),
        new_password.as_bytes(),
        &path,
        None,
    )?;

    output::success("Password changed. Every secret was re-encrypted.");
    Ok(())
}
