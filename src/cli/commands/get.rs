//! `obvious get`: copy a secret to the clipboard (or print it).

use std::io::Write;

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{database_path, load_settings, unlock_or_create, Cli};
use crate::errors::{ObviousError, Result};
use crate::vault;

/// Execute the `get` command.
pub fn execute(cli: &Cli, name: &str, print: bool) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = database_path(cli, &settings)?;
    let password = unlock_or_create(&path, &settings)?;

    let secret = vault::get(password.as_bytes(), &path, name)?;

    if print || !settings.clipboard {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&secret)?;
        stdout.write_all(b"\n")?;
        return Ok(());
    }

    copy_to_clipboard(&secret)?;
    output::success("Secret copied to clipboard.");
    Ok(())
}

fn copy_to_clipboard(secret: &[u8]) -> Result<()> {
    let text = Zeroizing::new(
        std::str::from_utf8(secret)
            .map_err(|_| {
                ObviousError::Clipboard("secret is not valid UTF-8; use --print".into())
            })?
            .to_string(),
    );

    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| ObviousError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text.as_str())
        .map_err(|e| ObviousError::Clipboard(e.to_string()))
}
