use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::Argon2Params;
use crate::errors::{ObviousError, Result};
use crate::vault::{CreateOptions, Format};

/// User-level configuration, loaded from `~/.obvious.toml`.
///
/// Every field has a sensible default so obvious works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Database file to use when `--database` is not given.
    #[serde(default)]
    pub database: Option<PathBuf>,

    /// Format for newly created databases ("sealed" or "legacy").
    #[serde(default)]
    pub format: Format,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Copy `get` results to the clipboard instead of printing them.
    #[serde(default = "default_clipboard")]
    pub clipboard: bool,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_clipboard() -> bool {
    true
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: None,
            format: Format::default(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            clipboard: default_clipboard(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the home directory.
    const FILE_NAME: &'static str = ".obvious.toml";

    /// Name of the database file used when nothing else is configured.
    const DEFAULT_DATABASE: &'static str = ".obvious";

    /// `$HOME/.obvious.toml`, if `$HOME` is set.
    pub fn default_path() -> Option<PathBuf> {
        home_dir().map(|home| home.join(Self::FILE_NAME))
    }

    /// Load settings from `config_path`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            ObviousError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// The database path: the configured one, else `$HOME/.obvious`.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database {
            return Ok(path.clone());
        }
        home_dir()
            .map(|home| home.join(Self::DEFAULT_DATABASE))
            .ok_or_else(|| {
                ObviousError::Config("HOME is not set; pass --database explicitly".into())
            })
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Options for creating a database under these settings.
    pub fn create_options(&self) -> CreateOptions {
        CreateOptions {
            format: self.format,
            argon2_params: self.argon2_params(),
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.database, None);
        assert_eq!(s.format, Format::Sealed);
        assert_eq!(s.argon2_memory_kib, 65_536);
        assert_eq!(s.argon2_iterations, 3);
        assert_eq!(s.argon2_parallelism, 4);
        assert!(s.clipboard);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(settings.format, Format::Sealed);
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
database = "/srv/secrets/db"
format = "legacy"
argon2_memory_kib = 131072
argon2_iterations = 5
argon2_parallelism = 8
clipboard = false
"#;
        let path = tmp.path().join("obvious.toml");
        fs::write(&path, config).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.database, Some(PathBuf::from("/srv/secrets/db")));
        assert_eq!(settings.format, Format::Legacy);
        assert_eq!(settings.argon2_memory_kib, 131_072);
        assert_eq!(settings.argon2_iterations, 5);
        assert_eq!(settings.argon2_parallelism, 8);
        assert!(!settings.clipboard);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("obvious.toml");
        fs::write(&path, "argon2_iterations = 7\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.argon2_iterations, 7);
        // Rest should be defaults
        assert_eq!(settings.format, Format::Sealed);
        assert_eq!(settings.argon2_memory_kib, 65_536);
        assert!(settings.clipboard);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("obvious.toml");
        fs::write(&path, "not valid {{toml").unwrap();

        assert!(matches!(
            Settings::load(&path),
            Err(ObviousError::Config(_))
        ));
    }

    #[test]
    fn load_errors_on_unknown_format() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("obvious.toml");
        fs::write(&path, "format = \"rot13\"\n").unwrap();

        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn configured_database_wins() {
        let s = Settings {
            database: Some(PathBuf::from("/tmp/my.db")),
            ..Settings::default()
        };
        assert_eq!(s.database_path().unwrap(), PathBuf::from("/tmp/my.db"));
    }

    #[test]
    fn create_options_follow_settings() {
        let s = Settings {
            format: Format::Legacy,
            argon2_iterations: 9,
            ..Settings::default()
        };
        let opts = s.create_options();
        assert_eq!(opts.format, Format::Legacy);
        assert_eq!(opts.argon2_params.iterations, 9);
    }
}
