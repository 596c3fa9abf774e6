//! User configuration (`~/.obvious.toml`).

pub mod settings;

pub use settings::Settings;
