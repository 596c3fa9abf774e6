use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in obvious.
#[derive(Debug, Error)]
pub enum ObviousError {
    // --- Cipher errors ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed data: {0}")]
    Malformed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    // --- Store errors ---
    #[error("Wrong password")]
    WrongPassword,

    #[error("Database failed authentication; the file was modified or corrupted")]
    Tampered,

    #[error("Database not found at {0}")]
    NotFound(PathBuf),

    #[error("Database already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("Secret '{0}' not found")]
    SecretNotFound(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- Front-end errors ---
    #[error("Password prompt failed: {0}")]
    Prompt(String),

    #[error("Password mismatch: passwords do not match")]
    PasswordMismatch,

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

/// Coarse classification of an error, used by callers that only care
/// about *what kind* of failure happened (e.g. to pick an exit status).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Malformed,
    WrongPassword,
    Tampered,
    NotFound,
    AlreadyExists,
    Io,
    Other,
}

impl ErrorKind {
    /// Process exit status the front-end uses for this kind.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Other => 1,
            ErrorKind::InvalidInput => 2,
            ErrorKind::Malformed => 3,
            ErrorKind::WrongPassword => 4,
            ErrorKind::NotFound => 5,
            ErrorKind::AlreadyExists => 6,
            ErrorKind::Io => 7,
            ErrorKind::Tampered => 8,
        }
    }
}

impl ObviousError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ObviousError::InvalidInput(_) => ErrorKind::InvalidInput,
            ObviousError::Malformed(_) | ObviousError::Serialization(_) => ErrorKind::Malformed,
            ObviousError::WrongPassword => ErrorKind::WrongPassword,
            ObviousError::Tampered => ErrorKind::Tampered,
            ObviousError::NotFound(_) | ObviousError::SecretNotFound(_) => ErrorKind::NotFound,
            ObviousError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            ObviousError::Io(_) => ErrorKind::Io,
            ObviousError::KeyDerivation(_)
            | ObviousError::Config(_)
            | ObviousError::Prompt(_)
            | ObviousError::PasswordMismatch
            | ObviousError::UserCancelled
            | ObviousError::Clipboard(_) => ErrorKind::Other,
        }
    }
}

/// Convenience type alias for obvious results.
pub type Result<T> = std::result::Result<T, ObviousError>;
