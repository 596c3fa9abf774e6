//! One module per subcommand.

pub mod delete;
pub mod get;
pub mod init;
pub mod list;
pub mod migrate;
pub mod put;
pub mod rekey;
