//! One module per subcommand, each exposing `execute`.

pub mod completions;
pub mod delete;
pub mod edit;
pub mod init;
pub mod list;
pub mod new;
pub mod reveal;
pub mod version;
