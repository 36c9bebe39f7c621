pub mod cli;
pub mod error;
pub mod node;
pub mod path;
pub mod traversal;
pub mod tree;
pub mod validator;

#[cfg(feature = "json")]
pub mod json;

pub use cli::{parse_args, Args, ColorMode, Command, OutputFormat};
pub use error::{FtError, FtResult};
pub use node::Node;
pub use path::Path;
pub use tree::{FileTree, Stat};
pub use validator::{validate, Violation};
