use thiserror::Error;

/// Status codes for every fallible tree operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FtError {
    #[error("tree is not initialized")]
    Initialization,

    #[error("malformed path: {0}")]
    BadPath(String),

    #[error("path conflicts with existing tree structure: {0}")]
    ConflictingPath(String),

    #[error("no such path in tree: {0}")]
    NoSuchPath(String),

    #[error("path already exists in tree: {0}")]
    AlreadyInTree(String),

    #[error("not a file: {0}")]
    NotAFile(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("memory allocation failed")]
    MemoryError,
}

pub type FtResult<T> = Result<T, FtError>;
