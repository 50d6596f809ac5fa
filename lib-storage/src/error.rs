use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("backend io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("encoding error: {0}")]
    Encoding(#[from] Box<bincode::ErrorKind>),
}
