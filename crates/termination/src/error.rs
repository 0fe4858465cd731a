use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown platform {0:?} (expected none, aws or azure)")]
    UnknownPlatform(String),
}
