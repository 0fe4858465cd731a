use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("google chat webhook: {0}")]
    Http(#[from] reqwest::Error),
}
