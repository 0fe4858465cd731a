use scuttle_termination::Platform;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("platform {0} has no metadata endpoint")]
    NoMetadataEndpoint(Platform),
}
