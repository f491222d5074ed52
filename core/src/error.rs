//! Error type shared across the analysis core.
//!
//! Only prerequisite fetches surface as hard errors; name-resolution misses
//! degrade to placeholder strings and empty analysis results are not errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure talking to the remote service.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote service answered with a GraphQL error payload.
    #[error("api error: {0}")]
    Api(String),

    /// A response arrived but the expected section was absent.
    #[error("report returned no {0} data")]
    MissingData(&'static str),

    /// The events payload could not be decoded.
    #[error("failed to decode events payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("fight {0} not found in report")]
    FightNotFound(i64),

    #[error("player '{0}' not found in report")]
    PlayerNotFound(String),

    #[error("configuration error: {0}")]
    Config(#[from] confy::ConfyError),
}
