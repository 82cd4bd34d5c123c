//! Errors returned by this crate

use thiserror::Error;

/// Everything that can go wrong while mapping calendars and events to and from their feeds
#[derive(Debug, Error)]
pub enum Error {
    /// A setter was given a malformed value. Nothing has been sent to the server.
    #[error("invalid value: {0}")]
    Validation(String),

    /// A response body could not be interpreted as the expected feed or entry
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A conditional write was rejected because the entity tag is stale.
    /// Reload the entity, then retry.
    #[error("conflicting change on {locator}: the entity has been modified on the server")]
    Conflict { locator: String },

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("this session is not authenticated")]
    NotAuthenticated,

    /// The server accepted a creation, but its reply could not be loaded back.
    /// The local object may not reflect what has been created.
    #[error("unable to save: {0}")]
    SaveFailed(String),

    /// The operation makes no sense in the current lifecycle state of the entity
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("invalid locator: {0}")]
    InvalidLocator(#[from] url::ParseError),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// An opaque failure of the transport, or an unexpected HTTP status
    #[error("transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<minidom::Error> for Error {
    fn from(err: minidom::Error) -> Self {
        Error::MalformedResponse(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}
