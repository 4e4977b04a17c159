use crate::note::NoteID;
use thiserror::Error;

/// Failures of a single request to the note API.
///
/// These never leave the web client: they are collapsed into the message of an
/// [`crate::ApiResult::Error`].
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("could not reach the note service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Http {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("unexpected response from the note service: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid note id `{0}`")]
    InvalidNoteId(NoteID),
}

/// Error type for building a [`crate::WebClient`].
#[derive(Error, Debug)]
pub enum WebClientBuildError {
    /// Not a valid URL.
    #[error("Not a valid URL")]
    NotAURL(#[from] url::ParseError),
    /// The URL has no path to put notes under, such as a `mailto:` link.
    #[error("base URL `{0}` cannot be a base")]
    CannotBeABase(String),
    #[error("failed to build HTTP client")]
    Reqwest(#[from] reqwest::Error),
}
