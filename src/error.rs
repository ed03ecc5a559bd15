//! Errors of the fetch-and-normalize pipeline.

use reqwest::StatusCode;

use crate::core::{DateRange, Granularity};

/// Broad classification of an [`Error`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum ErrorKind {
    /// Malformed date range, unsupported device, missing credentials.
    #[display("configuration")]
    Configuration,

    /// Network failure or non-success HTTP status.
    #[display("transport")]
    Transport,

    /// The upstream response cannot be used: bad JSON, unsupported granularity, broken shape.
    #[display("protocol")]
    Protocol,

    /// Two partial series cannot be stitched together.
    #[display("consistency")]
    Consistency,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("request failed")]
    Request(#[from] reqwest::Error),

    #[error("server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to deserialize the response")]
    Deserialize(#[from] serde_json::Error),

    #[error("returned interval `{0}` is not supported")]
    UnsupportedGranularity(Granularity),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("{field} mismatch: `{lhs}` cannot be combined with `{rhs}`")]
    Mismatch { field: &'static str, lhs: String, rhs: String },

    #[error("failed to fetch {window} for device `{device}`")]
    Window {
        device: String,
        window: DateRange,

        #[source]
        source: Box<Self>,
    },
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Attach the device and window the error happened in.
    pub fn in_window(self, device: impl Into<String>, window: DateRange) -> Self {
        Self::Window { device: device.into(), window, source: Box::new(self) }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Request(_) | Self::Status { .. } => ErrorKind::Transport,
            Self::Deserialize(_) | Self::UnsupportedGranularity(_) | Self::Malformed(_) => {
                ErrorKind::Protocol
            }
            Self::Mismatch { .. } => ErrorKind::Consistency,
            Self::Window { source, .. } => source.kind(),
        }
    }
}
