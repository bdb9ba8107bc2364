use thiserror::Error;

/// Why a single request against the recordings API did not produce a page.
///
/// Stored inside loader state, so it is cloneable and carries rendered
/// messages instead of the transport error values themselves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchCause {
    #[error("HTTP status {status}")]
    Status { status: u16 },
    #[error("transport error: {message}")]
    Transport { message: String },
    #[error("invalid response body: {message}")]
    Decode { message: String },
    #[error("invalid request URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

impl From<reqwest::Error> for FetchCause {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return FetchCause::Status {
                status: status.as_u16(),
            };
        }
        if err.is_decode() {
            return FetchCause::Decode {
                message: err.to_string(),
            };
        }
        FetchCause::Transport {
            message: err.to_string(),
        }
    }
}

/// Runtime failures of the recording loader. The fetch variants are terminal
/// for their loader and are never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    #[error("Failed to load recording metadata: {cause}")]
    MetadataFetch {
        #[source]
        cause: FetchCause,
    },
    #[error("Failed to load recording snapshots: {cause}")]
    SnapshotFetch {
        #[source]
        cause: FetchCause,
    },
    #[error("Failed to load recording events: {cause}")]
    EventsFetch {
        #[source]
        cause: FetchCause,
    },
    #[error("Failed to load performance events: {cause}")]
    PerformanceFetch {
        #[source]
        cause: FetchCause,
    },
    #[error("Recording loader stopped before the request could be delivered.")]
    Stopped,
}

impl LoaderError {
    /// HTTP status of the failed request, when the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            LoaderError::MetadataFetch { cause }
            | LoaderError::SnapshotFetch { cause }
            | LoaderError::EventsFetch { cause }
            | LoaderError::PerformanceFetch { cause } => match cause {
                FetchCause::Status { status } => Some(*status),
                FetchCause::Transport { .. }
                | FetchCause::Decode { .. }
                | FetchCause::InvalidUrl { .. } => None,
            },
            LoaderError::Stopped => None,
        }
    }
}
