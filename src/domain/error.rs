use thiserror::Error;

/// Failure talking to the catalog backend.
///
/// A non-empty `errors` list in an otherwise well-formed response is treated
/// the same as a transport failure: the lookup degrades to "no data".
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("catalog endpoint returned status {status}")]
    Status { status: u16 },
    #[error("catalog response malformed: {message}")]
    Malformed { message: String },
    #[error("catalog returned errors: {summary}")]
    Backend { summary: String },
}

impl CatalogError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub fn backend(summary: impl Into<String>) -> Self {
        Self::Backend {
            summary: summary.into(),
        }
    }
}

/// Failure executing a structural query against the content repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("repository query endpoint returned status {status}")]
    Status { status: u16 },
    #[error("repository response malformed: {message}")]
    Malformed { message: String },
}

impl RepositoryError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Failure purging a single path from the dispatcher cache.
///
/// Always scoped to one path; the flush loop logs it and moves on.
#[derive(Debug, Error)]
pub enum FlushError {
    #[error("purge transport failed for `{path}`: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("purge of `{path}` rejected with status {status}")]
    Rejected { path: String, status: u16 },
}
