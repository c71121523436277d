//! Error types for pattern compilation, remote fetches, and write-backs
//!
//! Every failure surfaces to the top-level invocation; nothing is caught and
//! suppressed inside the library. The CLI layer wraps these in `anyhow` for
//! user-facing messages.

use thiserror::Error;

/// A search pattern or replacement template that cannot be used.
///
/// Raised at compile time, before any object is fetched or touched, so a bad
/// pattern never causes partial side effects.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid regular expression: {0}")]
    Regex(#[from] regex::Error),

    /// The replacement template references a capture group the pattern does
    /// not define, e.g. `$2` against a single-group pattern.
    #[error("replacement template references unknown capture group `${0}`")]
    UnknownGroup(String),

    #[error("replacement template has an unclosed `${{...}}` group reference")]
    UnclosedGroup,

    #[error("replacement template has an empty `${{}}` group reference")]
    EmptyGroup,
}

/// A collection or course lookup that could not be retrieved from the
/// course service. Fatal for the run; there is no partial-type retry.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to the course service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("course service returned HTTP {status} for {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("could not decode course service response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A write-back that failed for a single object.
///
/// By the time this occurs, earlier objects in the same collection may
/// already have been persisted; each object is its own unit of atomicity.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("write-back request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("course service rejected the update (HTTP {status}) for {url}: {body}")]
    Rejected {
        status: u16,
        url: String,
        body: String,
    },
}

/// Failure while processing a collection of content objects.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Persist(#[from] PersistError),

    /// An attribute declared as a text field for this object type is absent
    /// on a concrete object (or holds a non-text value).
    #[error("{type_name} object has no text attribute `{field}`")]
    MissingField { type_name: String, field: String },
}
