// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Error types for the scrubber

use thiserror::Error;

/// Errors surfaced by scrubber construction and the JSON adapter
#[derive(Debug, Error)]
pub enum ScrubError {
    /// Input payload is not well-formed JSON
    #[error("scrubber: decode json: {0}")]
    Decode(#[source] serde_json::Error),

    /// Scrubbed tree could not be serialized
    #[error("scrubber: encode json: {0}")]
    Encode(#[source] serde_json::Error),

    /// A key/value expression failed to compile
    #[error("scrubber: invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A declarative policy could not be deserialized
    #[error("scrubber: invalid config: {0}")]
    InvalidConfig(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScrubError>;

#[cfg(feature = "python")]
impl From<ScrubError> for pyo3::PyErr {
    fn from(err: ScrubError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
