//! Error types surfaced by the document decoders.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can arise while decoding a document tree into the feature
/// model.
///
/// Structural errors are fatal to the smallest enclosing decode: a malformed
/// table aborts that table, a missing name aborts that node, and the failure
/// propagates upward from there. The one built-in skip-and-continue policy
/// lives in the example-table loader, which drops declarations matching no
/// source group instead of failing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuildError {
    /// Raised when none of a key group's aliases are present in a container.
    #[error("none of the keys {aliases:?} are present in {node}")]
    MissingKey {
        /// Accepted spellings that were tried, in order.
        aliases: &'static [&'static str],
        /// Description of the container that was searched.
        node: String,
    },
    /// Raised when a feature-node lacks its required `Name` key.
    #[error("node '{node}' has no 'Name' key")]
    MissingName {
        /// Keyword of the node being decoded.
        node: String,
    },
    /// Raised when tabular text cannot be parsed into headers and rows.
    #[error("malformed table: {detail}")]
    MalformedTable {
        /// Parser-reported reason.
        detail: String,
    },
    /// Raised when a structured table carries no `Headers` key.
    #[error("structured table content has no 'Headers' key")]
    MissingHeaders,
    /// Raised when a structured table carries neither `Rows` nor `Columns`.
    #[error("structured table content has neither 'Rows' nor 'Columns'")]
    MissingRowsOrColumns,
    /// Raised when an example-table declaration matches a source group but
    /// lacks a required sub-key or uses the wrong shape for one.
    #[error("malformed example table: {detail}")]
    MalformedExampleTable {
        /// Description of the offending declaration.
        detail: String,
    },
    /// Raised when no parser is registered for a content-type label.
    #[error("no parser registered for content type '{content_type}'")]
    UnsupportedContentType {
        /// The unrecognised label.
        content_type: String,
    },
    /// Raised when a present key holds a value of the wrong shape.
    #[error("value under '{key}' must be a {expected}")]
    UnexpectedShape {
        /// Key whose value was malformed.
        key: String,
        /// Shape the decoder required.
        expected: &'static str,
    },
    /// Raised when a tag entry is not a non-empty string.
    #[error("tag names must be non-empty strings")]
    InvalidTag,
    /// Raised when reading a file-referenced example table fails.
    #[error("failed to read example table from {path}: {source}")]
    Io {
        /// Resolved path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Raised when fetching a URI-referenced example table fails.
    #[error("failed to fetch example table from {uri}: {source}")]
    Fetch {
        /// Target of the failed request.
        uri: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },
}
