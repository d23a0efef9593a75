use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template not found: {origin}")]
    NotFound { origin: String },

    #[error("failed to read template {origin}: {error}")]
    Read {
        origin: String,
        #[source]
        error: io::Error,
    },

    /// `case_index` is 0-based, in the order the records were passed in.
    #[error("unbound placeholder `{name}` in case #{case_index}")]
    UnboundPlaceholder { case_index: usize, name: String },

    #[error("malformed placeholder at line {line}, column {column}: {reason}")]
    MalformedPlaceholder {
        line: usize,
        column: usize,
        reason: &'static str,
    },
}
