// src/error.rs
//
// Library error type. Diagnostics about quotes and brackets are never errors: they become
// counter increments and marks in the output. Only I/O, malformed markup and a bad encoding
// label stop a run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Markup the tokenizer cannot make sense of. `offset` is a byte offset into the decoded input.
    #[error("malformed markup at byte {offset}: {message}")]
    Markup { offset: usize, message: String },

    #[error("unknown encoding label: {0}")]
    UnknownEncoding(String),

    /// The encoding can be read but not written back (UTF-16, `replacement`).
    #[error("encoding {0} cannot be used for output")]
    UnsupportedEncoding(&'static str),

    #[error("input is not valid {0}")]
    Decode(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
