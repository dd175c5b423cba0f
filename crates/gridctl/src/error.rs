//! Error handling for the gridctl crate.

use std::{io, result};

use ron::error::SpannedError;
use thiserror::Error;

/// Convenient result type for gridctl operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur while running directives.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Grid configuration, script parsing, or a rejected request.
    #[error("{}", .0.pretty())]
    Grid(#[from] slotgrid::Error),
    /// A directive or script was not valid RON.
    #[error("RON error: {0}")]
    Ron(#[from] SpannedError),
    /// Failed to serialize the JSON report.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Failed to parse a directive string.
    #[error("Failed to parse directive: {0}")]
    DirectiveSpec(String),
    /// No directives were provided.
    #[error("No directives supplied; pass place(...), relocate(...) or remove(...) arguments")]
    NoDirectives,
    /// Generic error with a message.
    #[error("{0}")]
    Other(String),
    /// A step was rejected before touching the grid.
    #[error("step {step} ({directive}) rejected: {source}")]
    Step {
        /// 1-based step index.
        step: usize,
        /// Rendered directive.
        directive: String,
        /// Underlying precondition failure.
        source: slotgrid::Error,
    },
}

impl Error {
    /// Helper to build a parse error from an arbitrary message.
    pub fn parse<M: Into<String>>(msg: M) -> Self {
        Self::DirectiveSpec(msg.into())
    }

    /// Helper to build a generic error from an arbitrary message.
    pub fn other<M: Into<String>>(msg: M) -> Self {
        Self::Other(msg.into())
    }
}
