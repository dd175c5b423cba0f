//! Error types for grid construction, configuration, and request validation.
//!
//! An infeasible placement is not an error: it is reported through the
//! `Infeasible` variants of the outcome enums. The variants here are
//! precondition violations, rejected before the grid is touched.

use std::{path::PathBuf, result};

use thiserror::Error;

use crate::item::ItemId;

/// Convenient result type for slotgrid operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors produced by the grid and its configuration loader.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The identifier is already placed somewhere in the grid.
    #[error("item '{name}' is already placed in row {row}")]
    DuplicateItem {
        /// Offending identifier.
        name: ItemId,
        /// Row currently holding the item.
        row: usize,
    },

    /// The identifier is not placed anywhere in the grid.
    #[error("item '{name}' is not placed in the grid")]
    UnknownItem {
        /// Missing identifier.
        name: ItemId,
    },

    /// Item width is zero or wider than a row.
    #[error("invalid width {width} for a row of {capacity} slots")]
    InvalidWidth {
        /// Requested width.
        width: usize,
        /// Row capacity.
        capacity: usize,
    },

    /// Row index past the end of the grid.
    #[error("row {row} out of range (grid has {rows} rows)")]
    RowOutOfRange {
        /// Requested row.
        row: usize,
        /// Number of rows in the grid.
        rows: usize,
    },

    /// The requested span does not fit inside the row.
    #[error("column {col} with width {width} does not fit in a row of {capacity} slots")]
    ColumnOutOfRange {
        /// Requested first column.
        col: usize,
        /// Item width.
        width: usize,
        /// Row capacity.
        capacity: usize,
    },

    /// Configuration values that cannot describe a grid.
    #[error("invalid grid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read a configuration file.
    #[error("{message}")]
    Read {
        /// Optional path associated with the read error.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },

    /// Configuration text is not valid RON for a grid configuration.
    #[error("{message}")]
    Parse {
        /// Optional path associated with the parse error.
        path: Option<PathBuf>,
        /// 1-based line number.
        line: usize,
        /// 1-based column number.
        col: usize,
        /// Human-readable error message.
        message: String,
    },
}

impl Error {
    /// Render a human-friendly message including the location when available.
    pub fn pretty(&self) -> String {
        match self {
            Self::Read { path, message } => match path {
                Some(p) => format!("Read error at {}: {}", p.display(), message),
                None => format!("Read error: {}", message),
            },
            Self::Parse {
                path,
                line,
                col,
                message,
            } => match path {
                Some(p) => format!(
                    "Config parse error at {}:{}:{}\n{}",
                    p.display(),
                    line,
                    col,
                    message
                ),
                None => format!(
                    "Config parse error at line {}, column {}\n{}",
                    line, col, message
                ),
            },
            other => other.to_string(),
        }
    }
}
