//! Grid configuration and RON loading.
//!
//! ```ron
//! (
//!     columns: 10,
//!     rows: 2,
//!     eviction: paired,
//!     column_hint: first_empty,
//! )
//! ```
//!
//! Every field is optional; missing fields take the values of
//! [`GridConfig::default`].

use std::{
    fs,
    path::{Path, PathBuf},
};

use ron::{Options, error::SpannedError, extensions::Extensions};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    row::SlotRow,
};

/// Which rows may receive items evicted from a full target row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionTarget {
    /// Only the row whose index differs in the lowest bit (`row ^ 1`).
    #[default]
    Paired,
    /// The paired row first, then every other row in index order.
    AnyRowWithSpace,
}

/// How a column is chosen when the caller does not name one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnHint {
    /// The first empty slot, regardless of whether the item fits there.
    #[default]
    FirstEmpty,
    /// The first run of empty slots wide enough for the item, falling back to
    /// the first empty slot.
    FirstFit,
}

impl ColumnHint {
    /// Pick a starting column for an item of `width` in `row`.
    ///
    /// The result is clamped so that the span stays inside the row. A full
    /// row yields column 0.
    pub fn column_for(self, row: &SlotRow, width: usize) -> usize {
        let first = match self {
            Self::FirstEmpty => row.first_free(),
            Self::FirstFit => row.first_fitting_span(width).or_else(|| row.first_free()),
        };
        first
            .unwrap_or(0)
            .min(row.capacity().saturating_sub(width))
    }
}

/// Shape and policy of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Slots per row.
    pub columns: usize,
    /// Number of rows.
    pub rows: usize,
    /// Eviction policy used by relocation.
    pub eviction: EvictionTarget,
    /// Column selection when none is requested.
    pub column_hint: ColumnHint,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 10,
            rows: 2,
            eviction: EvictionTarget::default(),
            column_hint: ColumnHint::default(),
        }
    }
}

impl GridConfig {
    /// Configuration for a `columns` x `rows` grid with default policies.
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            ..Self::default()
        }
    }

    /// Check that the configuration describes a usable grid.
    pub fn validate(&self) -> Result<()> {
        if self.columns == 0 {
            return Err(Error::InvalidConfig("columns must be at least 1".into()));
        }
        if self.rows == 0 {
            return Err(Error::InvalidConfig("rows must be at least 1".into()));
        }
        Ok(())
    }

    /// Parse and validate a configuration from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        parse(text, None)
    }
}

/// RON options shared by configuration and script parsing.
pub fn ron_options() -> Options {
    Options::default()
        .with_default_extension(Extensions::IMPLICIT_SOME)
        .with_default_extension(Extensions::UNWRAP_NEWTYPES)
}

/// Load and validate a grid configuration from a RON file.
pub fn load_from_path(path: &Path) -> Result<GridConfig> {
    let text = fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    parse(&text, Some(path))
}

/// Convert a RON error into a located parse error.
pub fn parse_error(err: &SpannedError, path: Option<&Path>) -> Error {
    Error::Parse {
        path: path.map(PathBuf::from),
        line: err.span.start.line.max(1),
        col: err.span.start.col.max(1),
        message: err.code.to_string(),
    }
}

/// Shared parse path for strings and files.
fn parse(text: &str, path: Option<&Path>) -> Result<GridConfig> {
    let cfg: GridConfig = ron_options()
        .from_str(text)
        .map_err(|e| parse_error(&e, path))?;
    cfg.validate()?;
    Ok(cfg)
}
