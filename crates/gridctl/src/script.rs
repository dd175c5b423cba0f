//! Directive and script formats accepted by gridctl.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs,
    path::Path,
};

use serde::{Deserialize, Serialize};
use slotgrid::{GridConfig, config};

use crate::error::{Error, Result};

/// One operation against the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    /// Insert a new item.
    Place {
        /// Item identifier.
        name: String,
        /// Number of slots the item occupies.
        width: usize,
        /// Target row; the orchestrator picks one when omitted.
        #[serde(default)]
        row: Option<usize>,
        /// Target column; the configured hint applies when omitted.
        #[serde(default)]
        col: Option<usize>,
    },
    /// Move an existing item to an explicit position.
    Relocate {
        /// Item identifier.
        name: String,
        /// Destination row.
        row: usize,
        /// Destination column.
        col: usize,
    },
    /// Take an item off the grid.
    Remove {
        /// Item identifier.
        name: String,
    },
}

impl Display for Directive {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Place {
                name,
                width,
                row,
                col,
            } => {
                write!(f, "place {name} width={width}")?;
                if let Some(row) = row {
                    write!(f, " row={row}")?;
                }
                if let Some(col) = col {
                    write!(f, " col={col}")?;
                }
                Ok(())
            }
            Self::Relocate { name, row, col } => write!(f, "relocate {name} to ({row}, {col})"),
            Self::Remove { name } => write!(f, "remove {name}"),
        }
    }
}

/// A grid configuration plus the steps to run against it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Script {
    /// Grid shape and policies.
    #[serde(default)]
    pub grid: GridConfig,
    /// Directives, run in order.
    pub steps: Vec<Directive>,
}

/// Parse a single directive such as `place(name: "A", width: 2)`.
pub fn parse_directive(raw: &str) -> Result<Directive> {
    Ok(config::ron_options().from_str(raw.trim())?)
}

/// Parse a script from RON text. `path` is only used for error locations.
pub fn parse_script(text: &str, path: Option<&Path>) -> Result<Script> {
    let script: Script = config::ron_options()
        .from_str(text)
        .map_err(|e| config::parse_error(&e, path))?;
    script.grid.validate()?;
    if script.steps.is_empty() {
        return Err(Error::other("script contains no steps"));
    }
    Ok(script)
}

/// Read and parse a script file.
pub fn load_script(path: &Path) -> Result<Script> {
    let text = fs::read_to_string(path)?;
    parse_script(&text, Some(path))
}
