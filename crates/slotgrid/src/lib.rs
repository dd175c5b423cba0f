#![warn(missing_docs)]

//! slotgrid: minimal-displacement placement of fixed-width items in a grid of
//! slots.
//!
//! Items occupy contiguous runs of slots within a single row. Placing or
//! relocating an item reflows its neighbours so that as few of them as
//! possible change position. When a row cannot make room, overlapping items
//! are evicted to another row.
//!
//! - [`row`]: fixed-capacity rows and their shift/evict primitives
//! - [`solve`]: the recursive insertion search
//! - [`grid`]: row selection, relocation, and eviction over a whole grid
//! - [`config`]: grid shape, eviction policy, and RON loading
//!
//! The grid is a plain value. It is mutated only through `&mut self`, and only
//! at the end of a successful call.

pub mod config;
mod error;
pub mod grid;
mod item;
pub mod row;
pub mod solve;

#[cfg(test)]
mod property_tests;

pub use config::{ColumnHint, EvictionTarget, GridConfig};
pub use error::{Error, Result};
pub use grid::{Grid, PlaceOutcome, Placed, RelocateOutcome, Relocated};
pub use item::{ItemId, Position};
pub use row::{Directions, SlotRow};
pub use solve::{Solution, solve};
