//! Grid orchestration: row selection, relocation, and cross-row eviction.
//!
//! All work happens on clones of the live rows. The live grid is only written
//! at the end of a successful call, so an `Infeasible` outcome or an `Err`
//! leaves every row exactly as it was.

use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result as FmtResult},
};

use serde::Serialize;
use tracing::debug;

use crate::{
    config::{EvictionTarget, GridConfig},
    error::{Error, Result},
    item::{ItemId, Position},
    row::{Occupant, SlotRow},
    solve::solve,
};

/// Details of a successful `place_new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placed {
    /// Where the new item landed.
    pub position: Position,
    /// Displacement cost of the rearrangement.
    pub cost: usize,
    /// Other items in the same row whose first column changed.
    pub moved: BTreeMap<ItemId, usize>,
}

/// Result of `place_new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlaceOutcome {
    /// The item was placed and the grid committed.
    Placed(Placed),
    /// No row could take the item; the grid is unchanged.
    Infeasible,
}

/// Details of a successful `relocate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relocated {
    /// Where the relocated item landed.
    pub position: Position,
    /// Total displacement cost over every row touched.
    pub cost: usize,
    /// Items pushed out of the target row, in eviction order.
    pub evicted: Vec<ItemId>,
    /// Other items whose position changed, including evicted ones.
    pub moved: BTreeMap<ItemId, Position>,
}

/// Result of `relocate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RelocateOutcome {
    /// The item was moved and the grid committed.
    Relocated(Relocated),
    /// The move was impossible; the grid is unchanged.
    Infeasible,
}

/// Bookkeeping for a placed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ItemRecord {
    /// Declared width in slots.
    width: usize,
    /// Row currently holding the item.
    row: usize,
}

/// An ordered set of equally sized slot rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Shape and policies.
    config: GridConfig,
    /// Committed rows.
    rows: Vec<SlotRow>,
    /// Every placed item, keyed by identifier.
    items: BTreeMap<ItemId, ItemRecord>,
}

impl Grid {
    /// Create an empty grid with default policies.
    pub fn new(columns: usize, rows: usize) -> Result<Self> {
        Self::with_config(GridConfig::new(columns, rows))
    }

    /// Create an empty grid from a configuration.
    pub fn with_config(config: GridConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rows: vec![SlotRow::new(config.columns); config.rows],
            items: BTreeMap::new(),
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Slots per row.
    pub fn columns(&self) -> usize {
        self.config.columns
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Committed rows.
    pub fn rows(&self) -> &[SlotRow] {
        &self.rows
    }

    /// A single committed row.
    pub fn row(&self, idx: usize) -> Option<&SlotRow> {
        self.rows.get(idx)
    }

    /// The row paired with `row` for eviction, if it exists.
    pub fn paired_row(&self, row: usize) -> Option<usize> {
        let paired = row ^ 1;
        (paired < self.rows.len()).then_some(paired)
    }

    /// Current position of `name`.
    pub fn position_of(&self, name: &str) -> Option<Position> {
        let record = self.items.get(name)?;
        let span = self.rows.get(record.row)?.span_of(&ItemId::from(name))?;
        Some(Position::new(record.row, span.start))
    }

    /// Declared width of `name`.
    pub fn width_of(&self, name: &str) -> Option<usize> {
        self.items.get(name).map(|record| record.width)
    }

    /// Number of placed items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if no items are placed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every placed item with its row index, in row then column order.
    pub fn items(&self) -> impl Iterator<Item = (usize, Occupant)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(idx, row)| row.occupants().into_iter().map(move |occ| (idx, occ)))
    }

    /// Place a new item.
    ///
    /// With no `row`, rows are tried in order and the first that can take the
    /// item wins. With no `col`, the configured [`ColumnHint`] picks the
    /// desired column. Rows with fewer free slots than `width` are skipped
    /// without searching.
    ///
    /// [`ColumnHint`]: crate::config::ColumnHint
    pub fn place_new(
        &mut self,
        name: impl Into<ItemId>,
        width: usize,
        row: Option<usize>,
        col: Option<usize>,
    ) -> Result<PlaceOutcome> {
        let name = name.into();
        if let Some(record) = self.items.get(&name) {
            return Err(Error::DuplicateItem {
                name,
                row: record.row,
            });
        }
        self.check_width(width)?;
        if let Some(r) = row {
            self.check_row(r)?;
        }
        if let Some(c) = col {
            self.check_span(c, width)?;
        }

        for r in self.rows_with_room(width, row) {
            let current = &self.rows[r];
            let desired = col.unwrap_or_else(|| self.config.column_hint.column_for(current, width));
            let Some((solved, cost)) = solve(&name, width, desired, current).into_placed() else {
                debug!(name = %name, row = r, desired, "place_new: no arrangement");
                continue;
            };
            let landed = solved.span_of(&name).map_or(desired, |span| span.start);
            let mut moved = self.rows[r].diff_against(solved);
            moved.remove(&name);
            self.items.insert(name.clone(), ItemRecord { width, row: r });
            debug!(
                "place_new: name={} row={} col={} cost={} moved={}",
                name,
                r,
                landed,
                cost,
                moved.len()
            );
            return Ok(PlaceOutcome::Placed(Placed {
                position: Position::new(r, landed),
                cost,
                moved,
            }));
        }
        debug!(name = %name, width, "place_new: infeasible");
        Ok(PlaceOutcome::Infeasible)
    }

    /// Move an already placed item to `(row, col)`.
    ///
    /// First the target row is reflowed with the item lifted out of the grid.
    /// If that fails, items overlapping the target span are evicted to the
    /// eviction row and the item is inserted into the cleared row.
    pub fn relocate(
        &mut self,
        name: impl Into<ItemId>,
        row: usize,
        col: usize,
    ) -> Result<RelocateOutcome> {
        let name = name.into();
        let Some(record) = self.items.get(&name).copied() else {
            return Err(Error::UnknownItem { name });
        };
        self.check_row(row)?;
        self.check_span(col, record.width)?;
        let width = record.width;

        let mut work = self.rows.clone();
        for r in &mut work {
            r.remove(&name);
        }

        if let Some((solved, cost)) = solve(&name, width, col, &work[row]).into_placed() {
            work[row] = solved;
            return Ok(self.commit_relocation(&name, row, work, cost, Vec::new()));
        }

        let eviction = work[row].evict_overlapping(width, col);
        if eviction.is_empty() {
            debug!(name = %name, row, col, "relocate: nothing to evict");
            return Ok(RelocateOutcome::Infeasible);
        }
        let Some(target) = self.eviction_row(row, eviction.width, &work) else {
            debug!(
                name = %name,
                row,
                needed = eviction.width,
                "relocate: no room for evicted items"
            );
            return Ok(RelocateOutcome::Infeasible);
        };
        debug!(
            "relocate: evicting {} item(s) width={} from row {} to row {}",
            eviction.items.len(),
            eviction.width,
            row,
            target
        );

        let mut cost = 0;
        for (evicted, evicted_width) in &eviction.items {
            let dest = &work[target];
            if dest.free_count() < *evicted_width {
                return Ok(RelocateOutcome::Infeasible);
            }
            let desired = self.config.column_hint.column_for(dest, *evicted_width);
            let Some((solved, c)) = solve(evicted, *evicted_width, desired, dest).into_placed()
            else {
                debug!(name = %evicted, row = target, "relocate: evicted item does not fit");
                return Ok(RelocateOutcome::Infeasible);
            };
            work[target] = solved;
            cost += c;
        }

        let Some((solved, c)) = solve(&name, width, col, &work[row]).into_placed() else {
            debug!(name = %name, row, col, "relocate: cleared row still rejects item");
            return Ok(RelocateOutcome::Infeasible);
        };
        work[row] = solved;
        cost += c;

        let evicted = eviction.items.into_iter().map(|(id, _)| id).collect();
        Ok(self.commit_relocation(&name, row, work, cost, evicted))
    }

    /// Remove an item, returning the number of slots freed.
    pub fn remove(&mut self, name: impl Into<ItemId>) -> Result<usize> {
        let name = name.into();
        let Some(record) = self.items.remove(&name) else {
            return Err(Error::UnknownItem { name });
        };
        let freed = self.rows[record.row].remove(&name);
        debug!(name = %name, row = record.row, freed, "remove");
        Ok(freed)
    }

    /// Swap in the working rows and report what moved.
    fn commit_relocation(
        &mut self,
        name: &ItemId,
        row: usize,
        work: Vec<SlotRow>,
        cost: usize,
        evicted: Vec<ItemId>,
    ) -> RelocateOutcome {
        let mut moved = BTreeMap::new();
        for (idx, (live, next)) in self.rows.iter_mut().zip(work).enumerate() {
            for (id, c) in live.diff_against(next) {
                moved.insert(id, Position::new(idx, c));
            }
        }
        moved.remove(name);
        for (id, pos) in &moved {
            if let Some(record) = self.items.get_mut(id) {
                record.row = pos.row;
            }
        }
        if let Some(record) = self.items.get_mut(name) {
            record.row = row;
        }
        let col = self.rows[row].span_of(name).map_or(0, |span| span.start);
        debug!(
            "relocate: name={} row={} col={} cost={} moved={} evicted={}",
            name,
            row,
            col,
            cost,
            moved.len(),
            evicted.len()
        );
        RelocateOutcome::Relocated(Relocated {
            position: Position::new(row, col),
            cost,
            evicted,
            moved,
        })
    }

    /// Rows that may take an item of `width`: `row` alone when given, else
    /// every row in order. Rows with too few free slots are dropped here so
    /// they never reach the search.
    fn rows_with_room(&self, width: usize, row: Option<usize>) -> Vec<usize> {
        let candidates = match row {
            Some(r) => r..r + 1,
            None => 0..self.rows.len(),
        };
        candidates
            .filter(|&r| {
                let free = self.rows[r].free_count();
                if free < width {
                    debug!(row = r, free, width, "place_new: row too full");
                }
                free >= width
            })
            .collect()
    }

    /// Pick the row that receives `needed` evicted slots from `row`.
    fn eviction_row(&self, row: usize, needed: usize, work: &[SlotRow]) -> Option<usize> {
        let paired = self.paired_row(row);
        let fits = |r: &usize| work[*r].free_count() >= needed;
        match self.config.eviction {
            EvictionTarget::Paired => paired.filter(fits),
            EvictionTarget::AnyRowWithSpace => paired
                .into_iter()
                .chain((0..work.len()).filter(|&r| r != row && Some(r) != paired))
                .find(fits),
        }
    }

    /// Reject widths that cannot fit in any row.
    fn check_width(&self, width: usize) -> Result<()> {
        if width == 0 || width > self.config.columns {
            return Err(Error::InvalidWidth {
                width,
                capacity: self.config.columns,
            });
        }
        Ok(())
    }

    /// Reject row indices past the end of the grid.
    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.rows.len() {
            return Err(Error::RowOutOfRange {
                row,
                rows: self.rows.len(),
            });
        }
        Ok(())
    }

    /// Reject spans that leave the row.
    fn check_span(&self, col: usize, width: usize) -> Result<()> {
        match col.checked_add(width) {
            Some(end) if end <= self.config.columns => Ok(()),
            _ => Err(Error::ColumnOutOfRange {
                col,
                width,
                capacity: self.config.columns,
            }),
        }
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (idx, row) in self.rows.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{idx}: {row}")?;
        }
        Ok(())
    }
}
