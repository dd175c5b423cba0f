//! Fixed-capacity rows of slots and the local primitives used by the solver.
//!
//! A [`SlotRow`] is a value type: the solver clones it for every search
//! branch, and the grid only swaps committed rows in at the end of a
//! successful call. All primitives here are local to one row.

use std::{
    collections::BTreeMap,
    convert::Infallible,
    fmt::{Display, Formatter, Result as FmtResult},
    ops::Range,
    str::FromStr,
};

use crate::item::ItemId;

/// One cell of a row: empty, or holding an item identifier.
pub type Slot = Option<ItemId>;

/// Directions a blocking item may be pushed when clearing a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directions {
    /// The blocker may move either way.
    Both,
    /// The blocker must move left.
    LeftOnly,
    /// The blocker must move right.
    RightOnly,
}

/// A contiguous block of slots held by one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupant {
    /// Item identifier.
    pub name: ItemId,
    /// Index of the first slot.
    pub start: usize,
    /// Number of slots held.
    pub width: usize,
}

/// Items removed from a row to make room for an incoming item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Eviction {
    /// Evicted identifiers with their widths, in removal order.
    pub items: Vec<(ItemId, usize)>,
    /// Total number of slots freed.
    pub width: usize,
}

impl Eviction {
    /// True if nothing was evicted.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A fixed-capacity sequence of slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SlotRow {
    /// Slot contents, left to right.
    slots: Vec<Slot>,
}

impl SlotRow {
    /// Create an empty row with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Wrap an explicit slot vector.
    pub fn from_slots(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    /// Number of slots in the row.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Borrow the raw slots.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Occupant of slot `idx`, if any.
    pub fn get(&self, idx: usize) -> Option<&ItemId> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    /// Number of empty slots.
    pub fn free_count(&self) -> usize {
        count_free(&self.slots)
    }

    /// True if slot `target` is empty or already holds `name`.
    pub fn is_acceptable(&self, target: usize, name: &ItemId) -> bool {
        match self.slots.get(target) {
            Some(None) => true,
            Some(Some(id)) => id == name,
            None => false,
        }
    }

    /// True if every slot of `[pos, pos + width)` is empty or held by `name`.
    ///
    /// A span that leaves the row is never clear.
    pub fn all_clear(&self, name: &ItemId, width: usize, pos: usize) -> bool {
        match pos.checked_add(width) {
            Some(end) if end <= self.capacity() => {
                (pos..end).all(|target| self.is_acceptable(target, name))
            }
            _ => false,
        }
    }

    /// Empty slots before `pos` and from `pos + width` onwards.
    pub fn free_on_sides(&self, width: usize, pos: usize) -> (usize, usize) {
        let cap = self.capacity();
        let start = pos.min(cap);
        let end = pos.saturating_add(width).min(cap);
        (count_free(&self.slots[..start]), count_free(&self.slots[end..]))
    }

    /// Decide which way the item at `target` may move to clear `[pos, pos + width)`.
    ///
    /// The row edges force a direction. Otherwise the blocker is compared with
    /// the slots just outside the span: if it continues on one side only, it
    /// must move that way to stay contiguous.
    pub fn allowed_directions(&self, pos: usize, width: usize, target: usize) -> Directions {
        if target == 0 {
            return Directions::RightOnly;
        }
        if target + 1 == self.capacity() {
            return Directions::LeftOnly;
        }
        let Some(occupant) = self.get(target) else {
            return Directions::Both;
        };
        let left = pos.checked_sub(1).and_then(|idx| self.get(idx));
        let right = self.get(pos.saturating_add(width));
        match (left == Some(occupant), right == Some(occupant)) {
            (true, false) => Directions::LeftOnly,
            (false, true) => Directions::RightOnly,
            _ => Directions::Both,
        }
    }

    /// Push the run at `target` one slot to the left.
    ///
    /// The run is extended to its right end, and the nearest empty slot left of
    /// that end is consumed. Everything in between moves one slot left, leaving
    /// an empty slot where the run ended. Returns the displacement cost, or 0
    /// if `target` is empty or there is no free slot to consume.
    pub fn shift_left(&mut self, target: usize) -> usize {
        let Some(name) = self.get(target).cloned() else {
            return 0;
        };
        let mut end = target;
        while end < self.capacity() && self.get(end) == Some(&name) {
            end += 1;
        }
        let Some(hole) = self.slots[..end].iter().rposition(Option::is_none) else {
            return 0;
        };
        let before = self.slots[hole..end].to_vec();
        self.slots[hole..end].rotate_left(1);
        displacement(&before, &self.slots[hole..end])
    }

    /// Push the run at `target` one slot to the right.
    ///
    /// Mirror image of [`SlotRow::shift_left`]: the run is extended to its left
    /// start and the nearest empty slot right of that start is consumed.
    pub fn shift_right(&mut self, target: usize) -> usize {
        let Some(name) = self.get(target).cloned() else {
            return 0;
        };
        let mut start = target;
        while start > 0 && self.get(start - 1) == Some(&name) {
            start -= 1;
        }
        let Some(offset) = self.slots[start..].iter().position(Option::is_none) else {
            return 0;
        };
        let hole = start + offset;
        let before = self.slots[start..=hole].to_vec();
        self.slots[start..=hole].rotate_right(1);
        displacement(&before, &self.slots[start..=hole])
    }

    /// Write `name` into `[pos, pos + width)`.
    ///
    /// Does nothing if `name` is already in the row. Callers check
    /// [`SlotRow::all_clear`] first.
    pub fn place(&mut self, name: &ItemId, width: usize, pos: usize) {
        if self.contains(name) {
            return;
        }
        let end = pos.saturating_add(width).min(self.capacity());
        if let Some(span) = self.slots.get_mut(pos..end) {
            span.fill(Some(name.clone()));
        }
    }

    /// Empty every slot held by `name`, returning how many were freed.
    pub fn remove(&mut self, name: &ItemId) -> usize {
        let mut freed = 0;
        for slot in &mut self.slots {
            if slot.as_ref() == Some(name) {
                *slot = None;
                freed += 1;
            }
        }
        freed
    }

    /// Report items whose first slot differs in `other`, then adopt `other`.
    ///
    /// The returned map holds the new first index of every identifier that
    /// moved or newly appeared. Identifiers that disappeared are not reported.
    pub fn diff_against(&mut self, other: Self) -> BTreeMap<ItemId, usize> {
        let before = self.first_indices();
        let moved = other
            .first_indices()
            .into_iter()
            .filter(|(name, idx)| before.get(name) != Some(idx))
            .collect();
        self.slots = other.slots;
        moved
    }

    /// Index of the first empty slot.
    pub fn first_free(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Start of the first run of at least `width` consecutive empty slots.
    pub fn first_fitting_span(&self, width: usize) -> Option<usize> {
        if width == 0 {
            return None;
        }
        let mut run = 0;
        for (idx, slot) in self.slots.iter().enumerate() {
            if slot.is_some() {
                run = 0;
                continue;
            }
            run += 1;
            if run == width {
                return Some(idx + 1 - width);
            }
        }
        None
    }

    /// True if any slot holds `name`.
    pub fn contains(&self, name: &ItemId) -> bool {
        self.slots.iter().any(|slot| slot.as_ref() == Some(name))
    }

    /// Number of slots held by `name`.
    pub fn count_of(&self, name: &ItemId) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.as_ref() == Some(name))
            .count()
    }

    /// Slot range held by `name`, assuming the row is well formed.
    pub fn span_of(&self, name: &ItemId) -> Option<Range<usize>> {
        let start = self.slots.iter().position(|slot| slot.as_ref() == Some(name))?;
        Some(start..start + self.count_of(name))
    }

    /// Contiguous blocks in slot order.
    ///
    /// A block ends wherever the identifier changes, so a malformed row with a
    /// split item yields one entry per fragment.
    pub fn occupants(&self) -> Vec<Occupant> {
        let mut out: Vec<Occupant> = Vec::new();
        for (idx, slot) in self.slots.iter().enumerate() {
            let Some(name) = slot else { continue };
            match out.last_mut() {
                Some(last) if &last.name == name && last.start + last.width == idx => {
                    last.width += 1;
                }
                _ => out.push(Occupant {
                    name: name.clone(),
                    start: idx,
                    width: 1,
                }),
            }
        }
        out
    }

    /// True if every slot of `name` lies inside `[pos, pos + width)`.
    pub fn is_fully_covered(&self, name: &ItemId, width: usize, pos: usize) -> bool {
        let end = pos.saturating_add(width).min(self.capacity());
        let inside = self.slots[pos.min(end)..end]
            .iter()
            .filter(|slot| slot.as_ref() == Some(name))
            .count();
        inside == self.count_of(name)
    }

    /// Remove items overlapping `[pos, pos + width)` until the row has room.
    ///
    /// Candidates are ranked fully covered first, then narrowest, then
    /// leftmost. Removal may stop once the free slots plus the evicted width
    /// reach `width`, but only while every item taken so far lay wholly inside
    /// the span. After a partially covered item goes, the rest of the span is
    /// cleared too so the caller can insert at exactly `pos`.
    pub fn evict_overlapping(&mut self, width: usize, pos: usize) -> Eviction {
        let free = self.free_count();
        let end = pos.saturating_add(width).min(self.capacity());
        let mut candidates: Vec<(bool, usize, usize, ItemId)> = Vec::new();
        for slot in &self.slots[pos.min(end)..end] {
            let Some(name) = slot else { continue };
            if candidates.iter().any(|c| &c.3 == name) {
                continue;
            }
            let Some(span) = self.span_of(name) else {
                continue;
            };
            candidates.push((
                self.is_fully_covered(name, width, pos),
                span.len(),
                span.start,
                name.clone(),
            ));
        }
        candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

        let mut eviction = Eviction::default();
        let mut covered = true;
        for (fully_covered, _, _, name) in candidates {
            if covered && free + eviction.width >= width {
                break;
            }
            let freed = self.remove(&name);
            eviction.width += freed;
            eviction.items.push((name, freed));
            covered = fully_covered;
        }
        eviction
    }

    /// First slot index of every identifier in the row.
    fn first_indices(&self) -> BTreeMap<ItemId, usize> {
        let mut out = BTreeMap::new();
        for (idx, slot) in self.slots.iter().enumerate() {
            if let Some(name) = slot {
                out.entry(name.clone()).or_insert(idx);
            }
        }
        out
    }
}

/// Count empty slots in a slice.
fn count_free(slots: &[Slot]) -> usize {
    slots.iter().filter(|slot| slot.is_none()).count()
}

/// Number of slots whose occupant changed, ignoring slots that became empty.
fn displacement(before: &[Slot], after: &[Slot]) -> usize {
    before
        .iter()
        .zip(after)
        .filter(|(old, new)| new.is_some() && old != new)
        .count()
}

impl Display for SlotRow {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let cells: Vec<&str> = self
            .slots
            .iter()
            .map(|slot| slot.as_ref().map_or(".", ItemId::as_str))
            .collect();
        write!(f, "{}", cells.join(" "))
    }
}

impl FromStr for SlotRow {
    type Err = Infallible;

    /// Parse whitespace-separated cells, with `.` or `_` for empty slots.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_slots(
            s.split_whitespace()
                .map(|cell| match cell {
                    "." | "_" => None,
                    name => Some(ItemId::from(name)),
                })
                .collect(),
        ))
    }
}
