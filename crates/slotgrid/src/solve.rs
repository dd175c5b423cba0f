//! Minimal-displacement insertion search.
//!
//! Given a row and an item that should start at a desired slot, the solver
//! looks for the cheapest way to make room: pushing blockers left or right,
//! or nudging the item itself one slot at a time. Every branch works on its
//! own clone of the row so alternatives can be compared against the untouched
//! original.
//!
//! Costs count slots whose occupant changed. Moving the item itself is
//! charged [`MOVE_PENALTY`] per step so the search prefers shifting neighbours.
//! A branch is abandoned once its cost passes twice the row capacity, or when
//! it has spent something and the row is back to where it started.
//!
//! Where the search forks, the second alternative is explored with a cost
//! ceiling taken from the first: costs only grow along a branch, so anything
//! that reaches the ceiling could never win and is cut early. The result is
//! the same as exploring both alternatives in full.

use tracing::trace;

use crate::{
    item::ItemId,
    row::{Directions, SlotRow},
};

/// Cost charged each time the incoming item moves instead of its neighbours.
pub const MOVE_PENALTY: usize = 2;

/// Result of an insertion search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Solution {
    /// The item fits; `row` is the rearranged row with the item written in.
    Placed {
        /// Row after rearrangement and insertion.
        row: SlotRow,
        /// Total displacement cost, including move penalties.
        cost: usize,
    },
    /// No arrangement within the cost bound exists.
    Infeasible,
}

impl Solution {
    /// Cost of a placed solution.
    pub fn cost(&self) -> Option<usize> {
        match self {
            Self::Placed { cost, .. } => Some(*cost),
            Self::Infeasible => None,
        }
    }

    /// Consume the solution, returning the placed row and its cost.
    pub fn into_placed(self) -> Option<(SlotRow, usize)> {
        match self {
            Self::Placed { row, cost } => Some((row, cost)),
            Self::Infeasible => None,
        }
    }

    /// Pick the cheaper of two alternatives. Ties go to `left`.
    fn cheaper(left: Self, right: Self) -> Self {
        match (left.cost(), right.cost()) {
            (None, Some(_)) => right,
            (Some(l), Some(r)) if r < l => right,
            _ => left,
        }
    }
}

/// Search `row` for the cheapest way to insert `name` at `desired_pos`.
pub fn solve(name: &ItemId, width: usize, desired_pos: usize, row: &SlotRow) -> Solution {
    Solver::new(name, width, row).solve(desired_pos)
}

/// Recursive insertion search for one item against one original row.
#[derive(Debug)]
pub struct Solver<'a> {
    /// Identifier being inserted.
    name: &'a ItemId,
    /// Width of the item being inserted.
    width: usize,
    /// The row as it was before the search started.
    original: &'a SlotRow,
    /// Branches costing more than this are dropped.
    abandon: usize,
    /// Tighten the ceiling of the second alternative at each fork.
    prune: bool,
}

impl<'a> Solver<'a> {
    /// Create a solver for inserting `name` into `original`.
    pub fn new(name: &'a ItemId, width: usize, original: &'a SlotRow) -> Self {
        Self {
            name,
            width,
            original,
            abandon: 2 * original.capacity(),
            prune: true,
        }
    }

    /// Explore every fork in full.
    #[cfg(test)]
    pub(crate) fn exhaustive(mut self) -> Self {
        self.prune = false;
        self
    }

    /// Ceiling for the second alternative at a fork, given the first one's
    /// result. `accept_tie` is true when the second alternative wins ties.
    /// `None` means the second alternative cannot win.
    fn ceiling_after(&self, limit: usize, first: &Solution, accept_tie: bool) -> Option<usize> {
        match first.cost() {
            Some(best) if self.prune => {
                let best = if accept_tie { Some(best) } else { best.checked_sub(1) };
                best.map(|b| b.min(limit))
            }
            _ => Some(limit),
        }
    }

    /// Largest cost a successful solution may carry.
    pub fn cost_bound(&self) -> usize {
        self.abandon
    }

    /// Run the search with the item starting at `desired_pos`.
    pub fn solve(&self, desired_pos: usize) -> Solution {
        let solution = self.search(desired_pos, self.original.clone(), 0, self.abandon);
        trace!(
            name = %self.name,
            width = self.width,
            desired_pos,
            cost = ?solution.cost(),
            "solve"
        );
        solution
    }

    /// True if an item starting at `pos` stays inside the row.
    fn in_bounds(&self, pos: usize) -> bool {
        self.width <= self.original.capacity() && pos <= self.original.capacity() - self.width
    }

    /// One search branch: clear the span at `pos`, moving the item as needed.
    /// Branches costing more than `limit` are dropped.
    fn search(&self, mut pos: usize, mut row: SlotRow, mut cost: usize, limit: usize) -> Solution {
        if cost > 0 && row == *self.original {
            trace!(pos, cost, "cycle: row unchanged");
            return Solution::Infeasible;
        }
        loop {
            if cost > limit || !self.in_bounds(pos) {
                return Solution::Infeasible;
            }
            if let Some(done) = self.clear_span(pos, &mut row, &mut cost, limit) {
                return done;
            }
            if row.all_clear(self.name, self.width, pos) {
                break;
            }

            cost += MOVE_PENALTY;
            let (free_left, free_right) = row.free_on_sides(self.width, pos);
            match (free_left > 0, free_right > 0) {
                (true, false) => match pos.checked_sub(1) {
                    Some(p) => pos = p,
                    None => return Solution::Infeasible,
                },
                (false, true) => pos += 1,
                _ => {
                    trace!(pos, cost, "branch: move item left or right");
                    let left = match pos.checked_sub(1) {
                        Some(p) => self.search(p, row.clone(), cost, limit),
                        None => Solution::Infeasible,
                    };
                    let right = match self.ceiling_after(limit, &left, false) {
                        Some(ceiling) => self.search(pos + 1, row, cost, ceiling),
                        None => Solution::Infeasible,
                    };
                    return Solution::cheaper(left, right);
                }
            }
        }

        if cost > limit {
            return Solution::Infeasible;
        }
        row.place(self.name, self.width, pos);
        Solution::Placed { row, cost }
    }

    /// Push blockers out of `[pos, pos + width)` in place.
    ///
    /// Returns `Some` when a two-way branch settled the whole search for this
    /// call, `None` when the scan finished and the caller should check whether
    /// the span is clear.
    fn clear_span(
        &self,
        pos: usize,
        row: &mut SlotRow,
        cost: &mut usize,
        limit: usize,
    ) -> Option<Solution> {
        let (mut free_left, mut free_right) = row.free_on_sides(self.width, pos);
        let end = pos + self.width;
        let mut target = pos;
        while target < end {
            if *cost > limit {
                return Some(Solution::Infeasible);
            }
            if row.is_acceptable(target, self.name) {
                target += 1;
                continue;
            }
            match row.allowed_directions(pos, self.width, target) {
                Directions::Both => {
                    let (left, right) = row.free_on_sides(self.width, pos);
                    match (left > 0, right > 0) {
                        (true, false) => {
                            *cost += row.shift_left(target);
                            if target != pos {
                                target -= 1;
                            }
                        }
                        (false, true) => *cost += row.shift_right(target),
                        _ => return Some(self.branch_shift(pos, row, *cost, target, limit)),
                    }
                    (free_left, free_right) = row.free_on_sides(self.width, pos);
                }
                Directions::RightOnly => {
                    if free_right > 0 {
                        *cost += row.shift_right(target);
                        free_right -= 1;
                    } else {
                        target += 1;
                    }
                }
                Directions::LeftOnly => {
                    if free_left > 0 {
                        *cost += row.shift_left(target);
                        free_left -= 1;
                        if target != pos {
                            target -= 1;
                        }
                    } else {
                        target += 1;
                    }
                }
            }
        }
        None
    }

    /// Try pushing the blocker at `target` both ways and keep the cheaper result.
    fn branch_shift(
        &self,
        pos: usize,
        row: &SlotRow,
        cost: usize,
        target: usize,
        limit: usize,
    ) -> Solution {
        trace!(pos, target, cost, "branch: shift blocker left or right");
        let attempt = |shift: fn(&mut SlotRow, usize) -> usize, ceiling: usize| {
            let mut copy = row.clone();
            match shift(&mut copy, target) {
                0 => Solution::Infeasible,
                moved => self.search(pos, copy, cost + moved, ceiling),
            }
        };
        let right = attempt(SlotRow::shift_right, limit);
        let left = match self.ceiling_after(limit, &right, true) {
            Some(ceiling) => attempt(SlotRow::shift_left, ceiling),
            None => Solution::Infeasible,
        };
        Solution::cheaper(left, right)
    }
}
