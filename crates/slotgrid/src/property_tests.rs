use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use crate::{
    grid::{Grid, PlaceOutcome, RelocateOutcome},
    item::ItemId,
    row::SlotRow,
    solve::{Solution, Solver},
};

/// Build a well-formed row of `capacity` slots from (gap, width) pairs.
fn layout(capacity: usize, blocks: &[(usize, usize)]) -> SlotRow {
    let mut row = SlotRow::new(capacity);
    let mut pos = 0;
    for (idx, (gap, width)) in blocks.iter().enumerate() {
        pos += gap;
        if pos + width > capacity {
            break;
        }
        row.place(&ItemId::new(format!("I{idx}")), *width, pos);
        pos += width;
    }
    row
}

/// Widths of every block, failing if an identifier is split.
fn block_widths(row: &SlotRow) -> BTreeMap<ItemId, usize> {
    let mut out = BTreeMap::new();
    for occ in row.occupants() {
        assert!(
            out.insert(occ.name.clone(), occ.width).is_none(),
            "item {} is not contiguous in {}",
            occ.name,
            row
        );
    }
    out
}

fn row_strategy() -> impl Strategy<Value = SlotRow> {
    (
        4usize..9,
        prop::collection::vec((0usize..3, 1usize..4), 0..5),
    )
        .prop_map(|(capacity, blocks)| layout(capacity, &blocks))
}

/// Check every structural invariant of a committed grid.
fn assert_grid_invariants(grid: &Grid) {
    let mut seen = BTreeSet::new();
    for row in grid.rows() {
        let widths = block_widths(row);
        let mut used = 0;
        for (name, width) in widths {
            assert_eq!(grid.width_of(name.as_str()), Some(width), "width of {name}");
            assert!(seen.insert(name.clone()), "{name} appears in two rows");
            used += width;
        }
        assert_eq!(row.free_count() + used, row.capacity());
    }
    assert_eq!(seen.len(), grid.len());
}

#[derive(Debug, Clone)]
enum Op {
    Place {
        width: usize,
        row: Option<usize>,
        col: Option<usize>,
    },
    Relocate {
        pick: usize,
        row: usize,
        col: usize,
    },
    Remove {
        pick: usize,
    },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1usize..4, prop::option::of(0usize..2), prop::option::of(0usize..6))
            .prop_map(|(width, row, col)| Op::Place { width, row, col }),
        3 => (0usize..8, 0usize..2, 0usize..6)
            .prop_map(|(pick, row, col)| Op::Relocate { pick, row, col }),
        1 => (0usize..8).prop_map(|pick| Op::Remove { pick }),
    ]
}

/// Name of the `pick`-th placed item, if any.
fn pick_item(grid: &Grid, pick: usize) -> Option<ItemId> {
    let names: Vec<ItemId> = grid.items().map(|(_, occ)| occ.name).collect();
    if names.is_empty() {
        None
    } else {
        Some(names[pick % names.len()].clone())
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn solve_keeps_rows_well_formed(
        row in row_strategy(),
        width in 1usize..4,
        pos in 0usize..8,
    ) {
        let name = ItemId::from("NEW");
        let before = block_widths(&row);
        let solver = Solver::new(&name, width, &row);
        match solver.solve(pos) {
            Solution::Placed { row: out, cost } => {
                prop_assert!(cost <= solver.cost_bound());
                prop_assert_eq!(out.capacity(), row.capacity());
                prop_assert_eq!(out.free_count() + width, row.free_count());
                let mut after = block_widths(&out);
                prop_assert_eq!(after.remove(&name), Some(width));
                prop_assert_eq!(after, before);
            }
            Solution::Infeasible => {}
        }
    }

    #[test]
    fn pruning_never_changes_the_solution(
        row in row_strategy(),
        width in 1usize..4,
        pos in 0usize..8,
    ) {
        let name = ItemId::from("NEW");
        let pruned = Solver::new(&name, width, &row).solve(pos);
        let full = Solver::new(&name, width, &row).exhaustive().solve(pos);
        prop_assert_eq!(pruned, full);
    }

    #[test]
    fn grid_operations_preserve_invariants(
        ops in prop::collection::vec(op_strategy(), 1..24),
    ) {
        let mut grid = Grid::new(6, 2).unwrap();
        let mut next = 0usize;
        for op in ops {
            let before = grid.clone();
            let committed = match op {
                Op::Place { width, row, col } => {
                    next += 1;
                    let name = format!("P{next}");
                    matches!(grid.place_new(name.as_str(), width, row, col), Ok(PlaceOutcome::Placed(_)))
                }
                Op::Relocate { pick, row, col } => match pick_item(&grid, pick) {
                    Some(name) => matches!(grid.relocate(name, row, col), Ok(RelocateOutcome::Relocated(_))),
                    None => false,
                },
                Op::Remove { pick } => match pick_item(&grid, pick) {
                    Some(name) => grid.remove(name).is_ok(),
                    None => false,
                },
            };
            if !committed {
                prop_assert_eq!(&grid, &before);
            }
            assert_grid_invariants(&grid);
        }
    }

    #[test]
    fn relocation_deltas_match_the_grid(
        ops in prop::collection::vec(op_strategy(), 1..16),
        pick in 0usize..8,
        row in 0usize..2,
        col in 0usize..4,
    ) {
        let mut grid = Grid::new(6, 2).unwrap();
        for (idx, op) in ops.into_iter().enumerate() {
            if let Op::Place { width, row, col } = op {
                let _placed = grid.place_new(format!("P{idx}"), width, row, col);
            }
        }
        let Some(name) = pick_item(&grid, pick) else {
            return Ok(());
        };
        let width = grid.width_of(name.as_str()).unwrap_or(1);
        let before = grid.clone();
        if let Ok(RelocateOutcome::Relocated(r)) = grid.relocate(name.clone(), row, col.min(6 - width)) {
            prop_assert_eq!(grid.position_of(name.as_str()), Some(r.position));
            prop_assert!(!r.moved.contains_key(&name));
            for (id, pos) in &r.moved {
                prop_assert_eq!(grid.position_of(id.as_str()), Some(*pos));
            }
            for (_, occ) in before.items() {
                if occ.name != name && !r.moved.contains_key(&occ.name) {
                    prop_assert_eq!(
                        grid.position_of(occ.name.as_str()),
                        before.position_of(occ.name.as_str())
                    );
                }
            }
        }
    }
}
