//! End-to-end placement scenarios against the public grid API.

use slotgrid::{
    ColumnHint, EvictionTarget, Grid, GridConfig, ItemId, PlaceOutcome, Position, RelocateOutcome,
    SlotRow, Solution, solve,
};

fn place(grid: &mut Grid, name: &str, width: usize, row: Option<usize>, col: Option<usize>) {
    match grid.place_new(name, width, row, col) {
        Ok(PlaceOutcome::Placed(_)) => {}
        other => panic!("placing {name} failed: {other:?}"),
    }
}

fn row_text(grid: &Grid, idx: usize) -> String {
    grid.row(idx).expect("row exists").to_string()
}

#[test]
fn first_item_lands_at_the_start_of_an_empty_row() {
    let mut grid = Grid::new(10, 1).unwrap();
    let outcome = grid.place_new("A", 3, Some(0), None).unwrap();
    match outcome {
        PlaceOutcome::Placed(p) => {
            assert_eq!(p.position, Position::new(0, 0));
            assert_eq!(p.cost, 0);
            assert!(p.moved.is_empty());
        }
        PlaceOutcome::Infeasible => panic!("empty row rejected A"),
    }
    assert_eq!(row_text(&grid, 0), "A A A . . . . . . .");
}

#[test]
fn relocation_pushes_blocker_into_the_gap() {
    let mut grid = Grid::new(10, 1).unwrap();
    place(&mut grid, "A", 2, Some(0), None);
    place(&mut grid, "B", 3, Some(0), None);
    place(&mut grid, "C", 2, Some(0), Some(7));
    assert_eq!(row_text(&grid, 0), "A A B B B . . C C .");

    let outcome = grid.relocate("C", 0, 2).unwrap();
    let RelocateOutcome::Relocated(r) = outcome else {
        panic!("relocation failed");
    };
    assert_eq!(row_text(&grid, 0), "A A C C B B B . . .");
    assert_eq!(r.position, Position::new(0, 2));
    assert_eq!(r.moved.len(), 1);
    assert_eq!(r.moved.get("B"), Some(&Position::new(0, 4)));
}

#[test]
fn too_full_row_fails_without_changes() {
    let mut grid = Grid::new(4, 1).unwrap();
    place(&mut grid, "A", 3, Some(0), None);
    let before = grid.clone();
    assert_eq!(
        grid.place_new("B", 2, Some(0), None).unwrap(),
        PlaceOutcome::Infeasible
    );
    assert_eq!(grid, before);
    assert_eq!(row_text(&grid, 0), "A A A .");
}

#[test]
fn covered_item_is_evicted_to_the_paired_row() {
    let mut grid = Grid::new(4, 2).unwrap();
    place(&mut grid, "A", 2, Some(0), None);
    place(&mut grid, "B", 2, Some(0), None);
    place(&mut grid, "C", 2, Some(1), None);
    place(&mut grid, "D", 2, Some(1), None);

    let outcome = grid.relocate("D", 0, 2).unwrap();
    let RelocateOutcome::Relocated(r) = outcome else {
        panic!("eviction failed");
    };
    assert_eq!(row_text(&grid, 0), "A A D D");
    assert_eq!(row_text(&grid, 1), "C C B B");
    assert_eq!(r.evicted, vec![ItemId::from("B")]);
    assert_eq!(r.moved.get("B"), Some(&Position::new(1, 2)));
    assert_eq!(grid.position_of("B"), Some(Position::new(1, 2)));
    assert_eq!(grid.position_of("D"), Some(Position::new(0, 2)));
}

#[test]
fn eviction_without_room_in_the_paired_row_fails() {
    let mut grid = Grid::new(4, 2).unwrap();
    place(&mut grid, "A", 2, Some(0), None);
    place(&mut grid, "B", 2, Some(0), None);
    place(&mut grid, "C", 3, Some(1), None);
    place(&mut grid, "D", 1, Some(1), None);
    let before = grid.clone();

    assert_eq!(
        grid.relocate("D", 0, 3).unwrap(),
        RelocateOutcome::Infeasible
    );
    assert_eq!(grid, before);
    assert_eq!(row_text(&grid, 0), "A A B B");
    assert_eq!(row_text(&grid, 1), "C C C D");
}

#[test]
fn first_fit_hint_avoids_narrow_gaps() {
    let config = GridConfig {
        columns: 6,
        rows: 1,
        eviction: EvictionTarget::Paired,
        column_hint: ColumnHint::FirstFit,
    };
    let mut grid = Grid::with_config(config).unwrap();
    place(&mut grid, "A", 1, None, None);
    place(&mut grid, "B", 1, None, Some(2));
    let outcome = grid.place_new("C", 2, None, None).unwrap();
    let PlaceOutcome::Placed(p) = outcome else {
        panic!("first fit rejected C");
    };
    assert_eq!(p.position, Position::new(0, 3));
    assert!(p.moved.is_empty());
    assert_eq!(row_text(&grid, 0), "A . B C C .");
}

#[test]
fn solve_is_usable_on_bare_rows() {
    let row: SlotRow = "A A B B B . . . . .".parse().unwrap();
    let solution = solve(&ItemId::from("C"), 2, 2, &row);
    assert_eq!(solution.cost(), Some(2));
    let Solution::Placed { row: out, .. } = solution else {
        panic!("expected placement");
    };
    assert_eq!(out.to_string(), "A A C C B B B . . .");
}
