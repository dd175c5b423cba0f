//! Step execution and reporting for the `run` and `apply` subcommands.

use serde::Serialize;
use slotgrid::{Grid, GridConfig, PlaceOutcome, RelocateOutcome, config};
use tracing::{info, warn};

use crate::{
    cli::{ApplyArgs, OutputArgs, RunArgs},
    error::{Error, Result},
    script::{self, Directive},
};

/// What a single step did to the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// Result of a `place` directive.
    Place(PlaceOutcome),
    /// Result of a `relocate` directive.
    Relocate(RelocateOutcome),
    /// Result of a `remove` directive.
    Remove {
        /// Slots released by the removal.
        freed: usize,
    },
}

impl StepOutcome {
    /// Whether the step changed the grid.
    fn committed(&self) -> bool {
        match self {
            Self::Place(outcome) => matches!(outcome, PlaceOutcome::Placed(_)),
            Self::Relocate(outcome) => matches!(outcome, RelocateOutcome::Relocated(_)),
            Self::Remove { .. } => true,
        }
    }
}

/// Per-step entry in the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// 1-based step index.
    pub step: usize,
    /// The directive that ran.
    pub directive: Directive,
    /// Its outcome.
    pub outcome: StepOutcome,
}

/// JSON document written by `--json`.
#[derive(Debug, Serialize)]
struct Report<'a> {
    /// One entry per step.
    steps: &'a [StepReport],
    /// Final rows, rendered one string per row.
    rows: Vec<String>,
}

/// Execute one directive.
fn execute(grid: &mut Grid, directive: &Directive) -> slotgrid::Result<StepOutcome> {
    Ok(match directive {
        Directive::Place {
            name,
            width,
            row,
            col,
        } => StepOutcome::Place(grid.place_new(name.as_str(), *width, *row, *col)?),
        Directive::Relocate { name, row, col } => {
            StepOutcome::Relocate(grid.relocate(name.as_str(), *row, *col)?)
        }
        Directive::Remove { name } => StepOutcome::Remove {
            freed: grid.remove(name.as_str())?,
        },
    })
}

/// Run `steps` in order. Infeasible steps are reported and skipped; a
/// precondition violation stops the run.
pub fn run_steps(grid: &mut Grid, steps: &[Directive]) -> Result<Vec<StepReport>> {
    let mut reports = Vec::with_capacity(steps.len());
    for (idx, directive) in steps.iter().enumerate() {
        let step = idx + 1;
        let outcome = execute(grid, directive).map_err(|source| Error::Step {
            step,
            directive: directive.to_string(),
            source,
        })?;
        if outcome.committed() {
            info!(step, %directive, "applied");
        } else {
            warn!(step, %directive, "infeasible; grid unchanged");
        }
        reports.push(StepReport {
            step,
            directive: directive.clone(),
            outcome,
        });
    }
    Ok(reports)
}

/// Print the final state in the requested format.
fn emit(grid: &Grid, reports: &[StepReport], output: OutputArgs) -> Result<()> {
    if output.json {
        let report = Report {
            steps: reports,
            rows: grid.rows().iter().map(ToString::to_string).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{grid}");
    }
    Ok(())
}

/// Run a script file.
pub fn run_script(args: &RunArgs) -> Result<()> {
    let script = script::load_script(&args.script)?;
    info!(
        path = %args.script.display(),
        steps = script.steps.len(),
        "Script loaded"
    );
    let mut grid = Grid::with_config(script.grid)?;
    let reports = run_steps(&mut grid, &script.steps)?;
    emit(&grid, &reports, args.output)
}

/// Build the grid configuration for `apply` from a file and overrides.
fn apply_config(args: &ApplyArgs) -> Result<GridConfig> {
    let mut cfg = match &args.config {
        Some(path) => config::load_from_path(path)?,
        None => GridConfig::default(),
    };
    if let Some(columns) = args.columns {
        cfg.columns = columns;
    }
    if let Some(rows) = args.rows {
        cfg.rows = rows;
    }
    Ok(cfg)
}

/// Apply directives given on the command line.
pub fn apply(args: &ApplyArgs) -> Result<()> {
    let directives: Vec<Directive> = args
        .directives
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            script::parse_directive(raw)
                .map_err(|err| Error::parse(format!("directive {} ('{}'): {}", idx + 1, raw, err)))
        })
        .collect::<Result<_>>()?;

    if directives.is_empty() {
        return Err(Error::NoDirectives);
    }

    let mut grid = Grid::with_config(apply_config(args)?)?;
    info!(
        steps = directives.len(),
        columns = grid.columns(),
        rows = grid.row_count(),
        eviction = ?grid.config().eviction,
        "Directives queued"
    );
    let reports = run_steps(&mut grid, &directives)?;
    emit(&grid, &reports, args.output)
}

#[cfg(test)]
mod tests {
    use slotgrid::Position;

    use super::*;

    fn steps(raw: &[&str]) -> Vec<Directive> {
        raw.iter()
            .map(|r| script::parse_directive(r).unwrap())
            .collect()
    }

    #[test]
    fn infeasible_steps_do_not_abort() {
        let mut grid = Grid::new(4, 1).unwrap();
        let reports = run_steps(
            &mut grid,
            &steps(&[
                r#"place(name: "A", width: 3)"#,
                r#"place(name: "B", width: 2)"#,
                r#"remove(name: "A")"#,
            ]),
        )
        .unwrap();
        assert_eq!(reports.len(), 3);
        assert_eq!(
            reports[1].outcome,
            StepOutcome::Place(PlaceOutcome::Infeasible)
        );
        assert_eq!(reports[2].outcome, StepOutcome::Remove { freed: 3 });
        assert!(grid.is_empty());
    }

    #[test]
    fn precondition_violation_stops_the_run() {
        let mut grid = Grid::new(4, 1).unwrap();
        let err = run_steps(
            &mut grid,
            &steps(&[
                r#"place(name: "A", width: 1)"#,
                r#"relocate(name: "Z", row: 0, col: 0)"#,
                r#"place(name: "B", width: 1)"#,
            ]),
        )
        .unwrap_err();
        match err {
            Error::Step { step, source, .. } => {
                assert_eq!(step, 2);
                assert!(matches!(source, slotgrid::Error::UnknownItem { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn relocation_report_lists_moved_items() {
        let mut grid = Grid::new(10, 1).unwrap();
        let reports = run_steps(
            &mut grid,
            &steps(&[
                r#"place(name: "A", width: 2)"#,
                r#"place(name: "B", width: 3)"#,
                r#"place(name: "C", width: 2, col: 7)"#,
                r#"relocate(name: "C", row: 0, col: 2)"#,
            ]),
        )
        .unwrap();
        let StepOutcome::Relocate(RelocateOutcome::Relocated(r)) = &reports[3].outcome else {
            panic!("relocation failed: {:?}", reports[3].outcome);
        };
        assert_eq!(r.moved.get("B"), Some(&Position::new(0, 4)));
        assert_eq!(grid.row(0).unwrap().to_string(), "A A C C B B B . . .");
    }

    #[test]
    fn json_report_tags_outcomes() {
        let mut grid = Grid::new(4, 1).unwrap();
        let reports = run_steps(&mut grid, &steps(&[r#"place(name: "A", width: 2)"#])).unwrap();
        let value = serde_json::to_value(&reports[0]).unwrap();
        assert_eq!(value["step"], 1);
        assert_eq!(value["directive"]["place"]["name"], "A");
        assert_eq!(value["outcome"]["place"]["status"], "placed");
    }

    #[test]
    fn apply_overrides_shape() {
        let args = ApplyArgs {
            directives: vec![],
            config: None,
            columns: Some(6),
            rows: Some(3),
            output: OutputArgs { json: false },
        };
        let cfg = apply_config(&args).unwrap();
        assert_eq!((cfg.columns, cfg.rows), (6, 3));
    }
}
