use tracing::{debug, trace};

use crate::basis::{BasicFeasibleSolution, LoopCell};
use crate::common::{Cell, SolveError};
use crate::config::SolverConfig;
use crate::instance::Instance;

/// Outcome of a single pricing pass over the non-basic cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pricing {
    Optimal,
    Enter { cell: Cell, reduced_cost: f64 },
}

/// Most negative reduced cost among the non-basic cells, ties broken by the
/// lowest row and then the lowest column.
pub fn price(
    instance: &Instance,
    bfs: &BasicFeasibleSolution,
    tolerance: f64,
) -> Result<Pricing, SolveError> {
    let duals = bfs.duals(instance)?;
    let mut best = Pricing::Optimal;
    let mut best_cost = -tolerance;
    // non_basic_cells is row-major, so strict comparison keeps the first tie
    for cell in bfs.non_basic_cells() {
        let reduced_cost = duals.reduced_cost(instance, cell);
        if reduced_cost < best_cost {
            best_cost = reduced_cost;
            best = Pricing::Enter { cell, reduced_cost };
        }
    }
    Ok(best)
}

/// The decreasing loop cell with the smallest allocation; ties go to the
/// lowest row, then the lowest column.
pub fn leaving(bfs: &BasicFeasibleSolution, cycle: &[LoopCell]) -> Result<(Cell, f64), SolveError> {
    cycle
        .iter()
        .filter(|loop_cell| !loop_cell.increase)
        .map(|loop_cell| (loop_cell.cell, bfs.allocation(loop_cell.cell)))
        .min_by(|(a_cell, a), (b_cell, b)| a.total_cmp(b).then(a_cell.cmp(b_cell)))
        .ok_or_else(|| SolveError::Unbounded {
            entering: cycle.first().map_or(Cell::new(0, 0), |loop_cell| loop_cell.cell),
        })
}

/// Runs MODI pivots from `bfs` until no non-basic cell has a negative reduced
/// cost. Returns the optimal basis and the number of pivots performed.
pub fn optimize(
    instance: &Instance,
    mut bfs: BasicFeasibleSolution,
    config: &SolverConfig,
) -> Result<(BasicFeasibleSolution, usize), SolveError> {
    let max_iterations = config.max_iterations(instance.rows(), instance.cols());
    let mut iterations = 0;
    loop {
        let Pricing::Enter { cell: entering, reduced_cost } = price(instance, &bfs, config.tolerance)? else {
            debug!(iterations, cost = bfs.total_cost(instance), "optimal basis reached");
            return Ok((bfs, iterations));
        };
        if iterations >= max_iterations {
            return Err(SolveError::CycleError { max_iterations });
        }
        let cycle = bfs.pivot_loop(entering)?;
        let (exiting, step) = leaving(&bfs, &cycle)?;
        trace!(
            iteration = iterations,
            %entering,
            reduced_cost,
            %exiting,
            step,
            "pivot"
        );
        bfs.pivot(&cycle, exiting, step);
        iterations += 1;
    }
}
