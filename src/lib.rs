//! Transportation problem solver: balances supply and demand, seeds a basis
//! with a starting rule, and improves it with MODI pivots over the spanning
//! tree of basic cells.

pub mod basis;
pub mod common;
pub mod config;
pub mod initial;
pub mod instance;
pub mod simplex;
pub mod solution;

use tracing::instrument;

pub use basis::{BasicFeasibleSolution, DualVariables};
pub use common::{Cell, InputKind, SolveError};
pub use config::{InitialMethod, SolverConfig};
pub use instance::{Destination, Dummy, Instance, Source};
pub use solution::Solution;

/// Minimum-cost shipment plan for `cost[source][destination]` with the default
/// configuration.
pub fn solve(cost: &[Vec<f64>], supply: &[f64], demand: &[f64]) -> Result<Solution, SolveError> {
    solve_with(cost, supply, demand, &SolverConfig::default())
}

#[instrument(skip_all, fields(sources = supply.len(), destinations = demand.len()))]
pub fn solve_with(
    cost: &[Vec<f64>],
    supply: &[f64],
    demand: &[f64],
    config: &SolverConfig,
) -> Result<Solution, SolveError> {
    let instance = Instance::build(cost, supply, demand, config)?;
    let start = initial::generate(&instance, config.initial_method, config.tolerance);
    let (bfs, iterations) = simplex::optimize(&instance, start, config)?;
    Solution::report(&instance, &bfs, iterations)
}
