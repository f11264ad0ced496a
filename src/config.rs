use serde::{Deserialize, Serialize};

/// Rule used to build the starting basis.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialMethod {
    #[default]
    LeastCost,
    NorthwestCorner,
    Vogel,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub initial_method: InitialMethod,
    /// Absolute slack for exhausted remainders and reduced-cost signs. The
    /// supply/demand balance check is relative: totals count as equal when
    /// they differ by at most `tolerance * max(total_supply, total_demand, 1)`.
    pub tolerance: f64,
    /// Pivot budget is `iteration_factor * rows * cols` of the balanced instance.
    pub iteration_factor: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            initial_method: InitialMethod::LeastCost,
            tolerance: 1e-9,
            iteration_factor: 10,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_initial_method(mut self, initial_method: InitialMethod) -> Self {
        self.initial_method = initial_method;
        self
    }
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.abs();
        self
    }
    pub fn with_iteration_factor(mut self, iteration_factor: usize) -> Self {
        self.iteration_factor = iteration_factor.max(1);
        self
    }
    pub fn max_iterations(&self, rows: usize, cols: usize) -> usize {
        self.iteration_factor.saturating_mul(rows).saturating_mul(cols)
    }
}
