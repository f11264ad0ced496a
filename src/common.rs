use std::fmt::Display;

use thiserror::Error;

#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Cell {
    // source index, destination index
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "S{} -> D{}", self.row + 1, self.col + 1)
    }
}

/// Which raw input a validation error points at.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum InputKind {
    Cost,
    Supply,
    Demand,
}

impl Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InputKind::Cost => "cost",
            InputKind::Supply => "supply",
            InputKind::Demand => "demand",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("Shape mismatch: {0}")]
    ShapeError(String),
    #[error("Negative {kind} value {value} at {position}")]
    NegativeValueError {
        kind: InputKind,
        position: String,
        value: f64,
    },
    #[error("Non-finite {kind} value {value} at {position}")]
    NonFiniteValue {
        kind: InputKind,
        position: String,
        value: f64,
    },
    #[error("Total cost {total_cost} is not representable; inputs are too large")]
    NonFiniteTotal { total_cost: f64 },
    #[error("No optimum reached within {max_iterations} pivots")]
    CycleError { max_iterations: usize },
    #[error("Pivot loop through {entering} has no decreasing cell")]
    Unbounded { entering: Cell },
    #[error("Basis invariant violated: {0}")]
    Infeasible(String),
}

impl SolveError {
    /// True for errors caused by the caller's data rather than by the solver.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SolveError::ShapeError(_)
                | SolveError::NegativeValueError { .. }
                | SolveError::NonFiniteValue { .. }
                | SolveError::NonFiniteTotal { .. }
        )
    }
}
