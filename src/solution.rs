use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::basis::BasicFeasibleSolution;
use crate::common::{Cell, SolveError};
use crate::instance::Instance;

/// Optimal shipment plan over the caller's sources (rows) and destinations
/// (columns). Dummy lines added for balancing never appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub allocation: Vec<Vec<f64>>,
    pub total_cost: f64,
    pub iterations: usize,
}

impl Solution {
    pub fn report(
        instance: &Instance,
        bfs: &BasicFeasibleSolution,
        iterations: usize,
    ) -> Result<Self, SolveError> {
        let rows = instance.real_rows();
        let cols = instance.real_cols();
        let allocation: Vec<Vec<f64>> = bfs.allocations()[..rows]
            .iter()
            .map(|row| row[..cols].to_vec())
            .collect();
        let total_cost: f64 = allocation
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.iter().enumerate().map(move |(j, &x)| (i, j, x)))
            .map(|(i, j, x)| instance.cost(i, j) * x)
            .sum();
        if !total_cost.is_finite() {
            return Err(SolveError::NonFiniteTotal { total_cost });
        }
        Ok(Solution {
            allocation,
            total_cost,
            iterations,
        })
    }
    pub fn rows(&self) -> usize {
        self.allocation.len()
    }
    pub fn cols(&self) -> usize {
        self.allocation.first().map_or(0, |row| row.len())
    }
    pub fn get(&self, source: usize, destination: usize) -> Option<f64> {
        self.allocation.get(source)?.get(destination).copied()
    }
    /// Strictly positive shipments in row-major order.
    pub fn shipments(&self) -> impl Iterator<Item = (Cell, f64)> + '_ {
        self.allocation.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &x)| x > 0.0)
                .map(move |(j, &x)| (Cell::new(i, j), x))
        })
    }
    pub fn shipped_from(&self, source: usize) -> f64 {
        self.allocation.get(source).map_or(0.0, |row| row.iter().sum())
    }
    pub fn delivered_to(&self, destination: usize) -> f64 {
        self.allocation
            .iter()
            .filter_map(|row| row.get(destination))
            .sum()
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:>6}", "")?;
        for j in 0..self.cols() {
            write!(f, " {:>10}", format!("D{}", j + 1))?;
        }
        writeln!(f)?;
        for (i, row) in self.allocation.iter().enumerate() {
            write!(f, "{:>6}", format!("S{}", i + 1))?;
            for x in row {
                write!(f, " {:>10.2}", x)?;
            }
            writeln!(f)?;
        }
        write!(f, "Minimal total cost: {:.2}", self.total_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConfig;

    #[test]
    fn dummy_destination_is_stripped() {
        let inst = Instance::build(&[vec![2.0], vec![5.0]], &[60.0, 40.0], &[80.0], &SolverConfig::default()).unwrap();
        let mut bfs = BasicFeasibleSolution::new(2, 2);
        bfs.insert(Cell::new(0, 0), 60.0);
        bfs.insert(Cell::new(1, 0), 20.0);
        bfs.insert(Cell::new(1, 1), 20.0);
        let solution = Solution::report(&inst, &bfs, 3).unwrap();
        assert_eq!(solution.allocation, vec![vec![60.0], vec![20.0]]);
        assert_eq!(solution.total_cost, 220.0);
        assert_eq!(solution.iterations, 3);
        assert_eq!(solution.shipped_from(1), 20.0);
        assert_eq!(solution.delivered_to(0), 80.0);
    }

    #[test]
    fn overflowing_total_is_an_error() {
        let inst = Instance::build(&[vec![1e300, 1e300]], &[1e10], &[5e9, 5e9], &SolverConfig::default()).unwrap();
        let mut bfs = BasicFeasibleSolution::new(1, 2);
        bfs.insert(Cell::new(0, 0), 5e9);
        bfs.insert(Cell::new(0, 1), 5e9);
        let err = Solution::report(&inst, &bfs, 0).unwrap_err();
        assert_eq!(err, SolveError::NonFiniteTotal { total_cost: f64::INFINITY });
        assert!(err.is_input_error());
    }

    #[test]
    fn accessors_and_display() {
        let solution = Solution {
            allocation: vec![vec![0.0, 20.0], vec![25.0, 5.0]],
            total_cost: 265.0,
            iterations: 1,
        };
        assert_eq!(solution.get(1, 0), Some(25.0));
        assert_eq!(solution.get(2, 0), None);
        let shipped: Vec<(Cell, f64)> = solution.shipments().collect();
        assert_eq!(
            shipped,
            vec![(Cell::new(0, 1), 20.0), (Cell::new(1, 0), 25.0), (Cell::new(1, 1), 5.0)]
        );
        let text = solution.to_string();
        assert!(text.contains("D2"));
        assert!(text.contains("S2"));
        assert!(text.contains("25.00"));
        assert!(text.ends_with("Minimal total cost: 265.00"));
    }
}
