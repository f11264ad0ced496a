use tracing::debug;

use crate::common::{InputKind, SolveError};
use crate::config::SolverConfig;

#[derive(Clone, Debug, PartialEq)]
pub struct Source {
    pub id: usize,
    pub supply: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Destination {
    pub id: usize,
    pub demand: f64,
}

/// Which side received a synthesized zero-cost line to restore balance.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Dummy {
    Source,
    Destination,
}

/// A balanced transportation problem. Ids equal positions, so a dummy line is
/// always the last row or column.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub sources: Vec<Source>,
    pub destinations: Vec<Destination>,
    cost: Vec<Vec<f64>>,
    pub dummy: Option<Dummy>,
}

impl Instance {
    pub fn build(
        cost: &[Vec<f64>],
        supply: &[f64],
        demand: &[f64],
        config: &SolverConfig,
    ) -> Result<Self, SolveError> {
        check_shape(cost, supply, demand)?;
        for (i, row) in cost.iter().enumerate() {
            for (j, &c) in row.iter().enumerate() {
                check_value(InputKind::Cost, || format!("S{} -> D{}", i + 1, j + 1), c)?;
            }
        }
        for (i, &s) in supply.iter().enumerate() {
            check_value(InputKind::Supply, || format!("S{}", i + 1), s)?;
        }
        for (j, &d) in demand.iter().enumerate() {
            check_value(InputKind::Demand, || format!("D{}", j + 1), d)?;
        }

        let mut sources: Vec<Source> = supply
            .iter()
            .enumerate()
            .map(|(id, &supply)| Source { id, supply })
            .collect();
        let mut destinations: Vec<Destination> = demand
            .iter()
            .enumerate()
            .map(|(id, &demand)| Destination { id, demand })
            .collect();
        let mut cost = cost.to_vec();

        let total_supply: f64 = supply.iter().sum();
        let total_demand: f64 = demand.iter().sum();
        let excess = total_supply - total_demand;
        let dummy = if excess.abs() <= config.tolerance * total_supply.max(total_demand).max(1.0) {
            None
        } else if excess > 0.0 {
            debug!(excess, "adding dummy destination");
            destinations.push(Destination {
                id: destinations.len(),
                demand: excess,
            });
            for row in cost.iter_mut() {
                row.push(0.0);
            }
            Some(Dummy::Destination)
        } else {
            debug!(shortfall = -excess, "adding dummy source");
            sources.push(Source {
                id: sources.len(),
                supply: -excess,
            });
            cost.push(vec![0.0; destinations.len()]);
            Some(Dummy::Source)
        };

        Ok(Instance {
            sources,
            destinations,
            cost,
            dummy,
        })
    }
    pub fn rows(&self) -> usize {
        self.sources.len()
    }
    pub fn cols(&self) -> usize {
        self.destinations.len()
    }
    pub fn cost(&self, row: usize, col: usize) -> f64 {
        self.cost[row][col]
    }
    pub fn supply(&self) -> Vec<f64> {
        self.sources.iter().map(|s| s.supply).collect()
    }
    pub fn demand(&self) -> Vec<f64> {
        self.destinations.iter().map(|d| d.demand).collect()
    }
    /// Number of rows belonging to the caller, i.e. without a dummy source.
    pub fn real_rows(&self) -> usize {
        match self.dummy {
            Some(Dummy::Source) => self.rows() - 1,
            _ => self.rows(),
        }
    }
    pub fn real_cols(&self) -> usize {
        match self.dummy {
            Some(Dummy::Destination) => self.cols() - 1,
            _ => self.cols(),
        }
    }
}

fn check_shape(cost: &[Vec<f64>], supply: &[f64], demand: &[f64]) -> Result<(), SolveError> {
    if supply.is_empty() || demand.is_empty() {
        return Err(SolveError::ShapeError(format!(
            "need at least one source and one destination (got {} and {})",
            supply.len(),
            demand.len()
        )));
    }
    if cost.len() != supply.len() {
        return Err(SolveError::ShapeError(format!(
            "cost matrix has {} rows but supply has {} entries",
            cost.len(),
            supply.len()
        )));
    }
    if let Some((i, row)) = cost.iter().enumerate().find(|(_, row)| row.len() != demand.len()) {
        return Err(SolveError::ShapeError(format!(
            "cost row {} has {} columns but demand has {} entries",
            i + 1,
            row.len(),
            demand.len()
        )));
    }
    Ok(())
}

fn check_value<F: FnOnce() -> String>(kind: InputKind, position: F, value: f64) -> Result<(), SolveError> {
    if !value.is_finite() {
        return Err(SolveError::NonFiniteValue {
            kind,
            position: position(),
            value,
        });
    }
    if value < 0.0 {
        return Err(SolveError::NegativeValueError {
            kind,
            position: position(),
            value,
        });
    }
    Ok(())
}
