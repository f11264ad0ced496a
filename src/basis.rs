use std::collections::BTreeSet;

use pathfinding::prelude::bfs;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::{Bfs, EdgeRef};

use crate::common::{Cell, SolveError};
use crate::instance::Instance;

/// Basic cells with their allocations. Row `i` of the transportation graph is
/// node `i`, column `j` is node `rows + j`; the basic cells are its edges and
/// must form a spanning tree.
#[derive(Clone, Debug, PartialEq)]
pub struct BasicFeasibleSolution {
    rows: usize,
    cols: usize,
    allocation: Vec<Vec<f64>>,
    basis: BTreeSet<Cell>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DualVariables {
    pub u: Vec<f64>,
    pub v: Vec<f64>,
}

impl DualVariables {
    pub fn reduced_cost(&self, instance: &Instance, cell: Cell) -> f64 {
        instance.cost(cell.row, cell.col) - self.u[cell.row] - self.v[cell.col]
    }
}

/// One cell of a pivot loop; `increase` is the `+` sign.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoopCell {
    pub cell: Cell,
    pub increase: bool,
}

impl BasicFeasibleSolution {
    pub fn new(rows: usize, cols: usize) -> Self {
        BasicFeasibleSolution {
            rows,
            cols,
            allocation: vec![vec![0.0; cols]; rows],
            basis: BTreeSet::new(),
        }
    }
    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn cols(&self) -> usize {
        self.cols
    }
    pub fn allocation(&self, cell: Cell) -> f64 {
        self.allocation[cell.row][cell.col]
    }
    pub fn allocations(&self) -> &[Vec<f64>] {
        &self.allocation
    }
    pub fn is_basic(&self, cell: Cell) -> bool {
        self.basis.contains(&cell)
    }
    /// Basic cells in row-major order.
    pub fn basic_cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.basis.iter()
    }
    pub fn basis_len(&self) -> usize {
        self.basis.len()
    }
    pub fn non_basic_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.rows)
            .flat_map(move |row| (0..self.cols).map(move |col| Cell::new(row, col)))
            .filter(|cell| !self.basis.contains(cell))
    }
    /// Makes `cell` basic with the given allocation.
    pub fn insert(&mut self, cell: Cell, value: f64) {
        self.allocation[cell.row][cell.col] = value;
        self.basis.insert(cell);
    }
    fn remove(&mut self, cell: Cell) {
        self.allocation[cell.row][cell.col] = 0.0;
        self.basis.remove(&cell);
    }
    pub fn total_cost(&self, instance: &Instance) -> f64 {
        self.basis
            .iter()
            .map(|cell| instance.cost(cell.row, cell.col) * self.allocation(*cell))
            .sum()
    }

    fn node_of_row(&self, row: usize) -> usize {
        row
    }
    fn node_of_col(&self, col: usize) -> usize {
        self.rows + col
    }
    fn edge_cell(&self, a: usize, b: usize) -> Cell {
        if a < self.rows {
            Cell::new(a, b - self.rows)
        } else {
            Cell::new(b, a - self.rows)
        }
    }
    fn tree(&self) -> UnGraph<(), Cell> {
        let mut graph = UnGraph::with_capacity(self.rows + self.cols, self.basis.len());
        for _ in 0..self.rows + self.cols {
            graph.add_node(());
        }
        for cell in self.basis.iter() {
            graph.add_edge(
                NodeIndex::new(self.node_of_row(cell.row)),
                NodeIndex::new(self.node_of_col(cell.col)),
                *cell,
            );
        }
        graph
    }

    /// Solves `u[i] + v[j] = cost[i][j]` over the basic cells, starting from `u[0] = 0`.
    pub fn duals(&self, instance: &Instance) -> Result<DualVariables, SolveError> {
        let tree = self.tree();
        let mut potential: Vec<Option<f64>> = vec![None; self.rows + self.cols];
        potential[0] = Some(0.0);
        let mut walk = Bfs::new(&tree, NodeIndex::new(0));
        while let Some(node) = walk.next(&tree) {
            let Some(p) = potential[node.index()] else {
                continue;
            };
            for edge in tree.edges(node) {
                let other = if edge.source() == node { edge.target() } else { edge.source() };
                if potential[other.index()].is_none() {
                    let cell = edge.weight();
                    potential[other.index()] = Some(instance.cost(cell.row, cell.col) - p);
                }
            }
        }
        let potential = potential
            .into_iter()
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| SolveError::Infeasible("basic cells do not span every row and column".to_owned()))?;
        let v = potential[self.rows..].to_vec();
        let mut u = potential;
        u.truncate(self.rows);
        Ok(DualVariables { u, v })
    }

    /// The closed loop formed by a non-basic `entering` cell and the basis,
    /// starting with `entering` itself (sign `+`) and alternating from there.
    pub fn pivot_loop(&self, entering: Cell) -> Result<Vec<LoopCell>, SolveError> {
        let tree = self.tree();
        let start = self.node_of_row(entering.row);
        let goal = self.node_of_col(entering.col);
        let path = bfs(
            &start,
            |&node| {
                tree.neighbors(NodeIndex::new(node))
                    .map(|n| n.index())
                    .collect::<Vec<_>>()
            },
            |&node| node == goal,
        )
        .ok_or_else(|| SolveError::Infeasible(format!("no basis path closes a loop through {entering}")))?;
        let mut cycle = vec![LoopCell {
            cell: entering,
            increase: true,
        }];
        cycle.extend(path.windows(2).enumerate().map(|(k, pair)| LoopCell {
            cell: self.edge_cell(pair[0], pair[1]),
            increase: k % 2 == 1,
        }));
        Ok(cycle)
    }

    /// Shifts `step` around `cycle`, swapping `entering` (first loop cell) into
    /// the basis and `leaving` out of it.
    pub fn pivot(&mut self, cycle: &[LoopCell], leaving: Cell, step: f64) {
        for loop_cell in cycle {
            let current = self.allocation(loop_cell.cell);
            let next = if loop_cell.increase { current + step } else { (current - step).max(0.0) };
            self.insert(loop_cell.cell, next);
        }
        self.remove(leaving);
    }
}
