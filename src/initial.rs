use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;

use crate::basis::BasicFeasibleSolution;
use crate::common::Cell;
use crate::config::InitialMethod;
use crate::instance::Instance;

pub fn generate(instance: &Instance, method: InitialMethod, tolerance: f64) -> BasicFeasibleSolution {
    let mut allocator = Allocator::new(instance, tolerance);
    match method {
        InitialMethod::LeastCost => least_cost(instance, &mut allocator),
        InitialMethod::NorthwestCorner => northwest_corner(&mut allocator),
        InitialMethod::Vogel => vogel(instance, &mut allocator),
    }
    allocator.bfs
}

/// Shared bookkeeping of the starting rules: every call to `allocate` closes
/// exactly one line, except the very last which closes the final row and
/// column together, so the basis ends with `rows + cols - 1` cells.
struct Allocator {
    row_left: Vec<f64>,
    col_left: Vec<f64>,
    row_open: Vec<bool>,
    col_open: Vec<bool>,
    open_rows: usize,
    open_cols: usize,
    tolerance: f64,
    bfs: BasicFeasibleSolution,
}

impl Allocator {
    fn new(instance: &Instance, tolerance: f64) -> Self {
        let rows = instance.rows();
        let cols = instance.cols();
        Allocator {
            row_left: instance.supply(),
            col_left: instance.demand(),
            row_open: vec![true; rows],
            col_open: vec![true; cols],
            open_rows: rows,
            open_cols: cols,
            tolerance,
            bfs: BasicFeasibleSolution::new(rows, cols),
        }
    }
    fn done(&self) -> bool {
        self.open_rows == 0 && self.open_cols == 0
    }
    fn is_open(&self, cell: Cell) -> bool {
        self.row_open[cell.row] && self.col_open[cell.col]
    }
    fn allocate(&mut self, cell: Cell) {
        let Cell { row, col } = cell;
        let amount = self.row_left[row].min(self.col_left[col]);
        self.bfs.insert(cell, amount);
        self.row_left[row] -= amount;
        self.col_left[col] -= amount;
        if self.row_left[row] <= self.tolerance {
            self.row_left[row] = 0.0;
        }
        if self.col_left[col] <= self.tolerance {
            self.col_left[col] = 0.0;
        }
        // When row and column run out together only the row is closed; the
        // column stays open with nothing left and later takes a zero-valued
        // basic cell. The last open line of a side is only closed together
        // with the last open line of the other side.
        if self.open_rows == 1 && self.open_cols == 1 {
            self.close_row(row);
            self.close_col(col);
        } else if self.open_cols == 1 {
            self.row_left[row] = 0.0;
            self.close_row(row);
        } else if self.open_rows == 1 {
            self.col_left[col] = 0.0;
            self.close_col(col);
        } else if self.row_left[row] == 0.0 {
            self.close_row(row);
        } else {
            self.close_col(col);
        }
    }
    fn close_row(&mut self, row: usize) {
        self.row_open[row] = false;
        self.open_rows -= 1;
    }
    fn close_col(&mut self, col: usize) {
        self.col_open[col] = false;
        self.open_cols -= 1;
    }
}

fn least_cost(instance: &Instance, allocator: &mut Allocator) {
    // pops the cheapest cell; ties go to the lowest row, then column
    let mut q: PriorityQueue<Cell, Reverse<(OrderedFloat<f64>, usize, usize)>> = PriorityQueue::new();
    for row in 0..instance.rows() {
        for col in 0..instance.cols() {
            q.push(Cell::new(row, col), Reverse((OrderedFloat(instance.cost(row, col)), row, col)));
        }
    }
    while let Some((cell, _)) = q.pop() {
        if allocator.done() {
            break;
        }
        if allocator.is_open(cell) {
            allocator.allocate(cell);
        }
    }
}

fn northwest_corner(allocator: &mut Allocator) {
    let (mut row, mut col) = (0, 0);
    while !allocator.done() {
        allocator.allocate(Cell::new(row, col));
        if !allocator.row_open[row] {
            row += 1;
        }
        if !allocator.col_open[col] {
            col += 1;
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Line {
    Row(usize),
    Col(usize),
}

fn vogel(instance: &Instance, allocator: &mut Allocator) {
    while !allocator.done() {
        let mut best: Option<(f64, Line)> = None;
        let row_lines = (0..instance.rows())
            .filter(|&row| allocator.row_open[row])
            .map(Line::Row);
        let col_lines = (0..instance.cols())
            .filter(|&col| allocator.col_open[col])
            .map(Line::Col);
        for line in row_lines.chain(col_lines) {
            let cells = open_cells(instance, allocator, line);
            let Some(penalty) = penalty(instance, &cells) else {
                continue;
            };
            if best.map_or(true, |(p, _)| penalty > p) {
                best = Some((penalty, line));
            }
        }
        let Some((_, line)) = best else {
            break;
        };
        let cells = open_cells(instance, allocator, line);
        let Some(cheapest) = cheapest(instance, &cells) else {
            break;
        };
        allocator.allocate(cheapest);
    }
}

fn open_cells(instance: &Instance, allocator: &Allocator, line: Line) -> Vec<Cell> {
    match line {
        Line::Row(row) => (0..instance.cols())
            .map(|col| Cell::new(row, col))
            .filter(|cell| allocator.is_open(*cell))
            .collect(),
        Line::Col(col) => (0..instance.rows())
            .map(|row| Cell::new(row, col))
            .filter(|cell| allocator.is_open(*cell))
            .collect(),
    }
}

fn penalty(instance: &Instance, cells: &[Cell]) -> Option<f64> {
    let mut costs: Vec<f64> = cells.iter().map(|c| instance.cost(c.row, c.col)).collect();
    costs.sort_by(|a, b| a.total_cmp(b));
    match costs.as_slice() {
        [] => None,
        [only] => Some(*only),
        [first, second, ..] => Some(second - first),
    }
}

fn cheapest(instance: &Instance, cells: &[Cell]) -> Option<Cell> {
    // cells come in index order, so min_by_key keeps the lowest index on ties
    cells
        .iter()
        .copied()
        .min_by_key(|c| OrderedFloat(instance.cost(c.row, c.col)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConfig;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn instance(cost: &[Vec<f64>], supply: &[f64], demand: &[f64]) -> Instance {
        Instance::build(cost, supply, demand, &SolverConfig::default()).unwrap()
    }

    fn assert_feasible(inst: &Instance, bfs: &BasicFeasibleSolution) {
        assert_eq!(bfs.basis_len(), inst.rows() + inst.cols() - 1);
        for (i, supply) in inst.supply().iter().enumerate() {
            let shipped: f64 = bfs.allocations()[i].iter().sum();
            assert_relative_eq!(shipped, *supply, epsilon = 1e-9);
        }
        for (j, demand) in inst.demand().iter().enumerate() {
            let received: f64 = bfs.allocations().iter().map(|row| row[j]).sum();
            assert_relative_eq!(received, *demand, epsilon = 1e-9);
        }
        for row in bfs.allocations() {
            assert!(row.iter().all(|&x| x >= 0.0));
        }
    }

    #[test]
    fn least_cost_picks_cheapest_cells_first() {
        let inst = instance(&[vec![3.0, 1.0, 7.0], vec![2.0, 6.0, 5.0]], &[10.0, 15.0], &[8.0, 9.0, 8.0]);
        let bfs = generate(&inst, InitialMethod::LeastCost, 1e-9);
        assert_feasible(&inst, &bfs);
        assert_eq!(bfs.allocation(Cell::new(0, 1)), 9.0);
        assert_eq!(bfs.allocation(Cell::new(1, 0)), 8.0);
        assert_eq!(bfs.allocation(Cell::new(1, 2)), 7.0);
        assert_eq!(bfs.allocation(Cell::new(0, 2)), 1.0);
    }

    #[test]
    fn least_cost_ties_go_to_lowest_index() {
        let inst = instance(&[vec![1.0, 1.0], vec![1.0, 1.0]], &[5.0, 5.0], &[5.0, 5.0]);
        let bfs = generate(&inst, InitialMethod::LeastCost, 1e-9);
        assert_feasible(&inst, &bfs);
        assert_eq!(bfs.allocation(Cell::new(0, 0)), 5.0);
        assert!(bfs.is_basic(Cell::new(1, 0)));
        assert_eq!(bfs.allocation(Cell::new(1, 0)), 0.0);
        assert_eq!(bfs.allocation(Cell::new(1, 1)), 5.0);
    }

    #[test]
    fn northwest_corner_walks_the_staircase() {
        let inst = instance(&[vec![3.0, 1.0, 7.0], vec![2.0, 6.0, 5.0]], &[10.0, 15.0], &[8.0, 9.0, 8.0]);
        let bfs = generate(&inst, InitialMethod::NorthwestCorner, 1e-9);
        assert_feasible(&inst, &bfs);
        let basic: Vec<Cell> = bfs.basic_cells().copied().collect();
        assert_eq!(basic, vec![Cell::new(0, 0), Cell::new(0, 1), Cell::new(1, 1), Cell::new(1, 2)]);
    }

    #[test]
    fn vogel_starts_at_largest_penalty() {
        // row penalties 2 and 3, column penalties 1, 5, 2: column 1 wins, cheapest is (0, 1)
        let inst = instance(&[vec![3.0, 1.0, 7.0], vec![2.0, 6.0, 5.0]], &[10.0, 15.0], &[8.0, 9.0, 8.0]);
        let bfs = generate(&inst, InitialMethod::Vogel, 1e-9);
        assert_feasible(&inst, &bfs);
        assert_eq!(bfs.allocation(Cell::new(0, 1)), 9.0);
    }

    #[rstest]
    #[case::least_cost(InitialMethod::LeastCost)]
    #[case::northwest(InitialMethod::NorthwestCorner)]
    #[case::vogel(InitialMethod::Vogel)]
    fn degenerate_supply_keeps_full_basis(#[case] method: InitialMethod) {
        let inst = instance(
            &[vec![4.0, 2.0, 9.0], vec![1.0, 8.0, 3.0], vec![5.0, 5.0, 5.0]],
            &[10.0, 10.0, 10.0],
            &[10.0, 10.0, 10.0],
        );
        let bfs = generate(&inst, method, 1e-9);
        assert_feasible(&inst, &bfs);
    }

    #[rstest]
    #[case::least_cost(InitialMethod::LeastCost)]
    #[case::northwest(InitialMethod::NorthwestCorner)]
    #[case::vogel(InitialMethod::Vogel)]
    fn all_zero_instance(#[case] method: InitialMethod) {
        let inst = instance(&[vec![1.0, 2.0], vec![3.0, 4.0]], &[0.0, 0.0], &[0.0, 0.0]);
        let bfs = generate(&inst, method, 1e-9);
        assert_feasible(&inst, &bfs);
    }
}
