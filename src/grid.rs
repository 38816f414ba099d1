use crate::cell::{Cell, CellType};
use crate::error::{GridError, Result};
use core::fmt;
use grid_util::point::Point;
use itertools::iproduct;
use log::{debug, warn};

/// Explicit brush for edit operations: the type to paint and, optionally, the cost and street
/// label to stamp onto the painted cell.
#[derive(Clone, Debug, PartialEq)]
pub struct EditContext {
    pub paint: CellType,
    pub cost: Option<f64>,
    pub street_label: Option<String>,
}

impl EditContext {
    pub fn new(paint: CellType) -> EditContext {
        EditContext {
            paint,
            cost: None,
            street_label: None,
        }
    }
    pub fn with_cost(mut self, cost: f64) -> EditContext {
        self.cost = Some(cost);
        self
    }
    pub fn with_street_label(mut self, label: impl Into<String>) -> EditContext {
        self.street_label = Some(label.into());
        self
    }
}

/// [Grid] owns a fixed-size, row-major array of [Cell]s together with the registry of the start
/// cell and the ordered goal list. Positions are [Point]s with `x` the column and `y` the row.
///
/// The grid holds at most one [Start](CellType::Start) cell. Goals are visited in the order in
/// which they were placed, not in spatial order.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    start: Option<Point>,
    goals: Vec<Point>,
}

impl Grid {
    /// Creates a grid of `rows * cols` empty cells without start or goals.
    pub fn new(rows: usize, cols: usize) -> Result<Grid> {
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidDimensions { rows, cols });
        }
        Ok(Grid {
            rows,
            cols,
            cells: vec![Cell::default(); rows * cols],
            start: None,
            goals: Vec::new(),
        })
    }

    /// Replaces every cell with a fresh empty one. The start and goal registries are cleared
    /// and previously obtained positions may no longer be valid.
    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<()> {
        *self = Grid::new(rows, cols)?;
        debug!("Resized grid to {}x{}", rows, cols);
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn cols(&self) -> usize {
        self.cols
    }
    pub fn len(&self) -> usize {
        self.cells.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
    pub fn start(&self) -> Option<Point> {
        self.start
    }
    /// Goals in visiting order.
    pub fn goals(&self) -> &[Point] {
        &self.goals
    }

    pub fn in_bounds(&self, pos: Point) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.y as usize) < self.rows && (pos.x as usize) < self.cols
    }

    /// Row-major index of `pos`, which has to be in bounds.
    pub(crate) fn ix(&self, pos: Point) -> usize {
        pos.y as usize * self.cols + pos.x as usize
    }

    pub(crate) fn point_at(&self, ix: usize) -> Point {
        Point::new((ix % self.cols) as i32, (ix / self.cols) as i32)
    }

    fn checked_ix(&self, pos: Point) -> Result<usize> {
        if self.in_bounds(pos) {
            Ok(self.ix(pos))
        } else {
            Err(GridError::OutOfBounds {
                row: pos.y as i64,
                col: pos.x as i64,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    pub fn get(&self, pos: Point) -> Result<&Cell> {
        let ix = self.checked_ix(pos)?;
        Ok(&self.cells[ix])
    }

    /// Unchecked access for positions already known to be in bounds.
    pub(crate) fn cell(&self, pos: Point) -> &Cell {
        &self.cells[self.ix(pos)]
    }

    /// Same as [get](Self::get) but addressed by row and column.
    pub fn get_rc(&self, row: usize, col: usize) -> Result<&Cell> {
        self.get(Point::new(col as i32, row as i32))
    }

    /// Iterates over all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Point, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(ix, cell)| (self.point_at(ix), cell))
    }

    /// Changes the type of a cell, keeping the start and goal registries consistent. Placing a
    /// start while a different cell is the start is rejected; call [clear_start](Self::clear_start)
    /// first. Overwriting a goal removes it from the goal list, preserving the order of the others.
    pub fn set_cell_type(&mut self, pos: Point, new_type: CellType) -> Result<()> {
        let ix = self.checked_ix(pos)?;
        if new_type == CellType::Start {
            if let Some(start) = self.start.filter(|s| *s != pos) {
                return Err(GridError::StartAlreadySet {
                    row: start.y as usize,
                    col: start.x as usize,
                });
            }
        }
        self.unregister(pos);
        let cell = &mut self.cells[ix];
        cell.cell_type = new_type;
        cell.color = new_type.default_color();
        self.register(pos, new_type);
        Ok(())
    }

    /// Paints a cell with the given brush. Unlike [set_cell_type](Self::set_cell_type), painting a
    /// start while one exists is ignored rather than rejected. Returns whether the cell changed.
    pub fn paint(&mut self, pos: Point, context: &EditContext) -> Result<bool> {
        self.checked_ix(pos)?;
        if context.paint == CellType::Start && self.start.is_some() {
            return Ok(false);
        }
        if let Some(cost) = context.cost {
            self.set_cost(pos, cost)?;
        }
        if let Some(label) = &context.street_label {
            self.set_street_label(pos, label.clone())?;
        }
        self.set_cell_type(pos, context.paint)?;
        Ok(true)
    }

    /// Paints the inclusive rectangle spanned by two corners, given in either order, in
    /// row-major order. Returns the number of painted cells.
    pub fn paint_rect(&mut self, corner_a: Point, corner_b: Point, context: &EditContext) -> Result<usize> {
        self.checked_ix(corner_a)?;
        self.checked_ix(corner_b)?;
        let (top, bottom) = (corner_a.y.min(corner_b.y), corner_a.y.max(corner_b.y));
        let (left, right) = (corner_a.x.min(corner_b.x), corner_a.x.max(corner_b.x));
        let mut painted = 0;
        for (y, x) in iproduct!(top..=bottom, left..=right) {
            if self.paint(Point::new(x, y), context)? {
                painted += 1;
            }
        }
        Ok(painted)
    }

    pub fn set_cost(&mut self, pos: Point, cost: f64) -> Result<()> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(GridError::InvalidCost(cost));
        }
        let ix = self.checked_ix(pos)?;
        self.cells[ix].cost = cost;
        Ok(())
    }

    pub fn set_street_label(&mut self, pos: Point, label: impl Into<String>) -> Result<()> {
        let ix = self.checked_ix(pos)?;
        self.cells[ix].street_label = label.into();
        Ok(())
    }

    /// Turns the current start cell, if any, back into an empty cell.
    pub fn clear_start(&mut self) {
        if let Some(start) = self.start {
            let ix = self.ix(start);
            self.cells[ix].cell_type = CellType::Empty;
            self.cells[ix].color = CellType::Empty.default_color();
            self.start = None;
        }
    }

    /// Resets every cell to an empty cell of cost 1 and clears the registries. Street labels
    /// are kept since they describe the underlying map rather than an edit.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.cell_type = CellType::Empty;
            cell.color = CellType::Empty.default_color();
            cell.cost = 1.0;
        }
        self.start = None;
        self.goals.clear();
    }

    /// Stores a cell read from a persisted grid, registering starts and goals in the order the
    /// cells are restored. A second start is demoted to an empty cell.
    pub(crate) fn restore_cell(&mut self, pos: Point, mut cell: Cell) -> Result<()> {
        let ix = self.checked_ix(pos)?;
        if cell.cell_type == CellType::Start && self.start.is_some_and(|s| s != pos) {
            warn!("Ignoring duplicate start at {}, keeping the first one", pos);
            cell.cell_type = CellType::Empty;
            cell.color = CellType::Empty.default_color();
        }
        self.unregister(pos);
        let cell_type = cell.cell_type;
        self.cells[ix] = cell;
        self.register(pos, cell_type);
        Ok(())
    }

    fn unregister(&mut self, pos: Point) {
        let current = self.cells[self.ix(pos)].cell_type;
        match current {
            CellType::Start => self.start = None,
            CellType::Goal => self.goals.retain(|g| *g != pos),
            _ => {}
        }
    }

    fn register(&mut self, pos: Point, cell_type: CellType) {
        match cell_type {
            CellType::Start => self.start = Some(pos),
            CellType::Goal => self.goals.push(pos),
            _ => {}
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            let line = row
                .iter()
                .map(|c| c.cell_type.symbol())
                .collect::<String>();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
