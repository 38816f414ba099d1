use crate::cell::CellType;
use crate::grid::Grid;
use grid_util::point::Point;
use log::debug;
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;

/// Offsets of the 4-neighbourhood in the order they are examined: down, up, right, left.
/// Bit `i` of a neighbour mask corresponds to `NEUMANN_OFFSETS[i]`.
pub const NEUMANN_OFFSETS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

const TRAVERSABLE_BIT: u8 = 1 << 4;

/// Set of [CellType]s that may appear in the neighbour graph of a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TraversableTypes(u16);

impl Default for TraversableTypes {
    fn default() -> TraversableTypes {
        TraversableTypes::all_but_barrier()
    }
}

impl TraversableTypes {
    pub fn none() -> TraversableTypes {
        TraversableTypes(0)
    }
    /// Everything except [Barrier](CellType::Barrier), so cells left [Open](CellType::Open),
    /// [Closed](CellType::Closed) or [PathPoint](CellType::PathPoint) by an earlier run stay usable.
    pub fn all_but_barrier() -> TraversableTypes {
        CellType::ALL
            .into_iter()
            .filter(|t| *t != CellType::Barrier)
            .collect()
    }
    /// Only pristine cells: empty, start, goal and the reset variants.
    pub fn pristine() -> TraversableTypes {
        CellType::ALL
            .into_iter()
            .filter(|t| t.is_empty_like() || matches!(t, CellType::Start | CellType::Goal))
            .collect()
    }
    pub fn with(mut self, cell_type: CellType) -> TraversableTypes {
        self.0 |= cell_type.bit();
        self
    }
    pub fn without(mut self, cell_type: CellType) -> TraversableTypes {
        self.0 &= !cell_type.bit();
        self
    }
    pub fn contains(&self, cell_type: CellType) -> bool {
        self.0 & cell_type.bit() != 0
    }
}

impl FromIterator<CellType> for TraversableTypes {
    fn from_iter<I: IntoIterator<Item = CellType>>(iter: I) -> Self {
        iter.into_iter().fold(TraversableTypes::none(), TraversableTypes::with)
    }
}

/// Adjacency of every cell to its in-bounds, traversable 4-neighbours, stored as a bit mask per
/// cell. Also records which cells are traversable and the connected components they form, so
/// hopeless searches can be rejected without flood-filling the grid.
///
/// The index is a snapshot: it has to be recomputed whenever any cell type may have changed.
#[derive(Clone, Debug)]
pub struct NeighborIndex {
    rows: usize,
    cols: usize,
    masks: Vec<u8>,
    components: UnionFind<usize>,
    traversable: TraversableTypes,
}

impl NeighborIndex {
    /// Full recompute over the grid.
    pub fn compute(grid: &Grid, traversable: TraversableTypes) -> NeighborIndex {
        let rows = grid.rows();
        let cols = grid.cols();
        let mut masks = vec![0u8; rows * cols];
        for (p, cell) in grid.cells() {
            let ix = grid.ix(p);
            if traversable.contains(cell.cell_type) {
                masks[ix] |= TRAVERSABLE_BIT;
            }
            for (i, (dx, dy)) in NEUMANN_OFFSETS.iter().enumerate() {
                let n = Point::new(p.x + dx, p.y + dy);
                if let Ok(neighbor) = grid.get(n) {
                    if traversable.contains(neighbor.cell_type) {
                        masks[ix] |= 1 << i;
                    }
                }
            }
        }
        let mut index = NeighborIndex {
            rows,
            cols,
            masks,
            components: UnionFind::new(rows * cols),
            traversable,
        };
        index.generate_components();
        debug!("Computed neighbours for {} cells", rows * cols);
        index
    }

    /// Links up traversable cells with their traversable neighbours. Edges between two
    /// traversable cells go both ways, so a union-find captures reachability between them.
    fn generate_components(&mut self) {
        for ix in 0..self.masks.len() {
            if self.masks[ix] & TRAVERSABLE_BIT == 0 {
                continue;
            }
            let p = self.point_at(ix);
            for n in self.neighbors(p) {
                let n_ix = self.ix(n);
                self.components.union(ix, n_ix);
            }
        }
    }

    pub fn traversable_types(&self) -> TraversableTypes {
        self.traversable
    }

    fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.y as usize) < self.rows && (p.x as usize) < self.cols
    }
    fn ix(&self, p: Point) -> usize {
        p.y as usize * self.cols + p.x as usize
    }
    fn point_at(&self, ix: usize) -> Point {
        Point::new((ix % self.cols) as i32, (ix / self.cols) as i32)
    }

    pub fn is_traversable(&self, p: Point) -> bool {
        self.in_bounds(p) && self.masks[self.ix(p)] & TRAVERSABLE_BIT != 0
    }

    /// Traversable neighbours of `p` in down, up, right, left order. Empty when `p` is out of
    /// bounds.
    pub fn neighbors(&self, p: Point) -> SmallVec<[Point; 4]> {
        if !self.in_bounds(p) {
            return SmallVec::new();
        }
        let mask = self.masks[self.ix(p)];
        NEUMANN_OFFSETS
            .iter()
            .enumerate()
            .filter(|&(i, _)| mask & (1 << i) != 0)
            .map(|(_, (dx, dy))| Point::new(p.x + dx, p.y + dy))
            .collect()
    }

    /// Whether a search from `start` can reach `goal`. The start itself need not be traversable,
    /// it only has to step onto a traversable cell in the goal's component.
    pub fn reachable(&self, start: &Point, goal: &Point) -> bool {
        if !self.in_bounds(*start) || !self.in_bounds(*goal) {
            return false;
        }
        if start == goal {
            return true;
        }
        if !self.is_traversable(*goal) {
            return false;
        }
        let goal_ix = self.ix(*goal);
        self.neighbors(*start)
            .iter()
            .any(|n| self.components.equiv(self.ix(*n), goal_ix))
    }

    pub fn unreachable(&self, start: &Point, goal: &Point) -> bool {
        !self.reachable(start, goal)
    }
}
