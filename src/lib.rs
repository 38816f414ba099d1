//! # route_grid
//!
//! Route planning over a grid of weighted, typed cells. A route starts at a start cell and
//! visits an ordered list of goals, each leg searched with
//! [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) over the 4-neighbourhood. Moving onto
//! a cell costs the cell's cost divided by a configurable cost scale, and the
//! [Manhattan distance](https://en.wikipedia.org/wiki/Taxicab_geometry) to the goal serves as
//! heuristic and as tie-breaker between equally promising cells, making routes reproducible.
//!
//! Searches can be driven step by step through [PlanRun](planner::PlanRun), which yields one
//! event per expansion and honours a [CancellationToken](cancel::CancellationToken) between
//! steps. Grids and named waypoints can be saved to and loaded from a CSV-based text format
//! with [codec].
pub mod astar;
pub mod cancel;
pub mod cell;
pub mod codec;
pub mod error;
pub mod grid;
pub mod neighbors;
pub mod planner;
pub mod waypoints;

pub use cancel::CancellationToken;
pub use cell::{Cell, CellType, Rgb};
pub use error::{GridError, Result};
pub use grid::{EditContext, Grid};
pub use neighbors::{NeighborIndex, TraversableTypes};
pub use planner::{PathPlanner, PathRequest, PathResult, PathStatus, PathStep, PlannerConfig};
pub use waypoints::{Waypoint, WaypointTable};

use grid_util::point::Point;

/// Default divisor applied to cell costs. With unit costs a step then costs far less than the
/// heuristic assumes, so the search behaves close to greedy best-first and hop count dominates.
pub const DEFAULT_COST_SCALE: f64 = 80.0;

/// Street name reported for route cells without a label.
pub const UNNAMED_STREET: &str = "Unnamed Road";

/// Joins route segments into one cell sequence. Segments are expected not to repeat the cell
/// that ended the previous segment.
pub fn segments_to_path(segments: &[Vec<Point>]) -> Vec<Point> {
    segments.iter().flatten().copied().collect()
}

/// Whether every consecutive pair of cells in `path` are 4-neighbours.
pub fn is_contiguous(path: &[Point]) -> bool {
    path.windows(2)
        .all(|w| w[0].manhattan_distance(&w[1]) == 1)
}
