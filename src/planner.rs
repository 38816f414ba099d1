use crate::astar::{SearchEvent, SearchSpace, SegmentSearch};
use crate::cancel::CancellationToken;
use crate::error::{GridError, Result};
use crate::grid::Grid;
use crate::neighbors::{NeighborIndex, TraversableTypes};
use crate::waypoints::WaypointTable;
use crate::{segments_to_path, DEFAULT_COST_SCALE, UNNAMED_STREET};
use grid_util::point::Point;
use log::{info, warn};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Cost type used by grid searches.
pub type Cost = OrderedFloat<f64>;

/// Settings shared by every search a [PathPlanner] runs.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannerConfig {
    /// Divisor applied to a cell's cost before it is added to the cost so far. Larger values
    /// make hop count dominate over cell cost; once `cost / cost_scale` drops below 1 the
    /// Manhattan heuristic overestimates and paths are no longer guaranteed optimal.
    pub cost_scale: f64,
    pub traversable: TraversableTypes,
    /// Rejects segments whose goal lies in another connected component before searching.
    pub component_check: bool,
}

impl Default for PlannerConfig {
    fn default() -> PlannerConfig {
        PlannerConfig {
            cost_scale: DEFAULT_COST_SCALE,
            traversable: TraversableTypes::default(),
            component_check: true,
        }
    }
}

impl PlannerConfig {
    pub fn with_cost_scale(mut self, cost_scale: f64) -> PlannerConfig {
        self.cost_scale = cost_scale;
        self
    }
    pub fn with_traversable(mut self, traversable: TraversableTypes) -> PlannerConfig {
        self.traversable = traversable;
        self
    }
    pub fn with_component_check(mut self, component_check: bool) -> PlannerConfig {
        self.component_check = component_check;
        self
    }
}

fn validate_cost_scale(cost_scale: f64) -> Result<f64> {
    if cost_scale.is_finite() && cost_scale > 0.0 {
        Ok(cost_scale)
    } else {
        Err(GridError::InvalidCostScale(cost_scale))
    }
}

/// A grid as seen by one search: adjacency from a freshly computed [NeighborIndex] and the cost
/// of moving onto a cell equal to its cost divided by the cost scale.
pub struct WeightedGrid<'a> {
    grid: &'a Grid,
    neighbors: NeighborIndex,
    cost_scale: f64,
}

impl<'a> WeightedGrid<'a> {
    pub fn new(grid: &'a Grid, traversable: TraversableTypes, cost_scale: f64) -> WeightedGrid<'a> {
        WeightedGrid {
            grid,
            neighbors: NeighborIndex::compute(grid, traversable),
            cost_scale,
        }
    }
    pub fn neighbor_index(&self) -> &NeighborIndex {
        &self.neighbors
    }
    pub fn move_cost(&self, pos: Point) -> Cost {
        OrderedFloat(self.grid.cell(pos).cost / self.cost_scale)
    }
}

impl SearchSpace for WeightedGrid<'_> {
    type Node = Point;
    type Cost = Cost;
    type Successors = SmallVec<[(Point, Cost); 4]>;

    fn successors(&self, node: &Point) -> Self::Successors {
        self.neighbors
            .neighbors(*node)
            .into_iter()
            .map(|p| (p, self.move_cost(p)))
            .collect()
    }

    /// [Manhattan distance](https://en.wikipedia.org/wiki/Taxicab_geometry), which matches the
    /// 4-neighbourhood.
    fn heuristic(&self, node: &Point, goal: &Point) -> Cost {
        OrderedFloat(node.manhattan_distance(goal) as f64)
    }
}

/// Start, ordered goals and per-request settings of a single planner invocation.
#[derive(Clone, Debug)]
pub struct PathRequest {
    pub start: Point,
    pub goals: Vec<Point>,
    /// Overrides [PlannerConfig::cost_scale] for this request.
    pub cost_scale: Option<f64>,
    pub token: CancellationToken,
}

impl PathRequest {
    pub fn new(start: Point, goals: Vec<Point>) -> Result<PathRequest> {
        if goals.is_empty() {
            return Err(GridError::NoGoals);
        }
        Ok(PathRequest {
            start,
            goals,
            cost_scale: None,
            token: CancellationToken::new(),
        })
    }

    /// Uses the start and goals registered on the grid.
    pub fn from_grid(grid: &Grid) -> Result<PathRequest> {
        let start = grid.start().ok_or(GridError::NoStart)?;
        PathRequest::new(start, grid.goals().to_vec())
    }

    /// Resolves named waypoints into a request.
    pub fn from_waypoints(table: &WaypointTable, start: &str, goals: &[&str]) -> Result<PathRequest> {
        let start = table.resolve(start)?;
        let goals = goals
            .iter()
            .map(|name| table.resolve(name))
            .collect::<Result<Vec<Point>>>()?;
        PathRequest::new(start, goals)
    }

    pub fn with_cost_scale(mut self, cost_scale: f64) -> PathRequest {
        self.cost_scale = Some(cost_scale);
        self
    }
    pub fn with_token(mut self, token: CancellationToken) -> PathRequest {
        self.token = token;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathStatus {
    Found,
    /// No path exists to the goal at this index; later goals were not attempted.
    Unreachable(usize),
    Cancelled,
}

/// One cell of a found route, as handed to whatever turns routes into directions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    pub row: usize,
    pub col: usize,
    pub street: String,
}

/// Outcome of a planner invocation. Segments are only filled when the status is
/// [Found](PathStatus::Found). The first segment starts with the start cell; later segments
/// begin after the goal that ended the previous one, so each goal appears exactly once.
#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
    pub segments: Vec<Vec<Point>>,
    pub status: PathStatus,
}

impl PathResult {
    pub fn is_found(&self) -> bool {
        self.status == PathStatus::Found
    }

    /// The whole route from the start through every goal.
    pub fn path(&self) -> Vec<Point> {
        segments_to_path(&self.segments)
    }

    pub fn steps(&self, grid: &Grid) -> Vec<PathStep> {
        to_steps(&self.path(), grid)
    }

    /// Steps grouped per goal, one group for each segment.
    pub fn segment_steps(&self, grid: &Grid) -> Vec<Vec<PathStep>> {
        self.segments
            .iter()
            .map(|segment| to_steps(segment, grid))
            .collect()
    }

    /// Cost of the route when every entered cell contributes `cost / cost_scale`.
    pub fn cost(&self, grid: &Grid, cost_scale: f64) -> f64 {
        self.path()
            .iter()
            .skip(1)
            .filter_map(|p| grid.get(*p).ok())
            .map(|cell| cell.cost / cost_scale)
            .sum()
    }
}

fn to_steps(points: &[Point], grid: &Grid) -> Vec<PathStep> {
    points
        .iter()
        .filter_map(|p| grid.get(*p).ok().map(|cell| (p, cell)))
        .map(|(p, cell)| {
            let street = cell.street_label.trim();
            PathStep {
                row: p.y as usize,
                col: p.x as usize,
                street: if street.is_empty() {
                    UNNAMED_STREET.to_owned()
                } else {
                    street.to_owned()
                },
            }
        })
        .collect()
}

/// Event of a [PlanRun], tagged with the goal whose segment produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanEvent {
    pub goal_index: usize,
    pub event: SearchEvent<Point, Cost>,
}

/// Plans routes that visit an ordered list of goals, searching one segment per goal with A*
/// and starting each segment where the previous one ended.
#[derive(Clone, Debug, Default)]
pub struct PathPlanner {
    pub config: PlannerConfig,
}

impl PathPlanner {
    pub fn new(config: PlannerConfig) -> Result<PathPlanner> {
        validate_cost_scale(config.cost_scale)?;
        Ok(PathPlanner { config })
    }

    /// Prepares a run without expanding anything. Neighbours are recomputed from the current
    /// cell types and the request's cancellation token is reset.
    pub fn start<'a>(&self, grid: &'a Grid, request: &PathRequest) -> Result<PlanRun<'a>> {
        if request.goals.is_empty() {
            return Err(GridError::NoGoals);
        }
        grid.get(request.start)?;
        for goal in &request.goals {
            grid.get(*goal)?;
        }
        let cost_scale = validate_cost_scale(request.cost_scale.unwrap_or(self.config.cost_scale))?;
        request.token.reset();
        Ok(PlanRun {
            space: WeightedGrid::new(grid, self.config.traversable, cost_scale),
            start: request.start,
            current: request.start,
            goals: request.goals.clone(),
            segments: Vec::with_capacity(request.goals.len()),
            search: None,
            token: request.token.clone(),
            component_check: self.config.component_check,
            status: None,
        })
    }

    /// Runs a request to completion.
    pub fn find_path(&self, grid: &Grid, request: &PathRequest) -> Result<PathResult> {
        Ok(self.start(grid, request)?.finish())
    }

    /// Routes from the grid's start through its goals in placement order.
    pub fn find_path_in_grid(&self, grid: &Grid) -> Result<PathResult> {
        self.find_path(grid, &PathRequest::from_grid(grid)?)
    }
}

/// A multi-goal search in progress. Iterating drives the search one event at a time, which lets
/// callers animate expansions or stop early; [finish](Self::finish) drains the remaining events.
///
/// The cancellation token is polled before every open-set pop. A cancelled or unreachable run
/// drops every segment, including completed ones.
pub struct PlanRun<'a> {
    space: WeightedGrid<'a>,
    start: Point,
    current: Point,
    goals: Vec<Point>,
    segments: Vec<Vec<Point>>,
    search: Option<SegmentSearch<Point, Cost>>,
    token: CancellationToken,
    component_check: bool,
    status: Option<PathStatus>,
}

impl<'a> PlanRun<'a> {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
    /// Final status, once the run is over.
    pub fn status(&self) -> Option<PathStatus> {
        self.status
    }
    /// Index of the goal currently searched for.
    pub fn goal_index(&self) -> usize {
        self.segments.len()
    }
    pub fn neighbor_index(&self) -> &NeighborIndex {
        self.space.neighbor_index()
    }

    pub fn finish(mut self) -> PathResult {
        self.by_ref().for_each(drop);
        PathResult {
            segments: self.segments,
            status: self.status.unwrap_or(PathStatus::Found),
        }
    }

    fn conclude(&mut self, status: PathStatus) {
        self.search = None;
        self.segments.clear();
        self.status = Some(status);
    }
}

impl Iterator for PlanRun<'_> {
    type Item = PlanEvent;

    fn next(&mut self) -> Option<PlanEvent> {
        if self.status.is_some() {
            return None;
        }
        let goal_index = self.segments.len();
        let Some(&goal) = self.goals.get(goal_index) else {
            info!("All {} goals reached", self.goals.len());
            self.status = Some(PathStatus::Found);
            return None;
        };
        if self.search.as_ref().map_or(true, |s| s.will_pop()) && self.token.is_cancelled() {
            info!("Search for goal {} at {} cancelled", goal_index, goal);
            self.conclude(PathStatus::Cancelled);
            return None;
        }
        if self.search.is_none() {
            if self.component_check && self.space.neighbors.unreachable(&self.current, &goal) {
                info!("{} is not reachable from {}", goal, self.current);
                self.conclude(PathStatus::Unreachable(goal_index));
                return None;
            }
            info!("Finding path from {} to goal {} at {}", self.current, goal_index, goal);
            self.search = Some(SegmentSearch::new(&self.space, self.current, goal));
        }
        let search = self.search.as_mut()?;
        let event = search.step(&self.space)?;
        match &event {
            SearchEvent::Reached(path) => {
                info!("Goal {} at {} reached", goal_index, goal);
                let mut segment = Vec::with_capacity(path.len() + 1);
                if goal_index == 0 {
                    segment.push(self.start);
                }
                segment.extend_from_slice(path);
                self.segments.push(segment);
                self.current = goal;
                self.search = None;
            }
            SearchEvent::Exhausted => {
                if self.component_check {
                    warn!("Reachable goal could not be pathed to, is the neighbour index correct?");
                }
                info!("No path found to goal {} at {}", goal_index, goal);
                self.conclude(PathStatus::Unreachable(goal_index));
            }
            _ => {}
        }
        Some(PlanEvent { goal_index, event })
    }
}
