use grid_util::point::Point;
use route_grid::*;

fn barrier(grid: &mut Grid, x: i32, y: i32) {
    grid.set_cell_type(Point::new(x, y), CellType::Barrier).unwrap();
}

fn route(planner: &PathPlanner, grid: &Grid, start: Point, goals: Vec<Point>) -> PathResult {
    let request = PathRequest::new(start, goals).unwrap();
    planner.find_path(grid, &request).unwrap()
}

/// 5x5 open grid, straight along the top row.
#[test]
fn straight_route_on_open_grid() {
    let grid = Grid::new(5, 5).unwrap();
    let result = route(&PathPlanner::default(), &grid, Point::new(0, 0), vec![Point::new(4, 0)]);
    assert_eq!(result.status, PathStatus::Found);
    let path = result.path();
    assert_eq!(path.len(), 5);
    assert!(path.windows(2).all(|w| w[1].x > w[0].x && w[1].y == 0));
}

/// A wall across row 2 with a single opening in column 4.
#[test]
fn route_through_opening() {
    // |S    |
    // |     |
    // |#### |
    // |     |
    // |    G|
    let mut grid = Grid::new(5, 5).unwrap();
    for x in 0..4 {
        barrier(&mut grid, x, 2);
    }
    let result = route(&PathPlanner::default(), &grid, Point::new(0, 0), vec![Point::new(4, 4)]);
    assert_eq!(result.status, PathStatus::Found);
    let path = result.path();
    assert!(path.contains(&Point::new(4, 2)));
    assert!(is_contiguous(&path));
    assert!(path.iter().all(|p| !grid.get(*p).unwrap().is_barrier()));
}

#[test]
fn enclosed_goal_is_unreachable() {
    let mut grid = Grid::new(5, 5).unwrap();
    for (x, y) in [(2, 1), (2, 3), (1, 2), (3, 2)] {
        barrier(&mut grid, x, y);
    }
    let before = grid.clone();
    for component_check in [true, false] {
        let planner =
            PathPlanner::new(PlannerConfig::default().with_component_check(component_check)).unwrap();
        let result = route(&planner, &grid, Point::new(0, 0), vec![Point::new(2, 2)]);
        assert_eq!(result.status, PathStatus::Unreachable(0));
        assert!(result.path().is_empty());
    }
    assert_eq!(grid, before);
}

#[test]
fn unit_cost_route_length_is_manhattan_distance() {
    let grid = Grid::new(8, 8).unwrap();
    let pairs = [
        ((0, 0), (7, 7)),
        ((3, 6), (6, 1)),
        ((7, 0), (0, 5)),
        ((2, 2), (2, 2)),
    ];
    for scale in [1.0, DEFAULT_COST_SCALE] {
        let planner = PathPlanner::new(PlannerConfig::default().with_cost_scale(scale)).unwrap();
        for ((sx, sy), (gx, gy)) in pairs {
            let start = Point::new(sx, sy);
            let goal = Point::new(gx, gy);
            let path = route(&planner, &grid, start, vec![goal]).path();
            assert_eq!(path.len() as i32 - 1, start.manhattan_distance(&goal));
        }
    }
}

/// The top row between start and goal is expensive. With a cost scale of 1 every step costs at
/// least the heuristic's unit, so the cheap detour through the second row is found. With the
/// default scale a step costs less than the heuristic assumes, the heuristic overestimates and
/// the search runs straight through the expensive cells.
#[test]
fn large_cost_scale_loses_admissibility() {
    // |S$$$G|
    // |     |
    // |     |
    let mut grid = Grid::new(3, 5).unwrap();
    for x in 1..4 {
        grid.set_cost(Point::new(x, 0), 100.0).unwrap();
    }
    let start = Point::new(0, 0);
    let goal = Point::new(4, 0);

    let admissible = PathPlanner::new(PlannerConfig::default().with_cost_scale(1.0)).unwrap();
    let optimal = route(&admissible, &grid, start, vec![goal]);
    assert!(optimal.path().iter().all(|p| p.y == 1 || p.x == 0 || p.x == 4));
    assert_eq!(optimal.cost(&grid, 1.0), 6.0);

    let overestimating = PathPlanner::default();
    let straight = route(&overestimating, &grid, start, vec![goal]);
    assert_eq!(
        straight.path(),
        (0..5).map(|x| Point::new(x, 0)).collect::<Vec<_>>()
    );
    assert!(straight.cost(&grid, DEFAULT_COST_SCALE) > optimal.cost(&grid, DEFAULT_COST_SCALE));
}

#[test]
fn identical_requests_give_identical_routes() {
    let mut grid = Grid::new(6, 6).unwrap();
    barrier(&mut grid, 2, 2);
    barrier(&mut grid, 3, 2);
    grid.set_cost(Point::new(1, 4), 3.0).unwrap();
    let planner = PathPlanner::default();
    let goals = vec![Point::new(5, 5), Point::new(0, 5)];
    let first = route(&planner, &grid, Point::new(0, 0), goals.clone());
    let second = route(&planner, &grid, Point::new(0, 0), goals);
    assert!(first.is_found());
    assert_eq!(first, second);
}

#[test]
fn cancelled_before_first_step() {
    let mut grid = Grid::new(5, 5).unwrap();
    grid.set_cell_type(Point::new(0, 0), CellType::Start).unwrap();
    grid.set_cell_type(Point::new(4, 4), CellType::Goal).unwrap();
    let before = grid.clone();
    let request = PathRequest::from_grid(&grid).unwrap();
    let planner = PathPlanner::default();
    let run = planner.start(&grid, &request).unwrap();
    request.token.cancel();
    let result = run.finish();
    assert_eq!(result.status, PathStatus::Cancelled);
    assert!(result.segments.is_empty());
    assert_eq!(grid, before);
}

#[test]
fn cancelled_from_another_handle() {
    let grid = Grid::new(20, 20).unwrap();
    let token = CancellationToken::new();
    let request = PathRequest::new(Point::new(0, 0), vec![Point::new(19, 0), Point::new(19, 19)])
        .unwrap()
        .with_token(token.clone());
    let planner = PathPlanner::default();
    let mut run = planner.start(&grid, &request).unwrap();
    // Let the first goal complete, then stop during the second segment.
    while run.goal_index() == 0 {
        assert!(run.next().is_some());
    }
    token.cancel();
    let result = run.finish();
    assert_eq!(result.status, PathStatus::Cancelled);
    assert!(result.segments.is_empty());
}

#[test]
fn goals_are_chained_in_order() {
    let mut grid = Grid::new(7, 7).unwrap();
    for y in 1..6 {
        barrier(&mut grid, 3, y);
    }
    grid.set_cost(Point::new(1, 3), 4.0).unwrap();
    let planner = PathPlanner::default();
    let start = Point::new(0, 0);
    let g1 = Point::new(6, 3);
    let g2 = Point::new(0, 6);

    let chained = route(&planner, &grid, start, vec![g1, g2]);
    let first = route(&planner, &grid, start, vec![g1]).path();
    let second = route(&planner, &grid, g1, vec![g2]).path();
    assert!(chained.is_found());
    let expected: Vec<Point> = first.iter().chain(second.iter().skip(1)).copied().collect();
    assert_eq!(chained.path(), expected);
    assert_eq!(chained.path().iter().filter(|p| **p == g1).count(), 1);
    assert_eq!(chained.segments.len(), 2);
}

/// Goals are visited in list order, even when a later goal is closer to the start.
#[test]
fn goal_order_is_list_order() {
    let grid = Grid::new(1, 6).unwrap();
    let near = Point::new(1, 0);
    let far = Point::new(5, 0);
    let result = route(&PathPlanner::default(), &grid, Point::new(0, 0), vec![far, near]);
    assert_eq!(result.path().len(), 6 + 4);
    assert_eq!(result.path().last(), Some(&near));
}

#[test]
fn named_waypoints_through_saved_grid() {
    let mut grid = Grid::new(3, 4).unwrap();
    barrier(&mut grid, 1, 0);
    barrier(&mut grid, 1, 1);
    for x in 0..4 {
        grid.set_street_label(Point::new(x, 2), "Harbour Rd").unwrap();
    }
    let mut waypoints = WaypointTable::new();
    waypoints.insert("Ferry", Waypoint::new(0, 0, 2.5));
    waypoints.insert("Market", Waypoint::new(3, 0, 4.0));

    let mut buf = Vec::new();
    codec::write_grid(&mut buf, &grid, &waypoints).unwrap();
    let (grid, waypoints) = codec::read_grid(buf.as_slice()).unwrap();

    let request = PathRequest::from_waypoints(&waypoints, "Ferry", &["Market"]).unwrap();
    let result = PathPlanner::default().find_path(&grid, &request).unwrap();
    assert!(result.is_found());
    let steps = result.steps(&grid);
    assert_eq!((steps[0].row, steps[0].col), (0, 0));
    assert_eq!((steps.last().unwrap().row, steps.last().unwrap().col), (0, 3));
    assert!(steps.iter().any(|s| s.street == "Harbour Rd"));
    assert!(matches!(
        PathRequest::from_waypoints(&waypoints, "Ferry", &["Museum"]),
        Err(GridError::UnknownWaypoint(_))
    ));
}

/// Editing the grid between two searches on the same planner is picked up by the second one.
#[test]
fn edits_between_searches_are_seen() {
    // |S # G|
    // |  #  |
    // |     |
    let mut grid = Grid::new(3, 5).unwrap();
    barrier(&mut grid, 2, 0);
    barrier(&mut grid, 2, 1);
    let planner = PathPlanner::default();
    let start = Point::new(0, 0);
    let goal = Point::new(4, 0);

    let open = route(&planner, &grid, start, vec![goal]);
    assert!(open.is_found());
    assert!(open.path().contains(&Point::new(2, 2)));

    barrier(&mut grid, 2, 2);
    let closed = route(&planner, &grid, start, vec![goal]);
    assert_eq!(closed.status, PathStatus::Unreachable(0));

    grid.set_cell_type(Point::new(2, 0), CellType::Empty).unwrap();
    let reopened = route(&planner, &grid, start, vec![goal]);
    assert_eq!(reopened.path().len(), 5);
}
