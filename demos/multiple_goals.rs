use grid_util::point::Point;
use route_grid::astar::SearchEvent;
use route_grid::{CellType, Grid, PathPlanner, PathRequest};

// In this example a route is planned through two goals on a 5x5 grid with shape
//  _____
// |S    |
// |###  |
// |  G  |
// | ### |
// |G    |
//  _____
// where
// - # marks an obstacle
// - S marks the start
// - G marks a goal
// The goals are visited in the order they were placed: first the middle one, then the bottom
// left one. Every expansion is printed as the search runs.

fn main() -> route_grid::Result<()> {
    let mut grid = Grid::new(5, 5)?;
    for x in 0..3 {
        grid.set_cell_type(Point::new(x, 1), CellType::Barrier)?;
    }
    for x in 1..4 {
        grid.set_cell_type(Point::new(x, 3), CellType::Barrier)?;
    }
    grid.set_cell_type(Point::new(0, 0), CellType::Start)?;
    grid.set_cell_type(Point::new(2, 2), CellType::Goal)?;
    grid.set_cell_type(Point::new(0, 4), CellType::Goal)?;
    println!("{}", grid);

    let planner = PathPlanner::default();
    let request = PathRequest::from_grid(&grid)?;
    let mut run = planner.start(&grid, &request)?;
    for event in run.by_ref() {
        if let SearchEvent::Expanded(p) = event.event {
            println!("goal {}: expanded {}", event.goal_index, p);
        }
    }
    let result = run.finish();
    println!("Status: {:?}\n", result.status);
    println!("Path:");
    for step in result.steps(&grid) {
        println!("{:?}", step);
    }
    Ok(())
}
