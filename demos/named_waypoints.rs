use grid_util::point::Point;
use route_grid::{codec, EditContext, CellType, Grid, PathPlanner, PathRequest, Waypoint, WaypointTable};

// This example paints a small street map, saves it together with two named places in the
// row-oriented text format, loads it back and routes between the places by name.

fn main() -> route_grid::Result<()> {
    let mut grid = Grid::new(4, 6)?;
    let main_street = EditContext::new(CellType::Empty).with_street_label("Main St");
    grid.paint_rect(Point::new(0, 1), Point::new(5, 1), &main_street)?;
    let block = EditContext::new(CellType::Barrier);
    grid.paint_rect(Point::new(1, 2), Point::new(4, 3), &block)?;
    let muddy = EditContext::new(CellType::Empty).with_cost(20.0);
    grid.paint(Point::new(3, 1), &muddy)?;

    let mut waypoints = WaypointTable::new();
    waypoints.insert("Bakery", Waypoint::new(0, 3, 4.5));
    waypoints.insert("Library", Waypoint::new(5, 3, 3.0));

    let mut buf = Vec::new();
    codec::write_grid(&mut buf, &grid, &waypoints)?;
    println!("{}", String::from_utf8_lossy(&buf));

    let (grid, waypoints) = codec::read_grid(buf.as_slice())?;
    for label in waypoints.labels() {
        println!("{}", label);
    }
    let request = PathRequest::from_waypoints(&waypoints, "Bakery", &["Library"])?.with_cost_scale(1.0);
    let result = PathPlanner::default().find_path(&grid, &request)?;
    println!("\nStatus: {:?}", result.status);
    for step in result.steps(&grid) {
        println!("({}, {}) {}", step.row, step.col, step.street);
    }
    Ok(())
}
