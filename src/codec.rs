//! Row-oriented text format for a [Grid] and its [WaypointTable].
//!
//! The first record is the waypoint table flattened into repeating `name, col, row, score`
//! groups. Every following record is one grid row with one field per column, each formatted as
//! `type:R,G,B:cost:street label`. Fields are CSV-quoted where needed, so labels may contain
//! commas and colons.
//!
//! Loading is lenient: a malformed cell field is logged and replaced by an empty cell of cost 1,
//! and a malformed waypoint group is logged and skipped.
use crate::cell::{Cell, CellType, Rgb};
use crate::error::Result;
use crate::grid::Grid;
use crate::waypoints::{Waypoint, WaypointTable};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use grid_util::point::Point;
use log::{info, warn};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

const WAYPOINT_FIELDS: usize = 4;

#[derive(Error, Debug, PartialEq)]
enum FieldError {
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("invalid color {0:?}")]
    Color(String),
    #[error("invalid cost {0:?}")]
    Cost(String),
    #[error("unknown cell type {0:?}")]
    CellType(String),
    #[error("invalid {0} {1:?}")]
    Number(&'static str, String),
}

fn encode_cell(cell: &Cell) -> String {
    format!(
        "{}:{}:{}:{}",
        cell.cell_type.token(),
        cell.color,
        cell.cost,
        cell.street_label
    )
}

fn parse_rgb(s: &str) -> std::result::Result<Rgb, FieldError> {
    let channels = s
        .split(',')
        .map(|c| c.trim().parse::<u8>())
        .collect::<std::result::Result<Vec<u8>, _>>()
        .map_err(|_| FieldError::Color(s.to_owned()))?;
    match channels[..] {
        [r, g, b] => Ok(Rgb::new(r, g, b)),
        _ => Err(FieldError::Color(s.to_owned())),
    }
}

fn parse_cell(field: &str) -> std::result::Result<Cell, FieldError> {
    let mut parts = field.splitn(4, ':');
    let type_token = parts.next().unwrap_or_default().trim();
    let color = parse_rgb(parts.next().ok_or(FieldError::Missing("color"))?)?;
    let cost_str = parts.next().ok_or(FieldError::Missing("cost"))?;
    let cost = cost_str
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|c| c.is_finite() && *c >= 0.0)
        .ok_or_else(|| FieldError::Cost(cost_str.to_owned()))?;
    let street_label = parts.next().unwrap_or_default().to_owned();
    // Fall back to the palette when the type token is unknown but the color is not.
    let cell_type = type_token
        .parse::<CellType>()
        .ok()
        .or_else(|| CellType::from_color(color))
        .ok_or_else(|| FieldError::CellType(type_token.to_owned()))?;
    Ok(Cell {
        cell_type,
        cost,
        street_label,
        color,
    })
}

fn parse_waypoint(group: &[&str]) -> std::result::Result<(String, Waypoint), FieldError> {
    let [name, col, row, score] = group else {
        return Err(FieldError::Missing("waypoint fields"));
    };
    let col = col
        .trim()
        .parse::<i32>()
        .map_err(|_| FieldError::Number("column", col.to_string()))?;
    let row = row
        .trim()
        .parse::<i32>()
        .map_err(|_| FieldError::Number("row", row.to_string()))?;
    let score = score
        .trim()
        .parse::<f64>()
        .map_err(|_| FieldError::Number("score", score.to_string()))?;
    Ok((name.trim().to_owned(), Waypoint::new(col, row, score)))
}

fn parse_waypoints(record: &StringRecord) -> WaypointTable {
    let mut table = WaypointTable::new();
    let fields: Vec<&str> = record.iter().collect();
    if fields.iter().all(|f| f.trim().is_empty()) {
        return table;
    }
    for (i, group) in fields.chunks(WAYPOINT_FIELDS).enumerate() {
        match parse_waypoint(group) {
            Ok((name, waypoint)) => {
                if table.insert(name.clone(), waypoint).is_some() {
                    warn!("Waypoint {:?} is listed twice, keeping the last entry", name);
                }
            }
            Err(e) => warn!("Skipping waypoint at field {}: {}", i * WAYPOINT_FIELDS, e),
        }
    }
    table
}

/// Writes the waypoint record followed by one record per grid row.
pub fn write_grid<W: Write>(writer: W, grid: &Grid, waypoints: &WaypointTable) -> Result<()> {
    let mut wtr = WriterBuilder::new().flexible(true).from_writer(writer);
    let mut waypoint_record: Vec<String> = waypoints
        .iter()
        .flat_map(|(name, w)| {
            [
                name.to_owned(),
                w.col.to_string(),
                w.row.to_string(),
                w.score.to_string(),
            ]
        })
        .collect();
    // A lone empty field is written as "", keeping the record from being read as a blank line.
    if waypoint_record.is_empty() {
        waypoint_record.push(String::new());
    }
    wtr.write_record(&waypoint_record)?;
    for row in 0..grid.rows() as i32 {
        let fields = (0..grid.cols() as i32).map(|col| encode_cell(grid.cell(Point::new(col, row))));
        wtr.write_record(fields)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads a grid and its waypoints. Starts and goals are registered in row-major order; a second
/// start is demoted to an empty cell. Short rows are padded with empty cells.
pub fn read_grid<R: Read>(reader: R) -> Result<(Grid, WaypointTable)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!("Record {} is malformed, loading it as empty: {}", i, e);
                records.push(StringRecord::new());
            }
        }
    }
    let waypoints = records
        .first()
        .map(parse_waypoints)
        .unwrap_or_default();
    let rows = records.len().saturating_sub(1);
    let cols = records.iter().skip(1).map(|r| r.len()).max().unwrap_or(0);
    let mut grid = Grid::new(rows, cols)?;
    for (row, record) in records.iter().skip(1).enumerate() {
        for (col, field) in record.iter().enumerate() {
            let cell = parse_cell(field).unwrap_or_else(|e| {
                warn!("Error parsing cell [{}, {}]: {}", row, col, e);
                Cell::default()
            });
            grid.restore_cell(Point::new(col as i32, row as i32), cell)?;
        }
    }
    Ok((grid, waypoints))
}

pub fn save_to_path<P: AsRef<Path>>(path: P, grid: &Grid, waypoints: &WaypointTable) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_grid(BufWriter::new(file), grid, waypoints)?;
    info!(
        "Grid of {}x{} cells and {} waypoints saved to {}",
        grid.rows(),
        grid.cols(),
        waypoints.len(),
        path.as_ref().display()
    );
    Ok(())
}

pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<(Grid, WaypointTable)> {
    let file = File::open(path.as_ref())?;
    let (grid, waypoints) = read_grid(BufReader::new(file))?;
    info!(
        "Grid of {}x{} cells and {} waypoints loaded from {}",
        grid.rows(),
        grid.cols(),
        waypoints.len(),
        path.as_ref().display()
    );
    Ok((grid, waypoints))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GridError;

    fn to_string(grid: &Grid, waypoints: &WaypointTable) -> String {
        let mut buf = Vec::new();
        write_grid(&mut buf, grid, waypoints).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn round_trip() {
        let mut grid = Grid::new(2, 3).unwrap();
        grid.set_cell_type(Point::new(0, 0), CellType::Start).unwrap();
        grid.set_cell_type(Point::new(2, 0), CellType::Goal).unwrap();
        grid.set_cell_type(Point::new(1, 1), CellType::Goal).unwrap();
        grid.set_cell_type(Point::new(1, 0), CellType::Barrier).unwrap();
        grid.set_cost(Point::new(2, 1), 2.5).unwrap();
        grid.set_street_label(Point::new(0, 1), "King St, West: 5").unwrap();
        let mut waypoints = WaypointTable::new();
        waypoints.insert("Corner Shop", Waypoint::new(2, 1, 3.25));
        waypoints.insert("Park", Waypoint::new(0, 1, 1.0));

        let text = to_string(&grid, &waypoints);
        let (loaded_grid, loaded_waypoints) = read_grid(text.as_bytes()).unwrap();
        assert_eq!(loaded_grid, grid);
        assert_eq!(loaded_waypoints, waypoints);
    }

    #[test]
    fn padded_waypoint_name_round_trip() {
        let grid = Grid::new(1, 1).unwrap();
        let mut waypoints = WaypointTable::new();
        waypoints.insert(" Cafe ", Waypoint::new(0, 0, 1.0));
        let text = to_string(&grid, &waypoints);
        let (_, loaded) = read_grid(text.as_bytes()).unwrap();
        assert_eq!(loaded, waypoints);
        assert_eq!(loaded.resolve(" Cafe ").unwrap(), Point::new(0, 0));
    }

    #[test]
    fn empty_waypoint_table_round_trip() {
        let grid = Grid::new(1, 2).unwrap();
        let text = to_string(&grid, &WaypointTable::new());
        let (loaded_grid, loaded_waypoints) = read_grid(text.as_bytes()).unwrap();
        assert!(loaded_waypoints.is_empty());
        assert_eq!((loaded_grid.rows(), loaded_grid.cols()), (1, 2));
    }

    #[test]
    fn cell_format() {
        let mut cell = Cell::default();
        cell.cost = 0.5;
        cell.street_label = "Elm".to_owned();
        assert_eq!(encode_cell(&cell), "reset:255,183,156:0.5:Elm");
        assert_eq!(parse_cell("reset:255,183,156:0.5:Elm"), Ok(cell));
    }

    #[test]
    fn malformed_fields() {
        assert_eq!(parse_cell("goal"), Err(FieldError::Missing("color")));
        assert!(matches!(parse_cell("goal:1,2:1:"), Err(FieldError::Color(_))));
        assert!(matches!(parse_cell("goal:1,2,3:-4:"), Err(FieldError::Cost(_))));
        assert!(matches!(parse_cell("wall:1,2,3:1:"), Err(FieldError::CellType(_))));
        let recovered = parse_cell("wall:0,0,0:1:").unwrap();
        assert_eq!(recovered.cell_type, CellType::Barrier);
        let no_label = parse_cell("barrier:0,0,0:3").unwrap();
        assert_eq!(no_label.street_label, "");
        assert_eq!(no_label.cost, 3.0);
    }

    #[test]
    fn malformed_cell_is_defaulted() {
        let text = "Shop,1,0,2.0\n\"barrier:0,0,0:1:\",\"start:1,2,x:1:\"\n";
        let (grid, waypoints) = read_grid(text.as_bytes()).unwrap();
        assert_eq!(waypoints.resolve("Shop").unwrap(), Point::new(1, 0));
        assert!(grid.get(Point::new(0, 0)).unwrap().is_barrier());
        assert_eq!(grid.get(Point::new(1, 0)).unwrap(), &Cell::default());
        assert!(grid.start().is_none());
    }

    #[test]
    fn malformed_waypoints_are_skipped() {
        let text = "A,1,1,1.0,B,x,1,2.0,C,0,0\n\"reset:255,183,156:1:\"\n";
        let (_, waypoints) = read_grid(text.as_bytes()).unwrap();
        assert_eq!(waypoints.len(), 1);
        assert!(waypoints.get("A").is_some());
    }

    #[test]
    fn registries_rebuilt_in_row_major_order() {
        let text = concat!(
            "\"\"\n",
            "\"goal:128,0,128:1:\",\"start:255,192,203:1:\"\n",
            "\"start:255,192,203:1:\",\"goal:128,0,128:1:\"\n",
        );
        let (grid, _) = read_grid(text.as_bytes()).unwrap();
        assert_eq!(grid.start(), Some(Point::new(1, 0)));
        let demoted = grid.get(Point::new(0, 1)).unwrap();
        assert_eq!(demoted.cell_type, CellType::Empty);
        assert_eq!(demoted.color, CellType::Empty.default_color());
        assert_eq!(grid.goals(), &[Point::new(0, 0), Point::new(1, 1)]);
    }

    #[test]
    fn short_rows_are_padded() {
        let text = "\"\"\n\"barrier:0,0,0:1:\"\n\"barrier:0,0,0:1:\",\"barrier:0,0,0:1:\"\n";
        let (grid, _) = read_grid(text.as_bytes()).unwrap();
        assert_eq!((grid.rows(), grid.cols()), (2, 2));
        assert_eq!(grid.get(Point::new(1, 0)).unwrap(), &Cell::default());
    }

    #[test]
    fn no_rows_is_invalid() {
        assert!(matches!(
            read_grid("A,0,0,1.0\n".as_bytes()),
            Err(GridError::InvalidDimensions { rows: 0, .. })
        ));
    }
}
