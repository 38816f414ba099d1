use crate::error::{GridError, Result};
use grid_util::point::Point;
use indexmap::IndexMap;

/// A named location on the grid with its accessibility score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waypoint {
    pub col: i32,
    pub row: i32,
    pub score: f64,
}

impl Waypoint {
    pub fn new(col: i32, row: i32, score: f64) -> Waypoint {
        Waypoint { col, row, score }
    }
    pub fn point(&self) -> Point {
        Point::new(self.col, self.row)
    }
}

/// Named waypoints in insertion order. Names are unique; inserting an existing name replaces
/// its waypoint but keeps its position in the table. Names are stored and looked up with
/// surrounding whitespace trimmed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaypointTable {
    entries: IndexMap<String, Waypoint>,
}

impl WaypointTable {
    pub fn new() -> WaypointTable {
        WaypointTable::default()
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// Returns the replaced waypoint, if the name was already present.
    pub fn insert(&mut self, name: impl Into<String>, waypoint: Waypoint) -> Option<Waypoint> {
        self.entries.insert(name.into().trim().to_owned(), waypoint)
    }
    pub fn get(&self, name: &str) -> Option<&Waypoint> {
        self.entries.get(name.trim())
    }
    pub fn remove(&mut self, name: &str) -> Option<Waypoint> {
        self.entries.shift_remove(name.trim())
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Waypoint)> + '_ {
        self.entries.iter().map(|(name, w)| (name.as_str(), w))
    }

    /// Grid position of a named waypoint.
    pub fn resolve(&self, name: &str) -> Result<Point> {
        self.get(name)
            .map(Waypoint::point)
            .ok_or_else(|| GridError::UnknownWaypoint(name.to_owned()))
    }

    /// Labels of the form `name (Score: s)` for pickers, in table order.
    pub fn labels(&self) -> Vec<String> {
        self.iter()
            .map(|(name, w)| format!("{} (Score: {})", name, w.score))
            .collect()
    }

    /// Inverse of [labels](Self::labels): strips the score suffix off a picker label.
    pub fn name_from_label(label: &str) -> &str {
        let label = label.trim();
        label
            .rsplit_once(" (Score:")
            .map_or(label, |(name, _)| name)
    }
}
