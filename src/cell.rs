use core::fmt;
use std::str::FromStr;

/// Type of a grid cell. [Open](CellType::Open), [Closed](CellType::Closed) and
/// [PathPoint](CellType::PathPoint) are left behind by visualising a search; the `Reset*`
/// variants are cosmetic and behave like [Empty](CellType::Empty).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellType {
    Empty,
    Start,
    Goal,
    Barrier,
    PathPoint,
    Open,
    Closed,
    Reset1,
    Reset2,
    Reset3,
}

impl CellType {
    pub const ALL: [CellType; 10] = [
        CellType::Empty,
        CellType::Start,
        CellType::Goal,
        CellType::Barrier,
        CellType::PathPoint,
        CellType::Open,
        CellType::Closed,
        CellType::Reset1,
        CellType::Reset2,
        CellType::Reset3,
    ];

    /// Bit used for this type in a [TraversableTypes](crate::neighbors::TraversableTypes) mask.
    pub(crate) fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// True for [Empty](CellType::Empty) and the cosmetic reset variants.
    pub fn is_empty_like(self) -> bool {
        matches!(
            self,
            CellType::Empty | CellType::Reset1 | CellType::Reset2 | CellType::Reset3
        )
    }

    /// Token used in the persisted grid format.
    pub fn token(self) -> &'static str {
        match self {
            CellType::Empty => "reset",
            CellType::Start => "start",
            CellType::Goal => "goal",
            CellType::Barrier => "barrier",
            CellType::PathPoint => "path_point",
            CellType::Open => "open",
            CellType::Closed => "closed",
            CellType::Reset1 => "reset1",
            CellType::Reset2 => "reset2",
            CellType::Reset3 => "reset3",
        }
    }

    /// Palette color the renderer uses for this type.
    pub fn default_color(self) -> Rgb {
        match self {
            CellType::Empty => Rgb::new(255, 183, 156),
            CellType::Start => Rgb::new(255, 192, 203),
            CellType::Goal => Rgb::new(128, 0, 128),
            CellType::Barrier => Rgb::new(0, 0, 0),
            CellType::PathPoint => Rgb::new(198, 193, 189),
            CellType::Open => Rgb::new(0, 255, 0),
            CellType::Closed => Rgb::new(171, 211, 223),
            CellType::Reset1 => Rgb::new(255, 255, 255),
            CellType::Reset2 => Rgb::new(233, 151, 163),
            CellType::Reset3 => Rgb::new(245, 244, 198),
        }
    }

    /// Maps a palette color back to its type, if the color is part of the palette.
    pub fn from_color(color: Rgb) -> Option<CellType> {
        CellType::ALL
            .into_iter()
            .find(|t| t.default_color() == color)
    }

    /// Single character used when printing a grid.
    pub fn symbol(self) -> char {
        match self {
            CellType::Start => 'S',
            CellType::Goal => 'G',
            CellType::Barrier => '#',
            CellType::PathPoint => '*',
            CellType::Open => 'o',
            CellType::Closed => 'x',
            _ => '.',
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownCellType(pub String);

impl fmt::Display for UnknownCellType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown cell type {:?}", self.0)
    }
}

impl FromStr for CellType {
    type Err = UnknownCellType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.eq_ignore_ascii_case("empty") {
            return Ok(CellType::Empty);
        }
        CellType::ALL
            .into_iter()
            .find(|t| t.token() == token)
            .ok_or_else(|| UnknownCellType(token.to_owned()))
    }
}

/// Color channels carried for the renderer. The planner never reads them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Rgb {
        Rgb { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

/// A single grid cell. Its position is implied by where the [Grid](crate::grid::Grid) stores it.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub cell_type: CellType,
    pub cost: f64,
    pub street_label: String,
    pub color: Rgb,
}

impl Default for Cell {
    fn default() -> Cell {
        Cell {
            cell_type: CellType::Empty,
            cost: 1.0,
            street_label: String::new(),
            color: CellType::Empty.default_color(),
        }
    }
}

impl Cell {
    pub fn is_barrier(&self) -> bool {
        self.cell_type == CellType::Barrier
    }
}
