use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::grid::{Color, Grid};

/// Facing of the ant. Tokens are `N`, `E`, `S`, `O` (O = ouest, West).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "O")]
    West,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::North, Heading::East, Heading::South, Heading::West];

    /// Clockwise: N -> E -> S -> O -> N.
    #[inline]
    pub fn turn_right(self) -> Self {
        match self {
            Heading::North => Heading::East,
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
        }
    }

    #[inline]
    pub fn turn_left(self) -> Self {
        match self {
            Heading::North => Heading::West,
            Heading::West => Heading::South,
            Heading::South => Heading::East,
            Heading::East => Heading::North,
        }
    }

    /// Reflection across the N-S axis.
    #[inline]
    pub fn mirror(self) -> Self {
        match self {
            Heading::East => Heading::West,
            Heading::West => Heading::East,
            h => h,
        }
    }

    /// `(drow, dcol)` for one step in this heading. Rows grow downward
    /// (image coordinates), so North is row - 1.
    #[inline]
    pub fn offset(self) -> (i64, i64) {
        match self {
            Heading::North => (-1, 0),
            Heading::East => (0, 1),
            Heading::South => (1, 0),
            Heading::West => (0, -1),
        }
    }

    pub fn token(self) -> char {
        match self {
            Heading::North => 'N',
            Heading::East => 'E',
            Heading::South => 'S',
            Heading::West => 'O',
        }
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for Heading {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "N" => Ok(Heading::North),
            "E" => Ok(Heading::East),
            "S" => Ok(Heading::South),
            "O" => Ok(Heading::West),
            other => Err(Error::UnknownHeading(other.to_string())),
        }
    }
}

/// Ant position and facing. Coordinates are signed because a step may carry
/// the ant one cell past the plate before the boundary policy runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ant {
    pub row: i64,
    pub col: i64,
    pub heading: Heading,
}

/// Turning convention, named after what happens on a white cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// White: turn right. Black: turn left. Classic Langton's ant.
    #[default]
    WhiteRight,
    /// White: turn left. Black: turn right.
    WhiteLeft,
}

impl Rule {
    /// Heading after reading `cell` while facing `heading`.
    #[inline]
    pub fn turn(self, cell: Color, heading: Heading) -> Heading {
        match (self, cell) {
            (Rule::WhiteRight, Color::White) | (Rule::WhiteLeft, Color::Black) => {
                heading.turn_right()
            }
            (Rule::WhiteRight, Color::Black) | (Rule::WhiteLeft, Color::White) => {
                heading.turn_left()
            }
        }
    }

    /// One transition: flip the ant's cell, turn on its prior color, then
    /// advance one cell along the new heading.
    ///
    /// The ant must be on the plate. The returned position is not wrapped
    /// and may lie one cell outside it.
    pub fn apply(self, plate: &mut Grid<Color>, ant: Ant) -> Ant {
        let (row, col) = (ant.row as usize, ant.col as usize);
        let cell = plate.get(row, col);
        plate.set(row, col, cell.flip());

        let heading = self.turn(cell, ant.heading);
        let (dr, dc) = heading.offset();
        Ant {
            row: ant.row + dr,
            col: ant.col + dc,
            heading,
        }
    }

    pub fn mirror(self) -> Self {
        match self {
            Rule::WhiteRight => Rule::WhiteLeft,
            Rule::WhiteLeft => Rule::WhiteRight,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rule::WhiteRight => "white_right",
            Rule::WhiteLeft => "white_left",
        })
    }
}

impl FromStr for Rule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white_right" => Ok(Rule::WhiteRight),
            "white_left" => Ok(Rule::WhiteLeft),
            other => Err(Error::UnknownRule(other.to_string())),
        }
    }
}
