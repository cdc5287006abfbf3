use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::rng::coin;

/// Cell color. `White` is color 0, `Black` is color 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Color {
    #[default]
    White = 0,
    Black = 1,
}

impl Color {
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[inline]
    pub fn bit(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::White => "white",
            Color::Black => "black",
        })
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" | "0" => Ok(Color::White),
            "black" | "1" => Ok(Color::Black),
            other => Err(Error::UnknownColor(other.to_string())),
        }
    }
}

/// Square row-major flat grid. No per-cell objects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T> {
    pub data: Vec<T>,
    pub edge: usize,
}

impl<T: Copy + Default> Grid<T> {
    pub fn new(edge: usize) -> Self {
        Self::filled(edge, T::default())
    }
}

impl<T: Copy> Grid<T> {
    pub fn filled(edge: usize, v: T) -> Self {
        Self {
            data: vec![v; edge * edge],
            edge,
        }
    }

    #[inline]
    pub fn idx(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.edge && col < self.edge);
        row * self.edge + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[self.idx(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, v: T) {
        let i = self.idx(row, col);
        self.data[i] = v;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Grid<Color> {
    /// Plate where every cell is an independent fair coin keyed on `(row, col, seed)`.
    pub fn random(edge: usize, seed: u32) -> Self {
        let mut plate = Self::new(edge);
        if edge == 0 {
            return plate;
        }
        plate
            .data
            .par_chunks_mut(edge)
            .enumerate()
            .for_each(|(row, cells)| {
                for (col, cell) in cells.iter_mut().enumerate() {
                    if coin(row, col, seed) {
                        *cell = Color::Black;
                    }
                }
            });
        plate
    }

    /// Full rescan of the plate.
    pub fn census(&self) -> Census {
        let black = self.data.iter().filter(|&&c| c == Color::Black).count();
        Census {
            white: self.data.len() - black,
            black,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            edge: self.edge,
            cells: self.data.iter().map(|c| c.bit()).collect(),
        }
    }
}

/// Plate contents as {0, 1} bytes in row-major order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub edge: usize,
    pub cells: Vec<u8>,
}

impl Snapshot {
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks(0) panics
        self.cells.chunks(self.edge.max(1))
    }
}

/// Running count of white and black cells.
///
/// Exactly one cell flips per step, so the driver adjusts the counts in place
/// instead of rescanning the plate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Census {
    pub white: usize,
    pub black: usize,
}

impl Census {
    #[inline]
    pub fn total(&self) -> usize {
        self.white + self.black
    }

    /// Record a single cell flipping away from `from`.
    #[inline]
    pub fn flip(&mut self, from: Color) {
        match from {
            Color::White => {
                self.white -= 1;
                self.black += 1;
            }
            Color::Black => {
                self.black -= 1;
                self.white += 1;
            }
        }
    }

    /// `(white, black)` fractions of the plate.
    pub fn fractions(&self) -> (f64, f64) {
        let total = self.total();
        if total == 0 {
            return (1.0, 0.0);
        }
        let t = total as f64;
        (self.white as f64 / t, self.black as f64 / t)
    }
}

#[inline]
pub fn in_bounds(row: i64, col: i64, edge: usize) -> bool {
    let e = edge as i64;
    (0..e).contains(&row) && (0..e).contains(&col)
}

/// Toroidal wrap of a signed coordinate onto `[0, edge)`.
#[inline]
pub fn wrap(v: i64, edge: usize) -> i64 {
    v.rem_euclid(edge as i64)
}
