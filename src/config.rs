use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::Color;
use crate::rule::{Heading, Rule};

/// Largest accepted plate edge (268M cells).
pub const MAX_EDGE: usize = 16_384;

/// Largest accepted step budget. Each step appends one history record.
pub const MAX_STEPS: usize = 10_000_000;

/// Initial plate contents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fill {
    #[default]
    White,
    Black,
    /// Independent fair coin per cell, keyed on the config seed.
    Random,
}

impl fmt::Display for Fill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Fill::White => "0",
            Fill::Black => "1",
            Fill::Random => "rand",
        })
    }
}

impl FromStr for Fill {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "0" | "white" => Ok(Fill::White),
            "1" | "black" => Ok(Fill::Black),
            "rand" | "random" => Ok(Fill::Random),
            other => Err(Error::UnknownFill(other.to_string())),
        }
    }
}

/// Everything a run needs. Each run owns its own plate and history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntConfig {
    pub rule: Rule,
    pub edge: usize,
    pub steps: usize,
    /// Forced onto the starting cell after the fill.
    pub start_color: Color,
    pub look: Heading,
    /// Starting `(row, col)`, reduced modulo `edge`. Defaults to the center.
    pub origin: Option<(i64, i64)>,
    pub fill: Fill,
    /// Toroidal wrap when true, stop at the first edge crossing when false.
    pub trap: bool,
    /// Only read when `fill` is `Random`.
    pub seed: u64,
}

impl AntConfig {
    pub fn new(rule: Rule, edge: usize, steps: usize) -> Self {
        Self {
            rule,
            edge,
            steps,
            start_color: Color::White,
            look: Heading::North,
            origin: None,
            fill: Fill::White,
            trap: false,
            seed: 42,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.edge == 0 {
            return Err(Error::EmptyPlate);
        }
        if self.edge > MAX_EDGE {
            return Err(Error::PlateTooLarge {
                edge: self.edge,
                max: MAX_EDGE,
            });
        }
        if self.steps > MAX_STEPS {
            return Err(Error::TooManySteps {
                steps: self.steps,
                max: MAX_STEPS,
            });
        }
        Ok(())
    }

    /// Starting cell after defaulting and wrapping. Assumes a validated edge.
    pub fn start(&self) -> (usize, usize) {
        let e = self.edge as i64;
        match self.origin {
            Some((row, col)) => (row.rem_euclid(e) as usize, col.rem_euclid(e) as usize),
            None => (self.edge / 2, self.edge / 2),
        }
    }
}

impl Default for AntConfig {
    /// 400x400 white plate for 15000 steps: long enough for the highway to form.
    fn default() -> Self {
        Self::new(Rule::WhiteRight, 400, 15_000)
    }
}
