//! Post-hoc views of a trajectory for plotting collaborators.

use serde::Serialize;

use crate::grid::Grid;
use crate::history::History;
use crate::rule::Heading;

/// How many records place the ant on each cell.
pub fn visit_histogram(history: &History, edge: usize) -> Grid<u32> {
    let mut visits = Grid::<u32>::new(edge);
    for r in history {
        if r.row < edge && r.col < edge {
            let i = visits.idx(r.row, r.col);
            visits.data[i] += 1;
        }
    }
    visits
}

/// Occurrences of each heading across a history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HeadingCounts {
    pub north: usize,
    pub east: usize,
    pub south: usize,
    pub west: usize,
}

impl HeadingCounts {
    pub fn get(&self, heading: Heading) -> usize {
        match heading {
            Heading::North => self.north,
            Heading::East => self.east,
            Heading::South => self.south,
            Heading::West => self.west,
        }
    }

    pub fn total(&self) -> usize {
        self.north + self.east + self.south + self.west
    }

    pub fn max(&self) -> usize {
        self.north.max(self.east).max(self.south).max(self.west)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Heading, usize)> + '_ {
        Heading::ALL.into_iter().map(|h| (h, self.get(h)))
    }
}

pub fn heading_counts(history: &History) -> HeadingCounts {
    let mut counts = HeadingCounts::default();
    for r in history {
        match r.heading {
            Heading::North => counts.north += 1,
            Heading::East => counts.east += 1,
            Heading::South => counts.south += 1,
            Heading::West => counts.west += 1,
        }
    }
    counts
}

/// White and black fractions as two series over the record index.
pub fn fraction_series(history: &History) -> (Vec<f64>, Vec<f64>) {
    history.iter().map(|r| (r.white, r.black)).unzip()
}
