use serde::Serialize;

use crate::rule::Heading;

/// Ant state and plate balance after one step (or before the first).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Record {
    pub row: usize,
    pub col: usize,
    pub heading: Heading,
    /// Fraction of white cells.
    pub white: f64,
    /// Fraction of black cells. `white + black == 1.0`.
    pub black: f64,
}

/// Append-only trajectory. Index 0 is the state before any step.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct History {
    records: Vec<Record>,
}

impl History {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            records: Vec::with_capacity(n),
        }
    }

    pub(crate) fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Record> {
        self.records.get(i)
    }

    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl std::ops::Index<usize> for History {
    type Output = Record;

    fn index(&self, i: usize) -> &Record {
        &self.records[i]
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
