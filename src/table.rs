//! Time-indexed telemetry table
use std::collections::BTreeMap;

use hifitime::{Duration, Epoch};

use crate::channel::Channel;
use crate::errors::TableError;

/// [TimeTable] is an ordered, column-oriented time series:
/// one [Epoch] per row, columns keyed by channel name, any cell
/// possibly missing. Insertion order is time order and is enforced
/// at construction: all window algorithms rely on it.
///
/// Cells are valid iff they hold a finite value. Non finite values
/// (NaN, infinities) are normalized to missing on construction, so
/// that "missing" is always an explicit [None], never a NaN that
/// would leak through arithmetic.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TimeTable {
    epochs: Vec<Epoch>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl TimeTable {
    /// Builds a [TimeTable] from a time index and named columns.
    /// Rejects unsorted epochs, duplicate column names and columns
    /// whose length does not match the time index.
    pub fn from_columns<S: Into<String>>(
        epochs: Vec<Epoch>,
        columns: impl IntoIterator<Item = (S, Vec<Option<f64>>)>,
    ) -> Result<Self, TableError> {
        if epochs.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(TableError::UnsortedTimestamps);
        }

        let rows = epochs.len();
        let mut map = BTreeMap::new();

        for (name, values) in columns.into_iter() {
            let name = name.into();
            if values.len() != rows {
                return Err(TableError::ColumnLength {
                    name,
                    len: values.len(),
                    rows,
                });
            }
            let values = values
                .into_iter()
                .map(|v| v.filter(|v| v.is_finite()))
                .collect();
            if map.insert(name.clone(), values).is_some() {
                return Err(TableError::DuplicateColumn(name));
            }
        }

        Ok(Self {
            epochs,
            columns: map,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    /// True if this [TimeTable] has no rows.
    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// The time index.
    pub fn epochs(&self) -> &[Epoch] {
        &self.epochs
    }

    /// [Epoch] of the final row. The synthesized observation is
    /// always keyed by this epoch, regardless of which rows supplied
    /// the individual field values.
    pub fn last_epoch(&self) -> Option<Epoch> {
        self.epochs.last().copied()
    }

    /// Access a column by name.
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    /// Access a tracked [Channel] column.
    pub fn tracked(&self, channel: Channel) -> Option<&[Option<f64>]> {
        self.column(channel.name())
    }

    /// Iterate over all (name, column) pairs.
    pub fn columns(&self) -> impl Iterator<Item = (&String, &[Option<f64>])> {
        self.columns.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Returns the trailing portion of this [TimeTable]: rows whose
    /// epoch lies within `window` of the final epoch (start inclusive).
    /// An empty table yields an empty table.
    pub fn trailing(&self, window: Duration) -> TimeTable {
        let last = match self.epochs.last() {
            Some(last) => *last,
            None => return self.clone(),
        };

        let start = last - window;
        let begin = self
            .epochs
            .iter()
            .position(|t| *t >= start)
            .unwrap_or(self.epochs.len());

        TimeTable {
            epochs: self.epochs[begin..].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|(name, values)| (name.clone(), values[begin..].to_vec()))
                .collect(),
        }
    }

    /// Nulls out the cells of `name` flagged by `mask`: this is how
    /// a QC stage discards readings it no longer trusts. Cells already
    /// missing stay missing; flagging is never undone.
    ///
    /// `mask` must carry exactly one flag per row: a shorter mask
    /// would silently leave tail cells unfiltered.
    pub fn mask_column(&mut self, name: &str, mask: &[bool]) {
        if let Some(values) = self.columns.get_mut(name) {
            debug_assert_eq!(
                mask.len(),
                values.len(),
                "one mask flag per row"
            );
            for (cell, flagged) in values.iter_mut().zip(mask.iter()) {
                if *flagged {
                    *cell = None;
                }
            }
        }
    }
}
