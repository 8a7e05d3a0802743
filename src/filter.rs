//! Row filter - the three dropdown selections applied to the table
//!
//! AND across dimensions, OR within one dimension's selected values.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

use crate::dataset::{Dimension, Row, Table};

/// Selected values for each of the three dropdowns.
/// An empty set means "no filter" on that dimension.
///
/// Deserialises from the update request body; a cleared dropdown arrives as
/// `null`, a missing field or `[]`, and all three mean the same thing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sensor: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub signal: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub track: BTreeSet<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeSet<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Selection {
    #[cfg(test)]
    pub fn new<I, S>(sensor: I, signal: I, track: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sensor: sensor.into_iter().map(Into::into).collect(),
            signal: signal.into_iter().map(Into::into).collect(),
            track: track.into_iter().map(Into::into).collect(),
        }
    }

    pub fn selected(&self, dimension: Dimension) -> &BTreeSet<String> {
        match dimension {
            Dimension::Sensor => &self.sensor,
            Dimension::Signal => &self.signal,
            Dimension::Track => &self.track,
        }
    }

    /// A row passes when, for every dimension with a non-empty set,
    /// its value is one of the selected values.
    pub fn matches(&self, row: &Row) -> bool {
        Dimension::ALL.iter().all(|&dim| {
            let selected = self.selected(dim);
            selected.is_empty() || selected.contains(dim.value(row))
        })
    }

    pub fn is_unfiltered(&self) -> bool {
        Dimension::ALL.iter().all(|&dim| self.selected(dim).is_empty())
    }
}

/// Rows passing the selection, in table order.
pub fn filter_rows<'a>(table: &'a Table, selection: &Selection) -> Vec<&'a Row> {
    table
        .rows()
        .iter()
        .filter(|row| selection.matches(row))
        .collect()
}
