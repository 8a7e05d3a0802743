//! Dataset store - the cross-table loaded once at startup
//!
//! Rows are kept in file order and never mutated after load.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

pub const COL_SENSOR: &str = "Sensor Type";
pub const COL_SIGNAL: &str = "Signal Processing Technique";
pub const COL_TRACK: &str = "Track Parameter or Irregularity";
pub const COL_SHARED: &str = "Shared References";
pub const COL_REFERENCES: &str = "References";

/// Columns every input file must carry
pub const REQUIRED_COLUMNS: [&str; 5] = [COL_SENSOR, COL_SIGNAL, COL_TRACK, COL_SHARED, COL_REFERENCES];

/// One sensor / technique / track-parameter fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(rename = "Sensor Type")]
    pub sensor_type: String,
    #[serde(rename = "Signal Processing Technique")]
    pub signal_technique: String,
    #[serde(rename = "Track Parameter or Irregularity")]
    pub track_parameter: String,
    #[serde(rename = "Shared References")]
    pub shared_references: f64,
    #[serde(rename = "References")]
    pub references: String,
}

/// Categorical columns usable as a filter and a chart axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Sensor,
    Signal,
    Track,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Sensor, Dimension::Signal, Dimension::Track];

    /// CSV header, also used as axis title and dropdown label
    pub fn column(self) -> &'static str {
        match self {
            Dimension::Sensor => COL_SENSOR,
            Dimension::Signal => COL_SIGNAL,
            Dimension::Track => COL_TRACK,
        }
    }

    pub fn value(self, row: &Row) -> &str {
        match self {
            Dimension::Sensor => &row.sensor_type,
            Dimension::Signal => &row.signal_technique,
            Dimension::Track => &row.track_parameter,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is missing required column '{column}'")]
    MissingColumn { path: String, column: String },
    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Immutable in-memory table
#[derive(Debug, Clone, Default)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    /// Load a comma-separated file with a header row
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        tracing::debug!("Loading dataset from {}", source_name);

        let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
            path: source_name.clone(),
            source,
        })?;
        let mut reader = csv::Reader::from_reader(file);

        let headers = reader
            .headers()
            .map_err(|source| csv_error(&source_name, source))?
            .clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(LoadError::MissingColumn {
                    path: source_name,
                    column: column.to_string(),
                });
            }
        }

        let rows = reader
            .deserialize::<Row>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| csv_error(&source_name, source))?;

        tracing::info!("Loaded {} rows from {}", rows.len(), source_name);
        Ok(Self { rows })
    }

    #[cfg(test)]
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted unique values of one column, for dropdown options
    pub fn distinct_values(&self, dimension: Dimension) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| dimension.value(row))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

fn csv_error(path: &str, source: csv::Error) -> LoadError {
    LoadError::Csv {
        path: path.to_string(),
        source,
    }
}

#[cfg(test)]
pub(crate) fn row(sensor: &str, signal: &str, track: &str, shared: f64, refs: &str) -> Row {
    Row {
        sensor_type: sensor.to_string(),
        signal_technique: signal.to_string(),
        track_parameter: track.to_string(),
        shared_references: shared,
        references: refs.to_string(),
    }
}
