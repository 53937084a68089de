//! Cleaning rules applied to one raw chunk
//!
//! Rows are filtered, never reordered. The only in-place rewrite is the id
//! prefix of the compact schema.

use crate::app::models::TripSchema;
use crate::app::services::csv_reader::field_parsers::{parse_f64, parse_integer};
use crate::app::services::csv_reader::{ColumnMapping, RawChunk, RawRow};
use crate::constants::{
    COLUMN_SUFFIX_SEPARATOR, MAX_TRIP_DURATION_SECS, SENTINEL_COORDINATE, TRIP_ID_PREFIX, columns,
};
use crate::{Error, Result};
use tracing::debug;

use super::stats::CleaningStats;

/// Rows of one chunk that satisfy every trip invariant
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedChunk {
    /// Schema the rows were cleaned for
    pub schema: TripSchema,
    /// Normalized column names
    pub mapping: ColumnMapping,
    /// Surviving rows with every cell present
    pub rows: Vec<Vec<String>>,
    /// What each rule removed or rewrote
    pub stats: CleaningStats,
}

impl CleanedChunk {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Applies the cleaning rules to raw chunks
#[derive(Debug, Clone, Default)]
pub struct RecordCleaner {
    /// Schema forced by the caller; detected per chunk when None
    schema: Option<TripSchema>,
}

impl RecordCleaner {
    /// Create a cleaner that detects the schema from each chunk's header
    pub fn new() -> Self {
        Self { schema: None }
    }

    /// Create a cleaner for a known schema
    pub fn for_schema(schema: TripSchema) -> Self {
        Self {
            schema: Some(schema),
        }
    }

    /// Schema forced on this cleaner, if any
    pub fn schema(&self) -> Option<TripSchema> {
        self.schema
    }

    /// Clean one chunk
    ///
    /// Structural problems (a required column missing from the header, a
    /// coordinate or duration that is not a number) are errors rather than
    /// dropped rows: they indicate the chunk does not match the schema at all.
    pub fn clean(&self, chunk: RawChunk) -> Result<CleanedChunk> {
        let mut stats = CleaningStats::new();
        stats.input_rows = chunk.rows.len();

        // Rule 1: rows with any missing cell
        let rows = drop_incomplete_rows(chunk.rows, &mut stats);

        // Rule 2: column-name suffixes
        let normalized = chunk
            .columns
            .iter()
            .map(|name| normalize_column_name(name).to_string())
            .collect();
        let mapping = ColumnMapping::new(normalized)?;

        let schema = self
            .schema
            .unwrap_or_else(|| TripSchema::detect(&mapping.names));
        let missing = mapping.missing_columns(schema.required_columns());
        if !missing.is_empty() {
            return Err(Error::data_validation(format!(
                "Chunk {} is missing required {} columns: {}",
                chunk.index,
                schema,
                missing.join(", ")
            )));
        }

        // Rule 3: sentinel coordinates
        let coordinate_indices = columns::COORDINATES
            .iter()
            .map(|name| mapping.require_index(name))
            .collect::<Result<Vec<_>>>()?;
        let (mut rows, dropped) = retain_rows(rows, |row| {
            has_sentinel_coordinate(row, &coordinate_indices).map(|sentinel| !sentinel)
        })?;
        stats.zero_coordinates += dropped;

        match schema {
            // Rule 4: duration outliers
            TripSchema::Detailed => {
                let duration_index = mapping.require_index(columns::TRIP_DURATION)?;
                let (kept, dropped) = retain_rows(rows, |row| {
                    duration_in_range(cell(row, duration_index)?).map_err(|value| {
                        Error::data_validation(format!(
                            "Invalid integer format for {}: '{}'",
                            columns::TRIP_DURATION,
                            value
                        ))
                    })
                })?;
                stats.duration_outliers += dropped;
                rows = kept;
            }
            // Rule 5: id prefix
            TripSchema::Compact => {
                let id_index = mapping.require_index(columns::ID)?;
                for row in rows.iter_mut() {
                    let id = cell(row, id_index)?;
                    if !id.starts_with(TRIP_ID_PREFIX) {
                        row[id_index] = normalize_trip_id(id);
                        stats.ids_normalized += 1;
                    }
                }
            }
        }

        stats.output_rows = rows.len();
        debug!("Chunk {}: {}", chunk.index, stats.summary());

        Ok(CleanedChunk {
            schema,
            mapping,
            rows,
            stats,
        })
    }
}

/// Strip any suffix after the first `__` in a column name
pub fn normalize_column_name(name: &str) -> &str {
    match name.find(COLUMN_SUFFIX_SEPARATOR) {
        Some(position) if position > 0 => &name[..position],
        _ => name,
    }
}

/// Prefix an id with "id" unless it already carries the prefix
pub fn normalize_trip_id(id: &str) -> String {
    if id.starts_with(TRIP_ID_PREFIX) {
        id.to_string()
    } else {
        format!("{}{}", TRIP_ID_PREFIX, id)
    }
}

/// True when any of the given coordinate cells equals exactly 0.0
pub fn has_sentinel_coordinate(row: &[String], coordinate_indices: &[usize]) -> Result<bool> {
    for &index in coordinate_indices {
        let value = cell(row, index)?;
        let parsed = parse_f64(value).ok_or_else(|| {
            Error::data_validation(format!("Invalid coordinate value: '{}'", value))
        })?;
        if parsed == SENTINEL_COORDINATE {
            return Ok(true);
        }
    }
    Ok(false)
}

fn cell(row: &[String], index: usize) -> Result<&str> {
    row.get(index).map(String::as_str).ok_or_else(|| {
        Error::data_validation(format!(
            "Row has {} cells, expected at least {}",
            row.len(),
            index + 1
        ))
    })
}

fn duration_in_range(value: &str) -> std::result::Result<bool, String> {
    parse_integer(value)
        .map(|duration| duration > 0 && duration <= MAX_TRIP_DURATION_SECS)
        .ok_or_else(|| value.to_string())
}

fn drop_incomplete_rows(rows: Vec<RawRow>, stats: &mut CleaningStats) -> Vec<Vec<String>> {
    rows.into_iter()
        .filter_map(|row| {
            let complete: Option<Vec<String>> = row.into_iter().collect();
            if complete.is_none() {
                stats.missing_values += 1;
            }
            complete
        })
        .collect()
}

/// Keep rows for which `keep` returns true; returns (kept, dropped count)
fn retain_rows<F>(rows: Vec<Vec<String>>, mut keep: F) -> Result<(Vec<Vec<String>>, usize)>
where
    F: FnMut(&[String]) -> Result<bool>,
{
    let total = rows.len();
    let mut kept = Vec::with_capacity(total);
    for row in rows {
        if keep(&row)? {
            kept.push(row);
        }
    }
    let dropped = total - kept.len();
    Ok((kept, dropped))
}
