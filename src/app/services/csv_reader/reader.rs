//! Core chunk reader implementation
//!
//! Reads records sequentially and groups them into fixed-size chunks.
//! Structural errors (wrong field count, invalid UTF-8) are kept inside the
//! chunk as malformed records so the ingestion pipeline can fail that chunk
//! without aborting the run.

use crate::constants::MISSING_VALUE_MARKERS;
use crate::{Error, Result};
use csv::StringRecord;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, warn};

/// One raw row; `None` marks a missing cell
pub type RawRow = Vec<Option<String>>;

/// A record that could not be parsed into the header's columns
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRecord {
    /// 1-based record number within the source (header excluded)
    pub record: usize,
    pub message: String,
}

/// A bounded slice of rows read from a larger source
#[derive(Debug, Clone, PartialEq)]
pub struct RawChunk {
    /// 0-based position of the chunk within the source
    pub index: usize,
    /// Column names exactly as they appear in the header
    pub columns: Vec<String>,
    /// Rows that parsed into the header's columns
    pub rows: Vec<RawRow>,
    /// Records that did not
    pub malformed: Vec<MalformedRecord>,
}

impl RawChunk {
    /// Number of records read for this chunk, malformed ones included
    pub fn len(&self) -> usize {
        self.rows.len() + self.malformed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if any record in the chunk failed structural parsing
    pub fn has_malformed(&self) -> bool {
        !self.malformed.is_empty()
    }
}

/// Streams a CSV source as fixed-size chunks of raw rows
pub struct ChunkedCsvReader<R: Read> {
    reader: csv::Reader<R>,
    columns: Vec<String>,
    chunk_size: usize,
    chunk_index: usize,
    records_read: usize,
    finished: bool,
}

impl ChunkedCsvReader<BufReader<File>> {
    /// Open a CSV file for chunked reading
    ///
    /// Fails before any chunk is read when the file does not exist.
    pub fn open(path: &Path, chunk_size: usize) -> Result<Self> {
        if !path.exists() {
            return Err(Error::file_not_found(path));
        }

        let file = File::open(path)
            .map_err(|e| Error::io(format!("Failed to open {}", path.display()), e))?;
        debug!("Opened CSV source {}", path.display());

        Self::from_reader(BufReader::new(file), chunk_size)
    }
}

impl<R: Read> ChunkedCsvReader<R> {
    /// Wrap any reader whose first line is the CSV header
    pub fn from_reader(source: R, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::configuration("batch size must be positive"));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(source);

        let columns = reader
            .headers()
            .map_err(|e| Error::csv_parsing("Failed to read CSV header", Some(e)))?
            .iter()
            .map(|name| name.trim().to_string())
            .collect();

        Ok(Self {
            reader,
            columns,
            chunk_size,
            chunk_index: 0,
            records_read: 0,
            finished: false,
        })
    }

    /// Column names from the header
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Configured rows per chunk
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Records consumed so far, malformed ones included
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    fn read_chunk(&mut self) -> Option<RawChunk> {
        let mut rows = Vec::new();
        let mut malformed = Vec::new();
        let mut record = StringRecord::new();

        while rows.len() + malformed.len() < self.chunk_size {
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    self.records_read += 1;
                    rows.push(to_raw_row(&record));
                }
                Ok(false) => {
                    self.finished = true;
                    break;
                }
                Err(e) => {
                    self.records_read += 1;
                    let io_failure = matches!(e.kind(), csv::ErrorKind::Io(_));
                    malformed.push(MalformedRecord {
                        record: self.records_read,
                        message: e.to_string(),
                    });
                    if io_failure {
                        warn!("I/O failure while reading CSV source: {}", e);
                        self.finished = true;
                        break;
                    }
                }
            }
        }

        if rows.is_empty() && malformed.is_empty() {
            return None;
        }

        let chunk = RawChunk {
            index: self.chunk_index,
            columns: self.columns.clone(),
            rows,
            malformed,
        };
        self.chunk_index += 1;
        Some(chunk)
    }
}

impl<R: Read> Iterator for ChunkedCsvReader<R> {
    type Item = RawChunk;

    fn next(&mut self) -> Option<RawChunk> {
        if self.finished {
            return None;
        }
        self.read_chunk()
    }
}

fn to_raw_row(record: &StringRecord) -> RawRow {
    record
        .iter()
        .map(|field| {
            let trimmed = field.trim();
            if MISSING_VALUE_MARKERS.contains(&trimmed) {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}
