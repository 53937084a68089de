//! Upload boundary: a named byte payload in, run statistics out

use crate::constants::{CSV_EXTENSION, UPLOAD_SUCCESS_MESSAGE};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

use super::pipeline::IngestionService;
use super::stats::IngestionStats;

/// Reply to a completed upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub statistics: IngestionStats,
}

/// Ingest uploaded CSV bytes via a file in the system temp directory
pub fn upload_trip_data(
    service: &IngestionService,
    file_name: &str,
    content: &[u8],
    batch_size: usize,
) -> Result<UploadResponse> {
    upload_trip_data_in(service, &std::env::temp_dir(), file_name, content, batch_size)
}

/// Ingest uploaded CSV bytes via a temporary file created in `dir`
///
/// Names without a `.csv` extension are rejected before anything is
/// written. The temporary file is removed whether or not ingestion succeeds.
pub fn upload_trip_data_in(
    service: &IngestionService,
    dir: &Path,
    file_name: &str,
    content: &[u8],
    batch_size: usize,
) -> Result<UploadResponse> {
    if !has_csv_extension(file_name) {
        return Err(Error::unsupported_file_type(file_name));
    }

    let mut temp_file = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(".csv")
        .tempfile_in(dir)
        .map_err(|e| Error::io("Failed to create temporary upload file", e))?;
    temp_file
        .write_all(content)
        .and_then(|_| temp_file.flush())
        .map_err(|e| Error::io("Failed to write temporary upload file", e))?;

    let result = service.ingest_csv(temp_file.path(), batch_size, None);

    if let Err(e) = temp_file.close() {
        warn!("Failed to remove temporary upload file: {}", e);
    }

    let statistics = result?;
    info!("Upload '{}' ingested: {}", file_name, statistics.summary());

    Ok(UploadResponse {
        message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        statistics,
    })
}

fn has_csv_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CSV_EXTENSION))
}
