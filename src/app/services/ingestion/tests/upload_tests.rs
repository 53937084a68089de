//! Tests for the upload boundary

use super::*;
use crate::app::services::ingestion::{IngestionService, upload_trip_data_in};
use crate::constants::UPLOAD_SUCCESS_MESSAGE;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn service() -> IngestionService {
    IngestionService::new(Arc::new(MemoryStore::new()))
}

#[test]
fn test_upload_ingests_and_removes_temp_file() {
    let temp_dir = TempDir::new().unwrap();
    let content = detailed_csv(3);

    let response =
        upload_trip_data_in(&service(), temp_dir.path(), "train.csv", content.as_bytes(), 2)
            .unwrap();

    assert_eq!(response.message, UPLOAD_SUCCESS_MESSAGE);
    assert_eq!(response.statistics.total_records, 3);
    assert_eq!(response.statistics.processed_records, 3);
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_extension_check_is_case_insensitive() {
    let temp_dir = TempDir::new().unwrap();
    let response = upload_trip_data_in(
        &service(),
        temp_dir.path(),
        "TRIPS.CSV",
        detailed_csv(1).as_bytes(),
        10,
    )
    .unwrap();
    assert_eq!(response.statistics.processed_records, 1);
}

#[test]
fn test_non_csv_upload_rejected_before_writing() {
    let temp_dir = TempDir::new().unwrap();

    for name in ["train.xlsx", "train", "csv"] {
        let err = upload_trip_data_in(&service(), temp_dir.path(), name, b"a,b\n1,2\n", 10)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFileType { .. }), "{}", name);
    }
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_temp_file_removed_when_ingestion_fails() {
    let temp_dir = TempDir::new().unwrap();

    let err = upload_trip_data_in(
        &service(),
        temp_dir.path(),
        "train.csv",
        detailed_csv(2).as_bytes(),
        0,
    )
    .unwrap_err();

    assert!(matches!(err, Error::Configuration { .. }));
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_upload_of_unusable_rows_reports_all_failed() {
    let temp_dir = TempDir::new().unwrap();
    let content = "pickup_datetime,passenger_count\n2023-01-01 10:00:00,1\n";

    let response =
        upload_trip_data_in(&service(), temp_dir.path(), "odd.csv", content.as_bytes(), 10)
            .unwrap();

    assert_eq!(response.statistics.total_records, 1);
    assert_eq!(response.statistics.failed_records, 1);
    assert_eq!(response.statistics.processed_records, 0);
}
