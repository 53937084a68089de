//! Tests for the chunked CSV reader


use super::ChunkedCsvReader;
use std::io::Cursor;

/// Header shared by the detailed-schema fixtures
pub const DETAILED_HEADER: &str = "vendor_id,pickup_datetime,dropoff_datetime,passenger_count,\
pickup_longitude,pickup_latitude,dropoff_longitude,dropoff_latitude,trip_duration";

/// Build a detailed-schema CSV with `rows` valid records
pub fn detailed_csv(rows: usize) -> String {
    let mut csv = String::from(DETAILED_HEADER);
    csv.push('\n');
    for i in 0..rows {
        csv.push_str(&format!(
            "V{},2023-01-01 10:00:00,2023-01-01 11:00:00,1,-73.9876,40.7545,-74.0065,40.7406,3600\n",
            i
        ));
    }
    csv
}

/// Create an in-memory reader over CSV text
pub fn reader_for(csv: &str, chunk_size: usize) -> ChunkedCsvReader<Cursor<Vec<u8>>> {
    ChunkedCsvReader::from_reader(Cursor::new(csv.as_bytes().to_vec()), chunk_size)
        .expect("reader should accept fixture")
}
