//! Input validation applied before any query runs

use super::geo::is_valid_coordinates;
use crate::{Error, Result};
use chrono::{DateTime, Utc};

/// Reject ranges whose start lies after their end
pub fn validate_date_range(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Result<()> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(Error::invalid_date_range(start, end)),
        _ => Ok(()),
    }
}

/// Reject latitude/longitude pairs outside the WGS84 bounds
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(Error::invalid_coordinates(format!(
            "Invalid latitude value {}",
            latitude
        )));
    }
    if !is_valid_coordinates(latitude, longitude) {
        return Err(Error::invalid_coordinates(format!(
            "Invalid longitude value {}",
            longitude
        )));
    }
    Ok(())
}
