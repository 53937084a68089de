//! Field parsing utilities for cleaned CSV rows
//!
//! This module provides helper functions for parsing different data types
//! from rows whose cells are all present, with errors that name the column
//! and the offending value.

use super::column_mapping::ColumnMapping;
use crate::utils::time::parse_datetime;
use crate::{Error, Result};
use chrono::{DateTime, Utc};

/// Get a required field value from a row
pub fn get_required_field<'a>(
    row: &'a [String],
    mapping: &ColumnMapping,
    field_name: &str,
) -> Result<&'a str> {
    let index = mapping.require_index(field_name)?;

    row.get(index).map(String::as_str).ok_or_else(|| {
        Error::data_validation(format!("No value for required column '{}'", field_name))
    })
}

/// Parse a required string field
pub fn parse_required_string(
    row: &[String],
    mapping: &ColumnMapping,
    field_name: &str,
) -> Result<String> {
    Ok(get_required_field(row, mapping, field_name)?.to_string())
}

/// Parse a required floating point field
pub fn parse_required_f64(row: &[String], mapping: &ColumnMapping, field_name: &str) -> Result<f64> {
    let value_str = get_required_field(row, mapping, field_name)?;
    parse_f64(value_str).ok_or_else(|| {
        Error::data_validation(format!(
            "Invalid number format for {}: '{}'",
            field_name, value_str
        ))
    })
}

/// Parse a required integer field
///
/// Float text with a zero fractional part (`"2.0"`) is accepted: sources
/// that went through a dataframe with missing values up-cast integer columns.
pub fn parse_required_i64(row: &[String], mapping: &ColumnMapping, field_name: &str) -> Result<i64> {
    let value_str = get_required_field(row, mapping, field_name)?;
    parse_integer(value_str).ok_or_else(|| {
        Error::data_validation(format!(
            "Invalid integer format for {}: '{}'",
            field_name, value_str
        ))
    })
}

/// Parse a required i32 field
pub fn parse_required_i32(row: &[String], mapping: &ColumnMapping, field_name: &str) -> Result<i32> {
    let value = parse_required_i64(row, mapping, field_name)?;
    i32::try_from(value).map_err(|_| {
        Error::data_validation(format!("Value out of range for {}: {}", field_name, value))
    })
}

/// Parse a required timestamp field
pub fn parse_required_datetime(
    row: &[String],
    mapping: &ColumnMapping,
    field_name: &str,
) -> Result<DateTime<Utc>> {
    let value_str = get_required_field(row, mapping, field_name)?;
    parse_datetime(value_str).ok_or_else(|| {
        Error::data_validation(format!(
            "Invalid datetime format for {}: '{}' (expected 'YYYY-MM-DD HH:MM:SS')",
            field_name, value_str
        ))
    })
}

/// Parse a finite float
pub fn parse_f64(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an integer, accepting float text without a fractional part
pub fn parse_integer(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(parsed) = value.parse::<i64>() {
        return Some(parsed);
    }

    parse_f64(value)
        .filter(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
        .map(|v| v as i64)
}
