//! Column name to index lookups for raw and cleaned rows

use crate::{Error, Result};
use std::collections::HashMap;

/// Column mapping for a chunk's header
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMapping {
    /// Column names in header order
    pub names: Vec<String>,

    /// Column name to index mapping
    pub name_to_index: HashMap<String, usize>,
}

impl ColumnMapping {
    /// Build a mapping; duplicate names are rejected
    pub fn new(names: Vec<String>) -> Result<Self> {
        let mut name_to_index = HashMap::with_capacity(names.len());

        for (index, name) in names.iter().enumerate() {
            if name_to_index.insert(name.clone(), index).is_some() {
                return Err(Error::data_validation(format!(
                    "Duplicate column '{}' in header",
                    name
                )));
            }
        }

        Ok(Self {
            names,
            name_to_index,
        })
    }

    /// Get the index for a given column name
    pub fn get_index(&self, column_name: &str) -> Option<usize> {
        self.name_to_index.get(column_name).copied()
    }

    /// Get the index for a column that must exist
    pub fn require_index(&self, column_name: &str) -> Result<usize> {
        self.get_index(column_name).ok_or_else(|| {
            Error::data_validation(format!("Required column '{}' not found", column_name))
        })
    }

    /// Check if a column exists in the mapping
    pub fn has_column(&self, column_name: &str) -> bool {
        self.name_to_index.contains_key(column_name)
    }

    /// Required columns absent from the mapping
    pub fn missing_columns<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .filter(|name| !self.has_column(name))
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
