//! Table headers for Tabstore
//!
//! A header is the ordered field list shared by every record of a table.
//! Field names are matched case-insensitively.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Fold a field name into its lookup key.
pub fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

/// Ordered field list of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Field names in declared order, as written at load time
    fields: Vec<String>,
    /// Folded field name to position mapping
    name_to_index: HashMap<String, usize>,
}

impl Header {
    /// Create a header from an ordered list of field names
    pub fn new<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut header = Self {
            fields: Vec::new(),
            name_to_index: HashMap::new(),
        };
        for field in fields {
            header.push(field.into())?;
        }
        Ok(header)
    }

    fn push(&mut self, field: String) -> Result<()> {
        let key = fold_name(&field);
        if self.name_to_index.contains_key(&key) {
            return Err(Error::DuplicateField(field));
        }
        self.name_to_index.insert(key, self.fields.len());
        self.fields.push(field);
        Ok(())
    }

    /// Get the position of a field
    pub fn position(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(&fold_name(name)).copied()
    }

    /// Check if a field exists
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Get the declared spelling of a field
    pub fn canonical(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.fields[idx].as_str())
    }

    /// Get all field names in order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Get number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render the field list for diagnostics
    pub fn describe(&self) -> String {
        self.fields.join(", ")
    }
}
