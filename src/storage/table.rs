//! Table storage for Tabstore
//!
//! This module combines a header and an ordered sequence of records.

use super::record::Record;
use crate::catalog::Header;
use crate::error::{Error, Result};

/// Iterator over the records of a table, in insertion order
pub type Rows<'a> = std::slice::Iter<'a, Record>;

/// A named table of same-shaped records
#[derive(Debug, Clone)]
pub struct Table {
    /// Table name
    name: String,
    /// Field list, fixed after load
    header: Header,
    /// Records in insertion order
    rows: Vec<Record>,
}

impl Table {
    /// Create a new empty table
    pub fn new(name: impl Into<String>, header: Header) -> Self {
        Self {
            name: name.into(),
            header,
            rows: Vec::new(),
        }
    }

    /// Create a table from positional rows.
    ///
    /// Short rows are padded with empty cells; rows longer than the header
    /// are rejected.
    pub fn from_rows(
        name: impl Into<String>,
        header: Header,
        rows: Vec<Vec<String>>,
    ) -> Result<Self> {
        let mut table = Self::new(name, header);
        table.rows.reserve(rows.len());
        for cells in rows {
            if cells.len() > table.header.len() {
                return Err(Error::SchemaMismatch {
                    table: table.name.clone(),
                    expected: table.header.describe(),
                    found: cells.join(", "),
                });
            }
            let record = Record::from_cells(&table.header, cells);
            table.rows.push(record);
        }
        Ok(table)
    }

    /// Get table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the table header
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Get the ordered field list
    pub fn headers(&self) -> &[String] {
        self.header.fields()
    }

    /// Iterate all records in insertion order.
    ///
    /// Each call starts a fresh pass over the same sequence.
    pub fn all(&self) -> Rows<'_> {
        self.rows.iter()
    }

    /// Get number of records
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a record at the end of the table
    pub fn append(&mut self, record: Record) -> Result<()> {
        let found = record.fields().collect::<Vec<_>>().join(", ");
        let record = record.conform(&self.header).ok_or_else(|| Error::SchemaMismatch {
            table: self.name.clone(),
            expected: self.header.describe(),
            found,
        })?;
        self.rows.push(record);
        Ok(())
    }

    /// Find the first record whose field equals `value` exactly
    pub fn find_first(&self, field: &str, value: &str) -> Option<&Record> {
        self.rows.iter().find(|r| r.get(field) == Some(value))
    }

    pub(crate) fn find_first_mut(&mut self, field: &str, value: &str) -> Option<&mut Record> {
        self.rows.iter_mut().find(|r| r.get(field) == Some(value))
    }

    /// Remove every record whose field equals `value`, returning the count
    pub(crate) fn remove_matching(&mut self, field: &str, value: &str) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| r.get(field) != Some(value));
        before - self.rows.len()
    }
}
