//! Record type for Tabstore
//!
//! A record is one row: an ordered mapping from field name to text value.
//! Field lookup ignores case; the spelling of the first insertion is kept.

use crate::catalog::{fold_name, Header};
use indexmap::IndexMap;
use std::fmt;

/// A row of a table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Folded field name -> (declared field name, value)
    cells: IndexMap<String, (String, String)>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    /// Insert or overwrite a field, returning the previous value
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let field = field.into();
        let value = value.into();
        match self.cells.get_mut(&fold_name(&field)) {
            Some((_, current)) => Some(std::mem::replace(current, value)),
            None => {
                self.cells.insert(fold_name(&field), (field, value));
                None
            }
        }
    }

    /// Overwrite an existing field; never adds a new one.
    ///
    /// Returns the previous value, or `None` when the field is absent.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> Option<String> {
        self.cells
            .get_mut(&fold_name(field))
            .map(|(_, current)| std::mem::replace(current, value.into()))
    }

    /// Get a field value
    pub fn get(&self, field: &str) -> Option<&str> {
        self.cells
            .get(&fold_name(field))
            .map(|(_, value)| value.as_str())
    }

    /// Check if a field exists
    pub fn contains(&self, field: &str) -> bool {
        self.cells.contains_key(&fold_name(field))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Field names in order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.cells.values().map(|(name, _)| name.as_str())
    }

    /// Values in field order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.values().map(|(_, value)| value.as_str())
    }

    /// (field, value) pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Check that this record has exactly the header's field set
    pub fn matches_header(&self, header: &Header) -> bool {
        self.len() == header.len() && header.fields().iter().all(|f| self.contains(f))
    }

    /// Rebuild the record in header order, using the header's spelling.
    ///
    /// Returns `None` when the field sets differ.
    pub fn conform(mut self, header: &Header) -> Option<Record> {
        if !self.matches_header(header) {
            return None;
        }
        let mut cells = IndexMap::with_capacity(header.len());
        for field in header.fields() {
            let key = fold_name(field);
            let (_, value) = self.cells.swap_remove(&key)?;
            cells.insert(key, (field.clone(), value));
        }
        Some(Record { cells })
    }

    /// Build a record from a header and positional cells.
    ///
    /// Missing trailing cells become empty strings.
    pub(crate) fn from_cells(header: &Header, cells: Vec<String>) -> Record {
        let mut values = cells.into_iter();
        let cells = header
            .fields()
            .iter()
            .map(|field| {
                let value = values.next().unwrap_or_default();
                (fold_name(field), (field.clone(), value))
            })
            .collect();
        Record { cells }
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = Record::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<&str> = self.values().collect();
        write!(f, "({})", values.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let record = Record::new().with("Category", "Toys").with("Price", "10");

        assert_eq!(record.get("category"), Some("Toys"));
        assert_eq!(record.get("PRICE"), Some("10"));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_insert_keeps_first_spelling() {
        let mut record = Record::new().with("Price", "10");
        let previous = record.insert("PRICE", "12");

        assert_eq!(previous, Some("10".to_string()));
        assert_eq!(record.fields().collect::<Vec<_>>(), vec!["Price"]);
        assert_eq!(record.get("price"), Some("12"));
    }

    #[test]
    fn test_set_never_adds_fields() {
        let mut record = Record::new().with("ID", "1");

        assert_eq!(record.set("Name", "Bob"), None);
        assert_eq!(record.len(), 1);
        assert_eq!(record.set("id", "2"), Some("1".to_string()));
        assert_eq!(record.get("ID"), Some("2"));
    }

    #[test]
    fn test_conform_reorders_to_header() {
        let header = Header::new(["ID", "Name", "Price"]).unwrap();
        let record = Record::new()
            .with("price", "5")
            .with("id", "7")
            .with("NAME", "Kite");

        let conformed = record.conform(&header).unwrap();
        assert_eq!(
            conformed.iter().collect::<Vec<_>>(),
            vec![("ID", "7"), ("Name", "Kite"), ("Price", "5")]
        );
    }

    #[test]
    fn test_conform_rejects_different_fields() {
        let header = Header::new(["ID", "Name"]).unwrap();

        assert!(Record::new().with("ID", "1").conform(&header).is_none());
        assert!(Record::new()
            .with("ID", "1")
            .with("Title", "x")
            .conform(&header)
            .is_none());
    }

    #[test]
    fn test_from_cells_pads_missing() {
        let header = Header::new(["ID", "Name", "Price"]).unwrap();
        let record = Record::from_cells(&header, vec!["1".to_string()]);

        assert_eq!(record.values().collect::<Vec<_>>(), vec!["1", "", ""]);
    }
}
