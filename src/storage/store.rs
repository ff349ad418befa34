//! Store for Tabstore
//!
//! The store owns every table of a session. It is populated once through
//! [`Store::load`] and then handed by reference to the engines.

use super::record::Record;
use super::table::Table;
use crate::catalog::Header;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::Deserialize;

/// One table as produced by a loader: name, header row, data rows
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableSource {
    pub name: String,
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

impl TableSource {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }
}

/// All tables of a session, in load order
#[derive(Debug, Default)]
pub struct Store {
    tables: IndexMap<String, Table>,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from loader output
    pub fn load<I>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = TableSource>,
    {
        let mut store = Self::new();
        for source in sources {
            let header = Header::new(source.headers)?;
            let table = Table::from_rows(source.name, header, source.rows)?;
            store.add_table(table)?;
        }
        Ok(store)
    }

    /// Build a store from ready-made tables
    pub fn from_tables<I>(tables: I) -> Result<Self>
    where
        I: IntoIterator<Item = Table>,
    {
        let mut store = Self::new();
        for table in tables {
            store.add_table(table)?;
        }
        Ok(store)
    }

    fn add_table(&mut self, table: Table) -> Result<()> {
        if self.tables.contains_key(table.name()) {
            return Err(Error::DuplicateTable(table.name().to_string()));
        }
        self.tables.insert(table.name().to_string(), table);
        Ok(())
    }

    /// Get a table by name
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::MissingTable(name.to_string()))
    }

    /// Get a table by name for mutation
    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::MissingTable(name.to_string()))
    }

    /// Check if a table exists
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// List all table names in load order
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Iterate all tables in load order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Builder for creating tables with a fluent API
pub struct TableBuilder {
    name: String,
    fields: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableBuilder {
    /// Start building a new table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Add a field to the header
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(name.into());
        self
    }

    /// Add several fields to the header
    pub fn fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add a positional row
    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    /// Build the table
    pub fn build(self) -> Result<Table> {
        let header = Header::new(self.fields)?;
        Table::from_rows(self.name, header, self.rows)
    }

    /// Turn the builder into a loader entry
    pub fn into_source(self) -> TableSource {
        TableSource::new(self.name, self.fields, self.rows)
    }
}

/// Build a record matching a table's header from positional values
pub fn record_for(table: &Table, values: &[&str]) -> Record {
    table
        .headers()
        .iter()
        .zip(values.iter().copied().chain(std::iter::repeat("")))
        .map(|(field, value)| (field.clone(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources() -> Vec<TableSource> {
        vec![
            TableBuilder::new("products")
                .fields(["ID", "Name"])
                .row(["1", "Kite"])
                .into_source(),
            TableBuilder::new("sales")
                .fields(["ID", "ProductID", "Qty"])
                .row(["10", "1", "3"])
                .into_source(),
        ]
    }

    #[test]
    fn test_load_and_get_table() {
        let store = Store::load(sources()).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.table_names(), vec!["products", "sales"]);
        assert_eq!(store.table("sales").unwrap().len(), 1);
    }

    #[test]
    fn test_missing_table() {
        let store = Store::load(sources()).unwrap();
        assert!(matches!(store.table("orders"), Err(Error::MissingTable(n)) if n == "orders"));
    }

    #[test]
    fn test_duplicate_table_rejected() {
        let mut input = sources();
        input.push(TableBuilder::new("products").field("ID").into_source());

        let result = Store::load(input);
        assert!(matches!(result, Err(Error::DuplicateTable(_))));
    }

    #[test]
    fn test_from_tables() {
        let stores = TableBuilder::new("stores").field("ID").build().unwrap();
        let store = Store::from_tables(vec![stores]).unwrap();

        assert!(store.contains("stores"));
        assert!(!store.contains("Stores"));
    }

    #[test]
    fn test_table_builder() {
        let table = TableBuilder::new("stores")
            .field("ID")
            .field("District")
            .row(["1", "North"])
            .build()
            .unwrap();

        assert_eq!(table.name(), "stores");
        assert_eq!(table.headers(), ["ID", "District"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_record_for_pads_values() {
        let table = TableBuilder::new("t").fields(["A", "B", "C"]).build().unwrap();
        let record = record_for(&table, &["1"]);

        assert!(record.matches_header(table.header()));
        assert_eq!(record.get("c"), Some(""));
    }
}
