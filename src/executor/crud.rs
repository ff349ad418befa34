//! Record-level operations for Tabstore
//!
//! Every operation works on one table of the store, addressed by name, and
//! an identifier field chosen by the caller. Identifier uniqueness is a
//! convention: by default `add` never checks for collisions and
//! `delete_by_id` removes every matching record.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::storage::{Record, Store};

/// How `add` treats a record whose identifier is already present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Append unconditionally
    #[default]
    Allow,
    /// Fail with `DuplicateIdentifier`
    Reject,
}

/// One applied field change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: String,
    pub old: String,
    pub new: String,
}

/// Result of an edit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditOutcome {
    /// Changes in the order they were offered
    pub changes: Vec<FieldChange>,
}

impl EditOutcome {
    /// Whether the edit left the record untouched
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }
}

fn not_found(table: &str, field: &str, value: &str) -> Error {
    Error::NotFound {
        table: table.to_string(),
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// CRUD engine
#[derive(Debug, Clone, Copy, Default)]
pub struct CrudEngine {
    duplicates: DuplicatePolicy,
}

impl CrudEngine {
    /// Create an engine with the permissive duplicate policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with an explicit duplicate policy
    pub fn with_policy(duplicates: DuplicatePolicy) -> Self {
        Self { duplicates }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.duplicates
    }

    /// Append a record to a table
    pub fn add(
        &self,
        store: &mut Store,
        table_name: &str,
        id_field: &str,
        record: Record,
    ) -> Result<()> {
        let table = store.table_mut(table_name)?;

        if self.duplicates == DuplicatePolicy::Reject {
            if let Some(id) = record.get(id_field) {
                if table.find_first(id_field, id).is_some() {
                    return Err(Error::DuplicateIdentifier {
                        table: table_name.to_string(),
                        field: id_field.to_string(),
                        value: id.to_string(),
                    });
                }
            }
        }

        table.append(record)
    }

    /// Find the first record whose identifier equals `id`.
    ///
    /// Returns `Ok(None)` when the identifier field is not part of the
    /// header or nothing matches.
    pub fn find_by_id<'s>(
        &self,
        store: &'s Store,
        table_name: &str,
        id_field: &str,
        id: &str,
    ) -> Result<Option<&'s Record>> {
        let table = store.table(table_name)?;
        if !table.header().contains(id_field) {
            return Ok(None);
        }
        Ok(table.find_first(id_field, id))
    }

    /// Apply per-field updates to the first record matching `id`.
    ///
    /// An update is applied only when the new value is non-empty and
    /// differs from the current one; other updates are skipped.
    pub fn edit<I, K, V>(
        &self,
        store: &mut Store,
        table_name: &str,
        id_field: &str,
        id: &str,
        updates: I,
    ) -> Result<EditOutcome>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let table = store.table_mut(table_name)?;

        if table.find_first(id_field, id).is_none() {
            return Err(not_found(table_name, id_field, id));
        }

        // Resolve field names before touching the record
        let mut resolved = Vec::new();
        for (field, value) in updates {
            let field = table
                .header()
                .canonical(field.as_ref())
                .ok_or_else(|| Error::UnknownField {
                    field: field.as_ref().to_string(),
                    table: table_name.to_string(),
                })?
                .to_string();
            resolved.push((field, value.into()));
        }

        let record = table
            .find_first_mut(id_field, id)
            .ok_or_else(|| not_found(table_name, id_field, id))?;

        let mut outcome = EditOutcome::default();
        for (field, new) in resolved {
            let current = record.get(&field).unwrap_or_default();
            if new.is_empty() || new == current {
                continue;
            }
            if let Some(old) = record.set(&field, new.clone()) {
                outcome.changes.push(FieldChange { field, old, new });
            }
        }

        Ok(outcome)
    }

    /// Remove every record whose identifier equals `id`.
    ///
    /// Returns the number of removed records; zero is reported as
    /// `NotFound`.
    pub fn delete_by_id(
        &self,
        store: &mut Store,
        table_name: &str,
        id_field: &str,
        id: &str,
    ) -> Result<usize> {
        let table = store.table_mut(table_name)?;
        let removed = table.remove_matching(id_field, id);

        if removed == 0 {
            return Err(not_found(table_name, id_field, id));
        }

        Ok(removed)
    }
}
