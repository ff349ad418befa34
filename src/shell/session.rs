//! Interactive session for Tabstore
//!
//! A session owns the store for its whole lifetime, runs shell commands
//! against the engines and records every notable step through `tracing`.
//! The store and engines themselves never log.

use tracing::{info, warn};

use super::command::{Command, HELP};
use super::render::format_number;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::executor::{
    anti_join, average, filtered_sum, group_count, top_groups, top_ranked, AntiJoin, CrudEngine,
    Measure, TopGroups,
};
use crate::loader;
use crate::storage::{Record, Store, Table};

/// Result of a shell command
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Column names
    pub columns: Vec<String>,
    /// Result rows, already rendered as text
    pub rows: Vec<Vec<String>>,
    /// Number of affected records (for add/edit/delete)
    pub affected_rows: usize,
    /// Message
    pub message: Option<String>,
}

impl QueryResult {
    /// Create a new empty result
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            affected_rows: 0,
            message: None,
        }
    }

    /// Create a result with a message
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::empty()
        }
    }

    /// Create a result with affected rows count
    pub fn with_affected_rows(count: usize, message: impl Into<String>) -> Self {
        Self {
            affected_rows: count,
            message: Some(message.into()),
            ..Self::empty()
        }
    }

    /// Create a tabular result
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            columns,
            rows,
            ..Self::empty()
        }
    }
}

fn record_row(record: &Record) -> Vec<String> {
    record.values().map(str::to_string).collect()
}

fn describe_measure(measure: &Measure) -> String {
    match measure {
        Measure::Field(name) => name.clone(),
        Measure::Product(left, right) => format!("{} × {}", left, right),
    }
}

/// A single-user session over one loaded store
#[derive(Debug)]
pub struct Session {
    store: Store,
    crud: CrudEngine,
    config: Config,
}

impl Session {
    /// Create a session over an already loaded store
    pub fn new(store: Store, config: Config) -> Self {
        let crud = CrudEngine::with_policy(config.duplicate_ids);
        Self { store, crud, config }
    }

    /// Load the configured workbook and open a session over it
    pub fn open(config: Config) -> Result<Self> {
        let path = config.data_path.clone();
        let store = match loader::load_path(&path).and_then(Store::load) {
            Ok(store) => store,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load workbook");
                return Err(e);
            }
        };
        info!(
            path = %path.display(),
            tables = store.len(),
            "Workbook loaded"
        );
        Ok(Self::new(store, config))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn id_field(&self, table: &str) -> String {
        self.config.id_field_for(table).to_string()
    }

    /// Execute a non-interactive command.
    ///
    /// `.add` and `.edit` need field input; use [`Session::add_with`] and
    /// [`Session::edit_with`] for them.
    pub fn execute(&mut self, command: &Command) -> Result<QueryResult> {
        let result = self.dispatch(command);
        if let Err(e) = &result {
            warn!(command = %command, error = %e, "Command failed");
        }
        result
    }

    fn dispatch(&mut self, command: &Command) -> Result<QueryResult> {
        match command {
            Command::Help => Ok(QueryResult::with_message(HELP.trim())),
            Command::Quit => Ok(QueryResult::with_message("Goodbye!")),
            Command::Tables => Ok(self.list_tables()),
            Command::Schema(table) => self.schema(table.as_deref()),
            Command::View(table) => self.view(table),
            Command::Find { table, id } => self.find(table, id),
            Command::Add(_) | Command::Edit { .. } => Err(Error::InvalidCommand(format!(
                "'{}' needs field input",
                command
            ))),
            Command::Delete { table, id } => self.delete(table, id),
            Command::Sum {
                table,
                field,
                value,
                measure,
            } => {
                let total = filtered_sum(&self.store, table, field, value, measure)?;
                let message = format!(
                    "Sum of {} in '{}' where {} = '{}': {}",
                    describe_measure(measure),
                    table,
                    field,
                    value,
                    format_number(total)
                );
                info!(table = %table, "{}", message);
                Ok(QueryResult::with_message(message))
            }
            Command::Average { table, field } => {
                let message = match average(&self.store, table, field)? {
                    Some(avg) => format!("Average of {} in '{}': {:.2}", field, table, avg),
                    None => format!("Average of {} in '{}': no numeric values", field, table),
                };
                info!(table = %table, "{}", message);
                Ok(QueryResult::with_message(message))
            }
            Command::Count { table, field } => {
                let groups = group_count(&self.store, table, field)?;
                info!(
                    table = %table,
                    field = %field,
                    groups = groups.len(),
                    "Counted records per value"
                );
                Ok(QueryResult::with_rows(
                    vec![field.clone(), "count".to_string()],
                    groups
                        .into_iter()
                        .map(|g| vec![g.key, g.count.to_string()])
                        .collect(),
                ))
            }
            Command::Top {
                fact,
                foreign_key,
                value_field,
                limit,
                dimension,
                name_field,
            } => {
                let id_field = self.id_field(dimension);
                let query = TopGroups {
                    fact,
                    foreign_key,
                    value_field,
                    limit: *limit,
                    dimension,
                    id_field: &id_field,
                    name_field,
                };
                let groups = top_groups(&self.store, &query)?;
                info!(fact = %fact, dimension = %dimension, groups = groups.len(), "Ranked groups");
                Ok(QueryResult::with_rows(
                    vec![foreign_key.clone(), name_field.clone(), format!("total {}", value_field)],
                    groups
                        .into_iter()
                        .map(|g| vec![g.key, g.name, format_number(g.total)])
                        .collect(),
                ))
            }
            Command::Rank {
                table,
                rank_field,
                other_field,
                limit,
            } => {
                let rows = top_ranked(&self.store, table, rank_field, other_field, *limit)?;
                info!(table = %table, field = %rank_field, rows = rows.len(), "Ranked records");
                let columns = self.store.table(table)?.headers().to_vec();
                Ok(QueryResult::with_rows(
                    columns,
                    rows.iter().map(|r| record_row(r.record)).collect(),
                ))
            }
            Command::Orphans {
                dimension,
                fact,
                foreign_key,
            } => {
                let id_field = self.id_field(dimension);
                let query = AntiJoin {
                    dimension,
                    id_field: &id_field,
                    fact,
                    foreign_key,
                };
                let orphans = anti_join(&self.store, &query)?;
                info!(
                    dimension = %dimension,
                    fact = %fact,
                    rows = orphans.len(),
                    "Found unreferenced records"
                );
                let columns = self.store.table(dimension)?.headers().to_vec();
                Ok(QueryResult::with_rows(
                    columns,
                    orphans.into_iter().map(record_row).collect(),
                ))
            }
        }
    }

    fn list_tables(&self) -> QueryResult {
        let rows = self
            .store
            .tables()
            .map(|t| {
                vec![
                    t.name().to_string(),
                    t.headers().len().to_string(),
                    t.len().to_string(),
                ]
            })
            .collect();
        QueryResult::with_rows(
            vec!["table".to_string(), "fields".to_string(), "records".to_string()],
            rows,
        )
    }

    fn schema(&self, table: Option<&str>) -> Result<QueryResult> {
        let tables: Vec<&Table> = match table {
            Some(name) => vec![self.store.table(name)?],
            None => self.store.tables().collect(),
        };

        let mut rows = Vec::new();
        for table in tables {
            let id_field = self.config.id_field_for(table.name());
            for (position, field) in table.headers().iter().enumerate() {
                let marker = if field.to_lowercase() == id_field.to_lowercase() {
                    "identifier"
                } else {
                    ""
                };
                rows.push(vec![
                    table.name().to_string(),
                    (position + 1).to_string(),
                    field.clone(),
                    marker.to_string(),
                ]);
            }
        }

        Ok(QueryResult::with_rows(
            vec![
                "table".to_string(),
                "#".to_string(),
                "field".to_string(),
                "role".to_string(),
            ],
            rows,
        ))
    }

    fn view(&self, table: &str) -> Result<QueryResult> {
        let table = self.store.table(table)?;
        info!(table = %table.name(), records = table.len(), "Viewing table");
        Ok(QueryResult::with_rows(
            table.headers().to_vec(),
            table.all().map(record_row).collect(),
        ))
    }

    fn find(&self, table: &str, id: &str) -> Result<QueryResult> {
        let id_field = self.id_field(table);
        let found = self.crud.find_by_id(&self.store, table, &id_field, id)?;
        let headers = self.store.table(table)?.headers().to_vec();
        match found {
            Some(record) => Ok(QueryResult::with_rows(headers, vec![record_row(record)])),
            None => {
                info!(table = %table, id = %id, "Lookup found no record");
                Ok(QueryResult::with_message(format!(
                    "No record in '{}' with {} = '{}'",
                    table, id_field, id
                )))
            }
        }
    }

    /// Append a record
    pub fn add(&mut self, table: &str, record: Record) -> Result<QueryResult> {
        let id_field = self.id_field(table);
        let id = record.get(&id_field).unwrap_or_default().to_string();

        if let Err(e) = self.crud.add(&mut self.store, table, &id_field, record) {
            warn!(table = %table, id = %id, error = %e, "Add failed");
            return Err(e);
        }

        info!(table = %table, id = %id, "Added record");
        Ok(QueryResult::with_affected_rows(1, "Record added"))
    }

    /// Prompt for every field of `table` and append the result.
    ///
    /// `ask` receives the field name and returns the entered text.
    pub fn add_with<F>(&mut self, table: &str, mut ask: F) -> Result<QueryResult>
    where
        F: FnMut(&str) -> Result<String>,
    {
        info!(table = %table, "Adding record");
        let headers = self.store.table(table)?.headers().to_vec();

        let mut record = Record::new();
        for field in headers {
            let value = ask(&field)?;
            record.insert(field, value);
        }
        self.add(table, record)
    }

    /// Apply updates to the record identified by `id`
    pub fn edit(
        &mut self,
        table: &str,
        id: &str,
        updates: Vec<(String, String)>,
    ) -> Result<QueryResult> {
        let id_field = self.id_field(table);

        let outcome = match self.crud.edit(&mut self.store, table, &id_field, id, updates) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(table = %table, id = %id, error = %e, "Edit failed");
                return Err(e);
            }
        };

        for change in &outcome.changes {
            info!(
                table = %table,
                id = %id,
                field = %change.field,
                old = %change.old,
                new = %change.new,
                "Changed field"
            );
        }
        info!(table = %table, id = %id, changes = outcome.changes.len(), "Finished editing record");

        let count = outcome.changes.len();
        Ok(QueryResult::with_affected_rows(
            usize::from(!outcome.is_unchanged()),
            format!("{} field(s) changed", count),
        ))
    }

    /// Prompt for every field of the record identified by `id` and apply
    /// the answers.
    ///
    /// `ask` receives the field name and its current value; an empty
    /// answer keeps the value.
    pub fn edit_with<F>(&mut self, table: &str, id: &str, mut ask: F) -> Result<QueryResult>
    where
        F: FnMut(&str, &str) -> Result<String>,
    {
        let id_field = self.id_field(table);
        let found = self.crud.find_by_id(&self.store, table, &id_field, id)?;
        let current: Vec<(String, String)> = match found {
            Some(record) => record
                .iter()
                .map(|(field, value)| (field.to_string(), value.to_string()))
                .collect(),
            None => {
                let e = Error::NotFound {
                    table: table.to_string(),
                    field: id_field,
                    value: id.to_string(),
                };
                warn!(table = %table, id = %id, error = %e, "Edit failed");
                return Err(e);
            }
        };

        info!(table = %table, id = %id, "Editing record");
        let mut updates = Vec::with_capacity(current.len());
        for (field, value) in current {
            let answer = ask(&field, &value)?;
            updates.push((field, answer));
        }
        self.edit(table, id, updates)
    }

    /// Delete every record identified by `id`
    pub fn delete(&mut self, table: &str, id: &str) -> Result<QueryResult> {
        let id_field = self.id_field(table);
        let removed = self.crud.delete_by_id(&mut self.store, table, &id_field, id)?;
        info!(table = %table, id = %id, removed, "Deleted records");
        Ok(QueryResult::with_affected_rows(
            removed,
            format!("{} record(s) deleted", removed),
        ))
    }
}
