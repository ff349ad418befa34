//! Shell commands for Tabstore
//!
//! Turns an input line into a [`Command`]. Words are separated by
//! whitespace; double quotes keep a word containing spaces together.

use std::fmt;

use crate::error::{Error, Result};
use crate::executor::Measure;

/// Help text shown by `.help`
pub const HELP: &str = r#"
Commands:
  .help                                   Show this help message
  .quit                                   Exit Tabstore
  .tables                                 List all tables
  .schema [table]                         Show table fields
  .view <table>                           Show all records of a table
  .find <table> <id>                      Show the record with an identifier
  .add <table>                            Add a record (prompts for each field)
  .edit <table> <id>                      Edit a record (empty input keeps a value)
  .delete <table> <id>                    Delete every record with an identifier

Queries:
  .sum <table> <field> <value> <measure> [<measure>]
                                          Sum (or sum of products) where field = value
  .avg <table> <field>                    Average over numeric values
  .count <table> <field>                  Record count per value
  .top <fact> <fk> <field> <n> <dim> <name-field>
                                          Largest sums per foreign key, named
  .rank <table> <field> <other> <n>       Top records by field where both parse
  .orphans <dim> <fact> <fk>              Records never referenced by the fact table

Names containing spaces go in double quotes: .avg products "Unit price"
"#;

/// A parsed shell command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Quit,
    Tables,
    Schema(Option<String>),
    View(String),
    Find {
        table: String,
        id: String,
    },
    Add(String),
    Edit {
        table: String,
        id: String,
    },
    Delete {
        table: String,
        id: String,
    },
    Sum {
        table: String,
        field: String,
        value: String,
        measure: Measure,
    },
    Average {
        table: String,
        field: String,
    },
    Count {
        table: String,
        field: String,
    },
    Top {
        fact: String,
        foreign_key: String,
        value_field: String,
        limit: usize,
        dimension: String,
        name_field: String,
    },
    Rank {
        table: String,
        rank_field: String,
        other_field: String,
        limit: usize,
    },
    Orphans {
        dimension: String,
        fact: String,
        foreign_key: String,
    },
}

impl Command {
    /// Parse an input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let words = tokenize(line)?;
        let Some((name, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match name.as_str() {
            ".help" => Command::Help,
            ".quit" | ".exit" => Command::Quit,
            ".tables" => Command::Tables,
            ".schema" => match args {
                [] => Command::Schema(None),
                [table] => Command::Schema(Some(table.clone())),
                _ => return Err(usage(".schema [table]")),
            },
            ".view" => match args {
                [table] => Command::View(table.clone()),
                _ => return Err(usage(".view <table>")),
            },
            ".find" => match args {
                [table, id] => Command::Find {
                    table: table.clone(),
                    id: id.clone(),
                },
                _ => return Err(usage(".find <table> <id>")),
            },
            ".add" => match args {
                [table] => Command::Add(table.clone()),
                _ => return Err(usage(".add <table>")),
            },
            ".edit" => match args {
                [table, id] => Command::Edit {
                    table: table.clone(),
                    id: id.clone(),
                },
                _ => return Err(usage(".edit <table> <id>")),
            },
            ".delete" => match args {
                [table, id] => Command::Delete {
                    table: table.clone(),
                    id: id.clone(),
                },
                _ => return Err(usage(".delete <table> <id>")),
            },
            ".sum" => {
                let measure = match args {
                    [_, _, _, field] => Measure::field(field.clone()),
                    [_, _, _, left, right] => Measure::product(left.clone(), right.clone()),
                    _ => return Err(usage(".sum <table> <field> <value> <measure> [<measure>]")),
                };
                Command::Sum {
                    table: args[0].clone(),
                    field: args[1].clone(),
                    value: args[2].clone(),
                    measure,
                }
            }
            ".avg" => match args {
                [table, field] => Command::Average {
                    table: table.clone(),
                    field: field.clone(),
                },
                _ => return Err(usage(".avg <table> <field>")),
            },
            ".count" => match args {
                [table, field] => Command::Count {
                    table: table.clone(),
                    field: field.clone(),
                },
                _ => return Err(usage(".count <table> <field>")),
            },
            ".top" => match args {
                [fact, foreign_key, value_field, limit, dimension, name_field] => Command::Top {
                    fact: fact.clone(),
                    foreign_key: foreign_key.clone(),
                    value_field: value_field.clone(),
                    limit: parse_limit(limit)?,
                    dimension: dimension.clone(),
                    name_field: name_field.clone(),
                },
                _ => return Err(usage(".top <fact> <fk> <field> <n> <dim> <name-field>")),
            },
            ".rank" => match args {
                [table, rank_field, other_field, limit] => Command::Rank {
                    table: table.clone(),
                    rank_field: rank_field.clone(),
                    other_field: other_field.clone(),
                    limit: parse_limit(limit)?,
                },
                _ => return Err(usage(".rank <table> <field> <other> <n>")),
            },
            ".orphans" => match args {
                [dimension, fact, foreign_key] => Command::Orphans {
                    dimension: dimension.clone(),
                    fact: fact.clone(),
                    foreign_key: foreign_key.clone(),
                },
                _ => return Err(usage(".orphans <dim> <fact> <fk>")),
            },
            other if other.starts_with('.') => {
                return Err(Error::InvalidCommand(format!(
                    "unknown command '{}', type '.help' for available commands",
                    other
                )))
            }
            other => {
                return Err(Error::InvalidCommand(format!(
                    "commands start with '.', got '{}'",
                    other
                )))
            }
        };

        Ok(Some(command))
    }

    /// Short name used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Quit => "quit",
            Command::Tables => "tables",
            Command::Schema(_) => "schema",
            Command::View(_) => "view",
            Command::Find { .. } => "find",
            Command::Add(_) => "add",
            Command::Edit { .. } => "edit",
            Command::Delete { .. } => "delete",
            Command::Sum { .. } => "sum",
            Command::Average { .. } => "avg",
            Command::Count { .. } => "count",
            Command::Top { .. } => "top",
            Command::Rank { .. } => "rank",
            Command::Orphans { .. } => "orphans",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.name())
    }
}

fn usage(text: &str) -> Error {
    Error::InvalidCommand(format!("usage: {}", text))
}

fn parse_limit(text: &str) -> Result<usize> {
    text.parse()
        .map_err(|_| Error::InvalidCommand(format!("'{}' is not a valid row count", text)))
}

/// Split a line into words, honoring double quotes
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                in_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if in_quotes {
        return Err(Error::InvalidCommand("unterminated quote".to_string()));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
