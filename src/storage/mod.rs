//! Storage module
//!
//! This module contains the in-memory storage components:
//! - Records (case-insensitive field maps)
//! - Tables (header + ordered records)
//! - The store owning all tables of a session

pub mod record;
pub mod store;
pub mod table;

pub use record::Record;
pub use store::{record_for, Store, TableBuilder, TableSource};
pub use table::{Rows, Table};
