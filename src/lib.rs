//! Tabstore - an in-memory multi-table record store written in Rust
//!
//! This library provides:
//! - Tables of loosely typed records with case-insensitive field names
//! - A store owning every table of a session
//! - CRUD operations keyed by an identifier field
//! - Analytical queries (filtered sums, averages, grouping, top-N, anti-joins)
//! - A workbook loader and an interactive shell session

pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod loader;
pub mod logging;
pub mod shell;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use storage::{Record, Store, Table};
