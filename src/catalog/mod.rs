//! Catalog module
//!
//! This module contains table header definitions.

pub mod schema;

pub use schema::{fold_name, Header};
