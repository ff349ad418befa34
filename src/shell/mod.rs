//! Shell module
//!
//! This module contains the interactive layer driving the engines:
//! command parsing, the session owning the store, and result rendering.

pub mod command;
pub mod render;
pub mod session;

pub use command::{tokenize, Command, HELP};
pub use render::{format_number, format_table, render};
pub use session::{QueryResult, Session};
