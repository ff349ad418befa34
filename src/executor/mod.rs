//! Execution module
//!
//! This module contains the record-level CRUD engine and the analytical
//! query functions.

pub mod crud;
pub mod numeric;
pub mod query;

pub use crud::{CrudEngine, DuplicatePolicy, EditOutcome, FieldChange};
pub use query::{
    anti_join, average, filtered_sum, group_count, top_groups, top_ranked, AntiJoin, GroupCount,
    GroupTotal, Measure, RankedRow, TopGroups, UNKNOWN,
};
