//! # Document Consolidator Shared
//!
//! Shared types used across the document consolidator crates.
//!
//! - [`Relation`]: an in-memory table of homogeneous records
//! - [`RelationMap`]: relations keyed by name, as loaded for one run
//! - [`JoinKey`]: normalised, hashable key used for joins and grouping
//! - [`Document`]: one consolidated output record with its document key

mod document;
mod join_key;
mod relation;

pub use document::{Document, DEFAULT_ID_FIELD};
pub use join_key::JoinKey;
pub use relation::{Record, Relation, RelationMap};
