//! Test helpers for reinhardt-mongo-fixtures tests.

#[path = "helpers/resources.rs"]
pub mod resources;
