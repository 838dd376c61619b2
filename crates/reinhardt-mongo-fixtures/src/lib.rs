//! Per-test MongoDB fixtures for Reinhardt integration tests.
//!
//! Before each test the target database is dropped and reloaded from the JSON
//! fixture declared for that test, so every test starts from a known state.
//!
//! - **Declarations**: a fixture is attached to a test method or to a scope
//!   (a named group of tests). Scopes may extend other scopes.
//! - **Resolution**: the method's own declaration wins, then its scope, then
//!   the scope's ancestors nearest first. Nothing declared means nothing
//!   happens.
//! - **Loading**: wipe, read, validate, then save record by record.
//!
//! # Features
//!
//! - `testcontainers` - [`containers::mongodb_container`] rstest fixture
//! - `full` - All features enabled
//!
//! # Quick Start
//!
//! Create a fixture file (`tests/resources/users.json`):
//!
//! ```json
//! {
//!   "users": [
//!     { "_id": { "$oid": "65f1a2b3c4d5e6f708192a3b" }, "name": "admin" },
//!     { "name": "guest" }
//!   ]
//! }
//! ```
//!
//! Declare it and load it before each test:
//!
//! ```ignore
//! use reinhardt_mongo_fixtures::prelude::*;
//!
//! fixture_scope!("UserTests", data = "/users.json");
//! fixture_method!("UserTests", "empty_database", data = "/empty.json");
//!
//! #[tokio::test]
//! async fn lists_users() {
//!     let case = MongoTestCase::from_env().await.unwrap();
//!     let report = case.before_each_named("UserTests", "lists_users").await.unwrap();
//!     assert_eq!(report.unwrap().records_in("users"), Some(2));
//! }
//! ```
//!
//! Settings come from `MONGO_FIXTURES_*` environment variables; see
//! [`FixtureSettings::from_env`].

pub mod error;
pub mod fixtures;
pub mod loader;
pub mod logging;
pub mod resolver;
pub mod settings;
pub mod store;
pub mod testcase;

#[cfg(feature = "testcontainers")]
pub mod containers;

pub mod prelude;

// Used by `fixture_scope!` and `fixture_method!`.
#[doc(hidden)]
pub use inventory;

pub use error::{FixtureError, FixtureResult};
pub use fixtures::{FixtureRegistry, MongoData, ResourceLocator, ScopeId, TestMethod};
pub use loader::{CollectionReport, FixtureLoader, LoadReport};
pub use resolver::{FixtureOrigin, FixtureResolver};
pub use settings::FixtureSettings;
pub use store::{DocumentStore, InMemoryStore, MongoStore};
pub use testcase::MongoTestCase;
