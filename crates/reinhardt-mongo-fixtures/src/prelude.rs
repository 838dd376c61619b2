//! Convenience re-exports for test code.
//!
//! ```ignore
//! use reinhardt_mongo_fixtures::prelude::*;
//! ```

pub use crate::error::{FixtureError, FixtureResult};

pub use crate::fixtures::{FixtureRegistry, MongoData, TestMethod};

pub use crate::loader::{FixtureLoader, LoadReport};

pub use crate::settings::FixtureSettings;

pub use crate::store::{DocumentStore, InMemoryStore, MongoStore};

pub use crate::testcase::MongoTestCase;

pub use crate::logging::init_test_logging;

pub use crate::{fixture_method, fixture_scope};

#[cfg(feature = "testcontainers")]
pub use crate::containers::{MongoContainer, mongodb_container};
