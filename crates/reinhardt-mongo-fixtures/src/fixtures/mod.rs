//! Fixture declarations, their registry, and fixture files.
//!
//! - [`MongoData`] - declaration naming a fixture file
//! - [`FixtureRegistry`] - scopes, their ancestry and registered methods
//! - [`ResourceLocator`] - classpath-style lookup of fixture files
//! - [`FixtureDocument`] - parsed collection-to-records mapping

mod declaration;
mod document;
mod registry;
mod resource;

pub use declaration::MongoData;
pub use document::{FixtureCollection, FixtureDocument};
pub use registry::{
	FixtureRegistry, FixtureRegistryBuilder, MethodDefinition, ScopeDefinition, ScopeId,
	TestMethod,
};
pub use resource::{DEFAULT_RESOURCE_DIR, ResourceLocator};
