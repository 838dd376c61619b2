//! Fixture resources shipped with the tests and cases built over them.

use std::path::{Path, PathBuf};

use mongodb::bson::Document;
use reinhardt_mongo_fixtures::{
	DocumentStore, FixtureLoader, FixtureRegistry, InMemoryStore, MongoTestCase, ResourceLocator,
};

/// Returns `tests/resources` of this crate.
pub fn resources_dir() -> PathBuf {
	Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("resources")
}

/// Returns a locator over [`resources_dir`].
pub fn resource_locator() -> ResourceLocator {
	ResourceLocator::new([resources_dir()])
}

/// Builds an in-memory test case over the scopes declared in the test binary.
pub fn memory_case() -> MongoTestCase<InMemoryStore> {
	let registry = FixtureRegistry::from_inventory().unwrap();
	let loader =
		FixtureLoader::new(InMemoryStore::default(), resource_locator()).with_registry(registry);
	MongoTestCase::new(loader)
}

/// Returns the string values of `field` across a collection, in stored order.
pub async fn field_values<S: DocumentStore>(store: &S, collection: &str, field: &str) -> Vec<String> {
	store
		.find_all(collection)
		.await
		.unwrap()
		.iter()
		.filter_map(|doc| doc.get_str(field).ok().map(str::to_string))
		.collect()
}

/// Returns a collection's records without their `_id`.
pub async fn without_ids<S: DocumentStore>(store: &S, collection: &str) -> Vec<Document> {
	store
		.find_all(collection)
		.await
		.unwrap()
		.into_iter()
		.map(|mut doc| {
			doc.remove("_id");
			doc
		})
		.collect()
}
