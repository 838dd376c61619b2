//! Wipe-and-load of fixture files.
//!
//! Loading a fixture always starts by dropping the target database, so a
//! test sees exactly the records of its own fixture. The file is then read,
//! validated as a whole and saved record by record.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{FixtureError, FixtureResult};
use crate::fixtures::{
	FixtureCollection, FixtureDocument, FixtureRegistry, ResourceLocator, TestMethod,
};
use crate::resolver::FixtureResolver;
use crate::settings::FixtureSettings;
use crate::store::{DocumentStore, MongoStore};

/// Number of records saved into one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionReport {
	/// Collection name.
	pub name: String,

	/// Records saved, in fixture order.
	pub records: usize,
}

/// Summary of a successful load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
	/// Logical fixture path as declared.
	pub fixture: String,

	/// File the fixture was read from.
	pub source: PathBuf,

	/// Per-collection counts in fixture order.
	pub collections: Vec<CollectionReport>,

	/// Total number of records saved.
	pub records_saved: usize,
}

impl LoadReport {
	fn new(fixture: &str, source: &Path) -> Self {
		Self {
			fixture: fixture.to_string(),
			source: source.to_path_buf(),
			collections: Vec::new(),
			records_saved: 0,
		}
	}

	fn record(&mut self, name: String, records: usize) {
		self.records_saved += records;
		self.collections.push(CollectionReport { name, records });
	}

	/// Returns the number of records saved into `collection`, if the fixture
	/// named it.
	pub fn records_in(&self, collection: &str) -> Option<usize> {
		self.collections
			.iter()
			.find(|c| c.name == collection)
			.map(|c| c.records)
	}
}

/// Loads fixture files into a [`DocumentStore`].
///
/// # Example
///
/// ```rust,ignore
/// use reinhardt_mongo_fixtures::{FixtureLoader, FixtureSettings};
///
/// let loader = FixtureLoader::connect(&FixtureSettings::from_env()?).await?;
/// let report = loader.load_data("/mongoTest.json").await?;
/// assert_eq!(report.records_in("documents"), Some(2));
/// ```
#[derive(Debug)]
pub struct FixtureLoader<S = MongoStore> {
	store: S,
	resources: ResourceLocator,
	registry: FixtureRegistry,
}

impl<S: DocumentStore> FixtureLoader<S> {
	/// Creates a loader over `store` reading fixtures through `resources`,
	/// with an empty registry.
	pub fn new(store: S, resources: ResourceLocator) -> Self {
		Self {
			store,
			resources,
			registry: FixtureRegistry::new(),
		}
	}

	/// Replaces the registry used by [`load_data_for`](Self::load_data_for).
	pub fn with_registry(mut self, registry: FixtureRegistry) -> Self {
		self.registry = registry;
		self
	}

	/// Returns the underlying store.
	pub fn store(&self) -> &S {
		&self.store
	}

	/// Returns the registry declarations are resolved against.
	pub fn registry(&self) -> &FixtureRegistry {
		&self.registry
	}

	/// Returns the locator fixture paths are resolved with.
	pub fn resources(&self) -> &ResourceLocator {
		&self.resources
	}

	/// Drops the target database.
	pub async fn wipe(&self) -> FixtureResult<()> {
		debug!(database = self.store.database_name(), "Dropping fixture database");
		self.store.drop_database().await
	}

	/// Wipes the database and loads the fixture at `path`.
	///
	/// The wipe happens even when the fixture turns out to be missing or
	/// malformed. Nothing is saved unless the whole file parses.
	///
	/// # Errors
	///
	/// - [`FixtureError::FixtureNotFound`] if `path` does not resolve
	/// - [`FixtureError::InvalidJson`] or [`FixtureError::MalformedFixture`]
	///   for unusable content
	/// - [`FixtureError::SaveFailed`] for the first record the store rejects;
	///   records saved before it are kept
	pub async fn load_data(&self, path: &str) -> FixtureResult<LoadReport> {
		self.wipe().await?;

		let (source, content) = self.resources.read_to_string(path)?;
		let document = FixtureDocument::parse_named(&content, path)?;

		let mut report = LoadReport::new(path, &source);
		for FixtureCollection { name, records } in document {
			let count = records.len();
			for (index, record) in records.into_iter().enumerate() {
				self.store
					.save(&name, record)
					.await
					.map_err(|e| FixtureError::SaveFailed {
						collection: name.clone(),
						index,
						message: e.to_string(),
					})?;
			}
			debug!(collection = %name, records = count, "Loaded fixture collection");
			report.record(name, count);
		}

		info!(
			fixture = path,
			source = %source.display(),
			records = report.records_saved,
			"Loaded MongoDB fixture"
		);
		Ok(report)
	}

	/// Resolves the declaration applying to `method` and loads it.
	///
	/// Returns `Ok(None)` without touching the database when no declaration
	/// applies.
	pub async fn load_data_for(
		&self,
		method: Option<&TestMethod>,
	) -> FixtureResult<Option<LoadReport>> {
		let Some(data) = FixtureResolver::new(&self.registry).resolve(method) else {
			debug!(
				method = method.map(TestMethod::name),
				"No fixture declared, leaving database untouched"
			);
			return Ok(None);
		};

		self.load_data(data.path()).await.map(Some)
	}
}

impl FixtureLoader<MongoStore> {
	/// Connects to MongoDB and builds a loader from `settings`, with scopes
	/// and methods collected from static registrations.
	pub async fn connect(settings: &FixtureSettings) -> FixtureResult<Self> {
		let store = MongoStore::connect(settings).await?;
		let registry = FixtureRegistry::from_inventory()?;
		Ok(Self::new(store, settings.resource_locator()).with_registry(registry))
	}

	/// Returns the client owning the database handle.
	pub fn client(&self) -> &mongodb::Client {
		self.store.client()
	}

	/// Returns the live database handle.
	pub fn database(&self) -> &mongodb::Database {
		self.store.database()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixtures::MongoData;
	use crate::store::InMemoryStore;
	use async_trait::async_trait;
	use mongodb::bson::{Bson, Document, doc};
	use rstest::rstest;
	use std::fs;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use tempfile::TempDir;

	const TWO_COLLECTIONS: &str =
		r#"{ "documents": [ {"a": 1}, {"a": 2} ], "others": [ {}, {}, {}, {}, {} ] }"#;

	fn resources(files: &[(&str, &str)]) -> (TempDir, ResourceLocator) {
		let dir = TempDir::new().unwrap();
		for (name, content) in files {
			fs::write(dir.path().join(name), content).unwrap();
		}
		let locator = ResourceLocator::new([dir.path()]);
		(dir, locator)
	}

	/// Store rejecting every save after the first `allowed` ones.
	struct FailingStore {
		inner: InMemoryStore,
		allowed: usize,
		saves: AtomicUsize,
	}

	#[async_trait]
	impl DocumentStore for FailingStore {
		fn database_name(&self) -> &str {
			self.inner.database_name()
		}

		async fn drop_database(&self) -> FixtureResult<()> {
			self.inner.drop_database().await
		}

		async fn save(&self, collection: &str, document: Document) -> FixtureResult<Bson> {
			if self.saves.fetch_add(1, Ordering::SeqCst) >= self.allowed {
				return Err(FixtureError::Database("write rejected".to_string()));
			}
			self.inner.save(collection, document).await
		}

		async fn insert_one(&self, collection: &str, document: Document) -> FixtureResult<Bson> {
			self.inner.insert_one(collection, document).await
		}

		async fn find_all(&self, collection: &str) -> FixtureResult<Vec<Document>> {
			self.inner.find_all(collection).await
		}

		async fn count_documents(&self, collection: &str) -> FixtureResult<u64> {
			self.inner.count_documents(collection).await
		}

		async fn collection_names(&self) -> FixtureResult<Vec<String>> {
			self.inner.collection_names().await
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_load_data_reports_counts() {
		let (_dir, locator) = resources(&[("mongoTest.json", TWO_COLLECTIONS)]);
		let loader = FixtureLoader::new(InMemoryStore::default(), locator);

		let report = loader.load_data("/mongoTest.json").await.unwrap();

		assert_eq!(report.fixture, "/mongoTest.json");
		assert!(report.source.ends_with("mongoTest.json"));
		assert_eq!(report.records_saved, 7);
		assert_eq!(report.records_in("documents"), Some(2));
		assert_eq!(report.records_in("others"), Some(5));
		assert_eq!(report.records_in("missing"), None);
		assert_eq!(
			report
				.collections
				.iter()
				.map(|c| c.name.as_str())
				.collect::<Vec<_>>(),
			vec!["documents", "others"]
		);
		assert_eq!(loader.store().count_documents("others").await.unwrap(), 5);
	}

	#[rstest]
	#[tokio::test]
	async fn test_missing_file_still_wipes() {
		let (_dir, locator) = resources(&[]);
		let loader = FixtureLoader::new(InMemoryStore::default(), locator);
		loader.store().save("stale", doc! { "x": 1 }).await.unwrap();

		let err = loader.load_data("/doesNotExist.json").await.unwrap_err();

		assert_eq!(
			err.to_string(),
			"MongoDB data file not found on classpath: /doesNotExist.json"
		);
		assert!(loader.store().collection_names().await.unwrap().is_empty());
	}

	#[rstest]
	#[case::not_an_object(r#"[{"a": 1}]"#)]
	#[case::value_not_array(r#"{"documents": [{"a": 1}], "others": {"a": 2}}"#)]
	#[case::record_not_object(r#"{"documents": [{"a": 1}, 2]}"#)]
	#[case::invalid_json(r#"{"documents": [{"a": 1}"#)]
	#[tokio::test]
	async fn test_malformed_fixture_saves_nothing(#[case] content: &str) {
		let (_dir, locator) = resources(&[("bad.json", content)]);
		let loader = FixtureLoader::new(InMemoryStore::default(), locator);

		let err = loader.load_data("bad.json").await.unwrap_err();

		assert!(matches!(
			err,
			FixtureError::InvalidJson { .. } | FixtureError::MalformedFixture { .. }
		));
		assert!(loader.store().collection_names().await.unwrap().is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_save_failure_stops_and_keeps_earlier_records() {
		let (_dir, locator) = resources(&[("mongoTest.json", TWO_COLLECTIONS)]);
		let store = FailingStore {
			inner: InMemoryStore::default(),
			allowed: 3,
			saves: AtomicUsize::new(0),
		};
		let loader = FixtureLoader::new(store, locator);

		let err = loader.load_data("/mongoTest.json").await.unwrap_err();

		match err {
			FixtureError::SaveFailed {
				collection,
				index,
				message,
			} => {
				assert_eq!(collection, "others");
				assert_eq!(index, 1);
				assert!(message.contains("write rejected"));
			}
			other => panic!("unexpected error: {other}"),
		}
		assert_eq!(loader.store().count_documents("documents").await.unwrap(), 2);
		assert_eq!(loader.store().count_documents("others").await.unwrap(), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_load_data_for_without_declaration_is_noop() {
		let (_dir, locator) = resources(&[("mongoTest.json", TWO_COLLECTIONS)]);
		let registry = FixtureRegistry::builder().scope("Plain", None).build().unwrap();
		let method = registry.test_method("Plain", "untouched").unwrap();
		let loader = FixtureLoader::new(InMemoryStore::default(), locator).with_registry(registry);
		loader.store().save("kept", doc! { "x": 1 }).await.unwrap();

		assert!(loader.load_data_for(Some(&method)).await.unwrap().is_none());
		assert!(loader.load_data_for(None).await.unwrap().is_none());
		assert_eq!(loader.store().count_documents("kept").await.unwrap(), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_load_data_for_uses_resolved_declaration() {
		let (_dir, locator) = resources(&[
			("scope.json", r#"{"fromScope": [{}]}"#),
			("method.json", r#"{"fromMethod": [{}, {}]}"#),
		]);
		let registry = FixtureRegistry::builder()
			.scope("Declaring", Some(MongoData::from_static("/scope.json")))
			.method(
				"Declaring",
				"overriding",
				Some(MongoData::from_static("/method.json")),
			)
			.build()
			.unwrap();
		let loader = FixtureLoader::new(InMemoryStore::default(), locator).with_registry(registry);

		let method = loader.registry().test_method("Declaring", "overriding").unwrap();
		let report = loader.load_data_for(Some(&method)).await.unwrap().unwrap();
		assert_eq!(report.fixture, "/method.json");
		assert_eq!(
			loader.store().collection_names().await.unwrap(),
			vec!["fromMethod".to_string()]
		);

		let method = loader.registry().test_method("Declaring", "inheriting").unwrap();
		let report = loader.load_data_for(Some(&method)).await.unwrap().unwrap();
		assert_eq!(report.fixture, "/scope.json");
		assert_eq!(
			loader.store().collection_names().await.unwrap(),
			vec!["fromScope".to_string()]
		);
	}
}
