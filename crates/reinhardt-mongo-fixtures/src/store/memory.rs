//! In-process document store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use parking_lot::RwLock;

use super::DocumentStore;
use crate::error::{FixtureError, FixtureResult};
use crate::settings::DEFAULT_DATABASE_NAME;

/// Document store keeping collections in memory.
///
/// Mirrors the MongoDB behaviour the loader relies on: collections appear on
/// first write, `_id` is generated when missing, and inserting a duplicate
/// `_id` fails.
#[derive(Debug)]
pub struct InMemoryStore {
	database_name: String,
	collections: RwLock<BTreeMap<String, Vec<Document>>>,
}

impl Default for InMemoryStore {
	fn default() -> Self {
		Self::new(DEFAULT_DATABASE_NAME)
	}
}

impl InMemoryStore {
	/// Creates an empty store for `database_name`.
	pub fn new(database_name: impl Into<String>) -> Self {
		Self {
			database_name: database_name.into(),
			collections: RwLock::new(BTreeMap::new()),
		}
	}

	fn ensure_id(document: &mut Document) -> Bson {
		match document.get("_id") {
			Some(id) => id.clone(),
			None => {
				let id = Bson::ObjectId(ObjectId::new());
				document.insert("_id", id.clone());
				id
			}
		}
	}
}

#[async_trait]
impl DocumentStore for InMemoryStore {
	fn database_name(&self) -> &str {
		&self.database_name
	}

	async fn drop_database(&self) -> FixtureResult<()> {
		self.collections.write().clear();
		Ok(())
	}

	async fn save(&self, collection: &str, mut document: Document) -> FixtureResult<Bson> {
		let id = Self::ensure_id(&mut document);
		let mut collections = self.collections.write();
		let records = collections.entry(collection.to_string()).or_default();

		match records.iter_mut().find(|r| r.get("_id") == Some(&id)) {
			Some(existing) => *existing = document,
			None => records.push(document),
		}
		Ok(id)
	}

	async fn insert_one(&self, collection: &str, mut document: Document) -> FixtureResult<Bson> {
		let id = Self::ensure_id(&mut document);
		let mut collections = self.collections.write();
		let records = collections.entry(collection.to_string()).or_default();

		if records.iter().any(|r| r.get("_id") == Some(&id)) {
			return Err(FixtureError::Database(format!(
				"E11000 duplicate key error collection: {}.{} dup key: {{ _id: {} }}",
				self.database_name, collection, id
			)));
		}
		records.push(document);
		Ok(id)
	}

	async fn find_all(&self, collection: &str) -> FixtureResult<Vec<Document>> {
		Ok(self
			.collections
			.read()
			.get(collection)
			.cloned()
			.unwrap_or_default())
	}

	async fn count_documents(&self, collection: &str) -> FixtureResult<u64> {
		Ok(self
			.collections
			.read()
			.get(collection)
			.map_or(0, |records| records.len() as u64))
	}

	async fn collection_names(&self) -> FixtureResult<Vec<String>> {
		Ok(self.collections.read().keys().cloned().collect())
	}
}
