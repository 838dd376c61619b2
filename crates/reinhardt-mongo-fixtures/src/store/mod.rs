//! Document stores fixtures are loaded into.
//!
//! [`DocumentStore`] is the small set of primitives the loader needs from a
//! database: wipe it, save a record, and let tests look at what is stored.
//! [`MongoStore`] talks to a MongoDB server; [`InMemoryStore`] keeps
//! everything in process for tests that do not need a server.

mod memory;
mod mongo;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};

use crate::error::FixtureResult;

pub use memory::InMemoryStore;
pub use mongo::{MongoStore, MongoStoreBuilder};

/// Database primitives used to reset and populate a test database.
///
/// # Example
///
/// ```rust,ignore
/// use reinhardt_mongo_fixtures::DocumentStore;
/// use mongodb::bson::doc;
///
/// async fn seed(store: &dyn DocumentStore) -> FixtureResult<()> {
///     store.drop_database().await?;
///     store.save("documents", doc! { "a": 1 }).await?;
///     assert_eq!(store.count_documents("documents").await?, 1);
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait DocumentStore: Send + Sync {
	/// Returns the name of the target database.
	fn database_name(&self) -> &str;

	/// Drops the whole database, every collection and record included.
	async fn drop_database(&self) -> FixtureResult<()>;

	/// Saves a record by identity.
	///
	/// A record carrying `_id` replaces the stored record with the same
	/// `_id`, or is inserted if there is none. A record without `_id` is
	/// inserted and receives a generated one.
	///
	/// Returns the `_id` of the saved record.
	async fn save(&self, collection: &str, document: Document) -> FixtureResult<Bson>;

	/// Inserts a record, failing if its `_id` is already taken.
	async fn insert_one(&self, collection: &str, document: Document) -> FixtureResult<Bson>;

	/// Returns every record of a collection.
	async fn find_all(&self, collection: &str) -> FixtureResult<Vec<Document>>;

	/// Returns the number of records in a collection.
	async fn count_documents(&self, collection: &str) -> FixtureResult<u64>;

	/// Returns the names of existing collections, sorted.
	async fn collection_names(&self) -> FixtureResult<Vec<String>>;
}
