//! MongoDB document store.
//!
//! # Example
//!
//! ```rust,no_run
//! use reinhardt_mongo_fixtures::store::MongoStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MongoStore::builder()
//!     .url("mongodb://localhost:27017")
//!     .database("integrationTestDB")
//!     .build()
//!     .await?;
//! let db = store.database();
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::{Acknowledgment, ClientOptions, DatabaseOptions, WriteConcern};
use mongodb::{Client, Database};

use super::DocumentStore;
use crate::error::{FixtureError, FixtureResult};
use crate::settings::{DEFAULT_DATABASE_NAME, DEFAULT_MONGODB_URL, FixtureSettings};

/// Document store backed by a MongoDB database.
///
/// Holds one client and one database handle for the lifetime of the store.
/// Writes are acknowledged by the server before they return.
#[derive(Clone, Debug)]
pub struct MongoStore {
	client: Client,
	database: Database,
}

/// Builder for configuring a [`MongoStore`].
///
/// # Example
///
/// ```rust,no_run
/// use reinhardt_mongo_fixtures::store::MongoStoreBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MongoStoreBuilder::new()
///     .url("mongodb://localhost:27017")
///     .database("integrationTestDB")
///     .max_pool_size(10)
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MongoStoreBuilder {
	url: String,
	database: String,
	max_pool_size: Option<u32>,
	min_pool_size: Option<u32>,
	max_idle_time_secs: Option<u64>,
	client: Option<Client>,
}

impl Default for MongoStoreBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl MongoStoreBuilder {
	/// Creates a builder for `mongodb://localhost:27017` / `integrationTestDB`.
	pub fn new() -> Self {
		Self {
			url: DEFAULT_MONGODB_URL.to_string(),
			database: DEFAULT_DATABASE_NAME.to_string(),
			max_pool_size: None,
			min_pool_size: None,
			max_idle_time_secs: None,
			client: None,
		}
	}

	/// Creates a builder from fixture settings.
	pub fn from_settings(settings: &FixtureSettings) -> Self {
		let builder = Self::new()
			.url(&settings.mongodb_url)
			.database(&settings.database_name);
		match settings.max_pool_size {
			Some(size) => builder.max_pool_size(size),
			None => builder,
		}
	}

	/// Sets the connection string.
	pub fn url(mut self, url: impl Into<String>) -> Self {
		self.url = url.into();
		self
	}

	/// Sets the database name.
	pub fn database(mut self, database: impl Into<String>) -> Self {
		self.database = database.into();
		self
	}

	/// Sets the maximum connection pool size.
	pub fn max_pool_size(mut self, size: u32) -> Self {
		self.max_pool_size = Some(size);
		self
	}

	/// Sets the minimum connection pool size.
	pub fn min_pool_size(mut self, size: u32) -> Self {
		self.min_pool_size = Some(size);
		self
	}

	/// Sets the maximum idle time for pooled connections in seconds.
	pub fn max_idle_time_secs(mut self, secs: u64) -> Self {
		self.max_idle_time_secs = Some(secs);
		self
	}

	/// Reuses an existing client instead of connecting from the URL.
	///
	/// Pool settings are ignored when a client is given.
	pub fn client(mut self, client: Client) -> Self {
		self.client = Some(client);
		self
	}

	/// Connects and checks that the server answers a `ping`.
	///
	/// # Errors
	///
	/// Returns [`FixtureError::Connection`] if the connection string is
	/// invalid or the server cannot be reached.
	pub async fn build(self) -> FixtureResult<MongoStore> {
		let client = match self.client {
			Some(client) => client,
			None => {
				let mut options = ClientOptions::parse(&self.url)
					.await
					.map_err(|e| FixtureError::Connection(e.to_string()))?;

				if let Some(max_size) = self.max_pool_size {
					options.max_pool_size = Some(max_size);
				}
				if let Some(min_size) = self.min_pool_size {
					options.min_pool_size = Some(min_size);
				}
				if let Some(idle_time) = self.max_idle_time_secs {
					options.max_idle_time = Some(Duration::from_secs(idle_time));
				}

				Client::with_options(options)
					.map_err(|e| FixtureError::Connection(e.to_string()))?
			}
		};

		let mut write_concern = WriteConcern::default();
		write_concern.w = Some(Acknowledgment::Nodes(1));
		let mut db_options = DatabaseOptions::default();
		db_options.write_concern = Some(write_concern);
		let database = client.database_with_options(&self.database, db_options);

		database
			.run_command(doc! { "ping": 1 })
			.await
			.map_err(|e| FixtureError::Connection(e.to_string()))?;

		tracing::debug!(database = %self.database, "Connected to MongoDB");

		Ok(MongoStore { client, database })
	}
}

impl MongoStore {
	/// Returns a builder for configuring the store.
	pub fn builder() -> MongoStoreBuilder {
		MongoStoreBuilder::new()
	}

	/// Connects using fixture settings.
	pub async fn connect(settings: &FixtureSettings) -> FixtureResult<Self> {
		MongoStoreBuilder::from_settings(settings).build().await
	}

	/// Returns the client owning the database handle.
	pub fn client(&self) -> &Client {
		&self.client
	}

	/// Returns the target database handle.
	pub fn database(&self) -> &Database {
		&self.database
	}
}

#[async_trait]
impl DocumentStore for MongoStore {
	fn database_name(&self) -> &str {
		self.database.name()
	}

	async fn drop_database(&self) -> FixtureResult<()> {
		self.database.drop().await?;
		Ok(())
	}

	async fn save(&self, collection: &str, document: Document) -> FixtureResult<Bson> {
		let coll = self.database.collection::<Document>(collection);

		match document.get("_id").cloned() {
			Some(id) => {
				coll.replace_one(doc! { "_id": id.clone() }, document)
					.upsert(true)
					.await?;
				Ok(id)
			}
			None => Ok(coll.insert_one(document).await?.inserted_id),
		}
	}

	async fn insert_one(&self, collection: &str, document: Document) -> FixtureResult<Bson> {
		let coll = self.database.collection::<Document>(collection);
		Ok(coll.insert_one(document).await?.inserted_id)
	}

	async fn find_all(&self, collection: &str) -> FixtureResult<Vec<Document>> {
		let coll = self.database.collection::<Document>(collection);
		let cursor = coll.find(doc! {}).await?;
		Ok(cursor.try_collect().await?)
	}

	async fn count_documents(&self, collection: &str) -> FixtureResult<u64> {
		let coll = self.database.collection::<Document>(collection);
		Ok(coll.count_documents(doc! {}).await?)
	}

	async fn collection_names(&self) -> FixtureResult<Vec<String>> {
		let mut names = self.database.list_collection_names().await?;
		names.sort();
		Ok(names)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_builder_default() {
		let builder = MongoStoreBuilder::new();
		assert_eq!(builder.url, "mongodb://localhost:27017");
		assert_eq!(builder.database, "integrationTestDB");
		assert_eq!(builder.max_pool_size, None);
		assert_eq!(builder.min_pool_size, None);
		assert!(builder.client.is_none());
	}

	#[rstest]
	fn test_builder_configuration() {
		let builder = MongoStoreBuilder::new()
			.url("mongodb://example.com:27017")
			.database("fixtures")
			.max_pool_size(20)
			.min_pool_size(2)
			.max_idle_time_secs(30);

		assert_eq!(builder.url, "mongodb://example.com:27017");
		assert_eq!(builder.database, "fixtures");
		assert_eq!(builder.max_pool_size, Some(20));
		assert_eq!(builder.min_pool_size, Some(2));
		assert_eq!(builder.max_idle_time_secs, Some(30));
	}

	#[rstest]
	fn test_builder_from_settings() {
		let settings = FixtureSettings::default()
			.with_mongodb_url("mongodb://db:27017")
			.with_database_name("otherDB")
			.with_max_pool_size(4);

		let builder = MongoStoreBuilder::from_settings(&settings);
		assert_eq!(builder.url, "mongodb://db:27017");
		assert_eq!(builder.database, "otherDB");
		assert_eq!(builder.max_pool_size, Some(4));
	}

	#[rstest]
	#[tokio::test]
	async fn test_build_rejects_invalid_url() {
		let result = MongoStoreBuilder::new().url("not-a-mongodb-url").build().await;
		assert!(matches!(result, Err(FixtureError::Connection(_))));
	}
}
