//! Test base that reloads the database before each test.
//!
//! A [`MongoTestCase`] owns one loader, and through it one client, shared by
//! every test of a binary. Cloning it shares the same loader.

use std::sync::Arc;

use crate::error::{FixtureError, FixtureResult};
use crate::fixtures::TestMethod;
use crate::loader::{FixtureLoader, LoadReport};
use crate::settings::FixtureSettings;
use crate::store::{DocumentStore, MongoStore};

/// Per-test fixture setup over a shared loader.
///
/// Call [`before_each`](Self::before_each) (or
/// [`before_each_named`](Self::before_each_named)) at the start of a test and
/// await it before the test body runs.
///
/// The MongoDB client is tied to the tokio runtime that created it; create
/// the test case inside the runtime that runs the tests.
///
/// # Example
///
/// ```rust,ignore
/// use reinhardt_mongo_fixtures::{fixture_scope, MongoTestCase};
///
/// fixture_scope!("UserQueries", data = "/users.json");
///
/// #[tokio::test]
/// async fn finds_active_users() {
///     let case = MongoTestCase::from_env().await.unwrap();
///     case.before_each_named("UserQueries", "finds_active_users").await.unwrap();
///
///     let users = case.database().collection::<Document>("users");
///     // ...
/// }
/// ```
#[derive(Debug)]
pub struct MongoTestCase<S = MongoStore> {
	loader: Arc<FixtureLoader<S>>,
}

impl<S> Clone for MongoTestCase<S> {
	fn clone(&self) -> Self {
		Self {
			loader: Arc::clone(&self.loader),
		}
	}
}

impl<S: DocumentStore> MongoTestCase<S> {
	/// Wraps an existing loader.
	pub fn new(loader: FixtureLoader<S>) -> Self {
		Self {
			loader: Arc::new(loader),
		}
	}

	/// Resolves and loads the fixture for `method`.
	///
	/// Returns `Ok(None)` and leaves the database untouched when nothing is
	/// declared for it.
	pub async fn before_each(
		&self,
		method: Option<&TestMethod>,
	) -> FixtureResult<Option<LoadReport>> {
		self.loader.load_data_for(method).await
	}

	/// Like [`before_each`](Self::before_each) for a method named by scope and
	/// method name.
	///
	/// # Errors
	///
	/// Returns [`FixtureError::Registration`] if `scope` is not registered.
	pub async fn before_each_named(
		&self,
		scope: &str,
		method: &str,
	) -> FixtureResult<Option<LoadReport>> {
		let method = self
			.loader
			.registry()
			.test_method(scope, method)
			.ok_or_else(|| FixtureError::Registration(format!("unknown scope '{}'", scope)))?;
		self.before_each(Some(&method)).await
	}

	/// Wipes the database and loads `path`, bypassing resolution.
	pub async fn load_data(&self, path: &str) -> FixtureResult<LoadReport> {
		self.loader.load_data(path).await
	}

	/// Returns the shared loader.
	pub fn loader(&self) -> &FixtureLoader<S> {
		&self.loader
	}

	/// Returns the store fixtures are loaded into.
	pub fn store(&self) -> &S {
		self.loader.store()
	}
}

impl MongoTestCase<MongoStore> {
	/// Connects using `settings`.
	pub async fn connect(settings: &FixtureSettings) -> FixtureResult<Self> {
		Ok(Self::new(FixtureLoader::connect(settings).await?))
	}

	/// Connects using settings read from the environment.
	pub async fn from_env() -> FixtureResult<Self> {
		Self::connect(&FixtureSettings::from_env()?).await
	}

	/// Returns the client owning the database handle.
	pub fn client(&self) -> &mongodb::Client {
		self.loader.client()
	}

	/// Returns the live database handle.
	pub fn database(&self) -> &mongodb::Database {
		self.loader.database()
	}
}
