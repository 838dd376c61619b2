//! Settings for the fixture database and fixture lookup.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{FixtureError, FixtureResult};
use crate::fixtures::ResourceLocator;

/// Database fixtures are loaded into unless configured otherwise.
pub const DEFAULT_DATABASE_NAME: &str = "integrationTestDB";

/// MongoDB server used unless configured otherwise.
pub const DEFAULT_MONGODB_URL: &str = "mongodb://localhost:27017";

/// Environment variable overriding [`FixtureSettings::database_name`].
pub const DATABASE_ENV: &str = "MONGO_FIXTURES_DATABASE";

/// Environment variable overriding [`FixtureSettings::mongodb_url`].
pub const URL_ENV: &str = "MONGO_FIXTURES_URL";

/// Environment variable overriding [`FixtureSettings::resource_roots`].
pub const RESOURCE_ROOTS_ENV: &str = "MONGO_FIXTURES_RESOURCE_ROOTS";

/// Environment variable overriding [`FixtureSettings::max_pool_size`].
pub const MAX_POOL_SIZE_ENV: &str = "MONGO_FIXTURES_MAX_POOL_SIZE";

/// Where fixtures are loaded from and which database they are loaded into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureSettings {
	/// Name of the database wiped and reloaded before each test.
	pub database_name: String,

	/// MongoDB connection string.
	pub mongodb_url: String,

	/// Directories searched, in order, for fixture files.
	pub resource_roots: Vec<PathBuf>,

	/// Maximum size of the client connection pool.
	pub max_pool_size: Option<u32>,
}

impl Default for FixtureSettings {
	fn default() -> Self {
		Self {
			database_name: DEFAULT_DATABASE_NAME.to_string(),
			mongodb_url: DEFAULT_MONGODB_URL.to_string(),
			resource_roots: ResourceLocator::from_manifest_dir().roots().to_vec(),
			max_pool_size: None,
		}
	}
}

impl FixtureSettings {
	/// Loads settings from environment variables, using defaults for unset
	/// ones.
	///
	/// # Environment Variables
	///
	/// - `MONGO_FIXTURES_DATABASE`: database name (default `integrationTestDB`)
	/// - `MONGO_FIXTURES_URL`: connection string (default `mongodb://localhost:27017`)
	/// - `MONGO_FIXTURES_RESOURCE_ROOTS`: search roots, separated like `PATH`
	///   (default `<crate>/tests/resources`)
	/// - `MONGO_FIXTURES_MAX_POOL_SIZE`: maximum pool size
	pub fn from_env() -> FixtureResult<Self> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Loads settings through `lookup` instead of the process environment.
	///
	/// # Errors
	///
	/// Returns [`FixtureError::Configuration`] if the pool size is not a
	/// positive integer or the root list is empty.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> FixtureResult<Self> {
		let mut settings = Self::default();

		if let Some(name) = lookup(DATABASE_ENV) {
			settings.database_name = name;
		}
		if let Some(url) = lookup(URL_ENV) {
			settings.mongodb_url = url;
		}
		if let Some(roots) = lookup(RESOURCE_ROOTS_ENV) {
			settings.resource_roots = env::split_paths(&roots)
				.filter(|p| !p.as_os_str().is_empty())
				.collect();
			if settings.resource_roots.is_empty() {
				return Err(FixtureError::Configuration(format!(
					"{} does not name any directory",
					RESOURCE_ROOTS_ENV
				)));
			}
		}
		if let Some(size) = lookup(MAX_POOL_SIZE_ENV) {
			let parsed = size
				.trim()
				.parse::<u32>()
				.ok()
				.filter(|n| *n > 0)
				.ok_or_else(|| {
					FixtureError::Configuration(format!(
						"Invalid {}: {}",
						MAX_POOL_SIZE_ENV, size
					))
				})?;
			settings.max_pool_size = Some(parsed);
		}

		Ok(settings)
	}

	/// Sets the database name.
	pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
		self.database_name = name.into();
		self
	}

	/// Sets the connection string.
	pub fn with_mongodb_url(mut self, url: impl Into<String>) -> Self {
		self.mongodb_url = url.into();
		self
	}

	/// Replaces the resource roots.
	pub fn with_resource_roots<I, P>(mut self, roots: I) -> Self
	where
		I: IntoIterator<Item = P>,
		P: Into<PathBuf>,
	{
		self.resource_roots = roots.into_iter().map(Into::into).collect();
		self
	}

	/// Sets the maximum pool size.
	pub fn with_max_pool_size(mut self, size: u32) -> Self {
		self.max_pool_size = Some(size);
		self
	}

	/// Returns a locator over the configured resource roots.
	pub fn resource_locator(&self) -> ResourceLocator {
		ResourceLocator::new(self.resource_roots.iter().cloned())
	}
}
