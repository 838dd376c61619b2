//! Error types for fixture resolution and loading.
//!
//! Every condition listed here is fatal for the test whose setup produced it.
//! A test without any fixture declaration is not an error and never reaches
//! this module.

use thiserror::Error;

/// Errors that can occur while registering, resolving or loading fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
	/// The MongoDB client could not be created or the server did not answer.
	#[error("Failed to connect to MongoDB: {0}")]
	Connection(String),

	/// The fixture path did not resolve against any resource root.
	#[error("MongoDB data file not found on classpath: {0}")]
	FixtureNotFound(String),

	/// The fixture file exists but could not be read.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// The fixture content is not valid JSON.
	#[error("Invalid JSON in fixture {source_name}: {source}")]
	InvalidJson {
		/// Fixture path or label the content came from.
		source_name: String,
		/// Underlying parser error.
		#[source]
		source: serde_json::Error,
	},

	/// The fixture is valid JSON but not an object of arrays of documents.
	#[error("Malformed fixture {source_name}: {message}")]
	MalformedFixture {
		/// Fixture path or label the content came from.
		source_name: String,
		/// Description of the offending value.
		message: String,
	},

	/// A record could not be saved. Records saved before it are kept.
	#[error("Failed to save record {index} into collection '{collection}': {message}")]
	SaveFailed {
		/// Target collection.
		collection: String,
		/// Zero-based position of the record in the fixture array.
		index: usize,
		/// Driver error message.
		message: String,
	},

	/// Any other database operation failed.
	#[error("Database error: {0}")]
	Database(String),

	/// A scope or test method registration is invalid.
	#[error("Registration error: {0}")]
	Registration(String),

	/// A settings value could not be interpreted.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Result type alias for fixture operations.
pub type FixtureResult<T> = Result<T, FixtureError>;

impl From<mongodb::error::Error> for FixtureError {
	fn from(err: mongodb::error::Error) -> Self {
		use mongodb::error::ErrorKind;

		match *err.kind {
			ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } => {
				FixtureError::Connection(err.to_string())
			}
			_ => FixtureError::Database(err.to_string()),
		}
	}
}
