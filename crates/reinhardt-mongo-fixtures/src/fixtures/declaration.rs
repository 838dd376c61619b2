//! Fixture declarations.
//!
//! A [`MongoData`] value names the fixture file a test method or a scope
//! wants loaded before it runs.

use std::borrow::Cow;
use std::fmt;

/// Declares the fixture file to load before a test.
///
/// The path is a logical resource name such as `/mongoTest.json`, resolved
/// against the configured resource roots when the fixture is loaded.
///
/// Declarations can be built in `const` context, which is what the
/// [`fixture_scope!`](crate::fixture_scope) and
/// [`fixture_method!`](crate::fixture_method) macros rely on.
///
/// # Example
///
/// ```
/// # use reinhardt_mongo_fixtures::MongoData;
/// const DATA: MongoData = MongoData::from_static("/mongoTest.json");
/// assert_eq!(DATA.path(), "/mongoTest.json");
///
/// let owned = MongoData::new(format!("/{}.json", "users"));
/// assert_eq!(owned.path(), "/users.json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MongoData {
	path: Cow<'static, str>,
}

impl MongoData {
	/// Creates a declaration from a static path.
	pub const fn from_static(path: &'static str) -> Self {
		Self {
			path: Cow::Borrowed(path),
		}
	}

	/// Creates a declaration from an owned path.
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: Cow::Owned(path.into()),
		}
	}

	/// Returns the declared fixture path.
	pub fn path(&self) -> &str {
		&self.path
	}
}

impl From<&'static str> for MongoData {
	fn from(path: &'static str) -> Self {
		Self::from_static(path)
	}
}

impl From<String> for MongoData {
	fn from(path: String) -> Self {
		Self::new(path)
	}
}

impl fmt::Display for MongoData {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.path)
	}
}
