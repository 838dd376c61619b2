//! Fixture document parsing.
//!
//! A fixture is a JSON object whose field names are collection names and
//! whose values are arrays of documents:
//!
//! ```json
//! { "documents": [ {"a": 1}, {"a": 2} ], "others": [ {}, {} ] }
//! ```
//!
//! Records are read as MongoDB Extended JSON, so `{"_id": {"$oid": "..."}}`
//! becomes an `ObjectId`. The whole document is validated before anything is
//! handed to the database.

use mongodb::bson::{Bson, Document};
use serde_json::Value;

use crate::error::{FixtureError, FixtureResult};

/// Label used when parsing content that did not come from a file.
const INLINE_SOURCE: &str = "<inline>";

/// Records destined for a single collection.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureCollection {
	/// Collection name.
	pub name: String,

	/// Records in fixture order.
	pub records: Vec<Document>,
}

impl FixtureCollection {
	/// Returns the number of records.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// Returns true if the collection has no records.
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}
}

/// Parsed fixture: collections in the order they appear in the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureDocument {
	collections: Vec<FixtureCollection>,
}

impl FixtureDocument {
	/// Parses fixture content that did not come from a named resource.
	pub fn parse(content: &str) -> FixtureResult<Self> {
		Self::parse_named(content, INLINE_SOURCE)
	}

	/// Parses fixture content, naming `source` in any error.
	///
	/// # Errors
	///
	/// - [`FixtureError::InvalidJson`] if `content` is not JSON
	/// - [`FixtureError::MalformedFixture`] if the top level is not an object,
	///   a field value is not an array, or a record is not an object
	pub fn parse_named(content: &str, source: &str) -> FixtureResult<Self> {
		let value: Value =
			serde_json::from_str(content).map_err(|source_err| FixtureError::InvalidJson {
				source_name: source.to_string(),
				source: source_err,
			})?;

		let Value::Object(fields) = value else {
			return Err(malformed(
				source,
				format!(
					"expected a JSON object at the top level, found {}",
					json_kind(&value)
				),
			));
		};

		let mut collections = Vec::with_capacity(fields.len());
		for (name, value) in fields {
			let Value::Array(items) = value else {
				return Err(malformed(
					source,
					format!(
						"collection '{}' must be an array of documents, found {}",
						name,
						json_kind(&value)
					),
				));
			};

			let mut records = Vec::with_capacity(items.len());
			for (idx, item) in items.into_iter().enumerate() {
				records.push(to_document(source, &name, idx, item)?);
			}
			collections.push(FixtureCollection { name, records });
		}

		Ok(Self { collections })
	}

	/// Returns the collections in fixture order.
	pub fn collections(&self) -> &[FixtureCollection] {
		&self.collections
	}

	/// Looks up a collection by name.
	pub fn collection(&self, name: &str) -> Option<&FixtureCollection> {
		self.collections.iter().find(|c| c.name == name)
	}

	/// Returns the number of records across all collections.
	pub fn total_records(&self) -> usize {
		self.collections.iter().map(FixtureCollection::len).sum()
	}

	/// Returns true if the fixture declares no collections.
	pub fn is_empty(&self) -> bool {
		self.collections.is_empty()
	}
}

impl IntoIterator for FixtureDocument {
	type Item = FixtureCollection;
	type IntoIter = std::vec::IntoIter<FixtureCollection>;

	fn into_iter(self) -> Self::IntoIter {
		self.collections.into_iter()
	}
}

fn to_document(source: &str, collection: &str, idx: usize, item: Value) -> FixtureResult<Document> {
	if !item.is_object() {
		return Err(malformed(
			source,
			format!(
				"record {} in collection '{}' must be a JSON object, found {}",
				idx,
				collection,
				json_kind(&item)
			),
		));
	}

	match Bson::try_from(item) {
		Ok(Bson::Document(document)) => Ok(document),
		Ok(other) => Err(malformed(
			source,
			format!(
				"record {} in collection '{}' is an extended JSON {:?}, not a document",
				idx,
				collection,
				other.element_type()
			),
		)),
		Err(e) => Err(malformed(
			source,
			format!(
				"record {} in collection '{}' is not valid extended JSON: {}",
				idx, collection, e
			),
		)),
	}
}

fn malformed(source: &str, message: String) -> FixtureError {
	FixtureError::MalformedFixture {
		source_name: source.to_string(),
		message,
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
