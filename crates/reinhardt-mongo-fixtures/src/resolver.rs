//! Fixture resolution for a test method.
//!
//! Lookup order, first match wins:
//!
//! 1. the declaration on the method itself
//! 2. the declaration on the method's scope
//! 3. the declarations on the scope's ancestors, nearest first
//!
//! Finding nothing is not an error; the caller skips the wipe and the load.

use crate::fixtures::{FixtureRegistry, MongoData, ScopeId, TestMethod};

/// Where a resolved declaration was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureOrigin {
	/// Declared on the test method.
	Method,
	/// Declared on a scope in the method's lineage.
	Scope(ScopeId),
}

/// Resolves the declaration that applies to a test method.
#[derive(Debug, Clone, Copy)]
pub struct FixtureResolver<'r> {
	registry: &'r FixtureRegistry,
}

impl<'r> FixtureResolver<'r> {
	/// Creates a resolver over `registry`.
	pub fn new(registry: &'r FixtureRegistry) -> Self {
		Self { registry }
	}

	/// Returns the declaration applying to `method`, if any.
	///
	/// An absent method resolves to `None`.
	pub fn resolve<'m>(&self, method: Option<&'m TestMethod>) -> Option<&'m MongoData>
	where
		'r: 'm,
	{
		self.resolve_with_origin(method).map(|(_, data)| data)
	}

	/// Like [`resolve`](Self::resolve), also reporting where the declaration
	/// was found.
	pub fn resolve_with_origin<'m>(
		&self,
		method: Option<&'m TestMethod>,
	) -> Option<(FixtureOrigin, &'m MongoData)>
	where
		'r: 'm,
	{
		let method = method?;

		if let Some(data) = method.data() {
			return Some((FixtureOrigin::Method, data));
		}

		let registry: &'r FixtureRegistry = self.registry;
		registry.lineage(method.scope()).iter().find_map(|&scope| {
			registry
				.scope_data(scope)
				.map(|data| (FixtureOrigin::Scope(scope), data))
		})
	}
}
