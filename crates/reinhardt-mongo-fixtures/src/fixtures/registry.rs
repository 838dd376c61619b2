//! Scope registry for fixture declarations.
//!
//! Test methods are grouped into *scopes* (the analogue of a test class).
//! A scope may extend another scope and may carry a [`MongoData`]
//! declaration that every method in it, and in every scope extending it,
//! inherits unless something nearer declares its own.
//!
//! The registry is an arena indexed by [`ScopeId`]. When a scope is added
//! its lineage (itself, then each ancestor, nearest first) is computed once,
//! so resolving a fixture is a plain ordered scan.
//!
//! Scopes and methods can be registered with [`FixtureRegistryBuilder`] or
//! declared statically with [`fixture_scope!`](crate::fixture_scope) and
//! [`fixture_method!`](crate::fixture_method), then collected with
//! [`FixtureRegistry::from_inventory`].

use std::collections::HashMap;

use super::MongoData;
use crate::error::{FixtureError, FixtureResult};

/// Index of a scope inside a [`FixtureRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

impl ScopeId {
	/// Returns the arena index.
	pub fn index(self) -> usize {
		self.0
	}
}

#[derive(Debug, Clone)]
struct ScopeEntry {
	name: String,
	data: Option<MongoData>,
	parent: Option<ScopeId>,
	lineage: Vec<ScopeId>,
}

/// Handle to a test method about to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestMethod {
	scope: ScopeId,
	name: String,
	data: Option<MongoData>,
}

impl TestMethod {
	/// Creates a method handle declared in `scope`.
	pub fn new(scope: ScopeId, name: impl Into<String>, data: Option<MongoData>) -> Self {
		Self {
			scope,
			name: name.into(),
			data,
		}
	}

	/// Returns the declaring scope.
	pub fn scope(&self) -> ScopeId {
		self.scope
	}

	/// Returns the method name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the declaration attached to the method itself.
	pub fn data(&self) -> Option<&MongoData> {
		self.data.as_ref()
	}
}

/// Statically declared scope, collected through `inventory`.
///
/// Normally produced by [`fixture_scope!`](crate::fixture_scope).
#[derive(Debug)]
pub struct ScopeDefinition {
	/// Scope name.
	pub name: &'static str,
	/// Name of the scope this one extends.
	pub parent: Option<&'static str>,
	/// Declaration attached to the scope.
	pub data: Option<MongoData>,
}

/// Statically declared test method, collected through `inventory`.
///
/// Normally produced by [`fixture_method!`](crate::fixture_method).
#[derive(Debug)]
pub struct MethodDefinition {
	/// Name of the declaring scope.
	pub scope: &'static str,
	/// Method name.
	pub name: &'static str,
	/// Declaration attached to the method.
	pub data: Option<MongoData>,
}

inventory::collect!(ScopeDefinition);
inventory::collect!(MethodDefinition);

/// Arena of scopes and registered test methods.
#[derive(Debug, Clone, Default)]
pub struct FixtureRegistry {
	scopes: Vec<ScopeEntry>,
	by_name: HashMap<String, ScopeId>,
	methods: HashMap<(ScopeId, String), TestMethod>,
}

impl FixtureRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a builder for registering scopes and methods.
	pub fn builder() -> FixtureRegistryBuilder {
		FixtureRegistryBuilder::new()
	}

	/// Builds a registry from every [`ScopeDefinition`] and
	/// [`MethodDefinition`] submitted in the current binary.
	///
	/// Parents are registered before their children regardless of
	/// submission order.
	///
	/// # Errors
	///
	/// Returns [`FixtureError::Registration`] for duplicate scope names,
	/// parents that are never declared, inheritance cycles, and methods
	/// declared in unknown scopes.
	pub fn from_inventory() -> FixtureResult<Self> {
		let mut pending: Vec<&ScopeDefinition> =
			inventory::iter::<ScopeDefinition>.into_iter().collect();
		pending.sort_by_key(|def| def.name);

		let mut registry = Self::new();
		while !pending.is_empty() {
			let before = pending.len();
			let mut deferred = Vec::new();
			for def in pending {
				let ready = def
					.parent
					.is_none_or(|parent| registry.by_name.contains_key(parent));
				if ready {
					registry.add_scope(def.name, def.parent, def.data.clone())?;
				} else {
					deferred.push(def);
				}
			}
			if deferred.len() == before {
				let names: Vec<String> = deferred
					.iter()
					.map(|def| format!("{} extends {}", def.name, def.parent.unwrap_or("?")))
					.collect();
				return Err(FixtureError::Registration(format!(
					"unresolvable scope parents: {}",
					names.join(", ")
				)));
			}
			pending = deferred;
		}

		for def in inventory::iter::<MethodDefinition> {
			registry.add_method(def.scope, def.name, def.data.clone())?;
		}

		Ok(registry)
	}

	/// Looks up a scope by name.
	pub fn scope_id(&self, name: &str) -> Option<ScopeId> {
		self.by_name.get(name).copied()
	}

	/// Returns the name of a scope.
	pub fn scope_name(&self, id: ScopeId) -> Option<&str> {
		self.scopes.get(id.0).map(|s| s.name.as_str())
	}

	/// Returns the declaration attached directly to a scope.
	pub fn scope_data(&self, id: ScopeId) -> Option<&MongoData> {
		self.scopes.get(id.0).and_then(|s| s.data.as_ref())
	}

	/// Returns the scope a scope extends.
	pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
		self.scopes.get(id.0).and_then(|s| s.parent)
	}

	/// Returns the scope followed by its ancestors, nearest first.
	///
	/// Unknown ids have an empty lineage.
	pub fn lineage(&self, id: ScopeId) -> &[ScopeId] {
		self.scopes
			.get(id.0)
			.map(|s| s.lineage.as_slice())
			.unwrap_or_default()
	}

	/// Returns a registered test method.
	pub fn method(&self, scope: &str, name: &str) -> Option<&TestMethod> {
		let id = self.scope_id(scope)?;
		self.methods.get(&(id, name.to_string()))
	}

	/// Returns a handle for a method run under a known scope.
	///
	/// The method is looked up in the scope and then its ancestors, nearest
	/// first. A method inherited from an ancestor keeps its own declaration
	/// and the ancestor as its scope. A name registered nowhere in the
	/// lineage gets a handle without a declaration. Returns `None` if the
	/// scope is unknown.
	pub fn test_method(&self, scope: &str, name: &str) -> Option<TestMethod> {
		let id = self.scope_id(scope)?;
		let key = name.to_string();
		Some(
			self.lineage(id)
				.iter()
				.find_map(|&declaring| self.methods.get(&(declaring, key.clone())))
				.cloned()
				.unwrap_or_else(|| TestMethod::new(id, name, None)),
		)
	}

	/// Returns the number of scopes.
	pub fn len(&self) -> usize {
		self.scopes.len()
	}

	/// Returns true if no scope is registered.
	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty()
	}

	fn add_scope(
		&mut self,
		name: &str,
		parent: Option<&str>,
		data: Option<MongoData>,
	) -> FixtureResult<ScopeId> {
		if self.by_name.contains_key(name) {
			return Err(FixtureError::Registration(format!(
				"scope '{}' is already registered",
				name
			)));
		}

		let parent = parent
			.map(|p| {
				self.scope_id(p).ok_or_else(|| {
					FixtureError::Registration(format!(
						"scope '{}' extends unknown scope '{}'",
						name, p
					))
				})
			})
			.transpose()?;

		let id = ScopeId(self.scopes.len());
		let mut lineage = vec![id];
		if let Some(parent) = parent {
			lineage.extend_from_slice(self.lineage(parent));
		}

		self.scopes.push(ScopeEntry {
			name: name.to_string(),
			data,
			parent,
			lineage,
		});
		self.by_name.insert(name.to_string(), id);
		Ok(id)
	}

	fn add_method(
		&mut self,
		scope: &str,
		name: &str,
		data: Option<MongoData>,
	) -> FixtureResult<()> {
		let id = self.scope_id(scope).ok_or_else(|| {
			FixtureError::Registration(format!(
				"method '{}' declared in unknown scope '{}'",
				name, scope
			))
		})?;
		let key = (id, name.to_string());
		if self.methods.contains_key(&key) {
			return Err(FixtureError::Registration(format!(
				"method '{}::{}' is already registered",
				scope, name
			)));
		}
		self.methods.insert(key, TestMethod::new(id, name, data));
		Ok(())
	}
}

/// Builder for [`FixtureRegistry`].
///
/// The first invalid registration is remembered and reported by
/// [`build`](Self::build); later calls are ignored.
///
/// # Example
///
/// ```
/// use reinhardt_mongo_fixtures::{FixtureRegistry, MongoData};
///
/// let registry = FixtureRegistry::builder()
///     .scope("MongoTestBase", Some(MongoData::from_static("/base.json")))
///     .scope_extending("MongoTestTest", "MongoTestBase", None)
///     .method("MongoTestTest", "loads_data", Some(MongoData::from_static("/mongoTest.json")))
///     .build()
///     .unwrap();
///
/// let child = registry.scope_id("MongoTestTest").unwrap();
/// assert_eq!(registry.lineage(child).len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct FixtureRegistryBuilder {
	registry: FixtureRegistry,
	error: Option<FixtureError>,
}

impl FixtureRegistryBuilder {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a root scope.
	pub fn scope(self, name: &str, data: Option<MongoData>) -> Self {
		self.record(|registry| registry.add_scope(name, None, data).map(|_| ()))
	}

	/// Registers a scope extending an already registered scope.
	pub fn scope_extending(self, name: &str, parent: &str, data: Option<MongoData>) -> Self {
		self.record(|registry| registry.add_scope(name, Some(parent), data).map(|_| ()))
	}

	/// Registers a test method of an already registered scope.
	pub fn method(self, scope: &str, name: &str, data: Option<MongoData>) -> Self {
		self.record(|registry| registry.add_method(scope, name, data))
	}

	/// Finishes the registry.
	///
	/// # Errors
	///
	/// Returns the first registration error encountered.
	pub fn build(self) -> FixtureResult<FixtureRegistry> {
		match self.error {
			Some(error) => Err(error),
			None => Ok(self.registry),
		}
	}

	fn record(mut self, f: impl FnOnce(&mut FixtureRegistry) -> FixtureResult<()>) -> Self {
		if self.error.is_none()
			&& let Err(e) = f(&mut self.registry)
		{
			self.error = Some(e);
		}
		self
	}
}

/// Declares a scope, optionally extending another one and optionally
/// carrying a fixture declaration.
///
/// ```ignore
/// reinhardt_mongo_fixtures::fixture_scope!("MongoTestBase", data = "/base.json");
/// reinhardt_mongo_fixtures::fixture_scope!("MongoTestTest", extends = "MongoTestBase");
/// ```
#[macro_export]
macro_rules! fixture_scope {
	($name:literal $(, extends = $parent:literal)? $(, data = $data:literal)? $(,)?) => {
		$crate::inventory::submit! {
			$crate::fixtures::ScopeDefinition {
				name: $name,
				parent: $crate::__fixture_opt_str!($($parent)?),
				data: $crate::__fixture_opt_data!($($data)?),
			}
		}
	};
}

/// Declares a test method of a scope with its own fixture declaration.
///
/// ```ignore
/// reinhardt_mongo_fixtures::fixture_method!("MongoTestTest", "loads_data", data = "/mongoTest.json");
/// ```
#[macro_export]
macro_rules! fixture_method {
	($scope:literal, $name:literal $(, data = $data:literal)? $(,)?) => {
		$crate::inventory::submit! {
			$crate::fixtures::MethodDefinition {
				scope: $scope,
				name: $name,
				data: $crate::__fixture_opt_data!($($data)?),
			}
		}
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __fixture_opt_str {
	() => {
		::core::option::Option::None
	};
	($value:literal) => {
		::core::option::Option::Some($value)
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __fixture_opt_data {
	() => {
		::core::option::Option::None
	};
	($path:literal) => {
		::core::option::Option::Some($crate::MongoData::from_static($path))
	};
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn data(path: &'static str) -> Option<MongoData> {
		Some(MongoData::from_static(path))
	}

	#[rstest]
	fn test_lineage_nearest_first() {
		let registry = FixtureRegistry::builder()
			.scope("Root", None)
			.scope_extending("Middle", "Root", None)
			.scope_extending("Leaf", "Middle", None)
			.build()
			.unwrap();

		let root = registry.scope_id("Root").unwrap();
		let middle = registry.scope_id("Middle").unwrap();
		let leaf = registry.scope_id("Leaf").unwrap();

		assert_eq!(registry.lineage(leaf), &[leaf, middle, root]);
		assert_eq!(registry.lineage(root), &[root]);
		assert_eq!(registry.parent(leaf), Some(middle));
		assert_eq!(registry.parent(root), None);
	}

	#[rstest]
	fn test_scope_accessors() {
		let registry = FixtureRegistry::builder()
			.scope("Suite", data("/suite.json"))
			.build()
			.unwrap();

		let id = registry.scope_id("Suite").unwrap();
		assert_eq!(registry.scope_name(id), Some("Suite"));
		assert_eq!(registry.scope_data(id).unwrap().path(), "/suite.json");
		assert_eq!(registry.len(), 1);
		assert!(!registry.is_empty());
	}

	#[rstest]
	fn test_unknown_scope_id_has_empty_lineage() {
		let registry = FixtureRegistry::new();
		assert!(registry.lineage(ScopeId(7)).is_empty());
		assert!(registry.scope_name(ScopeId(7)).is_none());
	}

	#[rstest]
	fn test_duplicate_scope_is_rejected() {
		let result = FixtureRegistry::builder()
			.scope("Suite", None)
			.scope("Suite", None)
			.build();
		assert!(matches!(result, Err(FixtureError::Registration(_))));
	}

	#[rstest]
	fn test_unknown_parent_is_rejected() {
		let result = FixtureRegistry::builder()
			.scope_extending("Child", "Missing", None)
			.build();
		match result {
			Err(FixtureError::Registration(message)) => assert!(message.contains("Missing")),
			other => panic!("Expected Registration error, got {:?}", other),
		}
	}

	#[rstest]
	fn test_first_error_is_reported() {
		let result = FixtureRegistry::builder()
			.method("Nowhere", "first", None)
			.scope("Suite", None)
			.scope("Suite", None)
			.build();
		match result {
			Err(FixtureError::Registration(message)) => assert!(message.contains("Nowhere")),
			other => panic!("Expected Registration error, got {:?}", other),
		}
	}

	#[rstest]
	fn test_registered_method_keeps_declaration() {
		let registry = FixtureRegistry::builder()
			.scope("Suite", None)
			.method("Suite", "loads_data", data("/mongoTest.json"))
			.build()
			.unwrap();

		let method = registry.method("Suite", "loads_data").unwrap();
		assert_eq!(method.name(), "loads_data");
		assert_eq!(method.data().unwrap().path(), "/mongoTest.json");
		assert_eq!(method.scope(), registry.scope_id("Suite").unwrap());
	}

	#[rstest]
	fn test_duplicate_method_is_rejected() {
		let result = FixtureRegistry::builder()
			.scope("Suite", None)
			.method("Suite", "loads_data", None)
			.method("Suite", "loads_data", None)
			.build();
		assert!(matches!(result, Err(FixtureError::Registration(_))));
	}

	#[rstest]
	fn test_test_method_for_unregistered_name() {
		let registry = FixtureRegistry::builder()
			.scope("Suite", data("/suite.json"))
			.build()
			.unwrap();

		let method = registry.test_method("Suite", "creates_client").unwrap();
		assert_eq!(method.name(), "creates_client");
		assert!(method.data().is_none());
		assert!(registry.test_method("Unknown", "creates_client").is_none());
	}

	#[rstest]
	fn test_test_method_inherited_from_ancestor() {
		let registry = FixtureRegistry::builder()
			.scope("Base", data("/base.json"))
			.scope_extending("Middle", "Base", None)
			.scope_extending("Derived", "Middle", data("/derived.json"))
			.method("Base", "inherited", data("/method.json"))
			.method("Middle", "overridden", None)
			.method("Base", "overridden", data("/base_method.json"))
			.build()
			.unwrap();
		let base = registry.scope_id("Base").unwrap();
		let middle = registry.scope_id("Middle").unwrap();

		let method = registry.test_method("Derived", "inherited").unwrap();
		assert_eq!(method.scope(), base);
		assert_eq!(method.data().unwrap().path(), "/method.json");

		let method = registry.test_method("Derived", "overridden").unwrap();
		assert_eq!(method.scope(), middle);
		assert!(method.data().is_none());

		let method = registry.test_method("Base", "inherited").unwrap();
		assert_eq!(method.scope(), base);
	}
}
