//! Classpath-style lookup of fixture files.
//!
//! Fixture paths are logical names (`/mongoTest.json`). The leading `/` is
//! dropped and the remainder is joined to each resource root in order; the
//! first existing file wins.

use std::env;
use std::path::{Component, Path, PathBuf};

use crate::error::{FixtureError, FixtureResult};

/// Directory under the crate root searched when nothing else is configured.
pub const DEFAULT_RESOURCE_DIR: &str = "tests/resources";

/// Resolves logical fixture paths against an ordered list of directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceLocator {
	roots: Vec<PathBuf>,
}

impl ResourceLocator {
	/// Creates a locator searching `roots` in order.
	pub fn new<I, P>(roots: I) -> Self
	where
		I: IntoIterator<Item = P>,
		P: Into<PathBuf>,
	{
		Self {
			roots: roots.into_iter().map(Into::into).collect(),
		}
	}

	/// Creates a locator rooted at `tests/resources` of the crate under test.
	///
	/// Uses `CARGO_MANIFEST_DIR`, which cargo sets for test binaries, and
	/// falls back to the current directory.
	pub fn from_manifest_dir() -> Self {
		let base = env::var_os("CARGO_MANIFEST_DIR")
			.map(PathBuf::from)
			.or_else(|| env::current_dir().ok())
			.unwrap_or_default();
		Self::new([base.join(DEFAULT_RESOURCE_DIR)])
	}

	/// Appends a root searched after the existing ones.
	pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
		self.roots.push(root.into());
		self
	}

	/// Returns the search roots in order.
	pub fn roots(&self) -> &[PathBuf] {
		&self.roots
	}

	/// Finds the file a logical path refers to.
	///
	/// Returns `None` when no root contains the file, and for paths that are
	/// empty or step outside a root with `..`.
	pub fn locate(&self, path: &str) -> Option<PathBuf> {
		let relative = Path::new(path.trim_start_matches('/'));
		if relative.as_os_str().is_empty() {
			return None;
		}
		if !relative
			.components()
			.all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
		{
			return None;
		}

		self.roots
			.iter()
			.map(|root| root.join(relative))
			.find(|candidate| candidate.is_file())
	}

	/// Locates and reads a fixture file.
	///
	/// # Errors
	///
	/// - [`FixtureError::FixtureNotFound`] if the path does not resolve
	/// - [`FixtureError::Io`] if the resolved file cannot be read
	pub fn read_to_string(&self, path: &str) -> FixtureResult<(PathBuf, String)> {
		let file = self
			.locate(path)
			.ok_or_else(|| FixtureError::FixtureNotFound(path.to_string()))?;
		let content = std::fs::read_to_string(&file)?;
		Ok((file, content))
	}
}
