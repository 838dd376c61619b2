//! Disposable MongoDB servers for integration tests.
//!
//! Requires the `testcontainers` feature and a running Docker daemon.

use std::time::Duration;

use rstest::fixture;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use tracing::warn;

use crate::error::{FixtureError, FixtureResult};
use crate::settings::FixtureSettings;

/// Image started by [`mongodb_container`].
pub const MONGO_IMAGE: (&str, &str) = ("mongo", "7.0");

const MONGO_PORT: u16 = 27017;
const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 2000;

/// A running MongoDB container. The server stops when this is dropped.
pub struct MongoContainer {
	/// Container handle.
	pub container: ContainerAsync<GenericImage>,

	/// Connection string for the mapped port.
	pub url: String,

	/// Host port mapped to 27017.
	pub port: u16,
}

impl MongoContainer {
	/// Starts a container, without retrying.
	pub async fn start() -> FixtureResult<Self> {
		let (name, tag) = MONGO_IMAGE;
		let container = GenericImage::new(name, tag)
			.with_exposed_port(MONGO_PORT.tcp())
			.with_wait_for(WaitFor::message_on_stdout("Waiting for connections"))
			.with_startup_timeout(Duration::from_secs(60))
			.start()
			.await
			.map_err(|e| FixtureError::Connection(e.to_string()))?;

		let port = container
			.get_host_port_ipv4(MONGO_PORT)
			.await
			.map_err(|e| FixtureError::Connection(e.to_string()))?;

		Ok(Self {
			container,
			url: format!("mongodb://127.0.0.1:{}", port),
			port,
		})
	}

	/// Returns settings pointing at this container.
	pub fn settings(&self) -> FixtureSettings {
		FixtureSettings::default().with_mongodb_url(self.url.clone())
	}
}

/// Fixture providing a MongoDB 7.0 container.
///
/// Starting is retried a few times before the fixture gives up.
///
/// # Examples
///
/// ```ignore
/// use reinhardt_mongo_fixtures::containers::{mongodb_container, MongoContainer};
/// use rstest::*;
///
/// #[rstest]
/// #[tokio::test]
/// async fn test_with_mongo(#[future] mongodb_container: MongoContainer) {
///     let mongo = mongodb_container.await;
///     let case = MongoTestCase::connect(&mongo.settings()).await.unwrap();
/// }
/// ```
#[fixture]
pub async fn mongodb_container() -> MongoContainer {
	let mut last_error = None;

	for attempt in 0..MAX_RETRIES {
		match MongoContainer::start().await {
			Ok(container) => return container,
			Err(e) => {
				warn!(
					attempt = attempt + 1,
					max = MAX_RETRIES,
					error = %e,
					"MongoDB container start failed"
				);
				last_error = Some(e);

				if attempt < MAX_RETRIES - 1 {
					tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
				}
			}
		}
	}

	panic!(
		"Failed to start MongoDB container after {} attempts: {:?}",
		MAX_RETRIES, last_error
	);
}
