//! Facade handing out scoped database handles.

use std::fmt;
use std::sync::Arc;

use dbaas_broker::{BaseDbParams, BrokerClient};

use crate::classifier::{ClassifierFn, ServiceIdentity, service_classifier, tenant_classifier};
use crate::database::CassandraDatabase;
use crate::driver::ClusterConnector;
use crate::manager::SessionCache;

/// Database type constant under which logical databases are registered with
/// the broker and keyed in the session cache.
pub const DB_TYPE: &str = "cassandra";

/// Creation parameters for a scoped database handle.
#[derive(Clone, Default)]
pub struct DbParams {
	classifier: Option<ClassifierFn>,
	base: BaseDbParams,
}

impl DbParams {
	pub fn new() -> Self {
		Self::default()
	}

	/// Overrides the scope-default classification strategy.
	pub fn with_classifier(mut self, classifier: ClassifierFn) -> Self {
		self.classifier = Some(classifier);
		self
	}

	/// Sets pass-through broker creation parameters.
	pub fn with_base(mut self, base: BaseDbParams) -> Self {
		self.base = base;
		self
	}
}

impl fmt::Debug for DbParams {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DbParams")
			.field("custom_classifier", &self.classifier.is_some())
			.field("base", &self.base)
			.finish()
	}
}

/// Entry point: hands out service- and tenant-scoped database handles.
///
/// All handles produced by one client share a single session cache, so the
/// same classifier always resolves to the same live session no matter which
/// handle asked for it.
pub struct DbaasCassandraClient {
	broker: Arc<dyn BrokerClient>,
	connector: Arc<dyn ClusterConnector>,
	identity: ServiceIdentity,
	cache: Arc<SessionCache>,
}

impl DbaasCassandraClient {
	pub fn new(
		broker: Arc<dyn BrokerClient>,
		connector: Arc<dyn ClusterConnector>,
		identity: ServiceIdentity,
	) -> Self {
		Self {
			broker,
			connector,
			identity,
			cache: Arc::new(SessionCache::new()),
		}
	}

	/// Handle for the service-scoped database.
	pub fn service_database(&self, params: DbParams) -> CassandraDatabase {
		let default = service_classifier(&self.identity);
		self.database(params, default)
	}

	/// Handle for tenant-scoped databases.
	///
	/// Session clients from this handle require a tenant id in the request
	/// context unless a custom classifier says otherwise.
	pub fn tenant_database(&self, params: DbParams) -> CassandraDatabase {
		let default = tenant_classifier(&self.identity);
		self.database(params, default)
	}

	fn database(&self, params: DbParams, default_classifier: ClassifierFn) -> CassandraDatabase {
		let classifier = params.classifier.unwrap_or(default_classifier);
		CassandraDatabase::new(
			Arc::clone(&self.broker),
			Arc::clone(&self.connector),
			Arc::clone(&self.cache),
			classifier,
			params.base,
		)
	}
}
