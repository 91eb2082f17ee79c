//! Scoped database handle yielding session clients.

use std::sync::Arc;

use dbaas_broker::{BaseDbParams, BrokerClient};

use crate::classifier::ClassifierFn;
use crate::driver::{ClusterConnector, ClusterSettings};
use crate::manager::{CassandraDbClient, SessionCache};

/// Handle for one service- or tenant-scoped database.
///
/// Produced by [`crate::DbaasCassandraClient`]; yields session clients that
/// share the owning client's cache.
#[derive(Clone)]
pub struct CassandraDatabase {
	broker: Arc<dyn BrokerClient>,
	connector: Arc<dyn ClusterConnector>,
	cache: Arc<SessionCache>,
	classifier: ClassifierFn,
	params: BaseDbParams,
}

impl CassandraDatabase {
	pub(crate) fn new(
		broker: Arc<dyn BrokerClient>,
		connector: Arc<dyn ClusterConnector>,
		cache: Arc<SessionCache>,
		classifier: ClassifierFn,
		params: BaseDbParams,
	) -> Self {
		Self {
			broker,
			connector,
			cache,
			classifier,
			params,
		}
	}

	/// Session client with default cluster settings.
	pub fn client(&self) -> CassandraDbClient {
		self.client_with_settings(ClusterSettings::default())
	}

	/// Session client with a caller-supplied cluster configuration template.
	///
	/// Broker-issued values (contact points, port, keyspace, credentials)
	/// overwrite the template on connect; everything else, notably the
	/// connect timeout bounding rotation recovery, is the caller's.
	pub fn client_with_settings(&self, settings: ClusterSettings) -> CassandraDbClient {
		CassandraDbClient::new(
			Arc::clone(&self.broker),
			Arc::clone(&self.connector),
			Arc::clone(&self.cache),
			Arc::clone(&self.classifier),
			self.params.clone(),
			settings,
		)
	}
}
