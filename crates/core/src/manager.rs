//! Session orchestration: cache lookup, creation, and rotation recovery.

use std::sync::Arc;
use std::time::Duration;

use dbaas_broker::{BaseDbParams, BrokerClient, Classifier};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, DbaasCache};
use crate::classifier::ClassifierFn;
use crate::client::DB_TYPE;
use crate::context::RequestContext;
use crate::driver::{CassandraSession, ClusterConnector, ClusterSettings, Credentials};
use crate::error::{Error, Result};

const CHECK_CONNECTION_QUERY: &str = "select release_version from system.local";
const RECONNECT_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// Shared cache type: one live session per (db-type, classifier) key.
pub(crate) type SessionCache = DbaasCache<Arc<dyn CassandraSession>, Error>;

/// Session client for one scoped database.
///
/// Cheap to clone; clones share the owning client's cache, so every handle
/// for the same classifier resolves to the same live session.
#[derive(Clone)]
pub struct CassandraDbClient {
	broker: Arc<dyn BrokerClient>,
	connector: Arc<dyn ClusterConnector>,
	cache: Arc<SessionCache>,
	classifier: ClassifierFn,
	params: BaseDbParams,
	settings: ClusterSettings,
}

impl CassandraDbClient {
	pub(crate) fn new(
		broker: Arc<dyn BrokerClient>,
		connector: Arc<dyn ClusterConnector>,
		cache: Arc<SessionCache>,
		classifier: ClassifierFn,
		params: BaseDbParams,
		settings: ClusterSettings,
	) -> Self {
		Self {
			broker,
			connector,
			cache,
			classifier,
			params,
			settings,
		}
	}

	/// Returns the live session for this database, creating it on first use.
	///
	/// A cached session that fails the liveness probe with the rotation
	/// symptom is closed, evicted, and rebuilt with freshly issued broker
	/// credentials; the rebuilt session is then polled until the cluster
	/// accepts the new password or the configured connect timeout elapses.
	/// Exactly one recovery cycle runs per call.
	pub async fn session(&self, ctx: &RequestContext) -> Result<Arc<dyn CassandraSession>> {
		let classifier = (self.classifier)(ctx)?;
		let key = CacheKey::new(DB_TYPE, classifier.clone());

		let session = self.cached_session(ctx, &key, &classifier).await?;
		if self.credentials_valid(session.as_ref()).await {
			return Ok(session);
		}

		info!(
			target = "dbaas.session",
			scope = %classifier.scope(),
			"cached session rejected by every host; assuming rotated credentials"
		);
		session.close().await;
		self.cache.delete(&key);

		let session = self.cached_session(ctx, &key, &classifier).await?;
		self.wait_for_session_reconnect(ctx, session.as_ref(), self.settings.connect_timeout)
			.await?;
		Ok(session)
	}

	/// Fetches the freshly issued password for this database from the broker.
	///
	/// The broker is the source of truth after a rotation; an open session
	/// keeps its old credentials until rebuilt.
	pub async fn refresh_password(&self, ctx: &RequestContext) -> Result<String> {
		let classifier = (self.classifier)(ctx)?;
		let connection = self
			.broker
			.get_connection(DB_TYPE, &classifier, &self.params)
			.await?;
		Ok(connection.password)
	}

	async fn cached_session(
		&self,
		ctx: &RequestContext,
		key: &CacheKey,
		classifier: &Classifier,
	) -> Result<Arc<dyn CassandraSession>> {
		let factory = {
			let broker = Arc::clone(&self.broker);
			let connector = Arc::clone(&self.connector);
			let classifier = classifier.clone();
			let params = self.params.clone();
			let settings = self.settings.clone();
			move || create_session(broker, connector, classifier, params, settings)
		};
		tokio::select! {
			biased;
			_ = ctx.cancellation().cancelled() => Err(Error::Cancelled),
			outcome = self.cache.get_or_create(key, factory) => outcome,
		}
	}

	/// Probes the session with a trivial metadata read.
	///
	/// Any failure other than the rotation classification still counts as
	/// valid: the credentials were accepted, something else is wrong, and
	/// that something is the caller's error to see on its own queries.
	async fn credentials_valid(&self, session: &dyn CassandraSession) -> bool {
		match session.execute(CHECK_CONNECTION_QUERY).await {
			Ok(()) => true,
			Err(err) => !err.is_credential_rotation(),
		}
	}

	/// Polls the rebuilt session until the cluster accepts its credentials.
	///
	/// Newly issued credentials can lag behind on the cluster's auth backend;
	/// this absorbs the propagation window. On timeout the last probe error
	/// is returned as the cause. Cancellation aborts the loop immediately.
	async fn wait_for_session_reconnect(
		&self,
		ctx: &RequestContext,
		session: &dyn CassandraSession,
		wait_time: Duration,
	) -> Result<()> {
		let deadline = Instant::now() + wait_time;
		let mut last_err = match session.execute(CHECK_CONNECTION_QUERY).await {
			Ok(()) => return Ok(()),
			Err(err) => err,
		};

		loop {
			let now = Instant::now();
			if now >= deadline {
				warn!(
					target = "dbaas.session",
					waited = ?wait_time,
					error = %last_err,
					"recreated session did not become ready in time"
				);
				return Err(Error::RecoveryTimeout {
					waited: wait_time,
					source: Arc::new(last_err),
				});
			}

			let tick = std::cmp::min(deadline, now + RECONNECT_CHECK_INTERVAL);
			tokio::select! {
				biased;
				_ = ctx.cancellation().cancelled() => return Err(Error::Cancelled),
				_ = tokio::time::sleep_until(tick) => {}
			}

			match session.execute(CHECK_CONNECTION_QUERY).await {
				Ok(()) => {
					debug!(target = "dbaas.session", "recreated session is ready");
					return Ok(());
				}
				Err(err) => last_err = err,
			}
		}
	}
}

/// Provisions the logical database and opens a session against it.
///
/// Runs as the cache factory: at most once per key at a time, with every
/// coalesced caller observing this one outcome. Failures are surfaced, not
/// cached.
async fn create_session(
	broker: Arc<dyn BrokerClient>,
	connector: Arc<dyn ClusterConnector>,
	classifier: Classifier,
	params: BaseDbParams,
	mut settings: ClusterSettings,
) -> Result<Arc<dyn CassandraSession>> {
	debug!(
		target = "dbaas.session",
		scope = %classifier.scope(),
		"requesting logical database from broker"
	);
	let database = broker
		.get_or_create_database(DB_TYPE, &classifier, &params)
		.await?;
	let properties = database.connection_properties;

	if properties.tls {
		info!(
			target = "dbaas.session",
			scope = %classifier.scope(),
			"connection to cassandra will be secured"
		);
	}
	settings.tls = settings.tls || properties.tls;
	settings.contact_points = properties.contact_points;
	settings.port = properties.port;
	settings.keyspace = properties.keyspace;
	settings.credentials = Some(Credentials {
		username: properties.username,
		password: properties.password,
	});

	debug!(
		target = "dbaas.session",
		contact_points = ?settings.contact_points,
		keyspace = %settings.keyspace,
		"opening cluster session"
	);
	match connector.connect(&settings).await {
		Ok(session) => Ok(session),
		Err(err) => {
			warn!(
				target = "dbaas.session",
				error = %err,
				"unable to create cassandra session"
			);
			Err(Error::Connection(Arc::new(err)))
		}
	}
}
