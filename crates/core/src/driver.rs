//! Boundary to the cluster driver that owns live connections.
//!
//! The real driver (wire protocol, topology, query execution) sits behind
//! [`ClusterConnector`] and [`CassandraSession`]; this crate only fills in
//! connection settings and probes liveness.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

const DEFAULT_PORT: u16 = 9042;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(600);

/// Cluster authentication material.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
	pub username: String,
	pub password: String,
}

impl fmt::Debug for Credentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Credentials")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Driver-level failures.
#[derive(Debug, Error)]
pub enum DriverError {
	/// Every connection attempt was rejected; the pool has no usable host.
	#[error("no hosts available in the pool")]
	NoHostsAvailable,
	/// The cluster could not be reached or refused the session.
	#[error("failed to reach the cluster: {0}")]
	Connect(String),
	/// A statement failed to execute.
	#[error("query execution failed: {0}")]
	Query(String),
}

impl DriverError {
	/// Whether this failure is the symptom of externally rotated credentials.
	///
	/// Only an exhausted pool qualifies: a session whose password was rotated
	/// keeps failing reconnection on every host until it is rebuilt with
	/// fresh credentials. Any other failure is an ordinary connectivity or
	/// query problem and must not trigger recovery.
	pub fn is_credential_rotation(&self) -> bool {
		matches!(self, DriverError::NoHostsAvailable)
	}
}

/// Cluster connection configuration template.
///
/// Callers may pre-fill any field; the session manager overwrites contact
/// points, port, keyspace, and credentials with broker-issued values before
/// connecting.
#[derive(Debug, Clone)]
pub struct ClusterSettings {
	pub contact_points: Vec<String>,
	pub port: u16,
	pub keyspace: String,
	pub credentials: Option<Credentials>,
	pub tls: bool,
	pub connect_timeout: Duration,
}

impl Default for ClusterSettings {
	fn default() -> Self {
		Self {
			contact_points: Vec::new(),
			port: DEFAULT_PORT,
			keyspace: String::new(),
			credentials: None,
			tls: false,
			connect_timeout: DEFAULT_CONNECT_TIMEOUT,
		}
	}
}

impl ClusterSettings {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the timeout that also bounds rotation-recovery polling.
	pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
		self.connect_timeout = timeout;
		self
	}

	pub fn with_tls(mut self, tls: bool) -> Self {
		self.tls = tls;
		self
	}
}

/// Live session against one keyspace.
///
/// Sessions are safe for concurrent use by multiple callers; this subsystem
/// adds no locking around them, only around the cache slot holding them.
#[async_trait]
pub trait CassandraSession: Send + Sync {
	/// Executes a statement, discarding any rows.
	async fn execute(&self, statement: &str) -> Result<(), DriverError>;

	/// Releases the session's connections. Idempotent.
	async fn close(&self);
}

impl fmt::Debug for dyn CassandraSession {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("CassandraSession")
	}
}

/// Opens sessions from settings. Implemented by the driver adapter.
#[async_trait]
pub trait ClusterConnector: Send + Sync {
	async fn connect(&self, settings: &ClusterSettings) -> Result<Arc<dyn CassandraSession>, DriverError>;
}
