//! Error and result types for session acquisition.

use std::sync::Arc;
use std::time::Duration;

use dbaas_broker::BrokerError;
use thiserror::Error;

use crate::driver::DriverError;

/// Convenience result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by session acquisition.
///
/// The type is cheap to clone: callers coalesced onto one in-flight session
/// creation all observe the same failure value, so collaborator errors are
/// held behind `Arc`.
#[derive(Debug, Clone, Error)]
pub enum Error {
	/// A required request attribute was absent during classification.
	#[error("classification failed: {0}")]
	Classification(String),
	/// The broker failed to issue or return connection properties.
	#[error("broker provisioning failed")]
	Provisioning(#[source] Arc<BrokerError>),
	/// The cluster rejected or never completed session creation.
	#[error("unable to create cassandra session")]
	Connection(#[source] Arc<DriverError>),
	/// Rotation recovery polled until the deadline without a usable session.
	#[error("session did not become ready within {waited:?}")]
	RecoveryTimeout {
		waited: Duration,
		#[source]
		source: Arc<DriverError>,
	},
	/// The caller's context was cancelled during a blocking step.
	#[error("session acquisition cancelled")]
	Cancelled,
}

impl From<BrokerError> for Error {
	fn from(err: BrokerError) -> Self {
		Error::Provisioning(Arc::new(err))
	}
}

impl From<DriverError> for Error {
	fn from(err: DriverError) -> Self {
		Error::Connection(Arc::new(err))
	}
}
