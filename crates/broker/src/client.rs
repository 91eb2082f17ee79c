//! Client boundary for logical-database provisioning and lookup.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{BaseDbParams, Classifier, ConnectionProperties, LogicalDatabase};

/// Errors surfaced by broker implementations.
#[derive(Debug, Error)]
pub enum BrokerError {
	#[error("broker request failed")]
	Transport(#[from] reqwest::Error),
	#[error("broker returned status {status}: {body}")]
	UnexpectedStatus { status: u16, body: String },
	#[error("failed to decode broker response")]
	Decode(#[from] serde_json::Error),
	#[error("classifier is missing the `{0}` attribute")]
	MissingAttribute(&'static str),
	#[error("invalid broker url")]
	Url(#[from] url::ParseError),
}

/// Issues and looks up logical databases on behalf of driver crates.
///
/// Implementations must be safe to share across tasks; callers hold them
/// behind `Arc<dyn BrokerClient>`.
#[async_trait]
pub trait BrokerClient: Send + Sync {
	/// Returns the logical database matching `classifier`, provisioning it on
	/// first request. Repeated calls with the same classifier return the same
	/// logical database with its current credentials.
	async fn get_or_create_database(
		&self,
		db_type: &str,
		classifier: &Classifier,
		params: &BaseDbParams,
	) -> Result<LogicalDatabase, BrokerError>;

	/// Fetches the current connection properties for an existing logical
	/// database without provisioning. Used for explicit credential refresh.
	async fn get_connection(
		&self,
		db_type: &str,
		classifier: &Classifier,
		params: &BaseDbParams,
	) -> Result<ConnectionProperties, BrokerError>;
}
