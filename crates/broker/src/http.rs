//! HTTP broker client over the dbaas aggregator REST surface.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::client::{BrokerClient, BrokerError};
use crate::model::{self, BaseDbParams, Classifier, ConnectionProperties, LogicalDatabase};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Broker client speaking the aggregator's `/api/v3/dbaas` API.
///
/// The target namespace is taken from the classifier's `namespace` attribute;
/// a classifier without one is rejected before any request is sent.
#[derive(Debug, Clone)]
pub struct HttpBroker {
	base_url: Url,
	http: reqwest::Client,
}

#[derive(Serialize)]
struct CreateDatabaseRequest<'a> {
	classifier: &'a Classifier,
	#[serde(rename = "type")]
	db_type: &'a str,
	#[serde(flatten)]
	params: &'a BaseDbParams,
}

impl HttpBroker {
	/// Creates a broker client with the default per-request timeout.
	pub fn new(base_url: Url) -> Result<Self, BrokerError> {
		Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
	}

	/// Creates a broker client with an explicit per-request timeout.
	pub fn with_timeout(base_url: Url, timeout: Duration) -> Result<Self, BrokerError> {
		let http = reqwest::Client::builder().timeout(timeout).build()?;
		Ok(Self { base_url, http })
	}

	fn namespace_of(classifier: &Classifier) -> Result<&str, BrokerError> {
		classifier
			.attribute(model::NAMESPACE)
			.ok_or(BrokerError::MissingAttribute(model::NAMESPACE))
	}

	fn databases_url(&self, namespace: &str) -> Result<Url, BrokerError> {
		Ok(self.base_url.join(&format!("api/v3/dbaas/{namespace}/databases"))?)
	}

	fn by_classifier_url(&self, namespace: &str, db_type: &str) -> Result<Url, BrokerError> {
		Ok(self
			.base_url
			.join(&format!("api/v3/dbaas/{namespace}/databases/get-by-classifier/{db_type}"))?)
	}

	async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BrokerError> {
		let status = response.status();
		let body = response.text().await?;
		if !status.is_success() {
			return Err(BrokerError::UnexpectedStatus {
				status: status.as_u16(),
				body,
			});
		}
		Ok(serde_json::from_str(&body)?)
	}
}

#[async_trait]
impl BrokerClient for HttpBroker {
	async fn get_or_create_database(
		&self,
		db_type: &str,
		classifier: &Classifier,
		params: &BaseDbParams,
	) -> Result<LogicalDatabase, BrokerError> {
		let namespace = Self::namespace_of(classifier)?;
		let url = self.databases_url(namespace)?;
		debug!(
			target = "dbaas.broker",
			%url,
			db_type,
			scope = %classifier.scope(),
			"requesting logical database"
		);
		let response = self
			.http
			.put(url)
			.json(&CreateDatabaseRequest {
				classifier,
				db_type,
				params,
			})
			.send()
			.await?;
		Self::decode(response).await
	}

	async fn get_connection(
		&self,
		db_type: &str,
		classifier: &Classifier,
		_params: &BaseDbParams,
	) -> Result<ConnectionProperties, BrokerError> {
		let namespace = Self::namespace_of(classifier)?;
		let url = self.by_classifier_url(namespace, db_type)?;
		debug!(
			target = "dbaas.broker",
			%url,
			db_type,
			"refreshing connection properties"
		);
		let response = self.http.post(url).json(classifier).send().await?;
		let database: LogicalDatabase = Self::decode(response).await?;
		Ok(database.connection_properties)
	}
}
