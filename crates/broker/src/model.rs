//! Payload shapes for broker provisioning and lookup calls.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Classifier attribute carrying the requesting microservice name.
pub const MICROSERVICE_NAME: &str = "microserviceName";
/// Classifier attribute carrying the deployment namespace.
pub const NAMESPACE: &str = "namespace";
/// Classifier attribute carrying the tenant identifier.
pub const TENANT_ID: &str = "tenantId";

/// Whether a logical database is shared by the service or owned by one tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
	Service,
	Tenant,
}

impl fmt::Display for Scope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Scope::Service => f.write_str("service"),
			Scope::Tenant => f.write_str("tenant"),
		}
	}
}

/// Attribute mapping identifying one logical database.
///
/// Two classifiers are equal iff their attribute sets and scope are equal;
/// insertion order is insignificant. On the wire a classifier is a flat JSON
/// object with the scope folded in as a `"scope"` member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Classifier {
	#[serde(flatten)]
	attributes: BTreeMap<String, String>,
	scope: Scope,
}

impl Classifier {
	/// Creates an empty classifier for `scope`.
	pub fn new(scope: Scope) -> Self {
		Self {
			attributes: BTreeMap::new(),
			scope,
		}
	}

	/// Adds or replaces an attribute.
	pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attributes.insert(name.into(), value.into());
		self
	}

	/// Returns the value of `name`, if present.
	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes.get(name).map(String::as_str)
	}

	/// Returns the scope discriminator.
	pub fn scope(&self) -> Scope {
		self.scope
	}

	/// Iterates attributes in key order.
	pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
		self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

/// Connection parameters issued by the broker for one logical database.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProperties {
	pub contact_points: Vec<String>,
	pub port: u16,
	pub keyspace: String,
	pub username: String,
	pub password: String,
	#[serde(default)]
	pub tls: bool,
}

impl fmt::Debug for ConnectionProperties {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConnectionProperties")
			.field("contact_points", &self.contact_points)
			.field("port", &self.port)
			.field("keyspace", &self.keyspace)
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.field("tls", &self.tls)
			.finish()
	}
}

/// Broker record for a provisioned logical database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalDatabase {
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub classifier: Option<Classifier>,
	pub connection_properties: ConnectionProperties,
}

/// Pass-through creation parameters forwarded to the broker verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseDbParams {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name_prefix: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub physical_database_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub settings: Option<serde_json::Value>,
}
