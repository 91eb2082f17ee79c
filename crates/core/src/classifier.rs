//! Default request classification strategies.
//!
//! A classifier names the logical database a request targets. The two
//! defaults cover service- and tenant-scoped databases; callers may supply
//! any [`ClassifierFn`] of their own through
//! [`crate::DbParams::with_classifier`].

use std::sync::Arc;

use dbaas_broker::model::{MICROSERVICE_NAME, NAMESPACE, TENANT_ID};
use dbaas_broker::{Classifier, Scope};

use crate::context::RequestContext;
use crate::error::{Error, Result};

/// Process-wide identity injected into the default classifiers.
///
/// Constant for the process lifetime; passed in explicitly so classification
/// stays a pure function of (identity, request context).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
	pub microservice_name: String,
	pub namespace: String,
}

impl ServiceIdentity {
	pub fn new(microservice_name: impl Into<String>, namespace: impl Into<String>) -> Self {
		Self {
			microservice_name: microservice_name.into(),
			namespace: namespace.into(),
		}
	}
}

/// Injectable strategy mapping a request to a classifier.
pub type ClassifierFn = Arc<dyn Fn(&RequestContext) -> Result<Classifier> + Send + Sync>;

/// Classifier for the service-scoped logical database.
pub fn service_classifier(identity: &ServiceIdentity) -> ClassifierFn {
	let identity = identity.clone();
	Arc::new(move |_ctx| {
		Ok(Classifier::new(Scope::Service)
			.with_attribute(MICROSERVICE_NAME, identity.microservice_name.clone())
			.with_attribute(NAMESPACE, identity.namespace.clone()))
	})
}

/// Classifier for tenant-scoped logical databases.
///
/// Fails fast when the request carries no tenant id: a partial classifier
/// would collide distinct tenants onto one cache key.
pub fn tenant_classifier(identity: &ServiceIdentity) -> ClassifierFn {
	let identity = identity.clone();
	Arc::new(move |ctx| {
		let tenant_id = ctx
			.tenant_id()
			.ok_or_else(|| Error::Classification("tenant id missing from request context".into()))?;
		Ok(Classifier::new(Scope::Tenant)
			.with_attribute(MICROSERVICE_NAME, identity.microservice_name.clone())
			.with_attribute(NAMESPACE, identity.namespace.clone())
			.with_attribute(TENANT_ID, tenant_id))
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn identity() -> ServiceIdentity {
		ServiceIdentity::new("test_service", "test_namespace")
	}

	#[test]
	fn service_classifier_maps_identity() {
		let classify = service_classifier(&identity());
		let classifier = classify(&RequestContext::new()).expect("service classification should succeed");

		assert_eq!(classifier.scope(), Scope::Service);
		assert_eq!(classifier.attribute(MICROSERVICE_NAME), Some("test_service"));
		assert_eq!(classifier.attribute(NAMESPACE), Some("test_namespace"));
		assert_eq!(classifier.attributes().count(), 2);
	}

	#[test]
	fn tenant_classifier_adds_tenant_id() {
		let classify = tenant_classifier(&identity());
		let ctx = RequestContext::new().with_tenant_id("123");
		let classifier = classify(&ctx).expect("tenant classification should succeed");

		assert_eq!(classifier.scope(), Scope::Tenant);
		assert_eq!(classifier.attribute(MICROSERVICE_NAME), Some("test_service"));
		assert_eq!(classifier.attribute(NAMESPACE), Some("test_namespace"));
		assert_eq!(classifier.attribute(TENANT_ID), Some("123"));
	}

	#[test]
	fn tenant_classifier_requires_tenant_id() {
		let classify = tenant_classifier(&identity());
		let err = classify(&RequestContext::new()).expect_err("missing tenant id should fail");
		assert!(matches!(err, Error::Classification(_)));
	}

	#[test]
	fn classification_is_stable_across_calls() {
		let classify = tenant_classifier(&identity());
		let ctx = RequestContext::new().with_tenant_id("123");
		let first = classify(&ctx).expect("first call");
		let second = classify(&ctx).expect("second call");
		assert_eq!(first, second);
	}
}
