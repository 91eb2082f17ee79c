//! Request-scoped context threaded through session acquisition.

use tokio_util::sync::CancellationToken;

/// Per-request baggage: tenant identity plus a cancellation signal.
///
/// Cheap to clone; clones share the same cancellation token. Cancelling the
/// token aborts any blocking step of an in-progress acquisition (creation
/// wait, recovery polling) with [`crate::Error::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
	tenant_id: Option<String>,
	cancellation: CancellationToken,
}

impl RequestContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Attaches the tenant identifier propagated with the request.
	pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
		self.tenant_id = Some(tenant_id.into());
		self
	}

	/// Replaces the cancellation token, e.g. with one tied to a caller deadline.
	pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
		self.cancellation = cancellation;
		self
	}

	pub fn tenant_id(&self) -> Option<&str> {
		self.tenant_id.as_deref()
	}

	pub fn cancellation(&self) -> &CancellationToken {
		&self.cancellation
	}
}
