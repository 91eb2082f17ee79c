//! Keyed single-flight cache for lazily created values.
//!
//! One cache key maps to exactly one logical value. Entries never expire on
//! their own; they leave the map only through [`DbaasCache::delete`], which
//! the session manager calls when it evicts a stale session.

use std::collections::HashMap;
use std::future::Future;

use dbaas_broker::Classifier;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;

/// Cache slot identifier: database type plus classifier content.
///
/// Equality and hashing derive purely from the values; classifier attribute
/// order is insignificant, so the same logical request always lands on the
/// same slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
	db_type: String,
	classifier: Classifier,
}

impl CacheKey {
	pub fn new(db_type: impl Into<String>, classifier: Classifier) -> Self {
		Self {
			db_type: db_type.into(),
			classifier,
		}
	}

	pub fn db_type(&self) -> &str {
		&self.db_type
	}

	pub fn classifier(&self) -> &Classifier {
		&self.classifier
	}
}

type Creation<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

enum Slot<V, E> {
	Ready(V),
	Pending(Creation<V, E>),
}

/// Lazily populated, concurrency-safe map with single-flight creation.
///
/// Concurrent callers racing on an absent key are coalesced onto one shared
/// factory invocation and all observe its single outcome. Failed creations
/// are never stored: the slot is cleared so a later call starts fresh.
pub struct DbaasCache<V, E> {
	entries: Mutex<HashMap<CacheKey, Slot<V, E>>>,
}

impl<V, E> DbaasCache<V, E>
where
	V: Clone + Send + Sync + 'static,
	E: Clone + Send + Sync + 'static,
{
	pub fn new() -> Self {
		Self {
			entries: Mutex::new(HashMap::new()),
		}
	}

	/// Returns the value stored under `key`, creating it via `factory` on a
	/// miss.
	///
	/// The factory runs at most once per absent key regardless of how many
	/// callers race on it. The lock guards only map access, never the
	/// creation itself, so slow creations on one key do not serialize other
	/// keys. If every awaiting caller is dropped mid-creation the entry stays
	/// pending and the next caller drives the same shared computation to
	/// completion.
	pub async fn get_or_create<F, Fut>(&self, key: &CacheKey, factory: F) -> Result<V, E>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<V, E>> + Send + 'static,
	{
		let creation = {
			let mut entries = self.entries.lock();
			match entries.get(key) {
				Some(Slot::Ready(value)) => return Ok(value.clone()),
				Some(Slot::Pending(creation)) => creation.clone(),
				None => {
					let creation: Creation<V, E> = factory().boxed().shared();
					entries.insert(key.clone(), Slot::Pending(creation.clone()));
					creation
				}
			}
		};

		let outcome = creation.clone().await;
		self.finish(key, &creation, &outcome);
		outcome
	}

	/// Settles a pending slot once its creation resolved. Skipped when the
	/// slot was deleted or replaced while the creation was in flight.
	fn finish(&self, key: &CacheKey, creation: &Creation<V, E>, outcome: &Result<V, E>) {
		let mut entries = self.entries.lock();
		match entries.get(key) {
			Some(Slot::Pending(current)) if current.ptr_eq(creation) => {}
			_ => return,
		}
		match outcome {
			Ok(value) => {
				entries.insert(key.clone(), Slot::Ready(value.clone()));
			}
			Err(_) => {
				entries.remove(key);
			}
		}
	}

	/// Removes any entry stored under `key`.
	///
	/// Affects only future lookups; values already handed out stay alive and
	/// closing them is the caller's job.
	pub fn delete(&self, key: &CacheKey) -> bool {
		self.entries.lock().remove(key).is_some()
	}
}

impl<V, E> Default for DbaasCache<V, E>
where
	V: Clone + Send + Sync + 'static,
	E: Clone + Send + Sync + 'static,
{
	fn default() -> Self {
		Self::new()
	}
}
