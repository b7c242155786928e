//! Storage contracts and built-in store implementations for the durable credential tier.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::CachedCredential};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for the single cached credential.
///
/// Implementations hold at most one record and replace it wholesale on every save.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Loads the stored record.
	///
	/// A missing record is `Ok(None)`; corrupted records are removed
	/// and reported as `Ok(None)` as well. `Err` is reserved for backend failures that leave the
	/// record's state unknown.
	fn load(&self) -> StoreFuture<'_, Option<CachedCredential>>;

	/// Persists `credential`, replacing any previous record.
	fn save<'a>(&'a self, credential: &'a CachedCredential) -> StoreFuture<'a, ()>;

	/// Removes the stored record. Clearing an empty store succeeds.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;

	#[test]
	fn store_error_converts_into_cache_error_with_source() {
		let store_error = StoreError::Backend { message: "permission denied".into() };
		let cache_error: Error = store_error.clone().into();

		assert!(matches!(cache_error, Error::Storage(_)));
		assert!(cache_error.to_string().contains("permission denied"));
		assert!(cache_error.is_retryable());

		let source = StdError::source(&cache_error)
			.expect("Cache error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
