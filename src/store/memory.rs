//! Thread-safe in-memory [`CredentialStore`] for tests and deployments without a writable disk.

// self
use crate::{
	_prelude::*,
	auth::CachedCredential,
	store::{CredentialStore, StoreFuture},
};

/// Non-durable store that keeps the record for as long as the value (or a clone) lives.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<Option<CachedCredential>>>);
impl MemoryStore {
	/// Creates a store pre-populated with `credential`.
	pub fn with_credential(credential: CachedCredential) -> Self {
		Self(Arc::new(RwLock::new(Some(credential))))
	}

	/// Returns a clone of the stored record without going through the async contract.
	pub fn snapshot(&self) -> Option<CachedCredential> {
		self.0.read().clone()
	}
}
impl CredentialStore for MemoryStore {
	fn load(&self) -> StoreFuture<'_, Option<CachedCredential>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}

	fn save<'a>(&'a self, credential: &'a CachedCredential) -> StoreFuture<'a, ()> {
		let slot = self.0.clone();
		let credential = credential.to_owned();

		Box::pin(async move {
			*slot.write() = Some(credential);

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			slot.write().take();

			Ok(())
		})
	}
}
