//! JSON-file [`CredentialStore`] holding the durable copy of the cached credential.
//!
//! The file is a single object:
//!
//! ```json
//! {
//!   "access_token": "<opaque>",
//!   "expiry_timestamp": 1748800000,
//!   "cached_at": "2025-06-01T08:00:00Z"
//! }
//! ```
//!
//! Writes replace the whole file through a sibling temporary file and a rename, so a crash
//! mid-write leaves either the previous record or the new one, never a partial document.

// std
use std::{
	fs::{self, File},
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
};
// crates.io
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
// self
use crate::{
	_prelude::*,
	auth::{CachedCredential, coerce_expiry},
	obs,
	store::{CredentialStore, StoreError, StoreFuture},
};

#[derive(Serialize)]
struct DurableRecord<'a> {
	access_token: &'a str,
	expiry_timestamp: i64,
	cached_at: String,
}

/// Persists the cached credential to a JSON file at a fixed path.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
}
impl FileStore {
	/// Creates a store for `path`. Nothing is read or created until the first operation.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Location of the durable record.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_now(&self) -> Result<Option<CachedCredential>, StoreError> {
		let bytes = match fs::read(&self.path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) =>
				return Err(StoreError::Backend {
					message: format!("Failed to read {}: {e}", self.path.display()),
				}),
		};

		match decode_record(&bytes) {
			Ok(credential) => Ok(credential),
			Err(reason) => {
				obs::record_warning(
					"store",
					"durable token record is corrupted; deleting it",
					&format!("{}: {reason}", self.path.display()),
				);

				// Best effort; a file that cannot be removed is simply reported as a miss again.
				let _ = fs::remove_file(&self.path);

				Ok(None)
			},
		}
	}

	fn save_now(&self, credential: &CachedCredential) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let cached_at = credential
			.cached_at
			.unwrap_or_else(OffsetDateTime::now_utc)
			.format(&Rfc3339)
			.map_err(|e| StoreError::Serialization {
				message: format!("Failed to format acquisition time: {e}"),
			})?;
		let record = DurableRecord {
			access_token: credential.token.expose(),
			expiry_timestamp: credential.expiry_timestamp,
			cached_at,
		};
		let serialized =
			serde_json::to_vec_pretty(&record).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize token record: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn clear_now(&self) -> Result<(), StoreError> {
		match fs::remove_file(&self.path) {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StoreError::Backend {
				message: format!("Failed to remove {}: {e}", self.path.display()),
			}),
		}
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}
}
impl CredentialStore for FileStore {
	fn load(&self) -> StoreFuture<'_, Option<CachedCredential>> {
		Box::pin(async move { self.load_now() })
	}

	fn save<'a>(&'a self, credential: &'a CachedCredential) -> StoreFuture<'a, ()> {
		Box::pin(async move { self.save_now(credential) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.clear_now() })
	}
}

/// Decodes the file contents.
///
/// `Err` means the document is corrupted. A token-less document is a plain miss, and an absent
/// or non-numeric expiry loads as `0` so the freshness check rejects it.
fn decode_record(bytes: &[u8]) -> Result<Option<CachedCredential>, String> {
	let value: Value = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
	let Value::Object(map) = value else {
		return Err("top-level value is not an object".into());
	};
	let token = match map.get("access_token") {
		Some(Value::String(token)) if !token.is_empty() => token.to_owned(),
		Some(Value::String(_)) | Some(Value::Null) | None => return Ok(None),
		Some(_) => return Err("access_token is not a string".into()),
	};
	let expiry_timestamp = map.get("expiry_timestamp").and_then(coerce_expiry).unwrap_or(0);
	let cached_at = map
		.get("cached_at")
		.and_then(Value::as_str)
		.and_then(|raw| OffsetDateTime::parse(raw, &Rfc3339).ok());

	Ok(Some(CachedCredential { cached_at, ..CachedCredential::new(token, expiry_timestamp) }))
}
