//! Process-wide cache for the OneMap bearer token: an in-memory fast path, a durable JSON record
//! that survives restarts, and safety-buffered refreshes against the issuer.

#![deny(clippy::all, missing_docs)]
#![cfg_attr(not(test), deny(unused_crate_dependencies))]

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod ext;
pub mod http;
pub mod issuer;
pub mod obs;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::{env, path::PathBuf, process};
	// self
	use crate::{
		cache::CredentialCache,
		config::{IssuerConfig, IssuerCredentials},
		http::ReqwestHttpClient,
		store::{CredentialStore, FileStore},
	};

	/// Cache type alias used by reqwest-backed integration tests.
	pub type ReqwestTestCache = CredentialCache<ReqwestHttpClient>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Returns a unique, not-yet-existing path under the system temp directory.
	pub fn temp_cache_path(label: &str) -> PathBuf {
		let unique = format!(
			"onemap_token_cache_{label}_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	/// Builds an issuer configuration pointing at `token_endpoint` with fixture credentials.
	pub fn test_issuer_config(token_endpoint: &str, cache_path: PathBuf) -> IssuerConfig {
		let endpoint =
			Url::parse(token_endpoint).expect("Mock token endpoint should parse successfully.");

		IssuerConfig::new(endpoint)
			.with_credentials(IssuerCredentials::new("tester@example.com", "hunter2"))
			.with_cache_path(cache_path)
	}

	/// Constructs a [`CredentialCache`] backed by a [`FileStore`] at `config.cache_path` and the
	/// reqwest transport used across integration tests.
	pub fn build_reqwest_test_cache(config: IssuerConfig) -> (ReqwestTestCache, Arc<FileStore>) {
		let store_backend = Arc::new(FileStore::new(config.cache_path.clone()));
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let cache: ReqwestTestCache =
			CredentialCache::with_http_client(config, test_reqwest_http_client(), store);

		(cache, store_backend)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
