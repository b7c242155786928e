//! Issuer endpoint, login credentials, and durable cache location.

// std
use std::{env, path::PathBuf};
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Environment variable holding the issuer login email.
pub const ENV_EMAIL: &str = "ONEMAP_EMAIL";
/// Environment variable holding the issuer login password.
pub const ENV_PASSWORD: &str = "ONEMAP_PASSWORD";
/// Optional environment override for the issuer token endpoint.
pub const ENV_TOKEN_URL: &str = "ONEMAP_TOKEN_URL";
/// Optional environment override for the durable cache file.
pub const ENV_CACHE_FILE: &str = "ONEMAP_TOKEN_CACHE_FILE";

/// Token endpoint used when no override is configured.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://www.onemap.gov.sg/api/auth/post/getToken";
/// Durable cache file used when no override is configured.
pub const DEFAULT_CACHE_FILE: &str = ".onemap_token_cache.json";

/// Login credentials posted to the issuer.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuerCredentials {
	/// Account email.
	pub email: String,
	/// Account password; never logged.
	pub password: TokenSecret,
}
impl IssuerCredentials {
	/// Creates a credential pair.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: TokenSecret::new(password) }
	}
}
impl Debug for IssuerCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IssuerCredentials")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Everything the cache needs to reach the issuer and persist what it returns.
#[derive(Clone, Debug)]
pub struct IssuerConfig {
	/// Endpoint accepting the `{email, password}` login body.
	pub token_endpoint: Url,
	/// Login credentials; `None` makes every cold-path acquisition fail without network traffic.
	pub credentials: Option<IssuerCredentials>,
	/// Location of the durable cache record.
	pub cache_path: PathBuf,
}
impl IssuerConfig {
	/// Creates a configuration for `token_endpoint` with no credentials and the default cache path.
	pub fn new(token_endpoint: Url) -> Self {
		Self { token_endpoint, credentials: None, cache_path: PathBuf::from(DEFAULT_CACHE_FILE) }
	}

	/// Reads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Builds the configuration from an arbitrary key lookup.
	///
	/// Credentials are only populated when both the email and the password are present and
	/// non-empty. A missing pair is not an error here; it surfaces on the first acquisition.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
		let endpoint_raw =
			non_empty(ENV_TOKEN_URL).unwrap_or_else(|| DEFAULT_TOKEN_ENDPOINT.to_owned());
		let token_endpoint = Url::parse(&endpoint_raw)
			.map_err(|source| ConfigError::InvalidEndpoint { value: endpoint_raw.clone(), source })?;
		let credentials = match (non_empty(ENV_EMAIL), non_empty(ENV_PASSWORD)) {
			(Some(email), Some(password)) => Some(IssuerCredentials::new(email, password)),
			_ => None,
		};
		let cache_path = non_empty(ENV_CACHE_FILE)
			.map(PathBuf::from)
			.unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE));

		Ok(Self { token_endpoint, credentials, cache_path })
	}

	/// Sets the login credentials.
	pub fn with_credentials(mut self, credentials: IssuerCredentials) -> Self {
		self.credentials = Some(credentials);

		self
	}

	/// Removes any configured credentials.
	pub fn without_credentials(mut self) -> Self {
		self.credentials = None;

		self
	}

	/// Overrides the durable cache location.
	pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.cache_path = path.into();

		self
	}

	/// Returns the credentials or the configuration error reported to callers.
	pub fn require_credentials(&self) -> Result<&IssuerCredentials, ConfigError> {
		self.credentials.as_ref().ok_or(ConfigError::MissingCredentials)
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> =
			pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();

		move |key| map.get(key).cloned()
	}

	#[test]
	fn lookup_populates_all_fields() {
		let config = IssuerConfig::from_lookup(lookup_from(&[
			(ENV_EMAIL, "ops@example.com"),
			(ENV_PASSWORD, "pw"),
			(ENV_TOKEN_URL, "http://127.0.0.1:9000/token"),
			(ENV_CACHE_FILE, "/tmp/cache/token.json"),
		]))
		.expect("Complete lookup should produce a configuration.");
		let credentials = config.require_credentials().expect("Credentials should be present.");

		assert_eq!(credentials.email, "ops@example.com");
		assert_eq!(credentials.password.expose(), "pw");
		assert_eq!(config.token_endpoint.as_str(), "http://127.0.0.1:9000/token");
		assert_eq!(config.cache_path, PathBuf::from("/tmp/cache/token.json"));
	}

	#[test]
	fn lookup_falls_back_to_defaults() {
		let config = IssuerConfig::from_lookup(lookup_from(&[]))
			.expect("Empty lookup should still produce a configuration.");

		assert_eq!(config.token_endpoint.as_str(), DEFAULT_TOKEN_ENDPOINT);
		assert_eq!(config.cache_path, PathBuf::from(DEFAULT_CACHE_FILE));
		assert!(matches!(config.require_credentials(), Err(ConfigError::MissingCredentials)));
	}

	#[test]
	fn empty_or_partial_credentials_count_as_unset() {
		let partial = IssuerConfig::from_lookup(lookup_from(&[(ENV_EMAIL, "ops@example.com")]))
			.expect("Partial lookup should produce a configuration.");
		let blank =
			IssuerConfig::from_lookup(lookup_from(&[(ENV_EMAIL, "a@b.c"), (ENV_PASSWORD, "  ")]))
				.expect("Blank password lookup should produce a configuration.");

		assert!(partial.credentials.is_none());
		assert!(blank.credentials.is_none());
	}

	#[test]
	fn invalid_endpoint_is_rejected() {
		let err = IssuerConfig::from_lookup(lookup_from(&[(ENV_TOKEN_URL, "not a url")]))
			.expect_err("Invalid endpoint should be rejected.");

		assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
	}

	#[test]
	fn credentials_debug_redacts_password() {
		let credentials = IssuerCredentials::new("ops@example.com", "pw-123");
		let rendered = format!("{credentials:?}");

		assert!(rendered.contains("ops@example.com"));
		assert!(!rendered.contains("pw-123"));
	}
}
