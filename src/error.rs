//! Cache-level error types shared by the issuer client, the stores, and the cache itself.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Any `Err` from [`CredentialCache::get_token`](crate::cache::CredentialCache::get_token) means
/// no usable token could be produced; consumers usually answer with "service unavailable".
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure; the next call may succeed.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Issuer answered successfully but the payload lacks a usable token.
	#[error("Issuer response is unusable: {reason}.")]
	InvalidResponse {
		/// Human-readable description of the missing or invalid field.
		reason: String,
	},
}
impl Error {
	/// Returns `true` when repeating the call later may succeed without operator action.
	pub fn is_retryable(&self) -> bool {
		!matches!(self, Self::Config(_))
	}
}

/// Configuration failures raised before any network traffic.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Issuer email or password is not configured.
	#[error("Issuer credentials (email/password) are not configured.")]
	MissingCredentials,
	/// Configured token endpoint is not a valid URL.
	#[error("Token endpoint `{value}` is not a valid URL.")]
	InvalidEndpoint {
		/// Raw value that failed to parse.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Login payload could not be encoded.
	#[error("Issuer request body could not be encoded.")]
	RequestEncode(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Temporary failure variants (safe to retry on a later call).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Issuer returned a non-success status.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Summary of the failure, including a short body preview when available.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Issuer responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn configuration_errors_are_not_retryable() {
		let err: Error = ConfigError::MissingCredentials.into();

		assert!(!err.is_retryable());
		assert_eq!(err.to_string(), "Issuer credentials (email/password) are not configured.");
	}

	#[test]
	fn upstream_errors_are_retryable() {
		let transient: Error = TransientError::TokenEndpoint {
			message: "status 503".into(),
			status: Some(503),
			retry_after: None,
		}
		.into();
		let transport: Error =
			TransportError::Io(std::io::Error::other("connection reset")).into();
		let invalid = Error::InvalidResponse { reason: "missing access_token".into() };

		assert!(transient.is_retryable());
		assert!(transport.is_retryable());
		assert!(invalid.is_retryable());
	}
}
