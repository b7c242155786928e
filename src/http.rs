//! Transport primitives for issuer logins.
//!
//! The module exposes [`TokenHttpClient`] alongside [`HttpReply`] and [`ResponseMetadata`] so
//! downstream crates can plug in custom HTTP stacks (or counting fakes in tests) without
//! touching the cache logic. Implementations only move bytes: status classification and
//! payload parsing live in [`crate::issuer`].

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::{
	header::{ACCEPT, CONTENT_TYPE, HeaderMap, RETRY_AFTER},
	redirect::Policy,
};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Boxed future returned by [`TokenHttpClient::post_json`].
pub type HttpFuture<'a, E> = Pin<Box<dyn Future<Output = Result<HttpReply, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of posting the issuer login.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by
/// every caller of the cache, and the returned future must be `Send` so cache futures can hop
/// executors.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Posts `body` (already-encoded JSON) to `url` and returns the raw reply.
	///
	/// Non-success statuses are replies, not errors; only failures to obtain a reply at all
	/// (DNS, TCP, TLS, timeouts) belong in [`Self::TransportError`].
	fn post_json<'a>(
		&'a self,
		url: &'a Url,
		body: Vec<u8>,
	) -> HttpFuture<'a, Self::TransportError>;
}

/// Status information captured from the issuer reply for downstream error mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the token endpoint.
	pub status: u16,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Raw issuer reply.
#[derive(Clone, Debug)]
pub struct HttpReply {
	/// Status and retry hints.
	pub metadata: ResponseMetadata,
	/// Undecoded response body.
	pub body: Vec<u8>,
}
impl HttpReply {
	/// Creates a reply with the provided status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { metadata: ResponseMetadata { status, retry_after: None }, body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.metadata.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The issuer answers the login directly, so clients built by [`ReqwestHttpClient::with_timeout`]
/// never follow redirects. Bring a custom [`ReqwestClient`] through
/// [`ReqwestHttpClient::with_client`] to control TLS, proxies, or pooling.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose requests give up after `timeout`.
	///
	/// Without a timeout a login that never answers blocks the caller indefinitely.
	pub fn with_timeout(timeout: Duration) -> Result<Self, ConfigError> {
		let timeout = std::time::Duration::try_from(timeout).unwrap_or_default();
		let client = ReqwestClient::builder().timeout(timeout).redirect(Policy::none()).build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl TokenHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn post_json<'a>(&'a self, url: &'a Url, body: Vec<u8>) -> HttpFuture<'a, ReqwestError> {
		Box::pin(async move {
			let response = self
				.0
				.post(url.clone())
				.header(CONTENT_TYPE, "application/json")
				.header(ACCEPT, "application/json")
				.body(body)
				.send()
				.await?;
			let status = response.status().as_u16();
			let retry_after = parse_retry_after(response.headers());
			let body = response.bytes().await?.to_vec();

			Ok(HttpReply { metadata: ResponseMetadata { status, retry_after }, body })
		})
	}
}

#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn reply_success_covers_2xx_only() {
		assert!(HttpReply::new(200, "{}").is_success());
		assert!(HttpReply::new(204, "").is_success());
		assert!(!HttpReply::new(301, "").is_success());
		assert!(!HttpReply::new(401, "").is_success());
		assert!(!HttpReply::new(503, "").is_success());
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn retry_after_parses_delta_seconds() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, "120".parse().expect("Header value should parse."));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(120)));
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn retry_after_ignores_garbage_and_past_dates() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, "later".parse().expect("Header value should parse."));

		assert_eq!(parse_retry_after(&headers), None);

		headers.insert(
			RETRY_AFTER,
			"Wed, 21 Oct 2015 07:28:00 GMT".parse().expect("Header value should parse."),
		);

		assert_eq!(parse_retry_after(&headers), None);
		assert_eq!(parse_retry_after(&HeaderMap::new()), None);
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn timeout_client_builds() {
		let client = ReqwestHttpClient::with_timeout(Duration::seconds(5));

		assert!(client.is_ok());
	}
}
