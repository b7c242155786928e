//! Issuer login: request encoding, failure classification, and response parsing.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{CachedCredential, coerce_expiry},
	config::IssuerConfig,
	error::{ConfigError, TransientError, TransportError},
	http::{HttpReply, TokenHttpClient},
	obs,
};

const BODY_PREVIEW_LIMIT: usize = 256;

#[derive(Serialize)]
struct LoginRequest<'a> {
	email: &'a str,
	password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
	#[serde(default)]
	access_token: Option<Value>,
	#[serde(default)]
	expiry_timestamp: Option<Value>,
}

/// Borrowed view over a transport + configuration pair that performs one login per call.
pub struct IssuerClient<'a, C>
where
	C: ?Sized + TokenHttpClient,
{
	http_client: &'a C,
	config: &'a IssuerConfig,
}
impl<'a, C> IssuerClient<'a, C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Wraps the transport and configuration used for the login.
	pub fn new(http_client: &'a C, config: &'a IssuerConfig) -> Self {
		Self { http_client, config }
	}

	/// Logs in and returns the freshly issued credential stamped with `now`.
	///
	/// Missing credentials fail before any request is sent. No retry is attempted.
	pub async fn request_token(&self, now: OffsetDateTime) -> Result<CachedCredential> {
		let credentials = self.config.require_credentials()?;
		let body = serde_json::to_vec(&LoginRequest {
			email: &credentials.email,
			password: credentials.password.expose(),
		})
		.map_err(ConfigError::from)?;
		let reply = self
			.http_client
			.post_json(&self.config.token_endpoint, body)
			.await
			.map_err(TransportError::network)?;

		parse_reply(reply, now)
	}
}

/// Classifies an issuer reply and extracts the credential it carries.
///
/// A present token with an absent or non-numeric expiry is still accepted; the expiry becomes
/// `0` so the credential is handed out once and refreshed on the next call.
pub fn parse_reply(reply: HttpReply, now: OffsetDateTime) -> Result<CachedCredential> {
	let status = reply.metadata.status;

	if !reply.is_success() {
		return Err(TransientError::TokenEndpoint {
			message: format!("status {status}: {}", body_preview(&reply.body)),
			status: Some(status),
			retry_after: reply.metadata.retry_after,
		}
		.into());
	}

	let mut deserializer = serde_json::Deserializer::from_slice(&reply.body);
	let response: LoginResponse = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| TransientError::TokenResponseParse { source, status: Some(status) })?;
	let token = match response.access_token {
		Some(Value::String(token)) if !token.is_empty() => token,
		Some(Value::String(_)) =>
			return Err(Error::InvalidResponse { reason: "access_token is empty".into() }),
		Some(Value::Null) | None =>
			return Err(Error::InvalidResponse { reason: "access_token is missing".into() }),
		Some(_) =>
			return Err(Error::InvalidResponse { reason: "access_token is not a string".into() }),
	};
	let expiry = response.expiry_timestamp.as_ref().and_then(coerce_expiry);

	if expiry.is_none() {
		obs::record_event(
			"issuer",
			"expiry_timestamp missing or not an integer; treating the token as immediately stale",
		);
	}

	Ok(CachedCredential::acquired_at(token, expiry.unwrap_or(0), now))
}

fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);
	let trimmed = text.trim();

	if trimmed.is_empty() {
		return "<empty body>".into();
	}

	trimmed.chars().take(BODY_PREVIEW_LIMIT).collect()
}
