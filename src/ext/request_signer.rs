//! Request signing contracts that attach the cached token to outbound API calls.

// crates.io
#[cfg(feature = "reqwest")]
use reqwest::{
	RequestBuilder,
	header::{AUTHORIZATION, HeaderValue, InvalidHeaderValue},
};
// self
use crate::auth::TokenSecret;

/// Describes how to attach a [`TokenSecret`] to an outbound request without constraining the
/// HTTP client type.
pub trait RequestSignerExt<Request, Error>
where
	Self: Send + Sync,
{
	/// Consumes the provided request and injects the authorization state derived from `token`.
	fn attach_token(&self, request: Request, token: &TokenSecret) -> Result<Request, Error>;
}

/// Signs reqwest requests through the `Authorization` header.
///
/// The default signer sends the bare token as the header value, which is what the OneMap APIs
/// expect. [`AuthorizationHeaderSigner::with_scheme`] prefixes a scheme such as `Bearer`.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizationHeaderSigner {
	scheme: Option<String>,
}
#[cfg(feature = "reqwest")]
impl AuthorizationHeaderSigner {
	/// Signer that prefixes `scheme` and a space before the token.
	pub fn with_scheme(scheme: impl Into<String>) -> Self {
		Self { scheme: Some(scheme.into()) }
	}

	/// Builds the sensitive header value for `token`.
	pub fn header_value(&self, token: &TokenSecret) -> Result<HeaderValue, InvalidHeaderValue> {
		let mut value = match &self.scheme {
			Some(scheme) => HeaderValue::from_str(&format!("{scheme} {}", token.expose()))?,
			None => HeaderValue::from_str(token.expose())?,
		};

		value.set_sensitive(true);

		Ok(value)
	}
}
#[cfg(feature = "reqwest")]
impl RequestSignerExt<RequestBuilder, InvalidHeaderValue> for AuthorizationHeaderSigner {
	fn attach_token(
		&self,
		request: RequestBuilder,
		token: &TokenSecret,
	) -> Result<RequestBuilder, InvalidHeaderValue> {
		Ok(request.header(AUTHORIZATION, self.header_value(token)?))
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::_prelude::*;

	#[test]
	fn default_signer_sends_the_bare_token() {
		let token = TokenSecret::new("eyJ.raw");
		let request = AuthorizationHeaderSigner::default()
			.attach_token(ReqwestClient::new().get("https://example.com/api"), &token)
			.expect("Signing should succeed.")
			.build()
			.expect("Request should build.");
		let header = request.headers().get(AUTHORIZATION).expect("Header should be present.");

		assert_eq!(header.to_str().expect("Header should be ASCII."), "eyJ.raw");
		assert!(header.is_sensitive());
	}

	#[test]
	fn scheme_is_prefixed_when_configured() {
		let token = TokenSecret::new("eyJ.raw");
		let value = AuthorizationHeaderSigner::with_scheme("Bearer")
			.header_value(&token)
			.expect("Header value should build.");

		assert_eq!(value.to_str().expect("Header should be ASCII."), "Bearer eyJ.raw");
	}

	#[test]
	fn control_characters_are_rejected() {
		let token = TokenSecret::new("bad\ntoken");

		assert!(AuthorizationHeaderSigner::default().header_value(&token).is_err());
	}
}
