//! Cached credential record, freshness checks, and expiry coercion.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Bearer token plus the absolute expiry declared by the issuer at acquisition time.
///
/// Records are replaced wholesale on every refresh; nothing mutates a record in place.
#[derive(Clone, PartialEq, Eq)]
pub struct CachedCredential {
	/// Opaque bearer token; callers must avoid logging it.
	pub token: TokenSecret,
	/// Absolute UNIX time (seconds) after which the token is invalid. `0` means unknown.
	pub expiry_timestamp: i64,
	/// Wall-clock instant of the acquisition, when known. Diagnostic only.
	pub cached_at: Option<OffsetDateTime>,
}
impl CachedCredential {
	/// Creates a record without an acquisition timestamp (e.g. loaded from an older file).
	pub fn new(token: impl Into<String>, expiry_timestamp: i64) -> Self {
		Self { token: TokenSecret::new(token), expiry_timestamp, cached_at: None }
	}

	/// Creates a record stamped with the provided acquisition instant.
	pub fn acquired_at(
		token: impl Into<String>,
		expiry_timestamp: i64,
		instant: OffsetDateTime,
	) -> Self {
		Self { token: TokenSecret::new(token), expiry_timestamp, cached_at: Some(instant) }
	}

	/// Returns `true` if the token stays valid beyond `now + buffer`.
	pub fn is_fresh_at(&self, now: OffsetDateTime, buffer: Duration) -> bool {
		let horizon = now.unix_timestamp().saturating_add(buffer.whole_seconds());

		self.expiry_timestamp > horizon
	}

	/// Time left until the declared expiry, negative once the token has expired.
	pub fn remaining_at(&self, now: OffsetDateTime) -> Duration {
		Duration::seconds(self.expiry_timestamp.saturating_sub(now.unix_timestamp()))
	}

	/// Declared expiry as an instant, if the timestamp is representable.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		OffsetDateTime::from_unix_timestamp(self.expiry_timestamp).ok()
	}
}
impl Debug for CachedCredential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedCredential")
			.field("token", &"<redacted>")
			.field("expiry_timestamp", &self.expiry_timestamp)
			.field("cached_at", &self.cached_at)
			.finish()
	}
}

/// Coerces an issuer- or file-supplied expiry into integer epoch seconds.
///
/// Integers pass through, floats are truncated, and numeric strings are trimmed then parsed.
/// Everything else (booleans, objects, non-numeric strings, non-finite floats) yields `None`;
/// callers treat that as an expiry of `0`.
pub fn coerce_expiry(value: &Value) -> Option<i64> {
	match value {
		Value::Number(number) => number
			.as_i64()
			.or_else(|| number.as_u64().and_then(|n| i64::try_from(n).ok()))
			.or_else(|| number.as_f64().and_then(truncate_float)),
		Value::String(raw) => raw.trim().parse::<i64>().ok(),
		_ => None,
	}
}

fn truncate_float(value: f64) -> Option<i64> {
	if !value.is_finite() {
		return None;
	}

	let truncated = value.trunc();

	if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
		return None;
	}

	Some(truncated as i64)
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	use time::macros;
	// self
	use super::*;

	#[test]
	fn freshness_respects_buffer_boundary() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let buffer = Duration::hours(1);
		let base = now.unix_timestamp();

		assert!(CachedCredential::new("t", base + 7200).is_fresh_at(now, buffer));
		assert!(CachedCredential::new("t", base + 3601).is_fresh_at(now, buffer));
		assert!(!CachedCredential::new("t", base + 3600).is_fresh_at(now, buffer));
		assert!(!CachedCredential::new("t", base + 1800).is_fresh_at(now, buffer));
		assert!(!CachedCredential::new("t", base - 10).is_fresh_at(now, buffer));
		assert!(!CachedCredential::new("t", 0).is_fresh_at(now, buffer));
	}

	#[test]
	fn freshness_saturates_for_extreme_values() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);

		assert!(CachedCredential::new("t", i64::MAX).is_fresh_at(now, Duration::hours(1)));
		assert!(!CachedCredential::new("t", i64::MIN).is_fresh_at(now, Duration::ZERO));
	}

	#[test]
	fn remaining_and_expiry_helpers() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let record = CachedCredential::new("t", now.unix_timestamp() + 90);

		assert_eq!(record.remaining_at(now), Duration::seconds(90));
		assert_eq!(record.expires_at(), Some(macros::datetime!(2025-01-01 00:01:30 UTC)));
		assert!(record.cached_at.is_none());
	}

	#[test]
	fn coerce_expiry_accepts_numeric_forms() {
		assert_eq!(coerce_expiry(&json!(1_700_000_000)), Some(1_700_000_000));
		assert_eq!(coerce_expiry(&json!(1_700_000_000.9)), Some(1_700_000_000));
		assert_eq!(coerce_expiry(&json!("1700000000")), Some(1_700_000_000));
		assert_eq!(coerce_expiry(&json!(" 1700000000 ")), Some(1_700_000_000));
		assert_eq!(coerce_expiry(&json!(-5)), Some(-5));
	}

	#[test]
	fn coerce_expiry_rejects_other_forms() {
		assert_eq!(coerce_expiry(&json!("soon")), None);
		assert_eq!(coerce_expiry(&json!("17.5")), None);
		assert_eq!(coerce_expiry(&json!(true)), None);
		assert_eq!(coerce_expiry(&json!(null)), None);
		assert_eq!(coerce_expiry(&json!({ "at": 1 })), None);
		assert_eq!(coerce_expiry(&json!(u64::MAX)), None);
	}

	#[test]
	fn debug_redacts_token() {
		let record = CachedCredential::new("very-secret", 42);
		let rendered = format!("{record:?}");

		assert!(!rendered.contains("very-secret"));
		assert!(rendered.contains("42"));
	}
}
