//! Cached bearer token with its absolute expiry instant.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Bearer token paired with the instant it stops being valid.
///
/// The expiry comparison here is authoritative: a token is never treated as valid past
/// `expires_at`, even if the cache backend has not evicted the entry yet. This guards against
/// TTL granularity mismatches between the provider and the backing store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
	/// Bearer secret presented on Graph API calls.
	pub token: TokenSecret,
	/// Absolute expiry instant, serialized as Unix seconds.
	#[serde(with = "time::serde::timestamp")]
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Wraps a bearer value expiring at the provided instant.
	pub fn new(token: impl Into<String>, expires_at: OffsetDateTime) -> Self {
		Self { token: TokenSecret::new(token), expires_at }
	}

	/// Returns `true` once the provided instant has reached the expiry.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Remaining validity at the provided instant; negative once expired.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		self.expires_at - instant
	}

	/// Returns the bearer value. Callers must avoid logging it.
	pub fn bearer(&self) -> &str {
		self.token.expose()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn expiry_comparison_is_inclusive() {
		let expires = macros::datetime!(2025-01-01 01:00 UTC);
		let token = CachedToken::new("access", expires);

		assert!(!token.is_expired_at(macros::datetime!(2025-01-01 00:59 UTC)));
		assert!(token.is_expired_at(expires));
		assert!(token.is_expired_at(macros::datetime!(2025-01-01 01:01 UTC)));
	}

	#[test]
	fn remaining_goes_negative_after_expiry() {
		let expires = macros::datetime!(2025-01-01 01:00 UTC);
		let token = CachedToken::new("access", expires);

		assert_eq!(
			token.remaining_at(macros::datetime!(2025-01-01 00:30 UTC)),
			Duration::minutes(30)
		);
		assert!(token.remaining_at(macros::datetime!(2025-01-01 01:30 UTC)).is_negative());
	}

	#[test]
	fn serde_uses_unix_seconds() {
		let token = CachedToken::new("AAA", macros::datetime!(2025-01-01 00:00 UTC));
		let payload =
			serde_json::to_string(&token).expect("Cached token should serialize to JSON.");

		assert_eq!(payload, "{\"token\":\"AAA\",\"expires_at\":1735689600}");

		let round_trip: CachedToken =
			serde_json::from_str(&payload).expect("Serialized token should deserialize.");

		assert_eq!(round_trip, token);
	}
}
