//! Token acquisition with caching + singleflight guards.
//!
//! [`TokenProvider::acquire`] returns a valid bearer token for a service principal. Each call
//! takes the provider's refresh guard, consults the cache, and only contacts Microsoft Entra
//! when the cached record is missing/expired/forced. The guard ensures concurrent callers
//! piggy-back on the same refresh instead of stampeding the token endpoint. One invocation
//! performs one cache read, at most one network call, and at most one cache write; a failed
//! exchange never writes to the cache.

mod metrics;
pub use metrics::AcquireMetrics;

// self
use crate::{
	_prelude::*,
	auth::CachedToken,
	cache::{CacheKey, TokenCache},
	config::Credentials,
	error::{AuthError, ConfigError},
	http::{TokenEndpointReply, TokenEndpointRequest, TokenHttpClient},
	obs::{self, AcquireOutcome, AcquireSpan},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Provider specialized for the crate's default reqwest transport.
pub type ReqwestTokenProvider = TokenProvider<ReqwestHttpClient>;

/// Microsoft Entra authority used when no override is supplied.
///
/// Sovereign-cloud deployments (for example `login.microsoftonline.us`) can override it via
/// [`TokenProvider::with_authority`].
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
/// OAuth scope requesting every statically consented Graph permission.
pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

const BODY_PREVIEW_LIMIT: usize = 256;

/// Acquires and caches bearer tokens for one service principal.
pub struct TokenProvider<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// HTTP client used for the token exchange.
	pub http_client: Arc<C>,
	/// Externally-owned cache the provider reads and writes one key of.
	pub cache: Arc<dyn TokenCache>,
	/// Validated credential triple.
	pub credentials: Credentials,
	/// Cache key the provider owns.
	pub cache_key: CacheKey,
	/// Shared counters for acquisition outcomes.
	pub acquire_metrics: Arc<AcquireMetrics>,
	authority: Option<Url>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<C> TokenProvider<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates a provider that reuses the caller-provided transport.
	pub fn with_http_client(
		cache: Arc<dyn TokenCache>,
		credentials: Credentials,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			cache,
			credentials,
			cache_key: CacheKey::default(),
			acquire_metrics: Default::default(),
			authority: None,
			refresh_guard: Arc::new(AsyncMutex::new(())),
		}
	}

	/// Overrides the cache key (defaults to [`CacheKey::DEFAULT`]).
	pub fn with_cache_key(mut self, key: CacheKey) -> Self {
		self.cache_key = key;

		self
	}

	/// Overrides the Entra authority, e.g. for sovereign clouds or tests.
	pub fn with_authority(mut self, authority: Url) -> Self {
		self.authority = Some(authority);

		self
	}

	/// Returns a valid bearer token, reusing the cached one when unexpired.
	pub async fn acquire(&self, request: AcquireRequest) -> Result<CachedToken> {
		let span = AcquireSpan::new("acquire");

		obs::record_acquire_outcome(AcquireOutcome::Attempt);
		self.acquire_metrics.record_attempt();

		let result = span
			.instrument(async move {
				let _singleflight = self.refresh_guard.lock().await;
				let now = OffsetDateTime::now_utc();

				if let Some(current) = <dyn TokenCache>::get(self.cache.as_ref(), &self.cache_key)
					.await
					.map_err(Error::from)?
					.filter(|token| !request.should_refresh(token, now))
				{
					obs::record_acquire_outcome(AcquireOutcome::CacheHit);
					self.acquire_metrics.record_cache_hit();

					return Ok(current);
				}

				let token = self.exchange(now).await?;
				let ttl = request.cache_ttl(&token, now);

				<dyn TokenCache>::put(self.cache.as_ref(), &self.cache_key, token.clone(), ttl)
					.await
					.map_err(Error::from)?;
				obs::record_acquire_outcome(AcquireOutcome::Refreshed);
				self.acquire_metrics.record_refresh();

				Ok(token)
			})
			.await;

		if result.is_err() {
			obs::record_acquire_outcome(AcquireOutcome::Failure);
			self.acquire_metrics.record_failure();
		}

		result
	}

	/// Convenience helper returning just the bearer secret for a default request.
	pub async fn access_token(&self) -> Result<crate::auth::TokenSecret> {
		Ok(self.acquire(AcquireRequest::default()).await?.token)
	}

	async fn exchange(&self, now: OffsetDateTime) -> Result<CachedToken> {
		let request = TokenEndpointRequest {
			url: self.token_endpoint()?,
			form: vec![
				("client_id", self.credentials.client_id().to_string()),
				("scope", GRAPH_DEFAULT_SCOPE.into()),
				("grant_type", "client_credentials".into()),
				("client_secret", self.credentials.client_secret().expose().into()),
			],
		};
		let reply = self.http_client.post_form(request).await?;

		if !reply.is_success() {
			return Err(AuthError::TokenEndpoint {
				message: describe_error_body(&reply.body),
				status: Some(reply.status),
				retry_after: reply.retry_after,
			}
			.into());
		}

		let response = parse_token_response(&reply)?;

		if response.expires_in <= 0 {
			return Err(AuthError::NonPositiveExpiresIn.into());
		}

		Ok(CachedToken::new(response.access_token, now + Duration::seconds(response.expires_in)))
	}

	fn token_endpoint(&self) -> Result<Url, ConfigError> {
		let authority = match &self.authority {
			Some(authority) => authority.clone(),
			None => Url::parse(DEFAULT_AUTHORITY)
				.map_err(|source| ConfigError::InvalidEndpoint { source })?,
		};

		authority
			.join(&format!("{}/oauth2/v2.0/token", self.credentials.tenant_id()))
			.map_err(|source| ConfigError::InvalidEndpoint { source })
	}
}
#[cfg(feature = "reqwest")]
impl TokenProvider<ReqwestHttpClient> {
	/// Creates a provider backed by the crate's default reqwest transport.
	pub fn new(cache: Arc<dyn TokenCache>, credentials: Credentials) -> Self {
		Self::with_http_client(cache, credentials, ReqwestHttpClient::default())
	}
}
impl<C> Clone for TokenProvider<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			cache: self.cache.clone(),
			credentials: self.credentials.clone(),
			cache_key: self.cache_key.clone(),
			acquire_metrics: self.acquire_metrics.clone(),
			authority: self.authority.clone(),
			refresh_guard: self.refresh_guard.clone(),
		}
	}
}
impl<C> Debug for TokenProvider<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenProvider")
			.field("credentials", &self.credentials)
			.field("cache_key", &self.cache_key)
			.finish()
	}
}

/// Per-call acquisition parameters.
#[derive(Clone, Debug)]
pub struct AcquireRequest {
	/// Forces cache bypass when true.
	pub force: bool,
	/// Window before expiry within which a token is already refreshed, and by which the cache
	/// TTL is shortened. Zero keeps the full token lifetime.
	pub safety_buffer: Duration,
}
impl AcquireRequest {
	const DEFAULT_SAFETY_BUFFER: Duration = Duration::ZERO;

	/// Creates a request with the default policy (no force, no safety buffer).
	pub fn new() -> Self {
		Self { force: false, safety_buffer: Self::DEFAULT_SAFETY_BUFFER }
	}

	/// Forces the provider to bypass the cache check.
	pub fn force_refresh(mut self) -> Self {
		self.force = true;

		self
	}

	/// Overrides the force flag.
	pub fn with_force(mut self, force: bool) -> Self {
		self.force = force;

		self
	}

	/// Overrides the safety buffer (negative values are clamped to zero).
	pub fn with_safety_buffer(mut self, buffer: Duration) -> Self {
		self.safety_buffer = if buffer.is_negative() { Duration::ZERO } else { buffer };

		self
	}

	/// Determines whether the cached token should be refreshed.
	pub fn should_refresh(&self, token: &CachedToken, now: OffsetDateTime) -> bool {
		if self.force || token.is_expired_at(now) {
			return true;
		}

		self.safety_buffer.is_positive() && token.remaining_at(now) <= self.safety_buffer
	}

	pub(crate) fn cache_ttl(&self, token: &CachedToken, now: OffsetDateTime) -> Duration {
		let ttl = token.remaining_at(now) - self.safety_buffer;

		if ttl.is_negative() { Duration::ZERO } else { ttl }
	}
}
impl Default for AcquireRequest {
	fn default() -> Self {
		Self::new()
	}
}

#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
	access_token: String,
	expires_in: i64,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorBody {
	error: Option<String>,
	error_description: Option<String>,
}

fn parse_token_response(reply: &TokenEndpointReply) -> Result<TokenEndpointResponse, AuthError> {
	let mut deserializer = serde_json::Deserializer::from_slice(&reply.body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| AuthError::ResponseParse { source, status: Some(reply.status) })
}

fn describe_error_body(body: &[u8]) -> String {
	let parsed = serde_json::from_slice::<TokenErrorBody>(body).unwrap_or_default();

	match (parsed.error_description, parsed.error) {
		(Some(description), _) => description,
		(None, Some(error)) => error,
		(None, None) => {
			let preview: String =
				String::from_utf8_lossy(body).chars().take(BODY_PREVIEW_LIMIT).collect();

			if preview.is_empty() { "no error details in response body".into() } else { preview }
		},
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::cache::MemoryCache;

	fn reply(status: u16, body: &str) -> TokenEndpointReply {
		TokenEndpointReply { status, retry_after: None, body: body.as_bytes().to_vec() }
	}

	fn token_expiring_at(expires_at: OffsetDateTime) -> CachedToken {
		CachedToken::new("access", expires_at)
	}

	#[test]
	fn should_refresh_covers_expiry_force_and_buffer() {
		let now = macros::datetime!(2025-06-01 12:00 UTC);
		let fresh = token_expiring_at(now + Duration::minutes(10));
		let expired = token_expiring_at(now - Duration::seconds(10));

		assert!(!AcquireRequest::new().should_refresh(&fresh, now));
		assert!(AcquireRequest::new().should_refresh(&expired, now));
		assert!(AcquireRequest::new().force_refresh().should_refresh(&fresh, now));
		assert!(
			AcquireRequest::new()
				.with_safety_buffer(Duration::minutes(15))
				.should_refresh(&fresh, now),
			"Tokens inside the safety buffer must be refreshed early."
		);
		assert!(
			!AcquireRequest::new()
				.with_safety_buffer(Duration::minutes(5))
				.should_refresh(&fresh, now)
		);
	}

	#[test]
	fn cache_ttl_is_shortened_by_the_buffer_and_clamped() {
		let now = macros::datetime!(2025-06-01 12:00 UTC);
		let token = token_expiring_at(now + Duration::seconds(3600));

		assert_eq!(AcquireRequest::new().cache_ttl(&token, now), Duration::seconds(3600));
		assert_eq!(
			AcquireRequest::new().with_safety_buffer(Duration::seconds(30)).cache_ttl(&token, now),
			Duration::seconds(3570)
		);

		let nearly_expired = token_expiring_at(now + Duration::seconds(10));

		assert_eq!(
			AcquireRequest::new()
				.with_safety_buffer(Duration::seconds(30))
				.cache_ttl(&nearly_expired, now),
			Duration::ZERO
		);
	}

	#[test]
	fn negative_safety_buffers_are_clamped() {
		let request = AcquireRequest::new().with_safety_buffer(Duration::seconds(-5));

		assert_eq!(request.safety_buffer, Duration::ZERO);
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn token_endpoint_targets_the_tenant() {
		let credentials = Credentials::new("t1", "c1", "s1")
			.expect("Credential fixture should be valid for endpoint test.");
		let provider =
			TokenProvider::new(Arc::new(MemoryCache::default()), credentials);
		let endpoint =
			provider.token_endpoint().expect("Default authority should produce a valid endpoint.");

		assert_eq!(
			endpoint.as_str(),
			"https://login.microsoftonline.com/t1/oauth2/v2.0/token"
		);
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn authority_override_is_honored() {
		let credentials = Credentials::new("t1", "c1", "s1")
			.expect("Credential fixture should be valid for authority test.");
		let provider = TokenProvider::new(Arc::new(MemoryCache::default()), credentials)
			.with_authority(
				Url::parse("https://login.microsoftonline.us").expect("Authority should parse."),
			);
		let endpoint =
			provider.token_endpoint().expect("Override authority should produce a valid endpoint.");

		assert_eq!(endpoint.as_str(), "https://login.microsoftonline.us/t1/oauth2/v2.0/token");
	}

	#[test]
	fn token_responses_require_both_fields() {
		let parsed = parse_token_response(&reply(
			200,
			"{\"access_token\":\"AAA\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
		))
		.expect("Well-formed response should parse.");

		assert_eq!(parsed.access_token, "AAA");
		assert_eq!(parsed.expires_in, 3600);

		let missing_expiry = parse_token_response(&reply(200, "{\"access_token\":\"AAA\"}"))
			.expect_err("Missing expires_in must be rejected.");

		assert!(missing_expiry.to_string().contains("invalid OAuth response"));
		assert!(parse_token_response(&reply(200, "[]")).is_err());
		assert!(parse_token_response(&reply(200, "not json")).is_err());
	}

	#[test]
	fn error_bodies_prefer_structured_fields() {
		assert_eq!(
			describe_error_body(
				b"{\"error\":\"invalid_client\",\"error_description\":\"AADSTS7000215\"}"
			),
			"AADSTS7000215"
		);
		assert_eq!(describe_error_body(b"{\"error\":\"invalid_client\"}"), "invalid_client");
		assert_eq!(describe_error_body(b"gateway timeout"), "gateway timeout");
		assert_eq!(describe_error_body(b""), "no error details in response body");
	}
}
