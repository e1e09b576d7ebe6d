//! Transport primitives for the client-credentials token exchange.
//!
//! [`TokenHttpClient`] is the crate's only dependency on an HTTP stack. Implementations execute
//! one form-encoded POST and hand back the status, a parsed Retry-After hint, and the raw body;
//! interpreting the body stays with the provider so transports remain interchangeable.

// std
use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::header::{ACCEPT, HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::AuthError};

/// Boxed future returned by [`TokenHttpClient::post_form`].
pub type HttpFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AuthError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing the token exchange.
///
/// Implementations must be `Send + Sync + 'static` so one client can be shared across provider
/// instances behind an `Arc`, and the returned future must be `Send` for the lifetime of the
/// in-flight request. Token requests should not follow redirects, matching OAuth 2.0 guidance
/// that token endpoints return results directly instead of delegating to another URI.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes a form-encoded POST with `Accept: application/json`.
	fn post_form(&self, request: TokenEndpointRequest) -> HttpFuture<'_, TokenEndpointReply>;
}

/// Form-encoded POST dispatched to the token endpoint.
#[derive(Clone)]
pub struct TokenEndpointRequest {
	/// Fully assembled token endpoint URL.
	pub url: Url,
	/// Form fields in wire order; includes the client secret.
	pub form: Vec<(&'static str, String)>,
}
impl Debug for TokenEndpointRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenEndpointRequest")
			.field("url", &self.url.as_str())
			.field("form", &"<redacted>")
			.finish()
	}
}

/// Raw reply captured from the token endpoint.
#[derive(Clone, Debug)]
pub struct TokenEndpointReply {
	/// HTTP status code.
	pub status: u16,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl TokenEndpointReply {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Configure any custom [`ReqwestClient`] with a request timeout so the token exchange cannot
/// block unboundedly; the crate adds no timeout of its own.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
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
	fn post_form(&self, request: TokenEndpointRequest) -> HttpFuture<'_, TokenEndpointReply> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client
				.post(request.url)
				.header(ACCEPT, "application/json")
				.form(&request.form)
				.send()
				.await
				.map_err(AuthError::from)?;
			let status = response.status().as_u16();
			let retry_after = parse_retry_after(response.headers());
			let body = response.bytes().await.map_err(AuthError::from)?.to_vec();

			Ok(TokenEndpointReply { status, retry_after, body })
		})
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(secs as i64));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;

	fn headers(value: &str) -> HeaderMap {
		let mut map = HeaderMap::new();

		map.insert(RETRY_AFTER, value.parse().expect("Header fixture should be valid."));

		map
	}

	#[test]
	fn retry_after_parses_relative_seconds() {
		assert_eq!(parse_retry_after(&headers("120")), Some(Duration::seconds(120)));
	}

	#[test]
	fn retry_after_parses_http_dates_in_the_future() {
		let moment = OffsetDateTime::now_utc() + Duration::minutes(5);
		let formatted =
			moment.format(&Rfc2822).expect("Future instant should format as RFC 2822.");
		let parsed =
			parse_retry_after(&headers(&formatted)).expect("Future date should yield a hint.");

		assert!(parsed.is_positive());
		assert!(parsed <= Duration::minutes(5));
	}

	#[test]
	fn retry_after_ignores_garbage_and_past_dates() {
		assert_eq!(parse_retry_after(&headers("soon")), None);

		let moment = OffsetDateTime::now_utc() - Duration::minutes(5);
		let formatted = moment.format(&Rfc2822).expect("Past instant should format as RFC 2822.");

		assert_eq!(parse_retry_after(&headers(&formatted)), None);
	}

	#[test]
	fn request_debug_redacts_the_form() {
		let request = TokenEndpointRequest {
			url: Url::parse("https://login.microsoftonline.com/t1/oauth2/v2.0/token")
				.expect("URL fixture should parse."),
			form: vec![("client_secret", "hunter2".into())],
		};
		let rendered = format!("{request:?}");

		assert!(!rendered.contains("hunter2"));
		assert!(rendered.contains("<redacted>"));
	}
}
