//! Crate-level error types shared by the provider, caches, and the disk factory.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Both [`ConfigError`] and [`AuthError`] are fatal to the operation that raised them; no retry
/// is attempted internally and a failed exchange never leaves partial state behind.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Cache-backend failure.
	#[error("{0}")]
	Cache(
		#[from]
		#[source]
		crate::cache::CacheError,
	),
	/// Local configuration problem, detected before any I/O.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token exchange failure.
	#[error(transparent)]
	Auth(#[from] AuthError),
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Credential field is missing, empty, or malformed.
	#[error(transparent)]
	Credential(#[from] crate::auth::CredentialError),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Token or Graph endpoint URL could not be assembled.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Token exchange failures.
///
/// Every variant aborts the current acquisition attempt without writing to the cache; callers
/// see the operation fail outright instead of falling back to a stale or unauthenticated mode.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Token endpoint answered with a non-success status.
	#[error("Token endpoint returned an OAuth error: {message}.")]
	TokenEndpoint {
		/// Provider-supplied `error_description`/`error` field, or a body preview.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with a body that is not the expected JSON mapping.
	#[error("Token endpoint returned an invalid OAuth response.")]
	ResponseParse {
		/// Structured parsing failure naming the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint returned a non-positive `expires_in`.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
}
impl AuthError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for AuthError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
