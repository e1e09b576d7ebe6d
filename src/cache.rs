//! Cache contracts and built-in cache implementations for bearer tokens.
//!
//! The provider treats the cache as an externally-owned key-value store: it only ever reads and
//! writes the one [`CacheKey`] it owns and never assumes exclusive access to the backend.

pub mod file;
pub mod memory;

pub use file::FileCache;
pub use memory::MemoryCache;

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::CachedToken, config::Credentials};

/// Boxed future returned by [`TokenCache`] operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + 'a + Send>>;

/// Key-value contract implemented by token caches.
pub trait TokenCache
where
	Self: Send + Sync,
{
	/// Fetches the token stored under the key, if present and not yet evicted.
	fn get<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<CachedToken>>;

	/// Persists or replaces the token under the key with the provided time-to-live.
	fn put<'a>(
		&'a self,
		key: &'a CacheKey,
		token: CachedToken,
		ttl: Duration,
	) -> CacheFuture<'a, ()>;
}

/// Error type produced by [`TokenCache`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CacheError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Key a provider's token lives under.
///
/// Defaults to the fixed `onedrive_cache` constant. When several disks share one cache store,
/// [`CacheKey::for_credentials`] derives a collision-free key from the credential identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);
impl CacheKey {
	/// Key used when no override is supplied.
	pub const DEFAULT: &'static str = "onedrive_cache";

	/// Wraps a caller-chosen key.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Derives a key scoped to the tenant/client identity of the credentials.
	///
	/// The suffix is a base64 (no padding) SHA-256 digest, so the secret itself never
	/// contributes to the key material.
	pub fn for_credentials(credentials: &Credentials) -> Self {
		let mut hasher = Sha256::new();

		hasher.update(credentials.tenant_id().as_ref().as_bytes());
		hasher.update(b"\n");
		hasher.update(credentials.client_id().as_ref().as_bytes());

		let digest = STANDARD_NO_PAD.encode(hasher.finalize());

		Self(format!("{}:{digest}", Self::DEFAULT))
	}

	/// Returns the key as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Default for CacheKey {
	fn default() -> Self {
		Self(Self::DEFAULT.into())
	}
}
impl Display for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
