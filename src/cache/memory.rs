//! Thread-safe in-memory [`TokenCache`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::CachedToken,
	cache::{CacheFuture, CacheKey, TokenCache},
};

type CacheMap = Arc<RwLock<HashMap<CacheKey, CacheEntry>>>;

#[derive(Clone, Debug)]
struct CacheEntry {
	token: CachedToken,
	evict_at: OffsetDateTime,
}

/// Thread-safe cache backend that keeps tokens in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache(CacheMap);
impl MemoryCache {
	fn get_now(map: CacheMap, key: CacheKey, now: OffsetDateTime) -> Option<CachedToken> {
		map.read().get(&key).filter(|entry| now < entry.evict_at).map(|entry| entry.token.clone())
	}

	fn put_now(map: CacheMap, key: CacheKey, token: CachedToken, ttl: Duration, now: OffsetDateTime) {
		map.write().insert(key, CacheEntry { token, evict_at: now + ttl });
	}
}
impl TokenCache for MemoryCache {
	fn get<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<CachedToken>> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Ok(Self::get_now(map, key, OffsetDateTime::now_utc())) })
	}

	fn put<'a>(
		&'a self,
		key: &'a CacheKey,
		token: CachedToken,
		ttl: Duration,
	) -> CacheFuture<'a, ()> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Ok(Self::put_now(map, key, token, ttl, OffsetDateTime::now_utc())) })
	}
}
