// std
use std::{env, fs, path::PathBuf, process};
// crates.io
use time::{Duration, OffsetDateTime};
// self
use onedrive_disk::{
	auth::CachedToken,
	cache::{CacheError, CacheKey, FileCache, MemoryCache, TokenCache},
};

fn temp_path(tag: &str) -> PathBuf {
	env::temp_dir().join(format!("onedrive-disk-{}-{tag}.json", process::id()))
}

#[tokio::test]
async fn memory_round_trip_returns_the_identical_token() {
	let cache = MemoryCache::default();
	let key = CacheKey::default();
	let token = CachedToken::new("round-trip", OffsetDateTime::now_utc() + Duration::hours(1));

	cache
		.put(&key, token.clone(), Duration::hours(1))
		.await
		.expect("Memory cache put should succeed.");

	let fetched = cache
		.get(&key)
		.await
		.expect("Memory cache get should succeed.")
		.expect("Entry should still be within its TTL.");

	assert_eq!(fetched.bearer(), token.bearer());
	assert_eq!(fetched.expires_at, token.expires_at);
}

#[tokio::test]
async fn file_cache_round_trips_and_survives_reopen() {
	let path = temp_path("reopen");
	let key = CacheKey::new("disk-main");
	let token = CachedToken::new("persisted", OffsetDateTime::now_utc() + Duration::hours(1));

	{
		let cache = FileCache::open(&path).expect("File cache should open at a fresh path.");

		cache
			.put(&key, token.clone(), Duration::hours(1))
			.await
			.expect("File cache put should succeed.");
	}

	let reopened = FileCache::open(&path).expect("File cache should reopen an existing snapshot.");
	let fetched = reopened
		.get(&key)
		.await
		.expect("File cache get should succeed.")
		.expect("Persisted entry should survive a reopen.");

	assert_eq!(fetched.bearer(), "persisted");

	let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn file_cache_honors_ttl_at_read_time() {
	let path = temp_path("ttl");
	let cache = FileCache::open(&path).expect("File cache should open at a fresh path.");
	let key = CacheKey::default();
	let token = CachedToken::new("gone", OffsetDateTime::now_utc() + Duration::hours(1));

	cache.put(&key, token, Duration::ZERO).await.expect("File cache put should succeed.");

	assert!(
		cache.get(&key).await.expect("File cache get should succeed.").is_none(),
		"Zero-TTL entries must never be served."
	);

	let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn file_cache_rejects_corrupt_snapshots() {
	let path = temp_path("corrupt");

	fs::write(&path, b"not json at all").expect("Corrupt fixture should be writable.");

	let err = FileCache::open(&path).expect_err("Corrupt snapshots must be rejected.");

	assert!(matches!(err, CacheError::Serialization { .. }));

	let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn caches_do_not_leak_across_keys() {
	let path = temp_path("keys");
	let cache = FileCache::open(&path).expect("File cache should open at a fresh path.");
	let token = CachedToken::new("scoped", OffsetDateTime::now_utc() + Duration::hours(1));

	cache
		.put(&CacheKey::new("disk-a"), token, Duration::hours(1))
		.await
		.expect("File cache put should succeed.");

	assert!(
		cache
			.get(&CacheKey::new("disk-b"))
			.await
			.expect("File cache get should succeed.")
			.is_none()
	);

	let _ = fs::remove_file(&path);
}
