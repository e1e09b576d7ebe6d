//! Simple file-backed [`TokenCache`] for single-process deployments that should survive
//! restarts without re-running the token exchange.
//!
//! Tokens are written to disk in plaintext JSON; deployments with stricter at-rest
//! requirements should supply their own [`TokenCache`] backend.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::CachedToken,
	cache::{CacheError, CacheFuture, CacheKey, TokenCache},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct FileEntry {
	token: CachedToken,
	#[serde(with = "time::serde::timestamp")]
	evict_at: OffsetDateTime,
}

/// Persists cached tokens to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileCache {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<CacheKey, FileEntry>>>,
}
impl FileCache {
	/// Opens (or creates) a cache at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = if path.exists() { Self::load_snapshot(&path)? } else { HashMap::new() };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<CacheKey, FileEntry>, CacheError> {
		let metadata = path.metadata().map_err(|e| CacheError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| CacheError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;
		let entries: Vec<(CacheKey, FileEntry)> =
			serde_json::from_slice(&bytes).map_err(|e| CacheError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(entries.into_iter().collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), CacheError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| CacheError::Backend {
				message: format!("Failed to create cache directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &HashMap<CacheKey, FileEntry>) -> Result<(), CacheError> {
		Self::ensure_parent_exists(&self.path)?;

		let snapshot: Vec<_> = contents.iter().collect();
		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| CacheError::Serialization {
				message: format!("Failed to serialize cache snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| CacheError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| CacheError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| CacheError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| CacheError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl TokenCache for FileCache {
	fn get<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<CachedToken>> {
		Box::pin(async move {
			let now = OffsetDateTime::now_utc();

			Ok(self
				.inner
				.read()
				.get(key)
				.filter(|entry| now < entry.evict_at)
				.map(|entry| entry.token.clone()))
		})
	}

	fn put<'a>(
		&'a self,
		key: &'a CacheKey,
		token: CachedToken,
		ttl: Duration,
	) -> CacheFuture<'a, ()> {
		Box::pin(async move {
			let evict_at = OffsetDateTime::now_utc() + ttl;
			let mut guard = self.inner.write();

			guard.insert(key.to_owned(), FileEntry { token, evict_at });
			self.persist_locked(&guard)?;

			Ok(())
		})
	}
}
