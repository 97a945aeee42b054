use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use derive_more::Deref;
use derive_more::Display;
use sha2::Digest;
use sha2::Sha256;

use crate::ExecutionRequest;
use crate::ZmdResult;

/// Number of hex characters of the SHA-256 digest kept in a cache key.
pub const CACHE_KEY_LEN: usize = 16;

const CACHE_FILE_EXTENSION: &str = "txt";

/// Content address of an execution request.
///
/// The mode is part of the digest, so the same text used once with `run`
/// and once with `test` gets two entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, Display)]
pub struct CacheKey(String);

impl CacheKey {
	pub fn new(request: &ExecutionRequest) -> Self {
		let mut hasher = Sha256::new();
		hasher.update(request.mode.as_str().as_bytes());
		hasher.update(b"\0");
		hasher.update(request.body.as_bytes());
		let digest = format!("{:x}", hasher.finalize());
		Self(digest.chars().take(CACHE_KEY_LEN).collect())
	}
}

/// Storage for rendered reports, addressed by [`CacheKey`].
pub trait OutputCache {
	fn load(&self, key: &CacheKey) -> ZmdResult<Option<String>>;
	fn store(&mut self, key: &CacheKey, report: &str) -> ZmdResult<()>;
}

impl<C: OutputCache + ?Sized> OutputCache for Box<C> {
	fn load(&self, key: &CacheKey) -> ZmdResult<Option<String>> {
		(**self).load(key)
	}

	fn store(&mut self, key: &CacheKey, report: &str) -> ZmdResult<()> {
		(**self).store(key, report)
	}
}

/// One plain text file per entry: `<dir>/<key>.txt`.
///
/// The directory is created on the first store. Entries are never removed
/// by zmd; delete the directory to start over.
#[derive(Debug, Clone)]
pub struct DiskCache {
	dir: PathBuf,
}

impl DiskCache {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
		self.dir.join(format!("{key}.{CACHE_FILE_EXTENSION}"))
	}
}

impl OutputCache for DiskCache {
	fn load(&self, key: &CacheKey) -> ZmdResult<Option<String>> {
		let path = self.entry_path(key);
		match std::fs::read_to_string(&path) {
			Ok(report) => {
				tracing::debug!(path = %path.display(), "found cache file");
				Ok(Some(report))
			}
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(e.into()),
		}
	}

	fn store(&mut self, key: &CacheKey, report: &str) -> ZmdResult<()> {
		if !self.dir.exists() {
			std::fs::create_dir_all(&self.dir)?;
			tracing::info!(dir = %self.dir.display(), "created cache directory");
		}

		let path = self.entry_path(key);
		// Identical keys always carry identical reports, so renaming over an
		// entry written by a concurrent run is fine.
		let temp_path = path.with_extension(format!(
			"{CACHE_FILE_EXTENSION}.tmp-{}-{}",
			std::process::id(),
			SystemTime::now()
				.duration_since(UNIX_EPOCH)
				.map_or(0, |duration| duration.as_nanos())
		));

		std::fs::write(&temp_path, report)?;
		if let Err(e) = std::fs::rename(&temp_path, &path) {
			let _ = std::fs::remove_file(&temp_path);
			return Err(e.into());
		}

		tracing::debug!(path = %path.display(), "wrote cache file");
		Ok(())
	}
}

/// In-process cache, useful for tests and for runs that must not touch disk
/// but still want to deduplicate identical bodies.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
	entries: HashMap<CacheKey, String>,
}

impl MemoryCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl OutputCache for MemoryCache {
	fn load(&self, key: &CacheKey) -> ZmdResult<Option<String>> {
		Ok(self.entries.get(key).cloned())
	}

	fn store(&mut self, key: &CacheKey, report: &str) -> ZmdResult<()> {
		self.entries.insert(key.clone(), report.to_string());
		Ok(())
	}
}

/// Never hits, never stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl OutputCache for NoCache {
	fn load(&self, _key: &CacheKey) -> ZmdResult<Option<String>> {
		Ok(None)
	}

	fn store(&mut self, _key: &CacheKey, _report: &str) -> ZmdResult<()> {
		Ok(())
	}
}
