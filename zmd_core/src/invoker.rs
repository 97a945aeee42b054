use crate::CacheKey;
use crate::ExecutionRequest;
use crate::OutputCache;
use crate::Toolchain;
use crate::ZmdResult;

/// Counters for one invoker, across every document it served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvocationStats {
	/// Toolchain processes started.
	pub invocations: usize,
	/// Requests answered from the cache.
	pub cache_hits: usize,
}

impl InvocationStats {
	/// Counters accumulated since `earlier` was taken.
	pub fn since(self, earlier: Self) -> Self {
		Self {
			invocations: self.invocations.saturating_sub(earlier.invocations),
			cache_hits: self.cache_hits.saturating_sub(earlier.cache_hits),
		}
	}
}

/// Runs requests through the toolchain at most once per distinct
/// (mode, body) pair, consulting and populating the cache.
#[derive(Debug)]
pub struct Invoker<T, C> {
	toolchain: T,
	cache: C,
	stats: InvocationStats,
}

impl<T: Toolchain, C: OutputCache> Invoker<T, C> {
	pub fn new(toolchain: T, cache: C) -> Self {
		Self {
			toolchain,
			cache,
			stats: InvocationStats::default(),
		}
	}

	/// Return the report for `request`, from the cache when possible.
	///
	/// A toolchain failure is returned as is and leaves the cache untouched.
	pub fn invoke(&mut self, request: &ExecutionRequest) -> ZmdResult<String> {
		let key = CacheKey::new(request);

		if let Some(report) = self.cache.load(&key)? {
			tracing::debug!(%key, mode = %request.mode, "reusing cached report");
			self.stats.cache_hits += 1;
			return Ok(report);
		}

		tracing::debug!(%key, mode = %request.mode, body = %request.body, "cache miss");
		self.stats.invocations += 1;
		let output = self.toolchain.execute(request)?;
		let report = output.render_report();
		tracing::debug!(%key, %report, "toolchain finished");

		self.cache.store(&key, &report)?;
		Ok(report)
	}

	pub fn stats(&self) -> InvocationStats {
		self.stats
	}

	pub fn toolchain(&self) -> &T {
		&self.toolchain
	}

	pub fn cache(&self) -> &C {
		&self.cache
	}

	pub fn into_parts(self) -> (T, C) {
		(self.toolchain, self.cache)
	}
}
