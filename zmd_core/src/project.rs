use std::path::Path;
use std::path::PathBuf;

use crate::DiskCache;
use crate::Invoker;
use crate::NoCache;
use crate::OutputCache;
use crate::ProcessOptions;
use crate::ProcessReport;
use crate::ProcessToolchain;
use crate::RenderOptions;
use crate::Toolchain;
use crate::ZmdConfig;
use crate::ZmdResult;
use crate::process_file;

/// The cache implementation chosen for a run.
pub type BoxedCache = Box<dyn OutputCache>;

/// Invoker backed by the real toolchain process.
pub type ProjectInvoker = Invoker<ProcessToolchain, BoxedCache>;

/// A project root together with its loaded configuration.
#[derive(Debug, Clone)]
pub struct ProjectContext {
	pub root: PathBuf,
	pub config: ZmdConfig,
	/// Path of the config file, when one was found.
	pub config_path: Option<PathBuf>,
}

impl ProjectContext {
	/// Load `zmd.toml` (or one of its alternatives) from `root`, falling back
	/// to the defaults when there is none.
	pub fn load(root: &Path) -> ZmdResult<Self> {
		let config_path = ZmdConfig::resolve_path(root);
		let config = ZmdConfig::load_or_default(root)?;

		Ok(Self {
			root: root.to_path_buf(),
			config,
			config_path,
		})
	}

	pub fn with_config(root: &Path, config: ZmdConfig) -> Self {
		Self {
			root: root.to_path_buf(),
			config,
			config_path: None,
		}
	}

	/// Absolute cache directory.
	pub fn cache_dir(&self) -> PathBuf {
		self.root.join(&self.config.cache.dir)
	}

	pub fn render_options(&self) -> RenderOptions {
		RenderOptions::from_config(&self.config)
	}

	/// Build the invoker for this project. The disk cache is skipped when
	/// `no_cache` is set or the config disables it.
	pub fn invoker(&self, no_cache: bool) -> ProjectInvoker {
		let toolchain = ProcessToolchain::from_config(&self.config.toolchain, &self.root);
		let cache: BoxedCache = if no_cache || !self.config.cache.enabled {
			Box::new(NoCache)
		} else {
			Box::new(DiskCache::new(self.cache_dir()))
		};

		Invoker::new(toolchain, cache)
	}

	/// Process a single document with the project's settings.
	pub fn process<T: Toolchain, C: OutputCache>(
		&self,
		input: &Path,
		options: &ProcessOptions,
		invoker: &mut Invoker<T, C>,
	) -> ZmdResult<ProcessReport> {
		process_file(
			input,
			&self.config.source_suffix,
			&self.render_options(),
			options,
			invoker,
		)
	}
}
