use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::ZmdError;
use crate::ZmdResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["zmd.toml", ".zmd.toml", ".config/zmd.toml"];

/// Fence tag of managed blocks.
pub const DEFAULT_LANGUAGE: &str = "zig";
/// Fence tag of rendered result blocks.
pub const DEFAULT_RESULT_TAG: &str = "ansi";
/// Suffix of source documents. `page.z.md` renders to `page.md`.
pub const DEFAULT_SOURCE_SUFFIX: &str = ".z.md";
/// Directory of cached reports, relative to the project root.
pub const DEFAULT_CACHE_DIR: &str = ".zmd/cache";
/// Wrapper applied to plain blocks before they are run. `{{ code }}` is
/// replaced by the block body.
pub const DEFAULT_ENTRY_POINT: &str =
	"const std = @import(\"std\");\npub fn main() !void {\n {{ code }} \n}";

/// Configuration loaded from a `zmd.toml` file.
///
/// Every key is optional:
///
/// ```toml
/// language = "zig"
/// result_tag = "ansi"
/// source_suffix = ".z.md"
///
/// [toolchain]
/// program = "zig"
/// run_args = ["run"]
/// test_args = ["test"]
/// extension = "zig"
/// scratch_dir = ".zmd/tmp"
/// entry_point = """
/// const std = @import("std");
/// pub fn main() !void {
///     {{ code }}
/// }
/// """
///
/// [cache]
/// dir = ".zmd/cache"
/// enabled = true
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ZmdConfig {
	/// Info string tag that marks a fence as managed.
	#[serde(default = "default_language")]
	pub language: String,
	/// Info string tag of the rendered result fence.
	#[serde(default = "default_result_tag")]
	pub result_tag: String,
	/// Suffix stripped from the input path (and replaced with `.md`) to name
	/// the output.
	#[serde(default = "default_source_suffix")]
	pub source_suffix: String,
	/// How the external toolchain is invoked.
	#[serde(default)]
	pub toolchain: ToolchainConfig,
	/// Where rendered reports are cached.
	#[serde(default)]
	pub cache: CacheConfig,
}

/// The `[toolchain]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolchainConfig {
	/// Executable to run.
	#[serde(default = "default_program")]
	pub program: String,
	/// Arguments placed before the source file in run mode.
	#[serde(default = "default_run_args")]
	pub run_args: Vec<String>,
	/// Arguments placed before the source file in test mode.
	#[serde(default = "default_test_args")]
	pub test_args: Vec<String>,
	/// File extension of the temporary source file.
	#[serde(default = "default_extension")]
	pub extension: String,
	/// Directory for temporary source files, relative to the project root.
	/// The system temp directory is used when unset.
	#[serde(default)]
	pub scratch_dir: Option<PathBuf>,
	/// `minijinja` template wrapped around plain blocks.
	#[serde(default = "default_entry_point")]
	pub entry_point: String,
}

impl Default for ToolchainConfig {
	fn default() -> Self {
		Self {
			program: default_program(),
			run_args: default_run_args(),
			test_args: default_test_args(),
			extension: default_extension(),
			scratch_dir: None,
			entry_point: default_entry_point(),
		}
	}
}

/// The `[cache]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
	/// Cache directory, relative to the project root.
	#[serde(default = "default_cache_dir")]
	pub dir: PathBuf,
	/// When false, every block runs the toolchain and nothing is stored.
	#[serde(default = "default_true")]
	pub enabled: bool,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			dir: default_cache_dir(),
			enabled: true,
		}
	}
}

impl Default for ZmdConfig {
	fn default() -> Self {
		Self {
			language: default_language(),
			result_tag: default_result_tag(),
			source_suffix: default_source_suffix(),
			toolchain: ToolchainConfig::default(),
			cache: CacheConfig::default(),
		}
	}
}

fn default_language() -> String {
	DEFAULT_LANGUAGE.to_string()
}

fn default_result_tag() -> String {
	DEFAULT_RESULT_TAG.to_string()
}

fn default_source_suffix() -> String {
	DEFAULT_SOURCE_SUFFIX.to_string()
}

fn default_program() -> String {
	"zig".to_string()
}

fn default_run_args() -> Vec<String> {
	vec!["run".to_string()]
}

fn default_test_args() -> Vec<String> {
	vec!["test".to_string()]
}

fn default_extension() -> String {
	"zig".to_string()
}

fn default_entry_point() -> String {
	DEFAULT_ENTRY_POINT.to_string()
}

fn default_cache_dir() -> PathBuf {
	PathBuf::from(DEFAULT_CACHE_DIR)
}

fn default_true() -> bool {
	true
}

impl ZmdConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> ZmdResult<Option<ZmdConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;
		tracing::debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}

	/// Like [`ZmdConfig::load`], falling back to the defaults.
	pub fn load_or_default(root: &Path) -> ZmdResult<ZmdConfig> {
		Ok(Self::load(root)?.unwrap_or_default())
	}

	pub fn parse(content: &str) -> ZmdResult<ZmdConfig> {
		toml::from_str(content).map_err(|e| ZmdError::ConfigParse(e.to_string()))
	}
}
