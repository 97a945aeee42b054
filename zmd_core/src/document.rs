use std::path::Path;
use std::path::PathBuf;

use crate::InvocationStats;
use crate::Invoker;
use crate::OutputCache;
use crate::RenderOptions;
use crate::Toolchain;
use crate::ZmdError;
use crate::ZmdResult;
use crate::transduce;

/// Per-file options for [`process_file`].
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
	/// Explicit output path. Derived from the input suffix when `None`.
	pub output: Option<PathBuf>,
	/// Render without writing the output file.
	pub dry_run: bool,
}

/// What happened to one document.
#[derive(Debug, Clone)]
pub struct ProcessReport {
	pub input: PathBuf,
	pub output: PathBuf,
	/// The rendered document.
	pub content: String,
	pub managed_blocks: usize,
	/// Toolchain runs and cache hits caused by this document alone.
	pub stats: InvocationStats,
	/// Whether `content` was written to `output`.
	pub written: bool,
}

/// Output path for `input`: the source suffix replaced by `.md`.
///
/// ```rust
/// use std::path::Path;
/// use zmd_core::output_path_for;
///
/// let output = output_path_for(Path::new("book/intro.z.md"), ".z.md").unwrap();
/// assert_eq!(output, Path::new("book/intro.md"));
/// ```
pub fn output_path_for(input: &Path, source_suffix: &str) -> ZmdResult<PathBuf> {
	let unrecognized = || {
		ZmdError::UnrecognizedSuffix {
			path: input.display().to_string(),
			suffix: source_suffix.to_string(),
		}
	};

	let file_name = input
		.file_name()
		.and_then(|name| name.to_str())
		.ok_or_else(unrecognized)?;
	let stem = file_name
		.strip_suffix(source_suffix)
		.filter(|stem| !stem.is_empty())
		.ok_or_else(unrecognized)?;

	Ok(input.with_file_name(format!("{stem}.md")))
}

/// Read `input`, run its managed blocks, and write the rendered document.
///
/// Nothing is written unless the whole document went through, so a failed
/// run never leaves a half-rendered output behind.
pub fn process_file<T: Toolchain, C: OutputCache>(
	input: &Path,
	source_suffix: &str,
	render: &RenderOptions,
	options: &ProcessOptions,
	invoker: &mut Invoker<T, C>,
) -> ZmdResult<ProcessReport> {
	let output = match &options.output {
		Some(output) => output.clone(),
		None => output_path_for(input, source_suffix)?,
	};

	tracing::info!(input = %input.display(), "processing");
	let source = std::fs::read_to_string(input)?;
	let before = invoker.stats();
	let document = transduce(&source, render, invoker)?;
	let stats = invoker.stats().since(before);

	let written = if options.dry_run {
		false
	} else {
		std::fs::write(&output, &document.content)?;
		tracing::info!(output = %output.display(), "saved markdown file");
		true
	};

	Ok(ProcessReport {
		input: input.to_path_buf(),
		output,
		content: document.content,
		managed_blocks: document.managed_blocks,
		stats,
		written,
	})
}
