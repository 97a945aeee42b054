use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

/// Exit status for invalid invocations (`EX_USAGE`).
pub const EXIT_USAGE: i32 = 65;
/// Exit status for processing failures and stale `--check` runs.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Run the code blocks of a markdown book and splice their output back into the page.",
	long_about = "zmd reads a `*.z.md` source, runs its annotated zig fences through the \
	              toolchain, and writes a `*.md` page where every executed block is followed by \
	              the output it produced.\n\nQuick start:\n  zmd run intro.z.md          Render \
	              intro.md\n  zmd run intro.z.md --check  Fail when intro.md is out of date\n  \
	              zmd run intro.z.md --watch  Re-render on every change"
)]
pub struct ZmdCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
#[allow(clippy::struct_excessive_bools)]
pub enum Commands {
	/// Render a `*.z.md` document.
	///
	/// Every managed fence is echoed into the output. Executed blocks are
	/// followed by an `ansi` fence holding their stdout and stderr. Reports are
	/// cached by content, so unchanged blocks never run twice.
	Run {
		/// The source document. Relative paths are resolved against the
		/// project root.
		input: Option<PathBuf>,

		/// Write the rendered document here instead of next to the input.
		#[arg(long, short)]
		output: Option<PathBuf>,

		/// Run every block, neither reading nor writing the cache.
		#[arg(long, default_value_t = false)]
		no_cache: bool,

		/// Print the rendered document instead of writing it.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Compare the rendered document with the existing output and exit
		/// with a non-zero status when they differ.
		#[arg(long, default_value_t = false, conflicts_with = "dry_run")]
		check: bool,

		/// Re-render whenever a file next to the input changes.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
}
