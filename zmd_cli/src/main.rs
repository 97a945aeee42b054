use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::CommandFactory;
use clap::Parser;
use clap::error::ErrorKind;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;
use zmd_cli::Commands;
use zmd_cli::EXIT_FAILURE;
use zmd_cli::EXIT_USAGE;
use zmd_cli::ZmdCli;
use zmd_core::ProcessOptions;
use zmd_core::ProcessReport;
use zmd_core::output_path_for;
use zmd_core::project::ProjectContext;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
}

/// Arguments of `zmd run` once the input is known.
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
struct RunArgs {
	input: PathBuf,
	output: Option<PathBuf>,
	no_cache: bool,
	dry_run: bool,
	check: bool,
	watch: bool,
}

fn main() {
	let args = match ZmdCli::try_parse() {
		Ok(args) => args,
		Err(error) => {
			match error.kind() {
				ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => error.exit(),
				_ => {
					let _ = error.print();
					process::exit(EXIT_USAGE);
				}
			}
		}
	};

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let run = match &args.command {
		Some(Commands::Run {
			input: Some(input),
			output,
			no_cache,
			dry_run,
			check,
			watch,
		}) => {
			RunArgs {
				input: input.clone(),
				output: output.clone(),
				no_cache: *no_cache,
				dry_run: *dry_run,
				check: *check,
				watch: *watch,
			}
		}
		Some(Commands::Run { input: None, .. }) => exit_with_usage("missing input file"),
		None => exit_with_usage("no subcommand specified"),
	};

	match run_command(&args, &run) {
		Ok(true) => process::exit(EXIT_FAILURE),
		Ok(false) => {}
		Err(e) => {
			report_error(e);
			process::exit(EXIT_FAILURE);
		}
	}
}

fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.init();
}

fn exit_with_usage(message: &str) -> ! {
	eprintln!("{} {message}", colored!("error:", red));
	eprintln!();
	eprintln!("{}", ZmdCli::command().render_usage());
	eprintln!();
	eprintln!("For more information, try '--help'.");
	process::exit(EXIT_USAGE);
}

fn report_error(e: Box<dyn std::error::Error>) {
	// Try to render through miette for rich diagnostics with help text
	// and error codes.
	match e.downcast::<zmd_core::ZmdError>() {
		Ok(zmd_err) => {
			let report: miette::Report = (*zmd_err).into();
			eprintln!("{report:?}");
		}
		Err(e) => {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

fn resolve_root(args: &ZmdCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Relative paths on the command line are taken from the project root.
fn resolve_against(root: &Path, path: &Path) -> PathBuf {
	if path.is_absolute() {
		path.to_path_buf()
	} else {
		root.join(path)
	}
}

/// Render once, then keep watching if asked. Returns whether a `--check`
/// found the output stale.
fn run_command(args: &ZmdCli, run: &RunArgs) -> Result<bool, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let is_stale = run_once(args, &root, run)?;

	if !run.watch {
		return Ok(is_stale);
	}

	watch(args, &root, run)?;
	Ok(false)
}

fn run_once(args: &ZmdCli, root: &Path, run: &RunArgs) -> Result<bool, Box<dyn std::error::Error>> {
	let project = ProjectContext::load(root)?;
	if let Some(config_path) = &project.config_path {
		tracing::debug!(path = %config_path.display(), "using config file");
	}

	let input = resolve_against(root, &run.input);
	let options = ProcessOptions {
		output: run.output.as_deref().map(|output| resolve_against(root, output)),
		dry_run: run.dry_run || run.check,
	};
	let mut invoker = project.invoker(run.no_cache);
	let report = project.process(&input, &options, &mut invoker)?;

	if run.check {
		return check_output(root, &report);
	}

	if run.dry_run {
		print!("{}", report.content);
		eprintln!("{}", summary(root, &report, "Dry run: would write"));
		return Ok(false);
	}

	println!("{}", summary(root, &report, "Rendered"));
	if args.verbose {
		println!("  from {}", make_relative(&report.input, root));
	}

	Ok(false)
}

fn summary(root: &Path, report: &ProcessReport, verb: &str) -> String {
	format!(
		"{verb} {} ({} block(s), {} run, {} cached).",
		make_relative(&report.output, root),
		report.managed_blocks,
		report.stats.invocations,
		report.stats.cache_hits,
	)
}

/// Compare the rendered document with what is on disk. A missing output
/// counts as stale.
fn check_output(root: &Path, report: &ProcessReport) -> Result<bool, Box<dyn std::error::Error>> {
	let rel = make_relative(&report.output, root);
	let current = match std::fs::read_to_string(&report.output) {
		Ok(current) => current,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
		Err(e) => return Err(e.into()),
	};

	if current == report.content {
		println!("{} {rel} is up to date.", colored!("ok:", green));
		return Ok(false);
	}

	eprintln!("{} {rel} is out of date.", colored!("stale:", yellow));
	print_diff(&current, &report.content);
	eprintln!();
	eprintln!(
		"Run `zmd run {}` to update it.",
		make_relative(&report.input, root)
	);

	Ok(true)
}

fn watch(args: &ZmdCli, root: &Path, run: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	// Notify reports canonical paths, so compare against canonical ones.
	let root = std::fs::canonicalize(root)?;
	let project = ProjectContext::load(&root)?;
	let input = resolve_against(&root, &run.input);
	let watch_dir = input
		.parent()
		.filter(|parent| !parent.as_os_str().is_empty())
		.map_or_else(|| root.clone(), Path::to_path_buf);

	// Our own writes must not retrigger a render.
	let output = match &run.output {
		Some(output) => resolve_against(&root, output),
		None => output_path_for(&input, &project.config.source_suffix)?,
	};
	let mut ignored = vec![output, project.cache_dir()];
	if let Some(scratch_dir) = &project.config.toolchain.scratch_dir {
		ignored.push(root.join(scratch_dir));
	}

	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				let relevant = event
					.paths
					.iter()
					.any(|path| !ignored.iter().any(|ignored| path.starts_with(ignored)));
				if relevant
					&& matches!(
						event.kind,
						notify::EventKind::Modify(_) | notify::EventKind::Create(_)
					) {
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&watch_dir, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, rendering...");
		if let Err(e) = run_once(args, &root, run) {
			report_error(e);
		}
	}
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
