use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;

use derive_more::Display;

use crate::ZmdError;
use crate::ZmdResult;
use crate::config::ToolchainConfig;

/// How the toolchain is asked to handle a source body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Mode {
	#[display("run")]
	Run,
	#[display("test")]
	Test,
}

impl Mode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Run => "run",
			Self::Test => "test",
		}
	}
}

/// A complete source body and the mode to hand it over in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
	pub body: String,
	pub mode: Mode,
}

impl ExecutionRequest {
	pub fn new(body: impl Into<String>, mode: Mode) -> Self {
		Self {
			body: body.into(),
			mode,
		}
	}
}

/// Streams captured from a successful toolchain run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
	pub stdout: String,
	pub stderr: String,
}

impl ToolOutput {
	pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
		Self {
			stdout: stdout.into(),
			stderr: stderr.into(),
		}
	}

	/// Render the report placed inside the result fence.
	///
	/// This is not the raw output: a non-empty stream that lacks a trailing
	/// `\n` gets one, so each section and the closing fence start a line.
	///
	/// ```text
	/// $stdout:
	/// <stdout>
	/// $stderr returns nothing.
	/// ```
	pub fn render_report(&self) -> String {
		let mut report = String::new();
		push_stream(&mut report, "stdout", &self.stdout);
		push_stream(&mut report, "stderr", &self.stderr);
		report
	}
}

fn push_stream(report: &mut String, name: &str, content: &str) {
	if content.is_empty() {
		report.push_str(&format!("${name} returns nothing.\n"));
		return;
	}

	report.push_str(&format!("${name}:\n"));
	report.push_str(content);
	if !content.ends_with('\n') {
		report.push('\n');
	}
}

/// The external compiler or runtime.
///
/// Implementations must return [`ZmdError::ToolchainFailure`] when the
/// process reports a failure, so that nothing gets cached for it.
pub trait Toolchain {
	fn execute(&mut self, request: &ExecutionRequest) -> ZmdResult<ToolOutput>;
}

impl<T: Toolchain + ?Sized> Toolchain for Box<T> {
	fn execute(&mut self, request: &ExecutionRequest) -> ZmdResult<ToolOutput> {
		(**self).execute(request)
	}
}

/// Runs `<program> <mode args...> <source file>` for every request.
#[derive(Debug, Clone)]
pub struct ProcessToolchain {
	program: String,
	run_args: Vec<String>,
	test_args: Vec<String>,
	extension: String,
	scratch_dir: Option<PathBuf>,
	working_dir: PathBuf,
}

impl ProcessToolchain {
	/// Build the toolchain from config. Relative scratch directories resolve
	/// against `root`, which is also the working directory of the process.
	pub fn from_config(config: &ToolchainConfig, root: &Path) -> Self {
		Self {
			program: config.program.clone(),
			run_args: config.run_args.clone(),
			test_args: config.test_args.clone(),
			extension: config.extension.clone(),
			scratch_dir: config.scratch_dir.as_ref().map(|dir| root.join(dir)),
			working_dir: root.to_path_buf(),
		}
	}

	pub fn program(&self) -> &str {
		&self.program
	}

	fn mode_args(&self, mode: Mode) -> &[String] {
		match mode {
			Mode::Run => &self.run_args,
			Mode::Test => &self.test_args,
		}
	}

	fn materialize(&self, body: &str) -> ZmdResult<tempfile::NamedTempFile> {
		let suffix = format!(".{}", self.extension.trim_start_matches('.'));
		let mut builder = tempfile::Builder::new();
		builder.prefix("zmd-").suffix(&suffix);

		let mut file = match &self.scratch_dir {
			Some(dir) => {
				if !dir.exists() {
					std::fs::create_dir_all(dir)?;
					tracing::info!(dir = %dir.display(), "created scratch directory");
				}
				builder.tempfile_in(dir)?
			}
			None => builder.tempfile()?,
		};

		file.write_all(body.as_bytes())?;
		file.flush()?;
		Ok(file)
	}
}

impl Toolchain for ProcessToolchain {
	fn execute(&mut self, request: &ExecutionRequest) -> ZmdResult<ToolOutput> {
		let source = self.materialize(&request.body)?;
		let verb = match request.mode {
			Mode::Run => "executing",
			Mode::Test => "testing",
		};
		tracing::info!(file = %source.path().display(), "{verb} temporary source file");

		let output = Command::new(&self.program)
			.args(self.mode_args(request.mode))
			.arg(source.path())
			.current_dir(&self.working_dir)
			.output()
			.map_err(|e| {
				ZmdError::ToolchainSpawn {
					program: self.program.clone(),
					reason: e.to_string(),
				}
			})?;

		let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
		let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

		if !output.status.success() {
			let status = output
				.status
				.code()
				.map_or_else(|| "no exit code".to_string(), |code| format!("status {code}"));
			return Err(ZmdError::ToolchainFailure {
				mode: request.mode,
				status,
				stderr,
			});
		}

		Ok(ToolOutput { stdout, stderr })
	}
}
