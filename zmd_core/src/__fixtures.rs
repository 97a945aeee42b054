use std::collections::HashMap;

use crate::ExecutionRequest;
use crate::Invoker;
use crate::MemoryCache;
use crate::Mode;
use crate::ToolOutput;
use crate::Toolchain;
use crate::ZmdError;
use crate::ZmdResult;

/// Toolchain double that records every request. Unless a canned response is
/// registered for the body, it echoes the body back on stdout.
#[derive(Debug, Default)]
pub struct FakeToolchain {
	pub requests: Vec<ExecutionRequest>,
	responses: HashMap<String, ZmdResult<ToolOutput>>,
}

impl FakeToolchain {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn respond(mut self, body: &str, stdout: &str, stderr: &str) -> Self {
		self.responses
			.insert(body.to_string(), Ok(ToolOutput::new(stdout, stderr)));
		self
	}

	pub fn fail(mut self, body: &str, stderr: &str) -> Self {
		self.responses.insert(
			body.to_string(),
			Err(ZmdError::ToolchainFailure {
				mode: Mode::Run,
				status: "status 1".to_string(),
				stderr: stderr.to_string(),
			}),
		);
		self
	}

	pub fn bodies(&self) -> Vec<&str> {
		self.requests
			.iter()
			.map(|request| request.body.as_str())
			.collect()
	}
}

impl Toolchain for FakeToolchain {
	fn execute(&mut self, request: &ExecutionRequest) -> ZmdResult<ToolOutput> {
		self.requests.push(request.clone());

		match self.responses.remove(&request.body) {
			Some(response) => response,
			None => Ok(ToolOutput::new(request.body.clone(), "")),
		}
	}
}

pub fn fake_invoker(toolchain: FakeToolchain) -> Invoker<FakeToolchain, MemoryCache> {
	Invoker::new(toolchain, MemoryCache::new())
}

/// The default entry point applied to `code`.
pub fn wrapped(code: &str) -> String {
	format!("const std = @import(\"std\");\npub fn main() !void {{\n {code} \n}}")
}
