use miette::Diagnostic;
use thiserror::Error;

use crate::CollectionId;
use crate::Family;
use crate::Mode;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum ZmdError {
	#[error(transparent)]
	#[diagnostic(code(zmd::io_error))]
	Io(#[from] std::io::Error),

	#[error("code block with {family} number {id} is not saved (line {line})")]
	#[diagnostic(
		code(zmd::unresolved_collection),
		help("collect fragments with id `{id}` above this directive before using it")
	)]
	UnresolvedCollection {
		family: Family,
		id: CollectionId,
		line: usize,
	},

	#[error("cannot {family} public code at line {line}")]
	#[diagnostic(
		code(zmd::wildcard_execution),
		help("public `*` fragments are prepended to every numbered block; use a numbered id instead")
	)]
	WildcardExecution { family: Family, line: usize },

	#[error("collection id `{id}` at line {line} is too large")]
	#[diagnostic(
		code(zmd::collection_id_out_of_range),
		help("collection ids must fit in an unsigned 64-bit integer")
	)]
	CollectionIdOutOfRange { id: String, line: usize },

	#[error("failed to start toolchain `{program}`: {reason}")]
	#[diagnostic(
		code(zmd::toolchain_spawn),
		help("check that the toolchain is installed or set `[toolchain] program` in zmd.toml")
	)]
	ToolchainSpawn { program: String, reason: String },

	#[error("toolchain `{mode}` exited with {status}:\n{stderr}")]
	#[diagnostic(code(zmd::toolchain_failure))]
	ToolchainFailure {
		mode: Mode,
		status: String,
		stderr: String,
	},

	#[error("code block opened at line {line} is never closed")]
	#[diagnostic(
		code(zmd::unterminated_block),
		help("add a closing ``` line after the block body")
	)]
	UnterminatedBlock { line: usize },

	#[error("input `{path}` does not end with `{suffix}`")]
	#[diagnostic(
		code(zmd::unrecognized_suffix),
		help("rename the source to `*{suffix}` or pass `--output` explicitly")
	)]
	UnrecognizedSuffix { path: String, suffix: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(zmd::config_parse),
		help("check that zmd.toml is valid TOML with [toolchain] and/or [cache] sections")
	)]
	ConfigParse(String),

	#[error("entry point template failed to render: {0}")]
	#[diagnostic(code(zmd::template_render))]
	Template(String),
}

pub type ZmdResult<T> = Result<T, ZmdError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
