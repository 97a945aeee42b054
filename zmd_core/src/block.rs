use derive_more::Display;

use crate::Mode;

/// Identifier of a collection: a number, or the public `*` wildcard whose
/// fragments are prefixed onto every numbered collection of the same family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum CollectionId {
	#[display("{_0}")]
	Number(u64),
	#[display("*")]
	Public,
}

impl CollectionId {
	/// Parse the `<id>` part of a directive. Returns `None` for anything other
	/// than decimal digits or `*`.
	pub fn parse(raw: &str) -> Option<Self> {
		if raw == "*" {
			return Some(Self::Public);
		}

		if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
			return None;
		}

		raw.parse().ok().map(Self::Number)
	}

	pub fn is_public(self) -> bool {
		matches!(self, Self::Public)
	}
}

/// The two independent directive families. Ids are scoped per family, so
/// `collect_1` and `test_collect_1` never see each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Family {
	/// `collect_<id>` / `execute_<id>`.
	#[display("execute")]
	Run,
	/// `test_collect_<id>` / `test_<id>`.
	#[display("test")]
	Test,
}

impl Family {
	/// The toolchain mode used when a collection of this family is executed.
	pub fn mode(self) -> Mode {
		match self {
			Self::Run => Mode::Run,
			Self::Test => Mode::Test,
		}
	}
}

/// What a managed fence asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
	/// Wrapped in the configured entry point and run.
	Plain,
	/// Echoed only.
	Skip,
	/// Run verbatim, without the entry point wrapper.
	SingleFile,
	Collect(CollectionId),
	Execute(CollectionId),
	TestCollect(CollectionId),
	Test(CollectionId),
}

impl BlockKind {
	/// Family and id for the collect/execute/test directives.
	pub fn directive(self) -> Option<(Family, CollectionId)> {
		match self {
			Self::Collect(id) | Self::Execute(id) => Some((Family::Run, id)),
			Self::TestCollect(id) | Self::Test(id) => Some((Family::Test, id)),
			Self::Plain | Self::Skip | Self::SingleFile => None,
		}
	}
}

/// A managed fence while it is being read, and after it is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
	pub kind: BlockKind,
	/// Body lines, each terminated by `\n`.
	pub body: String,
	/// 0-indexed line of the opening fence.
	pub start_line: usize,
	/// Raw `{...}` annotation from the opening fence.
	pub highlight: Option<String>,
}

impl CodeBlock {
	pub fn new(kind: BlockKind, start_line: usize, highlight: Option<String>) -> Self {
		Self {
			kind,
			body: String::new(),
			start_line,
			highlight,
		}
	}

	pub fn push_line(&mut self, line: &str) {
		self.body.push_str(line);
		self.body.push('\n');
	}
}
