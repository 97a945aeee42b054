use crate::BlockKind;
use crate::CodeBlock;
use crate::CollectionId;
use crate::EntryPoint;
use crate::ExecutionRequest;
use crate::Family;
use crate::FragmentAccumulator;
use crate::Invoker;
use crate::Mode;
use crate::OutputCache;
use crate::Toolchain;
use crate::ZmdConfig;
use crate::ZmdError;
use crate::ZmdResult;
use crate::annotation::FENCE;
use crate::annotation::classify_fence;
use crate::annotation::is_fence_close;

/// How managed fences are recognised and rendered.
#[derive(Debug, Clone)]
pub struct RenderOptions {
	/// Info string tag of managed fences and of the echoed source fence.
	pub language: String,
	/// Info string tag of the result fence.
	pub result_tag: String,
	/// Wrapper for plain blocks.
	pub entry_point: EntryPoint,
}

impl RenderOptions {
	pub fn from_config(config: &ZmdConfig) -> Self {
		Self {
			language: config.language.clone(),
			result_tag: config.result_tag.clone(),
			entry_point: EntryPoint::new(config.toolchain.entry_point.clone()),
		}
	}
}

impl Default for RenderOptions {
	fn default() -> Self {
		Self::from_config(&ZmdConfig::default())
	}
}

/// Where the transducer is between two lines.
///
/// Unmanaged fences have no state of their own: their lines, including the
/// opening and closing markers, are copied while staying `Outside`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransducerState {
	Outside,
	/// Inside a managed fence; lines go into the block body.
	InManagedBlock(CodeBlock),
}

/// Output of a whole document pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransducedDocument {
	pub content: String,
	/// Managed fences seen, whatever their kind.
	pub managed_blocks: usize,
}

/// Line-driven state machine that rebuilds a document, running managed
/// blocks as their closing fence goes by.
///
/// Collections only ever refer backwards, so a single pass in document order
/// is enough, and results land exactly where their block was.
#[derive(Debug)]
pub struct Transducer {
	options: RenderOptions,
	state: TransducerState,
	accumulator: FragmentAccumulator,
	output: String,
	managed_blocks: usize,
}

impl Transducer {
	pub fn new(options: RenderOptions) -> Self {
		Self {
			options,
			state: TransducerState::Outside,
			accumulator: FragmentAccumulator::new(),
			output: String::new(),
			managed_blocks: 0,
		}
	}

	pub fn state(&self) -> &TransducerState {
		&self.state
	}

	pub fn accumulator(&self) -> &FragmentAccumulator {
		&self.accumulator
	}

	/// Everything emitted so far.
	pub fn output(&self) -> &str {
		&self.output
	}

	/// Feed the line at 0-indexed `line_index`, terminator included.
	///
	/// Unmanaged lines are copied byte for byte. The terminator (`\n` or
	/// `\r\n`) is ignored when recognising fences and dropped from managed
	/// block bodies.
	pub fn feed<T: Toolchain, C: OutputCache>(
		&mut self,
		line_index: usize,
		line: &str,
		invoker: &mut Invoker<T, C>,
	) -> ZmdResult<()> {
		let text = strip_terminator(line);

		match std::mem::replace(&mut self.state, TransducerState::Outside) {
			TransducerState::Outside => {
				match classify_fence(text, &self.options.language, line_index)? {
					Some(annotation) => {
						self.state = TransducerState::InManagedBlock(CodeBlock::new(
							annotation.kind,
							line_index,
							annotation.highlight,
						));
					}
					None => self.output.push_str(line),
				}
			}
			TransducerState::InManagedBlock(mut block) => {
				if is_fence_close(text) {
					self.close_block(block, invoker)?;
				} else {
					block.push_line(text);
					self.state = TransducerState::InManagedBlock(block);
				}
			}
		}

		Ok(())
	}

	/// End the pass. A managed fence that is still open is an error.
	pub fn finish(self) -> ZmdResult<TransducedDocument> {
		if let TransducerState::InManagedBlock(block) = &self.state {
			return Err(ZmdError::UnterminatedBlock {
				line: block.start_line + 1,
			});
		}

		Ok(TransducedDocument {
			content: self.output,
			managed_blocks: self.managed_blocks,
		})
	}

	fn close_block<T: Toolchain, C: OutputCache>(
		&mut self,
		block: CodeBlock,
		invoker: &mut Invoker<T, C>,
	) -> ZmdResult<()> {
		self.managed_blocks += 1;
		self.push_source_fence(&block);

		let kind = block.kind;
		match kind {
			BlockKind::Skip => {
				tracing::debug!(line = block.start_line + 1, "skipping block");
			}
			BlockKind::Collect(id) => self.accumulator.record_collect(Family::Run, id, block),
			BlockKind::TestCollect(id) => self.accumulator.record_collect(Family::Test, id, block),
			BlockKind::Execute(id) => self.run_collection(Family::Run, id, &block, invoker)?,
			BlockKind::Test(id) => self.run_collection(Family::Test, id, &block, invoker)?,
			BlockKind::Plain => {
				let body = self.options.entry_point.wrap(&block.body)?;
				let report = invoker.invoke(&ExecutionRequest::new(body, Mode::Run))?;
				self.push_result_fence(&report);
			}
			BlockKind::SingleFile => {
				let report = invoker.invoke(&ExecutionRequest::new(block.body, Mode::Run))?;
				self.push_result_fence(&report);
			}
		}

		Ok(())
	}

	/// Execute `public + collection + own body`, then drop the collection.
	fn run_collection<T: Toolchain, C: OutputCache>(
		&mut self,
		family: Family,
		id: CollectionId,
		block: &CodeBlock,
		invoker: &mut Invoker<T, C>,
	) -> ZmdResult<()> {
		let line = block.start_line + 1;
		if id.is_public() {
			return Err(ZmdError::WildcardExecution { family, line });
		}

		let collected = self.accumulator.resolve(family, id, line)?;
		let public = self.accumulator.resolve_public(family);
		let body = format!("{public}{collected}{}", block.body);

		let report = invoker.invoke(&ExecutionRequest::new(body, family.mode()))?;
		self.accumulator.consume(family, id);
		self.push_result_fence(&report);

		Ok(())
	}

	fn push_line(&mut self, line: &str) {
		self.output.push_str(line);
		self.output.push('\n');
	}

	fn push_source_fence(&mut self, block: &CodeBlock) {
		let opening = match &block.highlight {
			Some(highlight) => format!("{FENCE}{} {highlight}", self.options.language),
			None => format!("{FENCE}{}", self.options.language),
		};
		self.push_line(&opening);
		self.output.push_str(&block.body);
		self.push_line(FENCE);
	}

	fn push_result_fence(&mut self, report: &str) {
		self.output.push('\n');
		self.push_line(&format!("{FENCE}{}", self.options.result_tag));
		self.output.push_str(report);
		self.push_line(FENCE);
	}
}

/// Run a whole document through a fresh [`Transducer`].
pub fn transduce<T: Toolchain, C: OutputCache>(
	content: &str,
	options: &RenderOptions,
	invoker: &mut Invoker<T, C>,
) -> ZmdResult<TransducedDocument> {
	let mut transducer = Transducer::new(options.clone());
	for (line_index, line) in content.split_inclusive('\n').enumerate() {
		transducer.feed(line_index, line, invoker)?;
	}

	transducer.finish()
}

fn strip_terminator(line: &str) -> &str {
	let line = line.strip_suffix('\n').unwrap_or(line);
	line.strip_suffix('\r').unwrap_or(line)
}
