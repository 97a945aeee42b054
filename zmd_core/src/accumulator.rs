use std::collections::HashMap;

use crate::CodeBlock;
use crate::CollectionId;
use crate::Family;
use crate::ZmdError;
use crate::ZmdResult;

/// Source text gathered for one collection id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
	pub body: String,
	/// Opening line of the block that created the entry.
	pub start_line: usize,
}

/// Collected fragments of one document, kept in two isolated maps so the
/// same id can be used independently by `collect`/`execute` and
/// `test_collect`/`test`.
#[derive(Debug, Default)]
pub struct FragmentAccumulator {
	run: HashMap<CollectionId, Fragment>,
	test: HashMap<CollectionId, Fragment>,
}

impl FragmentAccumulator {
	pub fn new() -> Self {
		Self::default()
	}

	fn entries(&self, family: Family) -> &HashMap<CollectionId, Fragment> {
		match family {
			Family::Run => &self.run,
			Family::Test => &self.test,
		}
	}

	fn entries_mut(&mut self, family: Family) -> &mut HashMap<CollectionId, Fragment> {
		match family {
			Family::Run => &mut self.run,
			Family::Test => &mut self.test,
		}
	}

	/// Merge a closed collect block into the entry for `id`.
	///
	/// The body is appended to an existing entry, unless that entry was
	/// created by a block starting on the same line. That is the same block
	/// seen again, and it replaces the entry instead of doubling it.
	pub fn record_collect(&mut self, family: Family, id: CollectionId, block: CodeBlock) {
		let line = block.start_line + 1;
		let entries = self.entries_mut(family);
		match entries.get_mut(&id) {
			Some(saved) if saved.start_line != block.start_line => {
				saved.body.push_str(&block.body);
			}
			_ => {
				entries.insert(
					id,
					Fragment {
						body: block.body,
						start_line: block.start_line,
					},
				);
			}
		}

		tracing::debug!(%family, %id, line, "collected fragment");
	}

	/// Body collected for `id`. `line` is the 1-indexed line of the directive
	/// and only feeds the error.
	pub fn resolve(&self, family: Family, id: CollectionId, line: usize) -> ZmdResult<&str> {
		self.entries(family)
			.get(&id)
			.map(|fragment| fragment.body.as_str())
			.ok_or(ZmdError::UnresolvedCollection { family, id, line })
	}

	/// Body of the public `*` collection, empty when none was recorded.
	pub fn resolve_public(&self, family: Family) -> &str {
		self.entries(family)
			.get(&CollectionId::Public)
			.map_or("", |fragment| fragment.body.as_str())
	}

	/// Drop a collection after it has been executed. The public collection
	/// is never removed.
	pub fn consume(&mut self, family: Family, id: CollectionId) -> Option<Fragment> {
		if id.is_public() {
			return None;
		}

		self.entries_mut(family).remove(&id)
	}

	pub fn get(&self, family: Family, id: CollectionId) -> Option<&Fragment> {
		self.entries(family).get(&id)
	}

	pub fn len(&self, family: Family) -> usize {
		self.entries(family).len()
	}

	pub fn is_empty(&self) -> bool {
		self.run.is_empty() && self.test.is_empty()
	}
}
