use crate::BlockKind;
use crate::CollectionId;
use crate::ZmdError;
use crate::ZmdResult;

/// Marker that opens and closes every fence the transducer understands.
pub const FENCE: &str = "```";

/// Classification of a managed fence-opening line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceAnnotation {
	pub kind: BlockKind,
	/// The raw `{...}` highlight spec, echoed into the rendered fence.
	pub highlight: Option<String>,
}

/// Classify a fence-opening line.
///
/// Returns `Ok(None)` when the line is not a fence for `language` (such
/// lines pass through the document untouched). The info string after the
/// language tag is split on whitespace; the first `-collect_<id>`,
/// `-execute_<id>`, `-test_collect_<id>` or `-test_<id>` token decides the
/// kind, otherwise `-skip` and `-singleFile` are honoured and everything else
/// is a plain block.
///
/// `line_index` is 0-indexed and only used for the error raised when
/// `execute_*` or `test_*` tries to run the public fragment directly.
pub fn classify_fence(
	line: &str,
	language: &str,
	line_index: usize,
) -> ZmdResult<Option<FenceAnnotation>> {
	let Some(info) = line.strip_prefix(FENCE) else {
		return Ok(None);
	};
	let Some(rest) = info.strip_prefix(language) else {
		return Ok(None);
	};

	// `zigzag` is not a `zig` fence.
	if rest
		.chars()
		.next()
		.is_some_and(|ch| ch.is_alphanumeric() || ch == '_')
	{
		return Ok(None);
	}

	let (rest, highlight) = split_highlight(rest);
	let tokens: Vec<&str> = rest.split_whitespace().collect();

	let mut directive = None;
	for token in &tokens {
		if let Some(kind) = parse_directive(token, line_index)? {
			directive = Some(kind);
			break;
		}
	}

	if let Some(kind) = directive {
		if let Some((family, id)) = kind.directive() {
			let runs = matches!(kind, BlockKind::Execute(_) | BlockKind::Test(_));
			if runs && id.is_public() {
				return Err(ZmdError::WildcardExecution {
					family,
					line: line_index + 1,
				});
			}
		}

		return Ok(Some(FenceAnnotation { kind, highlight }));
	}

	for token in tokens
		.iter()
		.filter(|token| token.starts_with('-') && !matches!(**token, "-skip" | "-singleFile"))
	{
		tracing::warn!(line = line_index + 1, %token, "ignoring unknown fence modifier");
	}

	let kind = if tokens.contains(&"-skip") {
		BlockKind::Skip
	} else if tokens.contains(&"-singleFile") {
		BlockKind::SingleFile
	} else {
		BlockKind::Plain
	};

	Ok(Some(FenceAnnotation { kind, highlight }))
}

/// Whether `line` closes the currently open fence.
pub fn is_fence_close(line: &str) -> bool {
	line.trim_end() == FENCE
}

/// Split off the `{...}` annotation, spanning the first `{` to the last `}`.
fn split_highlight(info: &str) -> (String, Option<String>) {
	let (Some(open), Some(close)) = (info.find('{'), info.rfind('}')) else {
		return (info.to_string(), None);
	};

	if close < open {
		return (info.to_string(), None);
	}

	let highlight = info[open..=close].to_string();
	let remainder = format!("{}{}", &info[..open], &info[close + 1..]);
	(remainder, Some(highlight))
}

/// Recognise a directive token. `Ok(None)` leaves the token to the modifier
/// checks; an all-digit id that does not fit a `u64` is an error rather than
/// a plain block.
fn parse_directive(token: &str, line_index: usize) -> ZmdResult<Option<BlockKind>> {
	let Some(directive) = token.strip_prefix('-') else {
		return Ok(None);
	};

	// `test_collect_` has to be tried before `test_`.
	let table: [(&str, fn(CollectionId) -> BlockKind); 4] = [
		("collect_", BlockKind::Collect),
		("execute_", BlockKind::Execute),
		("test_collect_", BlockKind::TestCollect),
		("test_", BlockKind::Test),
	];

	for (prefix, build) in table {
		let Some(raw) = directive.strip_prefix(prefix) else {
			continue;
		};

		if let Some(id) = CollectionId::parse(raw) {
			return Ok(Some(build(id)));
		}

		if !raw.is_empty() && raw.bytes().all(|byte| byte.is_ascii_digit()) {
			return Err(ZmdError::CollectionIdOutOfRange {
				id: raw.to_string(),
				line: line_index + 1,
			});
		}
	}

	Ok(None)
}
