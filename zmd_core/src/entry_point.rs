use crate::ZmdError;
use crate::ZmdResult;

/// Program entry point wrapped around plain blocks so that short snippets can
/// be run without boilerplate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
	template: String,
}

impl EntryPoint {
	/// `template` is rendered with `minijinja`, with the block body bound to
	/// `code`.
	pub fn new(template: impl Into<String>) -> Self {
		Self {
			template: template.into(),
		}
	}

	pub fn template(&self) -> &str {
		&self.template
	}

	pub fn wrap(&self, code: &str) -> ZmdResult<String> {
		let mut env = minijinja::Environment::new();
		env.set_keep_trailing_newline(true);
		env.render_str(&self.template, minijinja::context! { code => code })
			.map_err(|e| ZmdError::Template(e.to_string()))
	}
}

impl Default for EntryPoint {
	fn default() -> Self {
		Self::new(crate::config::DEFAULT_ENTRY_POINT)
	}
}
