//! Named text transforms applied to a fragment before it is inserted.
//!
//! An insertion marker may name one pipe:
//!
//! ```text
//! <!-- insert_code_fragment: example.hello | fenced:rust -->
//! <!-- end_code_fragment: -->
//! ```
//!
//! The pipe receives the fragment content and the full specifier
//! (`fenced:rust`), so it can parse its own argument.

use std::collections::HashMap;
use std::fmt;

use crate::text::content_lines;

/// A transform from fragment content to the text that gets inserted.
///
/// Any `Fn(&str, &str) -> String` closure is a pipe.
pub trait Pipe {
	/// Transform `content`. `arg` is the full pipe specifier, either `name` or
	/// `name:argument`.
	fn apply(&self, content: &str, arg: &str) -> String;
}

impl<F> Pipe for F
where
	F: Fn(&str, &str) -> String,
{
	fn apply(&self, content: &str, arg: &str) -> String {
		self(content, arg)
	}
}

/// Indents every line by four spaces. Useful in markdown when fenced code
/// blocks are not wanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndentPipe;

impl IndentPipe {
	pub const NAME: &'static str = "indent";
	const INDENT: &'static str = "    ";
}

impl Pipe for IndentPipe {
	fn apply(&self, content: &str, _arg: &str) -> String {
		let mut result = String::with_capacity(content.len() + Self::INDENT.len() * 8);
		for line in content_lines(content) {
			result.push_str(Self::INDENT);
			result.push_str(line);
			result.push('\n');
		}
		result
	}
}

/// Escapes `&`, `<`, `>` and `"` as HTML entities, for plain doc comments that
/// are rendered as HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlPipe;

impl HtmlPipe {
	pub const NAME: &'static str = "html";
}

impl Pipe for HtmlPipe {
	fn apply(&self, content: &str, _arg: &str) -> String {
		html_escape::encode_double_quoted_attribute(content).into_owned()
	}
}

/// Wraps content in a markdown code fence.
///
/// `fenced:js` produces a fence tagged `js`. Without an argument the default
/// language is used, which is empty unless configured.
#[derive(Debug, Clone, Default)]
pub struct CodeFencePipe {
	default_language: Option<String>,
}

impl CodeFencePipe {
	pub const NAME: &'static str = "fenced";

	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_default_language(language: impl Into<String>) -> Self {
		Self {
			default_language: Some(language.into()),
		}
	}

	fn language<'a>(&'a self, arg: &'a str) -> &'a str {
		match arg.split_once(':') {
			Some((_, language)) => language,
			None => self.default_language.as_deref().unwrap_or_default(),
		}
	}
}

impl Pipe for CodeFencePipe {
	fn apply(&self, content: &str, arg: &str) -> String {
		let language = self.language(arg);
		format!("```{language}\n{content}```\n")
	}
}

/// Wraps content in a `<pre>{@code ...}</pre>` block for Javadoc comments.
/// The leading `*` of each line comes from the insertion marker's indent.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaDocPipe;

impl JavaDocPipe {
	pub const NAME: &'static str = "javadoc";
}

impl Pipe for JavaDocPipe {
	fn apply(&self, content: &str, _arg: &str) -> String {
		format!("<pre>{{@code\n{content}}}</pre>\n")
	}
}

/// Mutable name → pipe mapping, seeded with the built-in pipes.
pub struct PipeRegistry {
	pipes: HashMap<String, Box<dyn Pipe>>,
}

impl PipeRegistry {
	/// A registry without any pipes.
	pub fn empty() -> Self {
		Self {
			pipes: HashMap::new(),
		}
	}

	/// A registry holding `indent`, `html`, `fenced` and `javadoc`. The
	/// `fenced` pipe uses `fence_language` when no language is given.
	pub fn with_builtins(fence_language: Option<&str>) -> Self {
		let fence = match fence_language {
			Some(language) => CodeFencePipe::with_default_language(language),
			None => CodeFencePipe::new(),
		};

		let mut registry = Self::empty();
		registry.put(IndentPipe::NAME, IndentPipe);
		registry.put(HtmlPipe::NAME, HtmlPipe);
		registry.put(CodeFencePipe::NAME, fence);
		registry.put(JavaDocPipe::NAME, JavaDocPipe);
		registry
	}

	pub fn get(&self, name: &str) -> Option<&dyn Pipe> {
		self.pipes.get(name).map(|pipe| &**pipe)
	}

	/// Add a pipe or replace the one registered under `name`.
	pub fn put(&mut self, name: impl Into<String>, pipe: impl Pipe + 'static) {
		self.pipes.insert(name.into(), Box::new(pipe));
	}

	/// Remove a pipe. Built-in pipes can be removed too.
	pub fn remove(&mut self, name: &str) -> Option<Box<dyn Pipe>> {
		self.pipes.remove(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.pipes.contains_key(name)
	}

	/// Registered names in sorted order.
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.pipes.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}
}

impl Default for PipeRegistry {
	fn default() -> Self {
		Self::with_builtins(None)
	}
}

impl fmt::Debug for PipeRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PipeRegistry")
			.field("pipes", &self.names())
			.finish()
	}
}
