//! Line-anchored recognition of the four marker forms.
//!
//! Fragment definitions use line comments (`//` or `#`):
//!
//! ```text
//!    // start_code_fragment: my.fragment.id
//!    hello world
//!    // end_code_fragment:
//! ```
//!
//! Insertion points use HTML comments, optionally preceded by whitespace, `*`
//! or `>` so they work inside block comments and blockquotes:
//!
//! ```text
//!  * <!-- insert_code_fragment: my.fragment.id | fenced:rust -->
//!  * <!-- end_code_fragment: -->
//! ```
//!
//! Every pattern must match the whole line. A marker mentioned in prose is
//! ordinary text.

use std::sync::LazyLock;

use regex::Regex;

static FRAGMENT_START: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(\s*)(?://|#)\s?start_code_fragment:\s*([\w.]+)\s*$")
		.unwrap_or_else(|e| panic!("invalid fragment start pattern: {e}"))
});

static FRAGMENT_END: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^\s*(?://|#)\s?end_code_fragment:.*$")
		.unwrap_or_else(|e| panic!("invalid fragment end pattern: {e}"))
});

// Only one pipe is recognized per insertion marker. The pipe argument runs up
// to the closing `-->` and may contain spaces but not `|`.
static INSERTION_START: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^([\s*>]*)<!--\s*insert_code_fragment:\s*([\w.]+)\s*(?:\|\s*(\w+(?::[^|]*?)?)\s*)?-->\s*$",
	)
	.unwrap_or_else(|e| panic!("invalid insertion start pattern: {e}"))
});

static INSERTION_END: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[\s*>]*<!--\s*end_code_fragment:.*$")
		.unwrap_or_else(|e| panic!("invalid insertion end pattern: {e}"))
});

/// A matched `start_code_fragment:` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentStart<'a> {
	/// Leading whitespace of the marker line. Body lines are stripped of their
	/// common prefix with this baseline.
	pub indent: &'a str,
	/// The dotted fragment key.
	pub key: &'a str,
}

/// A matched `insert_code_fragment:` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPoint<'a> {
	/// Everything before `<!--`: whitespace, `*` and `>` characters.
	pub indent: &'a str,
	/// The dotted fragment key.
	pub key: &'a str,
	/// The pipe applied to the fragment before insertion, if any.
	pub pipe: Option<PipeSpec<'a>>,
}

/// A pipe specifier of the form `name` or `name:arg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipeSpec<'a> {
	raw: &'a str,
}

impl<'a> PipeSpec<'a> {
	pub fn new(raw: &'a str) -> Self {
		Self { raw }
	}

	/// The registry name: everything before the first `:`.
	pub fn name(&self) -> &'a str {
		self.raw.split_once(':').map_or(self.raw, |(name, _)| name)
	}

	/// The argument after the first `:`, if there is one. It is opaque to the
	/// grammar.
	pub fn arg(&self) -> Option<&'a str> {
		self.raw.split_once(':').map(|(_, arg)| arg)
	}

	/// The full specifier as written, handed to the pipe untouched.
	pub fn raw(&self) -> &'a str {
		self.raw
	}
}

pub fn match_fragment_start(line: &str) -> Option<FragmentStart<'_>> {
	let captures = FRAGMENT_START.captures(line)?;
	Some(FragmentStart {
		indent: captures.get(1).map_or("", |m| m.as_str()),
		key: captures.get(2)?.as_str(),
	})
}

pub fn is_fragment_end(line: &str) -> bool {
	FRAGMENT_END.is_match(line)
}

pub fn match_insertion_start(line: &str) -> Option<InsertionPoint<'_>> {
	let captures = INSERTION_START.captures(line)?;
	Some(InsertionPoint {
		indent: captures.get(1).map_or("", |m| m.as_str()),
		key: captures.get(2)?.as_str(),
		pipe: captures.get(3).map(|m| PipeSpec::new(m.as_str())),
	})
}

pub fn is_insertion_end(line: &str) -> bool {
	INSERTION_END.is_match(line)
}
