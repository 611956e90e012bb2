use std::io;
use std::io::BufRead;

/// The terminator that ended a line read from a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineEnding {
	Lf,
	CrLf,
	/// The last line of a file that does not end with a newline.
	Missing,
}

impl LineEnding {
	pub(crate) fn as_str(self) -> &'static str {
		match self {
			Self::CrLf => "\r\n",
			Self::Lf | Self::Missing => "\n",
		}
	}
}

/// A single line without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceLine {
	pub text: String,
	pub ending: LineEnding,
}

/// Iterator over the lines of a reader that remembers how each line was
/// terminated. `BufRead::lines` throws that information away, and the
/// injector needs it to write files back with their original line endings.
pub(crate) struct SourceLines<R> {
	reader: R,
}

impl<R: BufRead> Iterator for SourceLines<R> {
	type Item = io::Result<SourceLine>;

	fn next(&mut self) -> Option<Self::Item> {
		let mut text = String::new();
		match self.reader.read_line(&mut text) {
			Ok(0) => None,
			Ok(_) => {
				let ending = if text.ends_with("\r\n") {
					text.truncate(text.len() - 2);
					LineEnding::CrLf
				} else if text.ends_with('\n') {
					text.truncate(text.len() - 1);
					LineEnding::Lf
				} else {
					LineEnding::Missing
				};
				Some(Ok(SourceLine { text, ending }))
			}
			Err(e) => Some(Err(e)),
		}
	}
}

pub(crate) fn source_lines<R: BufRead>(reader: R) -> SourceLines<R> {
	SourceLines { reader }
}

/// Split fragment content into lines, dropping trailing empty lines.
///
/// `"a\n\nb\n\n"` yields `["a", "", "b"]` and an empty string yields no lines
/// at all.
pub fn content_lines(content: &str) -> Vec<&str> {
	let mut lines: Vec<&str> = content.lines().collect();
	while lines.last().is_some_and(|line| line.is_empty()) {
		lines.pop();
	}
	lines
}

/// Length in bytes of the longest common prefix of `a` and `b`, measured on
/// character boundaries.
pub fn common_prefix_len(a: &str, b: &str) -> usize {
	a.char_indices()
		.zip(b.chars())
		.find(|((_, left), right)| left != right)
		.map_or_else(|| a.len().min(b.len()), |((idx, _), _)| idx)
}
