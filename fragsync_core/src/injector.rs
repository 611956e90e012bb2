use std::io::BufRead;
use std::path::Path;

use crate::FragError;
use crate::FragResult;
use crate::FragmentStore;
use crate::PipeRegistry;
use crate::Warning;
use crate::WarningKind;
use crate::markers::InsertionPoint;
use crate::markers::is_insertion_end;
use crate::markers::match_insertion_start;
use crate::text::LineEnding;
use crate::text::content_lines;
use crate::text::source_lines;

/// Everything the injector reads besides the file itself.
#[derive(Debug, Clone, Copy)]
pub struct InjectContext<'a> {
	pub fragments: &'a FragmentStore,
	pub pipes: &'a PipeRegistry,
	/// Extra indentation added after the marker's own indent.
	pub indent_unit: &'a str,
}

/// The candidate output of one injector pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
	pub output: String,
	/// Number of insertion points that received a fragment. Zero means the
	/// file must be left alone.
	pub insertions: usize,
	pub warnings: Vec<Warning>,
}

enum InsertState {
	Outside,
	Inside { key: String, start_line: usize },
}

/// Rewrite the content read from `reader`, replacing the body of every
/// insertion block whose key is in the store.
///
/// Marker lines are always kept. Fragments are written right after their
/// opening marker and everything up to the closing marker is dropped. A
/// marker whose key is unknown opens nothing, so its old body and closing
/// marker are copied through untouched.
pub fn inject_fragments<R: BufRead>(
	reader: R,
	file: &Path,
	ctx: &InjectContext<'_>,
) -> FragResult<Injection> {
	let mut output = String::new();
	let mut insertions = 0;
	let mut warnings = Vec::new();
	let mut file_newline: Option<&'static str> = None;
	let mut state = InsertState::Outside;

	for (index, line) in source_lines(reader).enumerate() {
		let line = line?;
		let line_number = index + 1;
		// The first terminated line decides the line ending of the output.
		let newline = match (file_newline, line.ending) {
			(Some(existing), _) => existing,
			(None, LineEnding::Missing) => LineEnding::Lf.as_str(),
			(None, ending) => *file_newline.insert(ending.as_str()),
		};

		if matches!(state, InsertState::Inside { .. }) {
			if is_insertion_end(&line.text) {
				push_line(&mut output, &line.text, newline);
				state = InsertState::Outside;
			}
			continue;
		}

		push_line(&mut output, &line.text, newline);

		let Some(point) = match_insertion_start(&line.text) else {
			continue;
		};

		let Some(content) = ctx.fragments.get(point.key) else {
			warnings.push(Warning {
				file: file.to_path_buf(),
				line: line_number,
				kind: WarningKind::UndefinedFragment {
					key: point.key.to_string(),
				},
			});
			continue;
		};

		let effective = apply_pipe(&point, content, ctx, file, line_number, &mut warnings);
		push_fragment(&mut output, &point, &effective, ctx.indent_unit, newline);
		insertions += 1;
		state = InsertState::Inside {
			key: point.key.to_string(),
			start_line: line_number,
		};
	}

	if let InsertState::Inside { key, start_line } = state {
		return Err(FragError::UnterminatedInsertion {
			key,
			line: start_line,
		});
	}

	Ok(Injection {
		output,
		insertions,
		warnings,
	})
}

fn apply_pipe(
	point: &InsertionPoint<'_>,
	content: &str,
	ctx: &InjectContext<'_>,
	file: &Path,
	line_number: usize,
	warnings: &mut Vec<Warning>,
) -> String {
	let Some(spec) = point.pipe else {
		return content.to_string();
	};

	match ctx.pipes.get(spec.name()) {
		Some(pipe) => pipe.apply(content, spec.raw()),
		None => {
			warnings.push(Warning {
				file: file.to_path_buf(),
				line: line_number,
				kind: WarningKind::UnknownPipe {
					name: spec.name().to_string(),
				},
			});
			content.to_string()
		}
	}
}

fn push_line(output: &mut String, text: &str, newline: &str) {
	output.push_str(text);
	output.push_str(newline);
}

/// Write every line of `content` prefixed by the marker's indent and the
/// indent unit. Blank lines only get the marker's indent, without trailing
/// whitespace.
fn push_fragment(
	output: &mut String,
	point: &InsertionPoint<'_>,
	content: &str,
	indent_unit: &str,
	newline: &str,
) {
	for line in content_lines(content) {
		if line.is_empty() {
			output.push_str(point.indent.trim_end());
		} else {
			output.push_str(point.indent);
			output.push_str(indent_unit);
			output.push_str(line);
		}
		output.push_str(newline);
	}
}
