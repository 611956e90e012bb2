use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;

use crate::FragError;
use crate::FragResult;
use crate::markers::is_fragment_end;
use crate::markers::match_fragment_start;
use crate::text::common_prefix_len;

/// A fragment definition found while scanning a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFragment {
	pub key: String,
	/// The lines between the markers, each stripped of its common prefix with
	/// the start marker's indent and terminated by `\n`.
	pub content: String,
	/// 1-indexed line number of the start marker.
	pub line: usize,
}

enum ExtractState {
	Outside,
	Inside {
		key: String,
		indent: String,
		start_line: usize,
		body: String,
	},
}

/// Scan `reader` for fragment definitions, in file order.
///
/// Text outside fragments is ignored. A start marker without a matching end
/// marker fails the whole scan, so callers never see a partial result for a
/// broken file.
pub fn extract_fragments<R: BufRead>(reader: R) -> FragResult<Vec<ExtractedFragment>> {
	let mut fragments = Vec::new();
	let mut state = ExtractState::Outside;

	for (index, text) in reader.lines().enumerate() {
		let text = text?;
		let line_number = index + 1;

		state = match state {
			ExtractState::Outside => {
				match match_fragment_start(&text) {
					Some(start) => {
						ExtractState::Inside {
							key: start.key.to_string(),
							indent: start.indent.to_string(),
							start_line: line_number,
							body: String::new(),
						}
					}
					None => ExtractState::Outside,
				}
			}
			ExtractState::Inside {
				key,
				indent,
				start_line,
				mut body,
			} => {
				if is_fragment_end(&text) {
					fragments.push(ExtractedFragment {
						key,
						content: body,
						line: start_line,
					});
					ExtractState::Outside
				} else {
					// Lines indented less than the marker keep what they have.
					let strip = common_prefix_len(&text, &indent);
					body.push_str(&text[strip..]);
					body.push('\n');
					ExtractState::Inside {
						key,
						indent,
						start_line,
						body,
					}
				}
			}
		};
	}

	if let ExtractState::Inside {
		key, start_line, ..
	} = state
	{
		return Err(FragError::UnterminatedFragment {
			key,
			line: start_line,
		});
	}

	Ok(fragments)
}

/// Open `path` and scan it for fragment definitions.
pub fn extract_fragments_from_file(path: &Path) -> FragResult<Vec<ExtractedFragment>> {
	let file = File::open(path)?;
	extract_fragments(BufReader::new(file))
}
