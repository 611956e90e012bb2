use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum FragError {
	#[error(transparent)]
	#[diagnostic(code(fragsync::io_error))]
	Io(#[from] std::io::Error),

	#[error("could not find `end_code_fragment:` for fragment `{key}` started on line {line}")]
	#[diagnostic(
		code(fragsync::unterminated_fragment),
		help("add a `// end_code_fragment:` line after the fragment body")
	)]
	UnterminatedFragment { key: String, line: usize },

	#[error("could not find `<!-- end_code_fragment: -->` for insertion of `{key}` on line {line}")]
	#[diagnostic(
		code(fragsync::unterminated_insertion),
		help("add `<!-- end_code_fragment: -->` after the insertion marker")
	)]
	UnterminatedInsertion { key: String, line: usize },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(fragsync::config_parse),
		help("check that fragsync.toml is valid TOML with [extract], [insert], [exclude] and [pipes] sections")
	)]
	ConfigParse(String),

	#[error("invalid exclude pattern `{pattern}`: {reason}")]
	#[diagnostic(code(fragsync::invalid_pattern))]
	InvalidPattern { pattern: String, reason: String },

	#[error("file too large: `{path}` is {size} bytes (limit: {limit} bytes)")]
	#[diagnostic(
		code(fragsync::file_too_large),
		help("increase `max_file_size` in fragsync.toml or exclude this file")
	)]
	FileTooLarge { path: String, size: u64, limit: u64 },

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(fragsync::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },
}

pub type FragResult<T> = Result<T, FragError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
