use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::FragError;

/// The kind of a recoverable problem found while loading or writing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub enum WarningKind {
	/// A fragment key was defined again; the later definition replaced the
	/// earlier one.
	DuplicateFragment { key: String },
	/// An insertion marker references a key that is not in the store. The
	/// insertion block was left as it was.
	UndefinedFragment { key: String },
	/// An insertion marker names a pipe that is not registered. The fragment
	/// was inserted without it.
	UnknownPipe { name: String },
}

/// A recoverable problem tied to a line of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
	pub file: PathBuf,
	/// 1-indexed line number of the marker that caused the warning.
	pub line: usize,
	pub kind: WarningKind,
}

impl Warning {
	/// Human-readable message for this warning.
	pub fn message(&self) -> String {
		match &self.kind {
			WarningKind::DuplicateFragment { key } => {
				format!("fragment `{key}` was already defined, using content from this file")
			}
			WarningKind::UndefinedFragment { key } => {
				format!("undefined fragment `{key}` was not inserted")
			}
			WarningKind::UnknownPipe { name } => format!("unknown pipe `{name}`, skipping"),
		}
	}

	/// Emit this warning on the diagnostic channel.
	pub(crate) fn emit(&self) {
		let file = self.file.display().to_string();
		let message = self.message();
		match &self.kind {
			WarningKind::DuplicateFragment { key } | WarningKind::UndefinedFragment { key } => {
				tracing::warn!(
					file = file.as_str(),
					line = self.line,
					key = key.as_str(),
					"{message}"
				);
			}
			WarningKind::UnknownPipe { name } => {
				tracing::warn!(
					file = file.as_str(),
					line = self.line,
					pipe = name.as_str(),
					"{message}"
				);
			}
		}
	}
}

impl fmt::Display for Warning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}:{}: warning: {}",
			self.file.display(),
			self.line,
			self.message()
		)
	}
}

/// A file (or directory) that was abandoned. Other files were still processed.
#[derive(Debug)]
pub struct FileError {
	pub file: PathBuf,
	pub error: FragError,
}

impl FileError {
	pub(crate) fn new(file: impl Into<PathBuf>, error: impl Into<FragError>) -> Self {
		let file_error = Self {
			file: file.into(),
			error: error.into(),
		};
		tracing::error!(
			file = %file_error.file.display(),
			"{}",
			file_error.error
		);
		file_error
	}
}

impl fmt::Display for FileError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.file.display(), self.error)
	}
}

/// Result of extracting fragments from one or more roots.
#[derive(Debug, Default)]
pub struct LoadReport {
	/// Number of eligible files that were read.
	pub files_scanned: usize,
	/// Number of fragment definitions stored, counting redefinitions.
	pub fragments_loaded: usize,
	pub warnings: Vec<Warning>,
	pub errors: Vec<FileError>,
}

impl LoadReport {
	/// Returns true if no file had to be abandoned.
	pub fn is_ok(&self) -> bool {
		self.errors.is_empty()
	}

	pub fn has_warnings(&self) -> bool {
		!self.warnings.is_empty()
	}
}

/// A file whose content changed, or would change in a dry run.
#[derive(Debug, Clone)]
pub struct FileChange {
	pub file: PathBuf,
	/// Number of insertion points filled in this file.
	pub insertions: usize,
	/// The file content before the pass.
	pub original: String,
	/// The full new content of the file.
	pub updated: String,
}

/// Result of injecting fragments into one or more roots.
#[derive(Debug, Default)]
pub struct WriteReport {
	/// Number of eligible files that were read.
	pub files_scanned: usize,
	/// Files that were rewritten (or would be, in a dry run).
	pub written: Vec<FileChange>,
	/// Files with insertions whose content was already up to date.
	pub unchanged: Vec<PathBuf>,
	pub warnings: Vec<Warning>,
	pub errors: Vec<FileError>,
}

impl WriteReport {
	/// Returns true if no file had to be abandoned.
	pub fn is_ok(&self) -> bool {
		self.errors.is_empty()
	}

	pub fn has_warnings(&self) -> bool {
		!self.warnings.is_empty()
	}

	/// Returns true if at least one file was (or would be) rewritten.
	pub fn has_changes(&self) -> bool {
		!self.written.is_empty()
	}
}

/// Result of [`CodeFragments::update`](crate::CodeFragments::update).
#[derive(Debug, Default)]
pub struct UpdateReport {
	pub load: LoadReport,
	pub write: WriteReport,
}

impl UpdateReport {
	pub fn is_ok(&self) -> bool {
		self.load.is_ok() && self.write.is_ok()
	}

	pub fn has_warnings(&self) -> bool {
		self.load.has_warnings() || self.write.has_warnings()
	}

	/// All warnings, load phase first.
	pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
		self.load.warnings.iter().chain(&self.write.warnings)
	}

	/// All per-file errors, load phase first.
	pub fn errors(&self) -> impl Iterator<Item = &FileError> {
		self.load.errors.iter().chain(&self.write.errors)
	}
}
