use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::FileError;
use crate::FragError;
use crate::FragResult;
use crate::SyncOptions;

/// Collect every regular file under `root` in sorted order.
///
/// A root that is a file is returned as-is. A root that does not exist yields
/// nothing. Directories that cannot be read are recorded in `errors` and the
/// walk carries on with their siblings. The caller decides which of the
/// returned files are eligible for a given pass.
pub fn collect_files(
	root: &Path,
	options: &SyncOptions,
	errors: &mut Vec<FileError>,
) -> FragResult<Vec<PathBuf>> {
	if root.is_file() {
		return Ok(vec![root.to_path_buf()]);
	}

	if !root.is_dir() {
		tracing::debug!(root = %root.display(), "root does not exist, skipping");
		return Ok(Vec::new());
	}

	let gitignore = if options.disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};
	let custom_exclude = build_exclude_matcher(root, &options.exclude_patterns)?;
	let matchers = Matchers {
		gitignore: &gitignore,
		custom_exclude: &custom_exclude,
	};

	let mut files = Vec::new();
	let mut visited = VisitedDirs::default();
	walk_dir(root, &matchers, &mut files, &mut visited, errors);
	files.sort();

	Ok(files)
}

struct Matchers<'a> {
	gitignore: &'a Gitignore,
	custom_exclude: &'a Gitignore,
}

impl Matchers<'_> {
	fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
		self.gitignore.matched(path, is_dir).is_ignore()
			|| self.custom_exclude.matched(path, is_dir).is_ignore()
	}
}

/// Build a `Gitignore` matcher from the `[exclude]` patterns, applied on top
/// of any `.gitignore` rules.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> FragResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			FragError::InvalidPattern {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
	}

	builder.build().map_err(|e| {
		FragError::InvalidPattern {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

/// Build a `Gitignore` matcher from the root's `.gitignore`, if there is one.
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.is_file() {
		if let Some(error) = builder.add(&gitignore_path) {
			tracing::warn!(path = %gitignore_path.display(), "ignoring malformed .gitignore: {error}");
		}
	}

	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

/// Canonical directory paths seen during one walk.
#[derive(Default)]
struct VisitedDirs {
	/// The chain of directories from the root down to the current one.
	ancestors: HashSet<PathBuf>,
	/// Every directory already walked. A symlink to one of these that is not an
	/// ancestor is skipped quietly so its files are not collected twice.
	walked: HashSet<PathBuf>,
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target"
}

fn walk_dir(
	dir: &Path,
	matchers: &Matchers<'_>,
	files: &mut Vec<PathBuf>,
	visited: &mut VisitedDirs,
	errors: &mut Vec<FileError>,
) {
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	// Only a link back to an ancestor is a cycle.
	if visited.ancestors.contains(&canonical) {
		errors.push(FileError::new(
			dir,
			FragError::SymlinkCycle {
				path: dir.display().to_string(),
			},
		));
		return;
	}

	if !visited.walked.insert(canonical.clone()) {
		tracing::debug!(dir = %dir.display(), "directory already walked, skipping");
		return;
	}

	visited.ancestors.insert(canonical.clone());
	walk_entries(dir, matchers, files, visited, errors);
	visited.ancestors.remove(&canonical);
}

fn walk_entries(
	dir: &Path,
	matchers: &Matchers<'_>,
	files: &mut Vec<PathBuf>,
	visited: &mut VisitedDirs,
	errors: &mut Vec<FileError>,
) {
	let entries = match std::fs::read_dir(dir) {
		Ok(entries) => entries,
		Err(error) => {
			errors.push(FileError::new(dir, error));
			return;
		}
	};

	for entry in entries {
		let path = match entry {
			Ok(entry) => entry.path(),
			Err(error) => {
				errors.push(FileError::new(dir, error));
				continue;
			}
		};
		let is_dir = path.is_dir();

		if is_dir
			&& path
				.file_name()
				.and_then(|name| name.to_str())
				.is_some_and(is_ignored_directory_name)
		{
			continue;
		}

		if matchers.is_ignored(&path, is_dir) {
			continue;
		}

		if is_dir {
			walk_dir(&path, matchers, files, visited, errors);
		} else if path.is_file() {
			files.push(path);
		}
	}
}
