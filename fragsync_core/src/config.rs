use std::path::Path;
use std::path::PathBuf;

use ignore::gitignore::GitignoreBuilder;
use serde::Deserialize;

use crate::FragError;
use crate::FragResult;

/// Default maximum file size in bytes (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Indentation added after an insertion marker's own indent.
pub const DEFAULT_INDENT: &str = "    ";

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"fragsync.toml",
	".fragsync.toml",
	".config/fragsync.toml",
];

/// File name suffixes scanned for fragment definitions by default.
pub const DEFAULT_EXTRACT_SUFFIXES: [&str; 4] = [".md", ".rs", ".java", "build.gradle"];

/// File name suffixes scanned for insertion points by default.
pub const DEFAULT_INSERT_SUFFIXES: [&str; 3] = [".md", ".rs", ".java"];

/// Configuration loaded from a `fragsync.toml` file.
///
/// ```toml
/// indent = "    "
/// max_file_size = 10485760
/// disable_gitignore = false
///
/// [extract]
/// suffixes = [".md", ".rs", ".java", "build.gradle"]
///
/// [insert]
/// suffixes = [".md", ".rs", ".java"]
///
/// [exclude]
/// patterns = ["vendor/", "*.generated.md"]
///
/// [pipes]
/// fence_language = "rust"
/// ```
#[derive(Debug, Deserialize)]
pub struct FragsyncConfig {
	/// Indentation added after an insertion marker's own indent. Defaults to
	/// four spaces.
	#[serde(default)]
	pub indent: Option<String>,
	/// Files scanned for fragment definitions.
	#[serde(default)]
	pub extract: SuffixConfig,
	/// Files scanned for insertion points.
	#[serde(default)]
	pub insert: SuffixConfig,
	/// Exclusion configuration using gitignore-style patterns.
	#[serde(default)]
	pub exclude: ExcludeConfig,
	/// Settings for the built-in pipes.
	#[serde(default)]
	pub pipes: PipesConfig,
	/// Maximum file size in bytes to process. Larger files are reported and
	/// skipped. Defaults to 10 MB.
	#[serde(default = "default_max_file_size")]
	pub max_file_size: u64,
	/// When true, `.gitignore` files are not used for filtering.
	#[serde(default)]
	pub disable_gitignore: bool,
}

/// A list of file name suffixes. `None` keeps the built-in defaults.
#[derive(Debug, Default, Deserialize)]
pub struct SuffixConfig {
	#[serde(default)]
	pub suffixes: Option<Vec<String>>,
}

/// Configuration for excluding files and directories from walking.
///
/// Patterns follow gitignore syntax and are applied on top of any `.gitignore`
/// rules (unless `disable_gitignore` is set).
#[derive(Debug, Default, Deserialize)]
pub struct ExcludeConfig {
	/// Gitignore-style patterns relative to each walked root.
	///
	/// Examples: `"build/"`, `"*.generated.md"`, `"!important.md"`.
	#[serde(default)]
	pub patterns: Vec<String>,
}

/// Configuration for the built-in pipes.
#[derive(Debug, Default, Deserialize)]
pub struct PipesConfig {
	/// Language tag used by `fenced` when the marker gives none.
	#[serde(default)]
	pub fence_language: Option<String>,
}

fn default_max_file_size() -> u64 {
	DEFAULT_MAX_FILE_SIZE
}

impl FragsyncConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if there is none.
	pub fn load(root: &Path) -> FragResult<Option<FragsyncConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;
		tracing::debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}

	/// Parse and validate config file content.
	pub fn parse(content: &str) -> FragResult<FragsyncConfig> {
		let config: FragsyncConfig =
			toml::from_str(content).map_err(|e| FragError::ConfigParse(e.to_string()))?;
		validate_exclude_patterns(&config.exclude.patterns)?;

		Ok(config)
	}
}

/// Options controlling which files are read and how fragments are inserted.
///
/// Use [`SyncOptions::default()`] for the documented defaults or
/// [`SyncOptions::from_config`] to construct from a [`FragsyncConfig`].
#[derive(Debug, Clone)]
pub struct SyncOptions {
	/// File name suffixes scanned for fragment definitions.
	pub extract_suffixes: Vec<String>,
	/// File name suffixes scanned for insertion points.
	pub insert_suffixes: Vec<String>,
	/// Indentation added after an insertion marker's own indent.
	pub indent: String,
	/// Language tag used by the `fenced` pipe when none is given.
	pub fence_language: Option<String>,
	/// Gitignore-style patterns to exclude while walking.
	pub exclude_patterns: Vec<String>,
	/// Whether to disable `.gitignore` integration.
	pub disable_gitignore: bool,
	/// Maximum file size to process in bytes.
	pub max_file_size: u64,
}

impl Default for SyncOptions {
	fn default() -> Self {
		Self {
			extract_suffixes: Vec::from(DEFAULT_EXTRACT_SUFFIXES.map(String::from)),
			insert_suffixes: Vec::from(DEFAULT_INSERT_SUFFIXES.map(String::from)),
			indent: DEFAULT_INDENT.to_string(),
			fence_language: None,
			exclude_patterns: Vec::new(),
			disable_gitignore: false,
			max_file_size: DEFAULT_MAX_FILE_SIZE,
		}
	}
}

impl SyncOptions {
	/// Construct [`SyncOptions`] from an optional [`FragsyncConfig`]. Fields the
	/// config leaves out keep their defaults.
	pub fn from_config(config: Option<&FragsyncConfig>) -> Self {
		let Some(config) = config else {
			return Self::default();
		};
		let defaults = Self::default();

		Self {
			extract_suffixes: config
				.extract
				.suffixes
				.clone()
				.unwrap_or(defaults.extract_suffixes),
			insert_suffixes: config
				.insert
				.suffixes
				.clone()
				.unwrap_or(defaults.insert_suffixes),
			indent: config.indent.clone().unwrap_or(defaults.indent),
			fence_language: config.pipes.fence_language.clone(),
			exclude_patterns: config.exclude.patterns.clone(),
			disable_gitignore: config.disable_gitignore,
			max_file_size: config.max_file_size,
		}
	}

	/// Whether `path` is scanned for fragment definitions.
	pub fn is_extractable(&self, path: &Path) -> bool {
		has_suffix(path, &self.extract_suffixes)
	}

	/// Whether `path` is scanned for insertion points.
	pub fn is_injectable(&self, path: &Path) -> bool {
		has_suffix(path, &self.insert_suffixes)
	}
}

fn has_suffix(path: &Path, suffixes: &[String]) -> bool {
	let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
		return false;
	};

	suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
}

fn validate_exclude_patterns(patterns: &[String]) -> FragResult<()> {
	let mut builder = GitignoreBuilder::new("");
	for pattern in patterns {
		builder
			.add_line(None, pattern)
			.map_err(|e| {
				FragError::InvalidPattern {
					pattern: pattern.clone(),
					reason: e.to_string(),
				}
			})?;
	}

	Ok(())
}
