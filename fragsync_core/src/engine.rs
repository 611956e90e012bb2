use std::path::Path;
use std::path::PathBuf;

use crate::FileError;
use crate::FragError;
use crate::FragResult;
use crate::FragmentStore;
use crate::FragsyncConfig;
use crate::LoadReport;
use crate::Pipe;
use crate::PipeRegistry;
use crate::SyncOptions;
use crate::UpdateReport;
use crate::Warning;
use crate::WarningKind;
use crate::WriteReport;
use crate::extractor::extract_fragments_from_file;
use crate::injector::InjectContext;
use crate::walk::collect_files;
use crate::writer::WriteOutcome;
use crate::writer::rewrite_file;

/// A tool instance: one fragment store, one pipe registry and the options that
/// decide which files are read.
///
/// Instances are independent of each other. Fragments accumulate across
/// [`load`](Self::load) calls until removed through
/// [`fragments_mut`](Self::fragments_mut).
#[derive(Debug, Default)]
pub struct CodeFragments {
	store: FragmentStore,
	pipes: PipeRegistry,
	options: SyncOptions,
}

impl CodeFragments {
	/// An empty store with the built-in pipes and default options.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_options(options: SyncOptions) -> Self {
		Self {
			store: FragmentStore::new(),
			pipes: PipeRegistry::with_builtins(options.fence_language.as_deref()),
			options,
		}
	}

	pub fn from_config(config: &FragsyncConfig) -> Self {
		Self::with_options(SyncOptions::from_config(Some(config)))
	}

	pub fn options(&self) -> &SyncOptions {
		&self.options
	}

	/// Register a fragment by hand. Replaces any existing fragment with the
	/// same key and returns the old content.
	pub fn add_fragment(
		&mut self,
		key: impl Into<String>,
		content: impl Into<String>,
	) -> Option<String> {
		self.store.insert(key, content)
	}

	/// Read-only view of the store.
	pub fn fragments(&self) -> &FragmentStore {
		&self.store
	}

	/// Mutable access to the store.
	#[deprecated(note = "use `add_fragment` or `fragments` instead")]
	pub fn fragments_mut(&mut self) -> &mut FragmentStore {
		&mut self.store
	}

	pub fn fragment(&self, key: &str) -> Option<&str> {
		self.store.get(key)
	}

	/// Register `pipe` under `name`, replacing any pipe with that name.
	pub fn add_pipe(&mut self, name: impl Into<String>, pipe: impl Pipe + 'static) {
		self.pipes.put(name, pipe);
	}

	pub fn remove_pipe(&mut self, name: &str) -> Option<Box<dyn Pipe>> {
		self.pipes.remove(name)
	}

	pub fn pipe(&self, name: &str) -> Option<&dyn Pipe> {
		self.pipes.get(name)
	}

	pub fn pipes(&self) -> &PipeRegistry {
		&self.pipes
	}

	/// Extract fragment definitions from every eligible file under `roots`.
	///
	/// Each file is parsed completely before any of its fragments reach the
	/// store, so a file with an unterminated fragment contributes nothing. Its
	/// error is reported and the remaining files are still read.
	pub fn load<I, P>(&mut self, roots: I) -> LoadReport
	where
		I: IntoIterator<Item = P>,
		P: AsRef<Path>,
	{
		let mut report = LoadReport::default();
		let files = self.eligible_files(roots, &mut report.errors, SyncOptions::is_extractable);

		for file in files {
			report.files_scanned += 1;
			tracing::debug!(file = %file.display(), "extracting");

			let extracted = check_file_size(&file, self.options.max_file_size)
				.and_then(|()| extract_fragments_from_file(&file));
			let fragments = match extracted {
				Ok(fragments) => fragments,
				Err(error) => {
					report.errors.push(FileError::new(&file, error));
					continue;
				}
			};

			for fragment in fragments {
				if self.store.insert(fragment.key.as_str(), fragment.content).is_some() {
					let warning = Warning {
						file: file.clone(),
						line: fragment.line,
						kind: WarningKind::DuplicateFragment { key: fragment.key },
					};
					warning.emit();
					report.warnings.push(warning);
				}
				report.fragments_loaded += 1;
			}
		}

		report
	}

	/// Fill every insertion point under `roots` with its fragment and rewrite
	/// the files whose content changed.
	pub fn write<I, P>(&self, roots: I) -> WriteReport
	where
		I: IntoIterator<Item = P>,
		P: AsRef<Path>,
	{
		self.inject(roots, false)
	}

	/// Compute what [`write`](Self::write) would change without touching any
	/// file.
	pub fn check<I, P>(&self, roots: I) -> WriteReport
	where
		I: IntoIterator<Item = P>,
		P: AsRef<Path>,
	{
		self.inject(roots, true)
	}

	/// [`load`](Self::load) then [`write`](Self::write) over the same roots.
	pub fn update<I, P>(&mut self, roots: I) -> UpdateReport
	where
		I: IntoIterator<Item = P>,
		P: AsRef<Path>,
	{
		let roots: Vec<PathBuf> = roots
			.into_iter()
			.map(|root| root.as_ref().to_path_buf())
			.collect();
		let load = self.load(&roots);
		let write = self.write(&roots);

		UpdateReport { load, write }
	}

	fn inject<I, P>(&self, roots: I, dry_run: bool) -> WriteReport
	where
		I: IntoIterator<Item = P>,
		P: AsRef<Path>,
	{
		let mut report = WriteReport::default();
		let files = self.eligible_files(roots, &mut report.errors, SyncOptions::is_injectable);
		let ctx = InjectContext {
			fragments: &self.store,
			pipes: &self.pipes,
			indent_unit: &self.options.indent,
		};

		for file in files {
			report.files_scanned += 1;
			tracing::debug!(file = %file.display(), dry_run, "injecting");

			let result = check_file_size(&file, self.options.max_file_size)
				.and_then(|()| rewrite_file(&file, &ctx, dry_run));
			let (outcome, warnings) = match result {
				Ok(result) => result,
				Err(error) => {
					report.errors.push(FileError::new(&file, error));
					continue;
				}
			};

			for warning in &warnings {
				warning.emit();
			}
			report.warnings.extend(warnings);

			match outcome {
				WriteOutcome::NoInsertions => {}
				WriteOutcome::Unchanged { .. } => report.unchanged.push(file),
				WriteOutcome::Changed(change) => report.written.push(change),
			}
		}

		report
	}

	fn eligible_files<I, P>(
		&self,
		roots: I,
		errors: &mut Vec<FileError>,
		is_eligible: fn(&SyncOptions, &Path) -> bool,
	) -> Vec<PathBuf>
	where
		I: IntoIterator<Item = P>,
		P: AsRef<Path>,
	{
		let mut eligible = Vec::new();

		for root in roots {
			let root = root.as_ref();
			match collect_files(root, &self.options, errors) {
				Ok(files) => {
					eligible.extend(
						files
							.into_iter()
							.filter(|file| is_eligible(&self.options, file)),
					);
				}
				Err(error) => errors.push(FileError::new(root, error)),
			}
		}

		eligible
	}
}

fn check_file_size(path: &Path, limit: u64) -> FragResult<()> {
	let size = std::fs::metadata(path)?.len();
	if size > limit {
		return Err(FragError::FileTooLarge {
			path: path.display().to_string(),
			size,
			limit,
		});
	}

	Ok(())
}
