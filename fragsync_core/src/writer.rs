use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use sha2::Digest;
use sha2::Sha256;

use crate::FileChange;
use crate::FragResult;
use crate::Warning;
use crate::injector::InjectContext;
use crate::injector::inject_fragments;

/// A reader that feeds every byte it hands out into a SHA-256 digest and keeps
/// a copy, so the input hash and text are known once the injector has consumed
/// the file without reading it again.
pub struct DigestReader<R> {
	inner: R,
	digest: Sha256,
	captured: Vec<u8>,
}

impl<R: Read> DigestReader<R> {
	pub fn new(inner: R) -> Self {
		Self {
			inner,
			digest: Sha256::new(),
			captured: Vec::new(),
		}
	}

	/// Consume the reader and return the digest of everything read so far,
	/// together with those bytes.
	pub fn finalize(self) -> (Vec<u8>, Vec<u8>) {
		(self.digest.finalize().to_vec(), self.captured)
	}
}

impl<R: Read> Read for DigestReader<R> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		let read = self.inner.read(buf)?;
		self.digest.update(&buf[..read]);
		self.captured.extend_from_slice(&buf[..read]);
		Ok(read)
	}
}

/// SHA-256 digest of `bytes`.
pub fn content_digest(bytes: &[u8]) -> Vec<u8> {
	Sha256::digest(bytes).to_vec()
}

/// What happened to one file during a write pass.
#[derive(Debug)]
pub enum WriteOutcome {
	/// No insertion point received a fragment; the file was not touched.
	NoInsertions,
	/// Fragments were inserted but the result equals the current content.
	Unchanged { insertions: usize },
	/// The file was rewritten, or would be in a dry run.
	Changed(FileChange),
}

/// Run the injector over `path` and replace the file when, and only when, at
/// least one fragment was inserted and the result differs from what is on
/// disk.
///
/// With `dry_run` set the outcome is computed but nothing is written.
pub fn rewrite_file(
	path: &Path,
	ctx: &InjectContext<'_>,
	dry_run: bool,
) -> FragResult<(WriteOutcome, Vec<Warning>)> {
	let (injection, input_digest, input) = {
		let mut reader = BufReader::new(DigestReader::new(File::open(path)?));
		let injection = inject_fragments(&mut reader, path, ctx)?;
		let (digest, input) = reader.into_inner().finalize();
		(injection, digest, input)
	};

	if injection.insertions == 0 {
		return Ok((WriteOutcome::NoInsertions, injection.warnings));
	}

	if content_digest(injection.output.as_bytes()) == input_digest {
		return Ok((
			WriteOutcome::Unchanged {
				insertions: injection.insertions,
			},
			injection.warnings,
		));
	}

	// The injector already rejected invalid UTF-8.
	let original = String::from_utf8(input)
		.map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
	if !dry_run {
		replace_file(path, injection.output.as_bytes())?;
		tracing::info!(file = %path.display(), insertions = injection.insertions, "updated");
	}

	let change = FileChange {
		file: path.to_path_buf(),
		insertions: injection.insertions,
		original,
		updated: injection.output,
	};

	Ok((WriteOutcome::Changed(change), injection.warnings))
}

/// Replace `path` with `bytes` by writing a sibling temporary file and
/// renaming it over the original. The original permissions are kept.
pub(crate) fn replace_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
	let permissions = std::fs::metadata(path)?.permissions();
	let file_name = path
		.file_name()
		.map(|name| name.to_string_lossy().into_owned())
		.unwrap_or_default();
	let temp_path = path.with_file_name(format!(
		".{file_name}.tmp-{}-{}",
		std::process::id(),
		SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map_or(0, |duration| duration.as_nanos())
	));

	let result = std::fs::write(&temp_path, bytes)
		.and_then(|()| std::fs::set_permissions(&temp_path, permissions))
		.and_then(|()| std::fs::rename(&temp_path, path));

	if result.is_err() {
		let _ = std::fs::remove_file(&temp_path);
	}

	result
}
