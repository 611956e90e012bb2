use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Keep example code in documentation in sync with the sources it was taken from.",
	long_about = "fragsync copies marked code fragments from source files into insertion points \
	              in documentation, so the examples readers see are always code that \
	              compiles.\n\nMark a fragment in source:\n  // start_code_fragment: ex.hello\n  \
	              ...\n  // end_code_fragment:\n\nMark where it goes:\n  <!-- \
	              insert_code_fragment: ex.hello | fenced:rust -->\n  <!-- end_code_fragment: \
	              -->\n\nQuick start:\n  fragsync update  Insert all fragments\n  fragsync check   \
	              Verify everything is up to date\n  fragsync list    Show the fragments that were \
	              found"
)]
pub struct FragsyncCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Load fragments and write them into every insertion point.
	///
	/// Fragments are read from the `--from` paths (or the roots when none are
	/// given) and inserted into the roots. Files are only rewritten when their
	/// content changes.
	Update {
		/// Directories or files to update. Defaults to the project path.
		roots: Vec<PathBuf>,

		/// Directories or files to read fragments from.
		#[arg(long)]
		from: Vec<PathBuf>,

		/// Watch for file changes and re-run the update automatically.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
	/// Check that every insertion point is up to date without writing.
	///
	/// Exits with status 1 when a file would change and 2 when a file could not
	/// be processed. Ideal for CI pipelines.
	Check {
		/// Directories or files to check. Defaults to the project path.
		roots: Vec<PathBuf>,

		/// Directories or files to read fragments from.
		#[arg(long)]
		from: Vec<PathBuf>,

		/// Show a diff for each file that would change.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// List every fragment found under the roots.
	List {
		/// Directories or files to scan. Defaults to the project path.
		roots: Vec<PathBuf>,

		/// Output format for the fragment list.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}

/// Quiet period that groups a burst of file events into one re-run.
pub const WATCH_DEBOUNCE: Duration = Duration::from_millis(200);

/// Call `on_change` once per burst of events received on `events`. Events that
/// arrive within `debounce` of each other are drained together. Returns when
/// every sender has been dropped.
///
/// The re-run's own writes produce events too. The next run finds every
/// insertion point up to date and writes nothing, so the loop settles.
pub fn run_on_changes(events: &Receiver<()>, debounce: Duration, mut on_change: impl FnMut()) {
	while events.recv().is_ok() {
		while events.recv_timeout(debounce).is_ok() {}
		on_change();
	}
}
