use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;

use clap::Parser;
use fragsync_cli::Commands;
use fragsync_cli::FragsyncCli;
use fragsync_cli::OutputFormat;
use fragsync_cli::WATCH_DEBOUNCE;
use fragsync_cli::run_on_changes;
use fragsync_core::CodeFragments;
use fragsync_core::FileError;
use fragsync_core::FragError;
use fragsync_core::FragsyncConfig;
use fragsync_core::SyncOptions;
use fragsync_core::Warning;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

/// Exit status when at least one file could not be processed.
const EXIT_FILE_ERRORS: i32 = 2;

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = FragsyncCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Update { roots, from, watch }) => run_update(&args, roots, from, *watch),
		Some(Commands::Check {
			roots,
			from,
			diff,
			format,
		}) => run_check(&args, roots, from, *diff, *format),
		Some(Commands::List { roots, format }) => run_list(&args, roots, *format),
		None => {
			eprintln!("No subcommand specified. Run `fragsync --help` for usage.");
			process::exit(1);
		}
	};

	match result {
		Ok(0) => {}
		Ok(code) => process::exit(code),
		Err(e) => {
			// Try to render through miette for rich diagnostics with help text
			// and error codes.
			match e.downcast::<FragError>() {
				Ok(frag_err) => {
					let report: miette::Report = (*frag_err).into();
					eprintln!("{report:?}");
				}
				Err(e) => {
					eprintln!("{} {e}", colored!("error:", red));
				}
			}
			process::exit(EXIT_FILE_ERRORS);
		}
	}
}

/// Diagnostics go to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_directive = if verbose {
		"warn,fragsync_core=debug"
	} else {
		"warn"
	};
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.without_time()
		.init();
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn resolve_root(args: &FragsyncCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Relative roots are taken from the project path. No roots means the project
/// path itself.
fn resolve_roots(root: &Path, roots: &[PathBuf]) -> Vec<PathBuf> {
	if roots.is_empty() {
		return vec![root.to_path_buf()];
	}

	roots.iter().map(|path| root.join(path)).collect()
}

fn create_fragments(root: &Path) -> CliResult<CodeFragments> {
	let config = FragsyncConfig::load(root)?;
	tracing::debug!(root = %root.display(), config = config.is_some(), "project resolved");
	let options = SyncOptions::from_config(config.as_ref());

	Ok(CodeFragments::with_options(options))
}

fn run_update(
	args: &FragsyncCli,
	roots: &[PathBuf],
	from: &[PathBuf],
	watch: bool,
) -> CliResult<i32> {
	// Run the initial update.
	let code = run_update_once(args, roots, from)?;

	if !watch {
		return Ok(code);
	}

	// Watch mode
	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	let root = resolve_root(args);
	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if matches!(
					event.kind,
					notify::EventKind::Modify(_) | notify::EventKind::Create(_)
				) {
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&root, notify::RecursiveMode::Recursive)?;

	run_on_changes(&rx, WATCH_DEBOUNCE, || {
		println!("\nFile change detected, updating...");
		if let Err(e) = run_update_once(args, roots, from) {
			eprintln!("{} {e}", colored!("error:", red));
		}
	});

	Ok(0)
}

fn run_update_once(args: &FragsyncCli, roots: &[PathBuf], from: &[PathBuf]) -> CliResult<i32> {
	let root = resolve_root(args);
	let targets = resolve_roots(&root, roots);
	let sources = if from.is_empty() {
		targets.clone()
	} else {
		resolve_roots(&root, from)
	};

	let mut fragments = create_fragments(&root)?;
	let load = fragments.load(&sources);
	let write = fragments.write(&targets);
	let has_errors = !load.is_ok() || !write.is_ok();

	print_file_errors(load.errors.into_iter().chain(write.errors), &root);

	if write.written.is_empty() {
		println!("All insertion points are already up to date.");
	} else {
		println!("Updated {} file(s).", write.written.len());

		if args.verbose {
			for change in &write.written {
				let rel = make_relative(&change.file, &root);
				println!("  {rel}");
			}
		}
	}

	Ok(if has_errors { EXIT_FILE_ERRORS } else { 0 })
}

fn run_check(
	args: &FragsyncCli,
	roots: &[PathBuf],
	from: &[PathBuf],
	show_diff: bool,
	format: OutputFormat,
) -> CliResult<i32> {
	let root = resolve_root(args);
	let targets = resolve_roots(&root, roots);
	let sources = if from.is_empty() {
		targets.clone()
	} else {
		resolve_roots(&root, from)
	};

	let mut fragments = create_fragments(&root)?;
	let load = fragments.load(&sources);
	let check = fragments.check(&targets);
	let has_errors = !load.is_ok() || !check.is_ok();
	let has_changes = check.has_changes();

	match format {
		OutputFormat::Json => {
			let outdated: Vec<serde_json::Value> = check
				.written
				.iter()
				.map(|change| {
					serde_json::json!({
						"file": make_relative(&change.file, &root),
						"insertions": change.insertions,
						"current": change.original,
						"expected": change.updated,
					})
				})
				.collect();
			let warnings: Vec<serde_json::Value> = load
				.warnings
				.iter()
				.chain(&check.warnings)
				.map(|warning| warning_json(warning, &root))
				.collect();
			let errors: Vec<serde_json::Value> = load
				.errors
				.iter()
				.chain(&check.errors)
				.map(|error| {
					serde_json::json!({
						"file": make_relative(&error.file, &root),
						"message": error.error.to_string(),
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": !has_changes && !has_errors,
				"outdated": outdated,
				"warnings": warnings,
				"errors": errors,
			});
			println!("{}", serde_json::to_string_pretty(&output)?);
		}
		OutputFormat::Text => {
			for change in &check.written {
				let rel = make_relative(&change.file, &root);
				eprintln!(
					"{} {} ({} insertion point(s))",
					colored!("Out of date:", yellow),
					colored!(rel, bold),
					change.insertions
				);
				if show_diff {
					print_diff(&change.original, &change.updated);
				}
			}

			print_file_errors(load.errors.into_iter().chain(check.errors), &root);

			if has_changes {
				eprintln!(
					"\n{} file(s) out of date. Run `fragsync update` to fix.",
					check.written.len()
				);
			} else if !has_errors {
				println!(
					"{} All insertion points are up to date.",
					colored!("ok:", green)
				);
			}
		}
	}

	Ok(if has_errors {
		EXIT_FILE_ERRORS
	} else if has_changes {
		1
	} else {
		0
	})
}

fn run_list(args: &FragsyncCli, roots: &[PathBuf], format: OutputFormat) -> CliResult<i32> {
	let root = resolve_root(args);
	let targets = resolve_roots(&root, roots);

	let mut fragments = create_fragments(&root)?;
	let load = fragments.load(&targets);
	let has_errors = !load.is_ok();

	match format {
		OutputFormat::Json => {
			println!("{}", serde_json::to_string_pretty(fragments.fragments())?);
		}
		OutputFormat::Text => {
			println!(
				"{}",
				colored!(format!("Fragments ({}):", fragments.fragments().len()), bold)
			);
			for (key, content) in fragments.fragments().iter() {
				println!("  {key} ({} line(s))", content.lines().count());
			}
		}
	}

	print_file_errors(load.errors, &root);

	Ok(if has_errors { EXIT_FILE_ERRORS } else { 0 })
}

fn warning_json(warning: &Warning, root: &Path) -> serde_json::Value {
	serde_json::json!({
		"file": make_relative(&warning.file, root),
		"line": warning.line,
		"kind": warning.kind,
		"message": warning.message(),
	})
}

/// Render every abandoned file through miette.
fn print_file_errors(errors: impl IntoIterator<Item = FileError>, root: &Path) {
	for file_error in errors {
		let rel = make_relative(&file_error.file, root);
		let report = miette::Report::new(file_error.error).wrap_err(format!("skipped {rel}"));
		eprintln!("{report:?}");
	}
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
