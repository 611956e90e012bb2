//! `fragsync_core` keeps documentation in sync with source code. Regions of
//! source files are marked as named fragments and copied into insertion points
//! in documentation files, so examples in docs are always code that compiles.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Source files
//!   -> Walker (sorted, honours .gitignore and [exclude] patterns)
//!   -> Extractor (start/end markers -> indentation-normalized fragments)
//!   -> Fragment store (key -> content, later definitions win)
//!   -> Injector (insertion markers -> fragment, optionally through a pipe)
//!   -> Writer (rewrites a file only when its content changed)
//! ```
//!
//! ## Markers
//!
//! ```text
//! // start_code_fragment: ex.hello
//! println!("hello");
//! // end_code_fragment:
//! ```
//!
//! ```text
//! <!-- insert_code_fragment: ex.hello | fenced:rust -->
//! <!-- end_code_fragment: -->
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration loading from `fragsync.toml`.
//! - [`markers`] - The line grammar of the four marker forms.
//! - [`extractor`] - Fragment definitions from a single file.
//! - [`injector`] - Insertion of stored fragments into a single file.
//! - [`pipes`] - Named content transforms and the built-in pipes.
//! - [`writer`] - Idempotent, atomic file replacement.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fragsync_core::CodeFragments;
//!
//! let mut fragments = CodeFragments::new();
//! let report = fragments.update(["src", "docs"]);
//! for warning in report.warnings() {
//! 	eprintln!("{warning}");
//! }
//! println!("{} file(s) updated", report.write.written.len());
//! ```

pub use config::*;
pub use engine::*;
pub use error::*;
pub use pipes::*;
pub use report::*;
pub use store::*;

pub mod config;
mod engine;
#[allow(unused_assignments)]
mod error;
pub mod extractor;
pub mod injector;
pub mod markers;
pub mod pipes;
mod report;
mod store;
pub mod text;
mod walk;
pub mod writer;
