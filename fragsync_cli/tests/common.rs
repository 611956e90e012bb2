#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub const HELLO_SOURCE: &str =
	"// start_code_fragment: ex.hello\nprint(\"hi\")\n// end_code_fragment:\n";
pub const HELLO_DOCS: &str =
	"# Demo\n\n<!-- insert_code_fragment: ex.hello -->\n<!-- end_code_fragment: -->\n";
pub const HELLO_DOCS_UPDATED: &str = "# Demo\n\n<!-- insert_code_fragment: ex.hello -->\n    \
                                      print(\"hi\")\n<!-- end_code_fragment: -->\n";

pub fn fragsync_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("fragsync"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}

pub fn write_file(root: &Path, relative: &str, content: &str) -> std::io::Result<()> {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)
}
