#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;

pub fn zmd_cmd() -> Command {
	let mut cmd = Command::cargo_bin("zmd").expect("zmd binary is built for integration tests");
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}

/// Points the toolchain at a program that does not exist, so any block that
/// would run fails loudly.
pub fn write_missing_toolchain_config(root: &Path) -> std::io::Result<()> {
	std::fs::write(
		root.join("zmd.toml"),
		"[toolchain]\nprogram = \"zmd-test-missing-toolchain\"\n",
	)
}

/// `cat <file>` echoes every block body back as its stdout.
pub fn write_cat_toolchain_config(root: &Path) -> std::io::Result<()> {
	std::fs::write(
		root.join("zmd.toml"),
		"[toolchain]\nprogram = \"cat\"\nrun_args = []\ntest_args = []\n",
	)
}
