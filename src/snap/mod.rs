//! Snap build, store and artifact tooling
//!
//! Trait seams (`SnapStore`, `SnapBuilder`, `SnapPack`, `AcceptanceRunner`)
//! keep the shell-outs to snapcraft, snap and squashfs-tools behind mockable
//! interfaces; the `System*` implementations are the only code that actually
//! spawns those tools.

pub mod acceptance;
pub mod build;
pub mod pack;
pub mod store;

pub use acceptance::{AcceptanceRunner, CommandRunner};
pub use build::{SnapBuilder, SnapcraftBuilder};
pub use pack::{SnapPack, SystemPack};
pub use store::{SnapStore, SystemStore};

use crate::core::error::{ResultExt, ShipError, ShipResult, ToolError};
use std::path::PathBuf;
use std::process::Command;

/// Path of the dependency manifest inside a built snap
pub const MANIFEST_PATH_IN_SNAP: &str = "usr/share/snapship/manifest";

/// Directory of per-package changelog fragments inside a built snap
pub const DOCS_DIR_IN_SNAP: &str = "usr/share/doc";

/// One built artifact for one architecture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltSnap {
  pub arch: String,
  pub path: PathBuf,
}

/// Run an external tool, mapping non-zero exit to a tool error
pub(crate) fn run_tool(cmd: &mut Command) -> ShipResult<Vec<u8>> {
  let rendered = render_command(cmd);
  let output = cmd
    .output()
    .with_context(|| format!("Failed to execute {}", rendered))?;

  if !output.status.success() {
    return Err(ShipError::Tool(ToolError {
      command: rendered,
      stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }));
  }

  Ok(output.stdout)
}

fn render_command(cmd: &Command) -> String {
  let mut parts = vec![cmd.get_program().to_string_lossy().to_string()];
  parts.extend(cmd.get_args().map(|a| a.to_string_lossy().to_string()));
  parts.join(" ")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_run_tool_captures_stdout() {
    let out = run_tool(Command::new("echo").arg("hello")).unwrap();
    assert_eq!(String::from_utf8_lossy(&out).trim(), "hello");
  }

  #[test]
  fn test_run_tool_failure_names_command() {
    let err = run_tool(Command::new("false").arg("--flag")).unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("false --flag"));
  }
}
