//! Acceptance testing of built snaps

use crate::core::error::{ResultExt, ShipError, ShipResult, ToolError};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs the configured acceptance command against a built snap
pub trait AcceptanceRunner {
  fn run(&self, snap: &Path) -> ShipResult<()>;
}

/// Shell-command runner
///
/// The command runs through `sh -c` in the workspace, with the artifact path
/// exported as `SNAPSHIP_SNAP`.
pub struct CommandRunner {
  command: String,
  workdir: PathBuf,
}

impl CommandRunner {
  pub fn new(command: String, workdir: PathBuf) -> Self {
    Self { command, workdir }
  }
}

impl AcceptanceRunner for CommandRunner {
  fn run(&self, snap: &Path) -> ShipResult<()> {
    let output = Command::new("sh")
      .arg("-c")
      .arg(&self.command)
      .current_dir(&self.workdir)
      .env("SNAPSHIP_SNAP", snap)
      .output()
      .with_context(|| format!("Failed to execute acceptance command: {}", self.command))?;

    if !output.status.success() {
      return Err(ShipError::Tool(ToolError {
        command: self.command.clone(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }

    Ok(())
  }
}
