//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A throwaway packaging repository with git history
pub struct TestRepo {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestRepo {
  /// Create a repository with a snapship config, a recipe and one commit
  pub fn new(snap_name: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    std::fs::write(
      path.join("snapship.toml"),
      format!("[snap]\nname = \"{}\"\n", snap_name),
    )?;
    std::fs::create_dir_all(path.join("snap"))?;
    std::fs::write(
      path.join("snap/snapcraft.yaml"),
      format!("name: {}\nversion: 1.1.0~dev\nsummary: test snap\n", snap_name),
    )?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial packaging setup"])?;

    Ok(Self { _root: root, path })
  }

  /// Commit current changes and return the new HEAD SHA
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;

    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Create a side branch with one commit and merge it with --no-ff
  ///
  /// The merge commit carries `merge_message` verbatim, so tests control the
  /// trailer lines the changelog extractor sees.
  pub fn merge_branch(&self, branch: &str, file: &str, merge_message: &str) -> Result<()> {
    git(&self.path, &["checkout", "-b", branch])?;
    std::fs::write(self.path.join(file), format!("content of {}\n", file))?;
    self.commit(&format!("Work on {}", file))?;

    git(&self.path, &["checkout", "main"])?;
    git(&self.path, &["merge", "--no-ff", "-m", merge_message, branch])?;
    Ok(())
  }

  /// Write a file relative to the repository root
  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    let full = self.path.join(path);
    if let Some(parent) = full.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(full, content)?;
    Ok(())
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the snapship CLI, expecting success
pub fn run_snapship(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_snapship_raw(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "snapship command failed: snapship {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

/// Run the snapship CLI without asserting on the exit status
pub fn run_snapship_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_snapship");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run snapship")
}
