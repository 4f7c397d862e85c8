//! Release-flow operations for SystemGit (merge walking, branches, tags)

use super::system_git::SystemGit;
use super::CommitInfo;
use crate::core::error::{GitError, ResultExt, ShipError, ShipResult};
use std::path::Path;

impl SystemGit {
  /// Enumerate merge commits in a range, oldest first
  ///
  /// Uses `git rev-list --merges --reverse` for efficient traversal.
  pub fn merge_commits(&self, range: &str) -> ShipResult<Vec<String>> {
    let output = self
      .git_cmd()
      .args(["rev-list", "--merges", "--reverse", range])
      .output()
      .context("Failed to run git rev-list")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ShipError::Git(GitError::CommandFailed {
        command: format!("git rev-list --merges --reverse {}", range),
        stderr: stderr.to_string(),
      }));
    }

    let shas = String::from_utf8_lossy(&output.stdout)
      .lines()
      .map(|s| s.trim().to_string())
      .filter(|s| !s.is_empty())
      .collect();

    Ok(shas)
  }

  /// Get commit metadata for a single SHA
  ///
  /// Uses `git log -1 --format` for efficient single-commit lookup.
  pub fn get_commit(&self, sha: &str) -> ShipResult<CommitInfo> {
    // Format: %H (hash) %an (author name) %ae (author email) %at (author time) %B (body)
    let format = "%H%n%an%n%ae%n%at%n%B";

    let output = self
      .git_cmd()
      .args(["log", "-1", &format!("--format={}", format), sha])
      .output()
      .context("Failed to get commit info")?;

    if !output.status.success() {
      return Err(ShipError::Git(GitError::CommitNotFound { sha: sha.to_string() }));
    }

    parse_commit_output(&output.stdout)
  }

  /// Most recent tag reachable from HEAD, if any
  pub fn latest_tag(&self) -> ShipResult<Option<String>> {
    let output = self
      .git_cmd()
      .args(["describe", "--tags", "--abbrev=0"])
      .output()
      .context("Failed to run git describe")?;

    if !output.status.success() {
      // No tags yet
      return Ok(None);
    }

    let tag = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(if tag.is_empty() { None } else { Some(tag) })
  }

  /// Create a branch
  pub fn create_branch(&self, branch_name: &str) -> ShipResult<()> {
    let output = self
      .git_cmd()
      .args(["branch", branch_name])
      .output()
      .context("Failed to create branch")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ShipError::Git(GitError::CommandFailed {
        command: "git branch".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Checkout a branch
  pub fn checkout_branch(&self, branch_name: &str) -> ShipResult<()> {
    let output = self
      .git_cmd()
      .args(["checkout", branch_name])
      .output()
      .context("Failed to checkout branch")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ShipError::Git(GitError::CommandFailed {
        command: "git checkout".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Create and checkout a branch
  pub fn create_and_checkout_branch(&self, branch_name: &str) -> ShipResult<()> {
    self.create_branch(branch_name)?;
    self.checkout_branch(branch_name)?;
    Ok(())
  }

  /// Delete a local branch (forced)
  pub fn delete_branch(&self, branch_name: &str) -> ShipResult<()> {
    let output = self
      .git_cmd()
      .args(["branch", "-D", branch_name])
      .output()
      .context("Failed to delete branch")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ShipError::Git(GitError::BranchError {
        message: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Delete a branch from a remote
  pub fn delete_remote_branch(&self, remote: &str, branch_name: &str) -> ShipResult<()> {
    self.push(remote, &format!(":refs/heads/{}", branch_name))
  }

  /// Stage specific paths
  pub fn add(&self, paths: &[&Path]) -> ShipResult<()> {
    let mut cmd = self.git_cmd();
    cmd.arg("add").arg("--");
    for path in paths {
      cmd.arg(path);
    }

    let output = cmd.output().context("Failed to stage files")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ShipError::Git(GitError::CommandFailed {
        command: "git add".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Commit staged and tracked changes
  pub fn commit_all(&self, message: &str) -> ShipResult<()> {
    let output = self
      .git_cmd()
      .args(["commit", "-a", "-m", message])
      .output()
      .context("Failed to commit")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ShipError::Git(GitError::CommandFailed {
        command: "git commit".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Create an annotated tag at a specific commit
  pub fn tag(&self, name: &str, message: &str, at: &str) -> ShipResult<()> {
    let output = self
      .git_cmd()
      .args(["tag", "-a", name, "-m", message, at])
      .output()
      .context("Failed to create tag")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ShipError::Git(GitError::CommandFailed {
        command: "git tag".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Push a refspec to a remote
  pub fn push(&self, remote: &str, refspec: &str) -> ShipResult<()> {
    let output = self
      .git_cmd()
      .args(["push", remote, refspec])
      .output()
      .context("Failed to push")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ShipError::Git(GitError::PushFailed {
        remote: remote.to_string(),
        refspec: refspec.to_string(),
        reason: stderr.to_string(),
      }));
    }

    Ok(())
  }
}

/// Parse git log output into CommitInfo
///
/// Format is %H%n%an%n%ae%n%at%n%B, giving hash, author name,
/// author email, author time, body.
fn parse_commit_output(data: &[u8]) -> ShipResult<CommitInfo> {
  let output = String::from_utf8_lossy(data);
  let mut lines = output.lines();

  let sha = lines.next().ok_or_else(|| ShipError::message("Missing commit SHA"))?.to_string();
  let author = lines
    .next()
    .ok_or_else(|| ShipError::message("Missing author name"))?
    .to_string();
  let author_email = lines
    .next()
    .ok_or_else(|| ShipError::message("Missing author email"))?
    .to_string();
  let timestamp = lines
    .next()
    .and_then(|s| s.parse::<i64>().ok())
    .ok_or_else(|| ShipError::message("Missing/invalid author timestamp"))?;

  // Rest is commit message
  let message: Vec<String> = lines.map(|s| s.to_string()).collect();
  let message = message.join("\n").trim().to_string();

  Ok(CommitInfo {
    sha,
    author,
    author_email,
    message,
    timestamp,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_commit_output() {
    let raw = b"abc123\nJane Doe\njane@example.com\n1699999999\nMerge branch 'fix'\n\nAuthor: Jane <j@x.com>\n";
    let info = parse_commit_output(raw).unwrap();

    assert_eq!(info.sha, "abc123");
    assert_eq!(info.author, "Jane Doe");
    assert_eq!(info.author_email, "jane@example.com");
    assert_eq!(info.timestamp, 1699999999);
    assert!(info.message.starts_with("Merge branch 'fix'"));
    assert!(info.message.contains("Author: Jane <j@x.com>"));
  }

  #[test]
  fn test_parse_commit_output_missing_fields() {
    assert!(parse_commit_output(b"abc123\nJane\n").is_err());
  }
}
