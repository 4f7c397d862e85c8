//! Error types for snapship with contextual messages and exit codes
//!
//! This module provides a unified error type that categorizes errors and provides
//! contextual help messages to users. Every error includes a helpful suggestion
//! to guide users toward resolution.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for snapship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, exhausted baseline, divergent manifests)
  User = 1,
  /// System error (git, build tooling, I/O)
  System = 2,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for snapship
#[derive(Debug)]
pub enum ShipError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Store fetch errors (baseline resolution)
  Store(StoreError),

  /// External tool failures (snapcraft, unsquashfs, test runner)
  Tool(ToolError),

  /// Cross-architecture manifest summaries diverged
  Consistency {
    left_arch: String,
    right_arch: String,
    left_text: String,
    right_text: String,
  },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ShipError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ShipError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ShipError::Message { message, context, help } => ShipError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ShipError::Config(_) => ExitCode::User,
      ShipError::Store(_) => ExitCode::User,
      ShipError::Consistency { .. } => ExitCode::User,
      ShipError::Message { .. } => ExitCode::User,
      ShipError::Git(_) => ExitCode::System,
      ShipError::Tool(_) => ExitCode::System,
      ShipError::Io(_) => ExitCode::System,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ShipError::Config(e) => e.help_message(),
      ShipError::Git(e) => e.help_message(),
      ShipError::Store(e) => e.help_message(),
      ShipError::Consistency { .. } => Some(
        "One or more architectures picked up a dependency the others did not. \
         Wait for the archive to settle and rebuild all architectures."
          .to_string(),
      ),
      ShipError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ShipError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ShipError::Config(e) => write!(f, "{}", e),
      ShipError::Git(e) => write!(f, "{}", e),
      ShipError::Store(e) => write!(f, "{}", e),
      ShipError::Tool(e) => write!(f, "{}", e),
      ShipError::Consistency {
        left_arch,
        right_arch,
        left_text,
        right_text,
      } => {
        write!(
          f,
          "Package-change summaries diverge between architectures.\n\
           --- {} ---\n{}\n--- {} ---\n{}",
          left_arch, left_text, right_arch, right_text
        )
      }
      ShipError::Io(e) => write!(f, "I/O error: {}", e),
      ShipError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ShipError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ShipError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ShipError {
  fn from(err: io::Error) -> Self {
    ShipError::Io(err)
  }
}

impl From<String> for ShipError {
  fn from(msg: String) -> Self {
    ShipError::message(msg)
  }
}

impl From<&str> for ShipError {
  fn from(msg: &str) -> Self {
    ShipError::message(msg)
  }
}

impl From<toml_edit::TomlError> for ShipError {
  fn from(err: toml_edit::TomlError) -> Self {
    ShipError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for ShipError {
  fn from(err: toml_edit::de::Error) -> Self {
    ShipError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ShipError {
  fn from(err: serde_json::Error) -> Self {
    ShipError::message(format!("JSON error: {}", err))
  }
}

impl From<serde_yaml::Error> for ShipError {
  fn from(err: serde_yaml::Error) -> Self {
    ShipError::message(format!("YAML error: {}", err))
  }
}

impl From<semver::Error> for ShipError {
  fn from(err: semver::Error) -> Self {
    ShipError::message(format!("Version parse error: {}", err))
  }
}

impl From<glob::PatternError> for ShipError {
  fn from(err: glob::PatternError) -> Self {
    ShipError::message(format!("Invalid exclusion pattern: {}", err))
  }
}

impl From<std::num::ParseIntError> for ShipError {
  fn from(err: std::num::ParseIntError) -> Self {
    ShipError::message(format!("Parse error: {}", err))
  }
}

impl From<std::str::Utf8Error> for ShipError {
  fn from(err: std::str::Utf8Error) -> Self {
    ShipError::message(format!("UTF-8 error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for ShipError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    ShipError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<std::env::VarError> for ShipError {
  fn from(err: std::env::VarError) -> Self {
    ShipError::message(format!("Environment variable error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// snapship.toml not found
  NotFound { workspace_root: PathBuf },

  /// Missing required field
  MissingField { field: String },

  /// Field present but invalid
  Invalid { reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Create a snapship.toml with a [snap] section naming the snap to release.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { workspace_root } => {
        write!(
          f,
          "No snapship configuration found.\nSearched under: {}",
          workspace_root.display()
        )
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
      ConfigError::Invalid { reason } => {
        write!(f, "Invalid configuration: {}", reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Commit not found
  CommitNotFound { sha: String },

  /// Branch operation failed
  BranchError { message: String },

  /// Push failed
  PushFailed {
    remote: String,
    refspec: String,
    reason: String,
  },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") {
          Some("The remote has commits you don't have. Pull first before releasing.".to_string())
        } else if reason.contains("permission denied") || reason.contains("403") {
          Some("Check your SSH key permissions and access to the release remote.".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Run snapship from inside the packaging repository, or check the path: {}",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::CommitNotFound { sha } => {
        write!(f, "Commit not found: {}", sha)
      }
      GitError::BranchError { message } => {
        write!(f, "Branch operation failed: {}", message)
      }
      GitError::PushFailed { remote, refspec, reason } => {
        write!(f, "Push of {} to {} failed: {}", refspec, remote, reason)
      }
    }
  }
}

/// Store fetch errors
#[derive(Debug)]
pub enum StoreError {
  /// Every candidate in the fallback chain failed
  BaselineExhausted {
    snap: String,
    attempts: Vec<(String, String)>,
  },

  /// A single download attempt failed
  DownloadFailed {
    snap: String,
    channel: String,
    arch: String,
    reason: String,
  },
}

impl StoreError {
  fn help_message(&self) -> Option<String> {
    match self {
      StoreError::BaselineExhausted { snap, .. } => Some(format!(
        "No published manifest could be fetched for '{}'. Check that the snap has been \
         released at least once on one of the candidate channels.",
        snap
      )),
      StoreError::DownloadFailed { .. } => None,
    }
  }
}

impl fmt::Display for StoreError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StoreError::BaselineExhausted { snap, attempts } => {
        write!(f, "Could not fetch a baseline manifest for '{}'. Tried:", snap)?;
        for (channel, arch) in attempts {
          write!(f, "\n  {} ({})", channel, arch)?;
        }
        Ok(())
      }
      StoreError::DownloadFailed {
        snap,
        channel,
        arch,
        reason,
      } => {
        write!(f, "Download of {} from {} ({}) failed: {}", snap, channel, arch, reason)
      }
    }
  }
}

/// External tool failures
#[derive(Debug)]
pub struct ToolError {
  pub command: String,
  pub stderr: String,
}

impl fmt::Display for ToolError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Command failed: {}\n{}", self.command, self.stderr)
  }
}

/// Result type alias for snapship
pub type ShipResult<T> = Result<T, ShipError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ShipResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ShipResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ShipError>,
{
  fn context(self, ctx: impl Into<String>) -> ShipResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ShipResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ShipError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

/// Convert anyhow::Error to ShipError (test helpers use anyhow)
impl From<anyhow::Error> for ShipError {
  fn from(err: anyhow::Error) -> Self {
    ShipError::message(err.to_string())
  }
}
