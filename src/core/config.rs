//! snapship.toml configuration
//!
//! Searched in order: snapship.toml, .snapship.toml, .config/snapship.toml

use crate::core::error::{ConfigError, ResultExt, ShipError, ShipResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for snapship
#[derive(Debug, Clone, Deserialize)]
pub struct ShipConfig {
  pub snap: SnapConfig,
  #[serde(default)]
  pub release: ReleaseSettings,
  #[serde(default)]
  pub store: StorePolicy,
}

/// Identity of the snap being released
#[derive(Debug, Clone, Deserialize)]
pub struct SnapConfig {
  /// Store name of the snap
  pub name: String,

  /// Path to the snapcraft recipe (relative to workspace root)
  #[serde(default = "default_recipe")]
  pub recipe: PathBuf,

  /// Path to the changelog file (newest entry first)
  #[serde(default = "default_changelog")]
  pub changelog: PathBuf,

  /// Directory holding one dependency manifest per architecture
  #[serde(default = "default_manifest_dir")]
  pub manifest_dir: PathBuf,
}

fn default_recipe() -> PathBuf {
  PathBuf::from("snap/snapcraft.yaml")
}

fn default_changelog() -> PathBuf {
  PathBuf::from("ChangeLog")
}

fn default_manifest_dir() -> PathBuf {
  PathBuf::from("snap-manifests")
}

/// Release run settings
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseSettings {
  /// Architectures to build and diff
  #[serde(default = "default_architectures")]
  pub architectures: Vec<String>,

  /// Channel whose last published snap provides the diff baseline
  #[serde(default = "default_channel")]
  pub channel: String,

  /// File-path patterns excluded from manifest diffing
  #[serde(default)]
  pub exclude: Vec<String>,

  /// Acceptance test command, run with the built snap path in SNAPSHIP_SNAP
  #[serde(default)]
  pub test_command: Option<String>,

  /// Remote to push branches and tags to
  #[serde(default = "default_remote")]
  pub remote: String,
}

fn default_architectures() -> Vec<String> {
  vec!["amd64".to_string()]
}

fn default_channel() -> String {
  "latest/beta".to_string()
}

fn default_remote() -> String {
  "origin".to_string()
}

impl Default for ReleaseSettings {
  fn default() -> Self {
    Self {
      architectures: default_architectures(),
      channel: default_channel(),
      exclude: Vec::new(),
      test_command: None,
      remote: default_remote(),
    }
  }
}

/// Baseline fallback policy
///
/// The track threshold, step and legacy-track map are deployment policy,
/// not algorithm, so they live in configuration.
///
/// # Example
///
/// ```toml
/// [store]
/// track_threshold = 20
/// track_step = 2
/// default_track = "latest"
/// default_arch = "amd64"
///
/// [store.legacy_tracks]
/// maas = "1.10"
/// maas-test-db = "1.10"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct StorePolicy {
  /// Numeric tracks above this threshold fall back to track - track_step
  #[serde(default = "default_track_threshold")]
  pub track_threshold: u32,

  /// How far to step back when deriving a fallback track
  #[serde(default = "default_track_step")]
  pub track_step: u32,

  /// Fallback track for non-numeric or low tracks
  #[serde(default = "default_track")]
  pub default_track: String,

  /// Architecture to retry with when the requested one has no published snap
  #[serde(default = "default_arch")]
  pub default_arch: String,

  /// Per-snap legacy tracks overriding default_track
  #[serde(default)]
  pub legacy_tracks: BTreeMap<String, String>,
}

fn default_track_threshold() -> u32 {
  20
}

fn default_track_step() -> u32 {
  2
}

fn default_track() -> String {
  "latest".to_string()
}

fn default_arch() -> String {
  "amd64".to_string()
}

impl Default for StorePolicy {
  fn default() -> Self {
    Self {
      track_threshold: default_track_threshold(),
      track_step: default_track_step(),
      default_track: default_track(),
      default_arch: default_arch(),
      legacy_tracks: BTreeMap::new(),
    }
  }
}

impl StorePolicy {
  /// Legacy track for a snap, falling back to the policy default
  pub fn legacy_track(&self, snap: &str) -> &str {
    self.legacy_tracks.get(snap).map(String::as_str).unwrap_or(&self.default_track)
  }
}

impl ShipConfig {
  /// Find config file in search order
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("snapship.toml"),
      path.join(".snapship.toml"),
      path.join(".config").join("snapship.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from snapship.toml (searches multiple locations)
  pub fn load(path: &Path) -> ShipResult<Self> {
    let config_path = Self::find_config_path(path).ok_or_else(|| {
      ShipError::Config(ConfigError::NotFound {
        workspace_root: path.to_path_buf(),
      })
    })?;

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: ShipConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config
      .validate()
      .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    Ok(config)
  }

  /// Check if config exists at the given path
  pub fn exists(path: &Path) -> bool {
    Self::find_config_path(path).is_some()
  }

  /// Validate the configuration
  pub fn validate(&self) -> ShipResult<()> {
    if self.snap.name.is_empty() {
      return Err(ShipError::Config(ConfigError::MissingField {
        field: "snap.name".to_string(),
      }));
    }

    if self.release.architectures.is_empty() {
      return Err(ShipError::Config(ConfigError::Invalid {
        reason: "release.architectures must name at least one architecture".to_string(),
      }));
    }

    if self.store.track_step == 0 {
      return Err(ShipError::Config(ConfigError::Invalid {
        reason: "store.track_step must be at least 1".to_string(),
      }));
    }

    for pattern in &self.release.exclude {
      glob::Pattern::new(pattern).map_err(|e| {
        ShipError::Config(ConfigError::Invalid {
          reason: format!("bad exclusion pattern '{}': {}", pattern, e),
        })
      })?;
    }

    Ok(())
  }
}
