//! The manifest diff and baseline commands

use crate::core::config::ShipConfig;
use crate::core::error::ShipResult;
use crate::manifest::baseline::BaselineResolver;
use crate::manifest::diff::{self, ExclusionList};
use crate::manifest::Manifest;
use crate::snap::SystemStore;
use std::path::{Path, PathBuf};

/// Diff two manifest files and print the package changes
///
/// Exclusion patterns given on the command line extend the configured list
/// when a configuration is present; the command also works standalone on
/// two bare manifest files.
pub fn run_manifest_diff(
  workspace: &Path,
  old: &Path,
  new: &Path,
  exclude: &[String],
  docs_dir: Option<&Path>,
  json: bool,
) -> ShipResult<()> {
  let mut patterns: Vec<String> = exclude.to_vec();
  if ShipConfig::exists(workspace) {
    patterns.extend(ShipConfig::load(workspace)?.release.exclude);
  }
  let exclusions = ExclusionList::new(&patterns)?;

  let old = Manifest::load(old)?;
  let new = Manifest::load(new)?;
  let changes = diff::diff(&old, &new, &exclusions, docs_dir)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&changes)?);
  } else if changes.is_empty() {
    println!("No package changes");
  } else {
    print!("{}", diff::summary(&changes));
  }

  Ok(())
}

/// Resolve and print the baseline manifest for a channel and architecture
pub fn run_manifest_baseline(
  workspace: &Path,
  channel: Option<String>,
  arch: Option<String>,
  cache_dir: Option<PathBuf>,
) -> ShipResult<()> {
  let config = ShipConfig::load(workspace)?;

  let channel = channel.unwrap_or_else(|| config.release.channel.clone());
  let arch = arch.unwrap_or_else(|| config.store.default_arch.clone());
  let cache_dir = cache_dir.unwrap_or_else(|| workspace.join(&config.snap.manifest_dir));

  let store = SystemStore::new(std::env::temp_dir().join("snapship-store"));
  let resolver = BaselineResolver::new(&store, &config.store, cache_dir);

  let manifest = resolver.resolve(&config.snap.name, &channel, &arch)?;
  print!("{}", manifest.to_text());

  Ok(())
}
