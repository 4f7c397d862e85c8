//! Release version resolution from the snapcraft recipe
//!
//! The recipe carries the development version (for example `3.5.0~dev`).
//! Stripping the tilde suffix yields the release version; the next
//! development version bumps the minor component unless overridden.

use crate::core::error::{ResultExt, ShipError, ShipResult};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// The recipe fields version resolution needs
#[derive(Debug, Deserialize)]
struct Recipe {
  version: String,
}

/// Versions driving one release run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPlan {
  /// Version being released (recipe version without its `~` suffix)
  pub release: String,

  /// Development version stamped after the release commit
  pub next_dev: String,
}

/// Read the version field of a snapcraft recipe
pub fn read_recipe_version(recipe: &Path) -> ShipResult<String> {
  let content =
    fs::read_to_string(recipe).with_context(|| format!("Failed to read recipe {}", recipe.display()))?;
  let parsed: Recipe =
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse recipe {}", recipe.display()))?;
  Ok(parsed.version)
}

/// Rewrite the recipe's version line in place
///
/// Line-based so the rest of the recipe (ordering, comments, formatting)
/// survives byte for byte.
pub fn stamp_recipe_version(recipe: &Path, version: &str) -> ShipResult<()> {
  let content =
    fs::read_to_string(recipe).with_context(|| format!("Failed to read recipe {}", recipe.display()))?;

  let mut stamped = false;
  let mut lines: Vec<String> = Vec::new();
  for line in content.lines() {
    if !stamped && line.starts_with("version:") {
      lines.push(format!("version: {}", version));
      stamped = true;
    } else {
      lines.push(line.to_string());
    }
  }

  if !stamped {
    return Err(ShipError::message(format!(
      "Recipe {} has no version line",
      recipe.display()
    )));
  }

  fs::write(recipe, lines.join("\n") + "\n")
    .with_context(|| format!("Failed to write recipe {}", recipe.display()))?;
  Ok(())
}

/// Resolve the version plan from a recipe version
///
/// `forced_next` overrides the computed next development version.
pub fn resolve(recipe_version: &str, forced_next: Option<&str>) -> ShipResult<VersionPlan> {
  let release = recipe_version
    .split_once('~')
    .map(|(base, _)| base)
    .unwrap_or(recipe_version)
    .to_string();

  let next_dev = match forced_next {
    Some(next) => next.to_string(),
    None => {
      let parsed = semver::Version::parse(&release)
        .with_context(|| format!("Release version '{}' is not semver", release))?;
      format!("{}.{}.0~dev", parsed.major, parsed.minor + 1)
    }
  };

  Ok(VersionPlan { release, next_dev })
}
