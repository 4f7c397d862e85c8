//! Dependency manifests embedded in built snaps
//!
//! A manifest records every dependency package bundled into the artifact and
//! the files each package owns. The on-disk format is line oriented: a
//! `name version` header line per package, followed by its owned file paths
//! indented by one space.

pub mod baseline;
pub mod diff;

use crate::core::error::{ResultExt, ShipError, ShipResult};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// One dependency package and the files it owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
  pub name: String,
  pub version: String,
  pub files: BTreeSet<String>,
}

/// A set of dependency packages keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
  pub entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
  /// Parse manifest text
  pub fn parse(text: &str) -> ShipResult<Self> {
    let mut entries = BTreeMap::new();
    let mut current: Option<ManifestEntry> = None;

    for (lineno, line) in text.lines().enumerate() {
      if line.trim().is_empty() {
        continue;
      }

      if line.starts_with(' ') || line.starts_with('\t') {
        match current.as_mut() {
          Some(entry) => {
            entry.files.insert(line.trim().to_string());
          }
          None => {
            return Err(ShipError::message(format!(
              "Manifest line {}: file path before any package header",
              lineno + 1
            )));
          }
        }
        continue;
      }

      if let Some(entry) = current.take() {
        entries.insert(entry.name.clone(), entry);
      }

      let mut parts = line.split_whitespace();
      let name = parts
        .next()
        .ok_or_else(|| ShipError::message(format!("Manifest line {}: empty package header", lineno + 1)))?;
      let version = parts.next().ok_or_else(|| {
        ShipError::message(format!("Manifest line {}: package '{}' has no version", lineno + 1, name))
      })?;

      current = Some(ManifestEntry {
        name: name.to_string(),
        version: version.to_string(),
        files: BTreeSet::new(),
      });
    }

    if let Some(entry) = current.take() {
      entries.insert(entry.name.clone(), entry);
    }

    Ok(Self { entries })
  }

  /// Serialize to manifest text
  pub fn to_text(&self) -> String {
    let mut out = String::new();
    for entry in self.entries.values() {
      out.push_str(&format!("{} {}\n", entry.name, entry.version));
      for file in &entry.files {
        out.push_str(&format!(" {}\n", file));
      }
    }
    out
  }

  /// Load a manifest file
  pub fn load(path: &Path) -> ShipResult<Self> {
    let text =
      fs::read_to_string(path).with_context(|| format!("Failed to read manifest {}", path.display()))?;
    Self::parse(&text)
  }

  /// Save a manifest file
  pub fn save(&self, path: &Path) -> ShipResult<()> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(path, self.to_text()).with_context(|| format!("Failed to write manifest {}", path.display()))?;
    Ok(())
  }

  /// Cache file path for an architecture's manifest
  pub fn cache_file(dir: &Path, arch: &str) -> PathBuf {
    dir.join(format!("manifest-{}.txt", arch))
  }
}
