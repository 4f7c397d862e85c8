//! Manifest diffing and package-change reporting
//!
//! Compares the baseline manifest against a freshly built one, restricted to
//! packages owning at least one non-excluded file, and summarizes each
//! change using the package's bundled changelog fragment. Summaries must be
//! byte-identical across architectures; divergence aborts the release.

use crate::core::error::{ResultExt, ShipError, ShipResult};
use crate::manifest::Manifest;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// A dependency package that changed between baseline and build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageChange {
  pub name: String,
  /// Absent when the package is newly added
  pub old_version: Option<String>,
  /// Absent when the package was removed
  pub new_version: Option<String>,
  /// Changelog stanzas covering the transition, empty when unavailable
  pub excerpt: String,
}

/// Compiled file-path exclusion patterns
pub struct ExclusionList {
  patterns: Vec<glob::Pattern>,
}

impl ExclusionList {
  pub fn new(patterns: &[String]) -> ShipResult<Self> {
    let patterns = patterns
      .iter()
      .map(|p| glob::Pattern::new(p))
      .collect::<Result<Vec<_>, _>>()?;
    Ok(Self { patterns })
  }

  pub fn empty() -> Self {
    Self { patterns: Vec::new() }
  }

  fn matches(&self, path: &str) -> bool {
    self.patterns.iter().any(|p| p.matches(path))
  }
}

/// Exclusion-filtered copy of a manifest, for diffing only
///
/// The stored manifest keeps its full file set; filtering is diff-scoped.
fn filter_manifest(manifest: &Manifest, exclusions: &ExclusionList) -> Manifest {
  let mut filtered = Manifest::default();
  for entry in manifest.entries.values() {
    let files: std::collections::BTreeSet<String> =
      entry.files.iter().filter(|f| !exclusions.matches(f)).cloned().collect();
    if files.is_empty() {
      continue;
    }
    let mut kept = entry.clone();
    kept.files = files;
    filtered.entries.insert(kept.name.clone(), kept);
  }
  filtered
}

/// Diff two manifests under an exclusion list
///
/// A package is reported only if its version changed, or it was added or
/// removed, after both manifests pass through the same exclusion filter.
/// Changelog excerpts come from `docs_dir/<package>/changelog` when present.
pub fn diff(
  old: &Manifest,
  new: &Manifest,
  exclusions: &ExclusionList,
  docs_dir: Option<&Path>,
) -> ShipResult<Vec<PackageChange>> {
  let old = filter_manifest(old, exclusions);
  let new = filter_manifest(new, exclusions);

  let mut names: Vec<&String> = old.entries.keys().chain(new.entries.keys()).collect();
  names.sort();
  names.dedup();

  let mut changes = Vec::new();
  for name in names {
    let old_entry = old.entries.get(name);
    let new_entry = new.entries.get(name);

    let (old_version, new_version) = match (old_entry, new_entry) {
      (Some(o), Some(n)) if o.version == n.version => continue,
      (Some(o), Some(n)) => (Some(o.version.clone()), Some(n.version.clone())),
      (Some(o), None) => (Some(o.version.clone()), None),
      (None, Some(n)) => (None, Some(n.version.clone())),
      (None, None) => continue,
    };

    let excerpt = match (&new_version, docs_dir) {
      (Some(new_version), Some(docs)) => {
        changelog_excerpt(docs, name, old_version.as_deref(), new_version)?
      }
      _ => String::new(),
    };

    changes.push(PackageChange {
      name: name.clone(),
      old_version,
      new_version,
      excerpt,
    });
  }

  Ok(changes)
}

/// Excerpt of a package's bundled changelog fragment
///
/// Stanzas are collected starting at the one matching the new version (or
/// the top of the fragment) down to, and excluding, the stanza matching the
/// old version. A newly added package gets the top stanza only.
fn changelog_excerpt(docs_dir: &Path, package: &str, old: Option<&str>, new: &str) -> ShipResult<String> {
  let path = docs_dir.join(package).join("changelog");
  if !path.exists() {
    return Ok(String::new());
  }

  let fragment =
    fs::read_to_string(&path).with_context(|| format!("Failed to read changelog fragment {}", path.display()))?;
  Ok(excerpt(&fragment, old, new))
}

/// Pure excerpt computation over a changelog fragment
pub fn excerpt(fragment: &str, old: Option<&str>, new: &str) -> String {
  let stanzas = split_stanzas(fragment);
  if stanzas.is_empty() {
    return String::new();
  }

  let start = stanzas.iter().position(|(version, _)| version == new).unwrap_or(0);

  let selected: Vec<&str> = match old {
    None => vec![stanzas[start].1.as_str()],
    Some(old) => stanzas[start..]
      .iter()
      .take_while(|(version, _)| version != old)
      .map(|(_, text)| text.as_str())
      .collect(),
  };

  selected.join("\n").trim_end().to_string()
}

/// Split a changelog fragment into (version, stanza text) pairs, newest first
///
/// A stanza starts with an unindented `package (version) ...` header line.
fn split_stanzas(fragment: &str) -> Vec<(String, String)> {
  let mut stanzas: Vec<(String, String)> = Vec::new();

  for line in fragment.lines() {
    if let Some(version) = stanza_version(line) {
      stanzas.push((version, String::new()));
    }
    if let Some((_, text)) = stanzas.last_mut() {
      text.push_str(line);
      text.push('\n');
    }
  }

  stanzas
}

fn stanza_version(line: &str) -> Option<String> {
  if line.starts_with(' ') || line.starts_with('\t') || line.is_empty() {
    return None;
  }
  let open = line.find('(')?;
  let close = line[open..].find(')')? + open;
  Some(line[open + 1..close].to_string())
}

/// Render one indented block per changed package
pub fn summary(changes: &[PackageChange]) -> String {
  let mut out = String::new();

  for change in changes {
    let transition = match (&change.old_version, &change.new_version) {
      (Some(old), Some(new)) => format!("{} -> {}", old, new),
      (None, Some(new)) => format!("added {}", new),
      (Some(old), None) => format!("removed (was {})", old),
      (None, None) => continue,
    };

    out.push_str(&format!("  * {}: {}\n", change.name, transition));
    for line in change.excerpt.lines() {
      out.push_str(&format!("    {}\n", line));
    }
  }

  out
}

/// Verify that all architectures produced the same summary text
///
/// A mismatch signals a packaging race (some builds picked up a dependency
/// update others missed) and aborts the release.
pub fn check_consistency(summaries: &[(String, String)]) -> ShipResult<()> {
  let Some((first_arch, first_text)) = summaries.first() else {
    return Ok(());
  };

  for (arch, text) in &summaries[1..] {
    if text != first_text {
      return Err(ShipError::Consistency {
        left_arch: first_arch.clone(),
        right_arch: arch.clone(),
        left_text: first_text.clone(),
        right_text: text.clone(),
      });
    }
  }

  Ok(())
}
