//! Changelog synthesis from merge history
//!
//! Builds one dated entry per release: merge-commit descriptions grouped by
//! author, followed by the package-change summary. The changelog file is an
//! append-at-top log, newest entry first.

pub mod commit;

pub use commit::MergeCommit;

use crate::core::error::{ResultExt, ShipResult};
use crate::core::vcs::{CommitInfo, SystemGit};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// One change under an author group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeItem {
  pub description: String,
  /// Merge-proposal reference, empty when none was found
  pub reference: String,
}

/// A dated changelog entry for one release
#[derive(Debug, Clone, Serialize)]
pub struct ChangelogEntry {
  /// ISO date (YYYY-MM-DD)
  pub date: String,
  pub name: String,
  pub version: String,
  /// Author groups in first-appearance order; items chronological within
  pub groups: Vec<(String, Vec<ChangeItem>)>,
  /// Free-text block appended verbatim (package-change summary)
  pub trailing: String,
}

impl ChangelogEntry {
  /// Synthesize an entry from merge commits (oldest first), dated today
  pub fn synthesize(commits: &[CommitInfo], name: &str, version: &str, trailing: &str) -> Self {
    let date = chrono::Utc::now().format("%Y-%m-%d").to_string();
    Self::synthesize_dated(commits, name, version, trailing, &date)
  }

  /// Synthesize an entry with an explicit date
  pub fn synthesize_dated(commits: &[CommitInfo], name: &str, version: &str, trailing: &str, date: &str) -> Self {
    Self {
      date: date.to_string(),
      name: name.to_string(),
      version: version.to_string(),
      groups: group_by_author(commits),
      trailing: trailing.to_string(),
    }
  }

  /// Render the entry as changelog text
  pub fn render(&self) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {} {}\n", self.date, self.name, self.version));

    for (author, items) in &self.groups {
      out.push('\n');
      out.push_str(&format!("  [ {} ]\n", author));
      for item in items {
        out.push_str(&format!("  * {}\n", item.description));
        if !item.reference.is_empty() {
          out.push_str(&format!("    {}\n", item.reference));
        }
      }
    }

    if !self.trailing.is_empty() {
      out.push('\n');
      out.push_str(&self.trailing);
      if !self.trailing.ends_with('\n') {
        out.push('\n');
      }
    }

    out
  }
}

/// Group merge commits by author, first-appearance order
///
/// Every commit lands under exactly one author key; per-author order is
/// chronological (the input is oldest first).
pub fn group_by_author(commits: &[CommitInfo]) -> Vec<(String, Vec<ChangeItem>)> {
  let mut groups: Vec<(String, Vec<ChangeItem>)> = Vec::new();

  for info in commits {
    let mc = MergeCommit::from_commit(info);
    let item = ChangeItem {
      description: mc.description,
      reference: mc.reference,
    };

    match groups.iter_mut().find(|(author, _)| *author == mc.author) {
      Some((_, items)) => items.push(item),
      None => groups.push((mc.author, vec![item])),
    }
  }

  groups
}

/// Enumerate merge commits in a range, oldest first, with full metadata
pub fn merge_commits_in_range(git: &SystemGit, range: &str) -> ShipResult<Vec<CommitInfo>> {
  let shas = git.merge_commits(range)?;
  shas.iter().map(|sha| git.get_commit(sha)).collect()
}

/// Prepend an entry to the changelog file
///
/// The resulting content is exactly `entry + "\n" + previous content`; a
/// missing file behaves as empty.
pub fn prepend_entry(path: &Path, entry: &str) -> ShipResult<()> {
  let existing = if path.exists() {
    fs::read_to_string(path).with_context(|| format!("Failed to read changelog {}", path.display()))?
  } else {
    String::new()
  };

  let content = format!("{}\n{}", entry, existing);
  fs::write(path, content).with_context(|| format!("Failed to write changelog {}", path.display()))?;

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::changelog::commit::EMPTY_DESCRIPTION;

  fn commit(sha: &str, author: &str, email: &str, message: &str) -> CommitInfo {
    CommitInfo {
      sha: sha.to_string(),
      author: author.to_string(),
      author_email: email.to_string(),
      message: message.to_string(),
      timestamp: 1700000000,
    }
  }

  #[test]
  fn test_group_by_author_first_appearance_order() {
    let commits = vec![
      commit("a", "X", "x@x", "one\n\nAuthor: Bob <b@x.com>"),
      commit("b", "X", "x@x", "two\n\nAuthor: Alice <a@x.com>"),
      commit("c", "X", "x@x", "three\n\nAuthor: Bob <b@x.com>"),
    ];

    let groups = group_by_author(&commits);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].0, "Bob <b@x.com>");
    assert_eq!(groups[1].0, "Alice <a@x.com>");
    // Chronological within Bob's group
    assert_eq!(groups[0].1[0].description, "one");
    assert_eq!(groups[0].1[1].description, "three");
  }

  #[test]
  fn test_every_commit_lands_in_exactly_one_group() {
    let commits = vec![
      commit("a", "X", "x@x", "one\n\nAuthor: Bob <b@x.com>"),
      commit("b", "Y", "y@y", "two"),
      commit("c", "Z", "z@z", "three"),
    ];

    let groups = group_by_author(&commits);
    let total: usize = groups.iter().map(|(_, items)| items.len()).sum();
    assert_eq!(total, commits.len());
  }

  #[test]
  fn test_render_header_and_groups() {
    let commits = vec![commit(
      "a",
      "X",
      "x@x",
      "Fix bug\n\nAuthor: Jane <j@x.com>\nMerge-Proposal: https://x/+merge/1",
    )];
    let entry = ChangelogEntry::synthesize_dated(&commits, "maas", "3.5.0", "", "2026-08-30");
    let text = entry.render();

    assert!(text.starts_with("2026-08-30 maas 3.5.0\n"));
    assert!(text.contains("  [ Jane <j@x.com> ]\n"));
    assert!(text.contains("  * Fix bug\n"));
    assert!(text.contains("    https://x/+merge/1\n"));
  }

  #[test]
  fn test_render_trailer_and_fallback_scenario() {
    // One commit with an explicit trailer, one with nothing but a marker
    let commits = vec![
      commit("a", "X", "x@x", "Fix bug\n\nAuthor: Jane <j@x.com>"),
      commit("b", "John Doe", "jd@x.com", "Merged thing into main https://x/p/+merge/2"),
    ];
    let entry = ChangelogEntry::synthesize_dated(&commits, "maas", "3.5.0", "", "2026-08-30");
    let text = entry.render();

    assert!(text.contains("[ Jane <j@x.com> ]"));
    assert!(text.contains("* Fix bug"));
    assert!(text.contains("[ John Doe <jd@x.com> ]"));
    assert!(text.contains(EMPTY_DESCRIPTION));
    assert!(text.contains("    https://x/p/+merge/2"));
  }

  #[test]
  fn test_render_appends_trailing_verbatim() {
    let entry = ChangelogEntry::synthesize_dated(&[], "maas", "3.5.0", "Package changes:\n  * pkg-a: 1.0 -> 1.1", "2026-08-30");
    let text = entry.render();

    assert!(text.ends_with("Package changes:\n  * pkg-a: 1.0 -> 1.1\n"));
  }

  #[test]
  fn test_prepend_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ChangeLog");
    fs::write(&path, "old entry\n").unwrap();

    prepend_entry(&path, "new entry").unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "new entry\nold entry\n");
  }

  #[test]
  fn test_prepend_creates_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ChangeLog");

    prepend_entry(&path, "first entry").unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "first entry\n");
  }
}
