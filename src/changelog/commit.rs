//! Field extraction from merge-commit messages
//!
//! Merge commits carry semi-structured bodies: optional `Author:` and
//! `Merge-Proposal:` trailer lines, an optional merge-proposal URL, and
//! free-text description. Each extraction rule is a named function so the
//! parsing policy stays independently testable.

use crate::core::vcs::CommitInfo;

/// Substituted when a merge commit carries no usable description
pub const EMPTY_DESCRIPTION: &str = "See the merge proposal for a description of the change.";

/// A merge commit reduced to the fields the changelog needs
///
/// Immutable after extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCommit {
  pub sha: String,
  /// Resolved author identity (trailer value, or VCS name + email)
  pub author: String,
  /// Merge-proposal reference, empty when none was found
  pub reference: String,
  pub description: String,
}

impl MergeCommit {
  /// Extract changelog fields from a commit
  ///
  /// An explicit `Author:` trailer wins; otherwise the VCS-recorded identity
  /// is used and the body is searched for a merge-proposal URL. Absent
  /// fields degrade to empty strings, never to an error.
  pub fn from_commit(info: &CommitInfo) -> Self {
    let body = &info.message;

    let (author, reference) = match author_trailer(body) {
      Some(author) => (author, proposal_trailer(body).unwrap_or_default()),
      None => {
        let author = format!("{} <{}>", info.author, info.author_email);
        let reference = proposal_trailer(body)
          .or_else(|| proposal_marker(body))
          .unwrap_or_default();
        (author, reference)
      }
    };

    let mut description = description(body);
    if description.is_empty() {
      description = EMPTY_DESCRIPTION.to_string();
    }

    Self {
      sha: info.sha.clone(),
      author,
      reference,
      description,
    }
  }
}

/// Value of an `Author:` trailer line, if present
pub fn author_trailer(body: &str) -> Option<String> {
  trailer_value(body, "Author:")
}

/// Value of a `Merge-Proposal:` trailer line, if present
pub fn proposal_trailer(body: &str) -> Option<String> {
  trailer_value(body, "Merge-Proposal:")
}

/// First merge-proposal URL embedded in the body, if any
///
/// Merge commits created by the review platform carry a line containing the
/// proposal URL (recognized by its `/+merge/` path segment).
pub fn proposal_marker(body: &str) -> Option<String> {
  for line in body.lines() {
    for token in line.split_whitespace() {
      if token.contains("/+merge/") {
        return Some(token.trim_end_matches(['.', ',', ';']).to_string());
      }
    }
  }
  None
}

fn trailer_value(body: &str, key: &str) -> Option<String> {
  body.lines().find_map(|line| {
    let trimmed = line.trim_start();
    trimmed.strip_prefix(key).map(|rest| rest.trim().to_string())
  })
}

/// Description text of a merge-commit body
///
/// Removes `Author:`/`Merge` trailer lines, strips leading blank lines, and
/// indents every line from the third onward by four spaces so multi-paragraph
/// descriptions stay visually subordinate in the rendered entry.
pub fn description(body: &str) -> String {
  let kept: Vec<&str> = body
    .lines()
    .filter(|line| {
      let trimmed = line.trim_start();
      !trimmed.starts_with("Author:") && !trimmed.starts_with("Merge")
    })
    .collect();

  let kept: Vec<&str> = kept
    .iter()
    .skip_while(|line| line.trim().is_empty())
    .copied()
    .collect();

  let mut out = Vec::with_capacity(kept.len());
  for (i, line) in kept.iter().enumerate() {
    if i >= 2 && !line.is_empty() {
      out.push(format!("    {}", line));
    } else {
      out.push((*line).to_string());
    }
  }

  out.join("\n").trim_end().to_string()
}
