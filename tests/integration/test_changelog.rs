//! Integration tests for `snapship changelog`

use crate::helpers::{run_snapship, TestRepo};
use anyhow::Result;

#[test]
fn test_changelog_groups_by_author() -> Result<()> {
  let repo = TestRepo::new("maas")?;

  repo.merge_branch(
    "fix-dhcp",
    "dhcp.txt",
    "Merge branch 'fix-dhcp'\n\nFix DHCP lease parsing\n\nAuthor: Jane Doe <jane@example.com>\nMerge-Proposal: https://launchpad.net/maas/+merge/101",
  )?;
  repo.merge_branch(
    "fix-dns",
    "dns.txt",
    "Merge branch 'fix-dns'\n\nFix DNS zone serials\n\nAuthor: Jane Doe <jane@example.com>",
  )?;

  let output = run_snapship(&repo.path, &["changelog", "--version", "3.5.0"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("maas 3.5.0"), "header names snap and version: {}", stdout);
  assert!(stdout.contains("[ Jane Doe <jane@example.com> ]"));
  assert!(stdout.contains("* Fix DHCP lease parsing"));
  assert!(stdout.contains("* Fix DNS zone serials"));
  assert!(stdout.contains("https://launchpad.net/maas/+merge/101"));
  // Both changes share one author group
  assert_eq!(stdout.matches("[ Jane Doe").count(), 1);

  Ok(())
}

#[test]
fn test_changelog_falls_back_to_vcs_author() -> Result<()> {
  let repo = TestRepo::new("maas")?;

  repo.merge_branch(
    "no-trailers",
    "thing.txt",
    "Merged no-trailers into main https://launchpad.net/maas/+merge/202",
  )?;

  let output = run_snapship(&repo.path, &["changelog", "--version", "3.5.0"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("[ Test User <test@example.com> ]"));
  assert!(stdout.contains("See the merge proposal for a description of the change."));
  assert!(stdout.contains("https://launchpad.net/maas/+merge/202"));

  Ok(())
}

#[test]
fn test_changelog_version_from_recipe() -> Result<()> {
  let repo = TestRepo::new("maas")?;

  repo.merge_branch(
    "small-fix",
    "fix.txt",
    "Merge branch 'small-fix'\n\nSmall fix\n\nAuthor: Bob <bob@example.com>",
  )?;

  // No --version: the recipe's 1.1.0~dev resolves to 1.1.0
  let output = run_snapship(&repo.path, &["changelog"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("maas 1.1.0\n"), "recipe-derived version: {}", stdout);

  Ok(())
}

#[test]
fn test_changelog_json_output() -> Result<()> {
  let repo = TestRepo::new("maas")?;

  repo.merge_branch(
    "fix-thing",
    "thing.txt",
    "Merge branch 'fix-thing'\n\nFix the thing\n\nAuthor: Jane <jane@example.com>",
  )?;

  let output = run_snapship(&repo.path, &["changelog", "--version", "3.5.0", "--json"])?;
  let parsed: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(parsed["name"], "maas");
  assert_eq!(parsed["version"], "3.5.0");
  let groups = parsed["groups"].as_array().unwrap();
  assert_eq!(groups.len(), 1);
  assert_eq!(groups[0][0], "Jane <jane@example.com>");
  assert_eq!(groups[0][1][0]["description"], "Fix the thing");

  Ok(())
}

#[test]
fn test_changelog_range_since_tag() -> Result<()> {
  let repo = TestRepo::new("maas")?;

  repo.merge_branch(
    "old-fix",
    "old.txt",
    "Merge branch 'old-fix'\n\nOld fix\n\nAuthor: Bob <bob@example.com>",
  )?;
  crate::helpers::git(&repo.path, &["tag", "-a", "v1.0.0", "-m", "Release 1.0.0"])?;
  repo.merge_branch(
    "new-fix",
    "new.txt",
    "Merge branch 'new-fix'\n\nNew fix\n\nAuthor: Bob <bob@example.com>",
  )?;

  // Default range starts at the last tag
  let output = run_snapship(&repo.path, &["changelog", "--version", "1.1.0"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("New fix"));
  assert!(!stdout.contains("Old fix"));

  Ok(())
}

#[test]
fn test_changelog_trailing_block() -> Result<()> {
  let repo = TestRepo::new("maas")?;

  repo.merge_branch(
    "a-fix",
    "a.txt",
    "Merge branch 'a-fix'\n\nA fix\n\nAuthor: Bob <bob@example.com>",
  )?;
  repo.write_file("summary.txt", "Package changes:\n  * pkg-a: 1.0 -> 1.1\n")?;

  let output = run_snapship(
    &repo.path,
    &["changelog", "--version", "3.5.0", "--trailing", "summary.txt"],
  )?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.ends_with("Package changes:\n  * pkg-a: 1.0 -> 1.1\n"));

  Ok(())
}
