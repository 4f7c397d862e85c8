//! Integration tests for `snapship manifest diff`

use crate::helpers::{run_snapship, run_snapship_raw, TestRepo};
use anyhow::Result;

const OLD: &str = "pkg-a 1.0\n /usr/bin/a\npkg-b 2.0\n /usr/bin/b\n";
const NEW: &str = "pkg-a 1.1\n /usr/bin/a\npkg-b 2.0\n /usr/bin/b\n";

#[test]
fn test_diff_reports_version_change() -> Result<()> {
  let repo = TestRepo::new("maas")?;
  repo.write_file("old.txt", OLD)?;
  repo.write_file("new.txt", NEW)?;

  let output = run_snapship(&repo.path, &["manifest", "diff", "old.txt", "new.txt"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("* pkg-a: 1.0 -> 1.1"));
  assert!(!stdout.contains("pkg-b"));

  Ok(())
}

#[test]
fn test_diff_no_changes() -> Result<()> {
  let repo = TestRepo::new("maas")?;
  repo.write_file("old.txt", OLD)?;
  repo.write_file("new.txt", OLD)?;

  let output = run_snapship(&repo.path, &["manifest", "diff", "old.txt", "new.txt"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("No package changes"));

  Ok(())
}

#[test]
fn test_diff_exclusion_pattern() -> Result<()> {
  let repo = TestRepo::new("maas")?;
  repo.write_file("old.txt", OLD)?;
  repo.write_file("new.txt", NEW)?;

  let output = run_snapship(
    &repo.path,
    &["manifest", "diff", "old.txt", "new.txt", "--exclude", "/usr/bin/a"],
  )?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("No package changes"));

  Ok(())
}

#[test]
fn test_diff_configured_exclusions_apply() -> Result<()> {
  let repo = TestRepo::new("maas")?;
  repo.write_file(
    "snapship.toml",
    "[snap]\nname = \"maas\"\n\n[release]\nexclude = [\"/usr/bin/a\"]\n",
  )?;
  repo.write_file("old.txt", OLD)?;
  repo.write_file("new.txt", NEW)?;

  let output = run_snapship(&repo.path, &["manifest", "diff", "old.txt", "new.txt"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("No package changes"));

  Ok(())
}

#[test]
fn test_diff_json_output() -> Result<()> {
  let repo = TestRepo::new("maas")?;
  repo.write_file("old.txt", OLD)?;
  repo.write_file("new.txt", NEW)?;

  let output = run_snapship(&repo.path, &["manifest", "diff", "old.txt", "new.txt", "--json"])?;
  let parsed: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  let changes = parsed.as_array().unwrap();
  assert_eq!(changes.len(), 1);
  assert_eq!(changes[0]["name"], "pkg-a");
  assert_eq!(changes[0]["old_version"], "1.0");
  assert_eq!(changes[0]["new_version"], "1.1");

  Ok(())
}

#[test]
fn test_diff_excerpt_from_docs() -> Result<()> {
  let repo = TestRepo::new("maas")?;
  repo.write_file("old.txt", OLD)?;
  repo.write_file("new.txt", NEW)?;
  repo.write_file(
    "docs/pkg-a/changelog",
    "pkg-a (1.1) stable; urgency=medium\n\n  * Fix buffer handling\n\n -- P <p@x>  Mon, 01 Jan 2026 00:00:00 +0000\n\npkg-a (1.0) stable; urgency=medium\n\n  * Initial release\n\n -- P <p@x>  Mon, 01 Dec 2025 00:00:00 +0000\n",
  )?;

  let output = run_snapship(
    &repo.path,
    &["manifest", "diff", "old.txt", "new.txt", "--docs", "docs"],
  )?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("* pkg-a: 1.0 -> 1.1"));
  assert!(stdout.contains("Fix buffer handling"));
  assert!(!stdout.contains("Initial release"));

  Ok(())
}

#[test]
fn test_diff_malformed_manifest_exits_with_user_error() -> Result<()> {
  let repo = TestRepo::new("maas")?;
  repo.write_file("old.txt", " /orphan/file\n")?;
  repo.write_file("new.txt", NEW)?;

  let output = run_snapship_raw(&repo.path, &["manifest", "diff", "old.txt", "new.txt"])?;

  assert!(!output.status.success());
  assert_eq!(output.status.code(), Some(1));

  Ok(())
}
