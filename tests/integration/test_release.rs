//! Integration tests for `snapship release --dry-run`

use crate::helpers::{run_snapship, run_snapship_raw, TestRepo};
use anyhow::Result;

#[test]
fn test_release_dry_run_prints_plan() -> Result<()> {
  let repo = TestRepo::new("maas")?;
  repo.merge_branch(
    "a-fix",
    "a.txt",
    "Merge branch 'a-fix'\n\nA fix\n\nAuthor: Bob <bob@example.com>",
  )?;

  let output = run_snapship(&repo.path, &["release", "--dry-run"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Dry run"));
  assert!(stdout.contains("maas"));
  // 1.1.0~dev in the recipe resolves to 1.1.0, then 1.2.0~dev
  assert!(stdout.contains("1.1.0"));
  assert!(stdout.contains("1.2.0~dev"));
  assert!(stdout.contains("snapship/build/main"));
  assert!(stdout.contains("1 merge commits"));

  Ok(())
}

#[test]
fn test_release_dry_run_touches_nothing() -> Result<()> {
  let repo = TestRepo::new("maas")?;
  repo.merge_branch(
    "a-fix",
    "a.txt",
    "Merge branch 'a-fix'\n\nA fix\n\nAuthor: Bob <bob@example.com>",
  )?;

  run_snapship(&repo.path, &["release", "--dry-run"])?;

  // No build branch, no tag, recipe untouched
  let branches = crate::helpers::git(&repo.path, &["branch", "--list", "snapship/build/*"])?;
  assert!(String::from_utf8_lossy(&branches.stdout).trim().is_empty());
  let tags = crate::helpers::git(&repo.path, &["tag"])?;
  assert!(String::from_utf8_lossy(&tags.stdout).trim().is_empty());
  let recipe = std::fs::read_to_string(repo.path.join("snap/snapcraft.yaml"))?;
  assert!(recipe.contains("version: 1.1.0~dev"));

  Ok(())
}

#[test]
fn test_release_without_config_exits_with_user_error() -> Result<()> {
  let repo = TestRepo::new("maas")?;
  std::fs::remove_file(repo.path.join("snapship.toml"))?;
  repo.commit("Drop config")?;

  let output = run_snapship_raw(&repo.path, &["release", "--dry-run"])?;

  assert!(!output.status.success());
  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("No snapship configuration found"));

  Ok(())
}
