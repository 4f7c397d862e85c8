//! The changelog command

use crate::changelog::{self, ChangelogEntry};
use crate::core::config::ShipConfig;
use crate::core::error::{ResultExt, ShipResult};
use crate::core::vcs::SystemGit;
use crate::release::version;
use std::fs;
use std::path::Path;

/// Synthesize and print a changelog entry for a merge range
///
/// The range defaults to everything since the last tag. The version defaults
/// to the release version derived from the recipe. `trailing_file` supplies
/// an extra verbatim block (normally the package-change summary).
pub fn run_changelog(
  workspace: &Path,
  range: Option<String>,
  version: Option<String>,
  trailing_file: Option<&Path>,
  json: bool,
) -> ShipResult<()> {
  let git = SystemGit::open(workspace)?;
  let config = ShipConfig::load(git.work_tree())?;

  let range = match range {
    Some(range) => range,
    None => match git.latest_tag()? {
      Some(tag) => format!("{}..HEAD", tag),
      None => "HEAD".to_string(),
    },
  };

  let version = match version {
    Some(version) => version,
    None => {
      let recipe = git.work_tree().join(&config.snap.recipe);
      version::resolve(&version::read_recipe_version(&recipe)?, None)?.release
    }
  };

  let trailing = match trailing_file {
    Some(path) => {
      fs::read_to_string(path).with_context(|| format!("Failed to read trailing block {}", path.display()))?
    }
    None => String::new(),
  };

  let merges = changelog::merge_commits_in_range(&git, &range)?;
  let entry = ChangelogEntry::synthesize(&merges, &config.snap.name, &version, &trailing);

  if json {
    println!("{}", serde_json::to_string_pretty(&entry)?);
  } else {
    print!("{}", entry.render());
  }

  Ok(())
}
