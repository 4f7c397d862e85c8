//! The release command

use crate::core::config::ShipConfig;
use crate::core::error::ShipResult;
use crate::core::vcs::SystemGit;
use crate::release::{ReleaseOrchestrator, ReleaseRequest};
use crate::snap::{AcceptanceRunner, CommandRunner, SnapcraftBuilder, SystemPack, SystemStore};
use std::path::Path;

/// Run a release from the given workspace
///
/// Environment overrides (`SNAPSHIP_ARCHITECTURES`, `SNAPSHIP_CHANNEL`,
/// `SNAPSHIP_NEXT_VERSION`) take precedence over configuration; they exist
/// for CI pipelines that parameterize one packaging repository.
pub fn run_release(workspace: &Path, branch: Option<String>, dry_run: bool) -> ShipResult<()> {
  let git = SystemGit::open(workspace)?;
  let config = ShipConfig::load(git.work_tree())?;
  let root = git.work_tree().to_path_buf();

  let architectures = match std::env::var("SNAPSHIP_ARCHITECTURES") {
    Ok(archs) => archs.split(',').map(|a| a.trim().to_string()).filter(|a| !a.is_empty()).collect(),
    Err(_) => config.release.architectures.clone(),
  };
  let channel = std::env::var("SNAPSHIP_CHANNEL").unwrap_or_else(|_| config.release.channel.clone());
  let next_version = std::env::var("SNAPSHIP_NEXT_VERSION").ok();

  let release_branch = match branch {
    Some(branch) => branch,
    None => git.current_branch()?,
  };

  let request = ReleaseRequest {
    release_branch,
    channel,
    architectures,
    next_version,
    dry_run,
  };

  let scratch = std::env::temp_dir().join("snapship-store");
  let store = SystemStore::new(scratch.clone());
  let builder = SnapcraftBuilder::new(root.clone(), root.join("snap-builds"));
  let pack = SystemPack::new(scratch);
  let acceptance = config
    .release
    .test_command
    .as_ref()
    .map(|command| CommandRunner::new(command.clone(), root.clone()));

  let orchestrator = ReleaseOrchestrator::new(
    &config,
    &git,
    &store,
    &builder,
    &pack,
    acceptance.as_ref().map(|runner| runner as &dyn AcceptanceRunner),
  );
  orchestrator.run(&request)
}
