//! The release pipeline
//!
//! A linear sequence: stamp the release version on a throwaway build branch,
//! build all architectures, diff the embedded manifests against the store
//! baseline, synthesize the changelog, commit the release, repack the
//! artifacts with the final metadata, run acceptance tests, move the branch
//! back to development, then tag and push. Any failure aborts the run; the
//! only compensation is a best-effort deletion of the build branch.

use crate::changelog::{self, ChangelogEntry};
use crate::core::config::ShipConfig;
use crate::core::error::{ResultExt, ShipResult};
use crate::core::vcs::{CommitInfo, SystemGit};
use crate::manifest::baseline::BaselineResolver;
use crate::manifest::diff::{self, ExclusionList};
use crate::manifest::Manifest;
use crate::release::version::{self, VersionPlan};
use crate::snap::{AcceptanceRunner, BuiltSnap, SnapBuilder, SnapPack, SnapStore, DOCS_DIR_IN_SNAP, MANIFEST_PATH_IN_SNAP};
use std::fs;
use std::path::Path;

/// Parameters of one release run
#[derive(Debug, Clone)]
pub struct ReleaseRequest {
  /// Branch being released (and pushed at the end)
  pub release_branch: String,

  /// Channel providing the diff baseline
  pub channel: String,

  /// Architectures to build; defaults come from configuration
  pub architectures: Vec<String>,

  /// Override for the next development version
  pub next_version: Option<String>,

  /// Print the plan without touching the repository or the store
  pub dry_run: bool,
}

/// Drives a release run end to end
pub struct ReleaseOrchestrator<'a> {
  config: &'a ShipConfig,
  git: &'a SystemGit,
  store: &'a dyn SnapStore,
  builder: &'a dyn SnapBuilder,
  pack: &'a dyn SnapPack,
  acceptance: Option<&'a dyn AcceptanceRunner>,
}

/// Build-branch name for a release branch
pub fn build_branch_name(release_branch: &str) -> String {
  format!("snapship/build/{}", release_branch)
}

/// Trailing changelog block for a package-change summary
pub fn trailing_block(summary: &str) -> String {
  if summary.is_empty() {
    String::new()
  } else {
    format!("Package changes:\n{}", summary)
  }
}

impl<'a> ReleaseOrchestrator<'a> {
  pub fn new(
    config: &'a ShipConfig,
    git: &'a SystemGit,
    store: &'a dyn SnapStore,
    builder: &'a dyn SnapBuilder,
    pack: &'a dyn SnapPack,
    acceptance: Option<&'a dyn AcceptanceRunner>,
  ) -> Self {
    Self {
      config,
      git,
      store,
      builder,
      pack,
      acceptance,
    }
  }

  /// Run the release, cleaning up the build branch on failure
  pub fn run(&self, request: &ReleaseRequest) -> ShipResult<()> {
    let result = self.run_steps(request);

    if result.is_err() && !request.dry_run {
      self.cleanup_build_branch(request);
    }

    result
  }

  /// Best-effort removal of the throwaway build branch
  ///
  /// Failures here are reported but never mask the original error.
  fn cleanup_build_branch(&self, request: &ReleaseRequest) {
    let build_branch = build_branch_name(&request.release_branch);
    println!("🧹 Cleaning up build branch {}...", build_branch);

    if let Err(err) = self.git.checkout_branch(&request.release_branch) {
      eprintln!("⚠️  Could not return to {}: {}", request.release_branch, err);
      return;
    }
    if let Err(err) = self.git.delete_branch(&build_branch) {
      eprintln!("⚠️  Could not delete local {}: {}", build_branch, err);
    }
    if let Err(err) = self.git.delete_remote_branch(&self.config.release.remote, &build_branch) {
      eprintln!("⚠️  Could not delete remote {}: {}", build_branch, err);
    }
  }

  fn run_steps(&self, request: &ReleaseRequest) -> ShipResult<()> {
    let root = self.git.work_tree().to_path_buf();
    let recipe = root.join(&self.config.snap.recipe);
    let snap_name = &self.config.snap.name;

    let versions = version::resolve(&version::read_recipe_version(&recipe)?, request.next_version.as_deref())?;

    // Merge history is collected up front, before any branch juggling
    let range = match self.git.latest_tag()? {
      Some(tag) => format!("{}..HEAD", tag),
      None => "HEAD".to_string(),
    };
    let merges = changelog::merge_commits_in_range(self.git, &range)?;

    if request.dry_run {
      self.print_plan(request, &versions, &merges, &range);
      return Ok(());
    }

    let build_branch = build_branch_name(&request.release_branch);
    println!("🚀 Releasing {} {} from {}", snap_name, versions.release, request.release_branch);

    println!("🌿 Creating build branch {}...", build_branch);
    self.git.create_and_checkout_branch(&build_branch)?;
    version::stamp_recipe_version(&recipe, &versions.release)?;
    self.git.commit_all(&format!("Build {}", versions.release))?;
    self.git.push(&self.config.release.remote, &build_branch)?;

    println!("🔨 Building {} for {}...", snap_name, request.architectures.join(", "));
    let built = self.builder.build(&request.architectures)?;

    println!("📦 Diffing manifests against {}...", request.channel);
    let (summaries, new_manifests) = self.diff_manifests(request, &built, &root)?;
    diff::check_consistency(&summaries)?;
    let summary = summaries.first().map(|(_, text)| text.clone()).unwrap_or_default();

    println!("📝 Synthesizing changelog ({} merges in {})...", merges.len(), range);
    self.git.checkout_branch(&request.release_branch)?;
    let entry = ChangelogEntry::synthesize(&merges, snap_name, &versions.release, &trailing_block(&summary));
    let changelog_path = root.join(&self.config.snap.changelog);
    changelog::prepend_entry(&changelog_path, &entry.render())?;

    let manifest_dir = root.join(&self.config.snap.manifest_dir);
    for (arch, manifest) in &new_manifests {
      manifest.save(&Manifest::cache_file(&manifest_dir, arch))?;
    }

    println!("🏷️  Committing release {}...", versions.release);
    version::stamp_recipe_version(&recipe, &versions.release)?;
    self.git.add(&[changelog_path.as_path(), manifest_dir.as_path()])?;
    self.git.commit_all(&format!("Release {}", versions.release))?;
    let release_sha = self.git.head_commit()?;

    println!("💉 Injecting release metadata into artifacts...");
    let changelog_text = fs::read_to_string(&changelog_path)
      .with_context(|| format!("Failed to read changelog {}", changelog_path.display()))?;
    for snap in &built {
      let manifest = new_manifests
        .iter()
        .find(|(arch, _)| arch == &snap.arch)
        .map(|(_, m)| m.to_text())
        .unwrap_or_default();
      self.pack.inject(
        &snap.path,
        &[
          (format!("{}/{}/ChangeLog", DOCS_DIR_IN_SNAP, snap_name), changelog_text.clone()),
          (MANIFEST_PATH_IN_SNAP.to_string(), manifest),
        ],
      )?;
    }

    if let (Some(runner), Some(first)) = (self.acceptance, built.first()) {
      println!("🧪 Running acceptance tests on {}...", first.path.display());
      runner.run(&first.path)?;
    }

    println!("🔄 Moving {} back to development ({})...", request.release_branch, versions.next_dev);
    version::stamp_recipe_version(&recipe, &versions.next_dev)?;
    self.git.commit_all(&format!("Back to development: {}", versions.next_dev))?;

    // The tag is the last local state created: an aborted run (acceptance
    // failure included) must not leave it behind, or the next run would both
    // fail at tag creation and compute a wrong changelog range.
    println!("🏷️  Tagging v{}...", versions.release);
    self.git.tag(
      &format!("v{}", versions.release),
      &format!("Release {}", versions.release),
      &release_sha,
    )?;

    println!("⬆️  Pushing {} and v{}...", request.release_branch, versions.release);
    self.git.push(&self.config.release.remote, &request.release_branch)?;
    self.git.push(&self.config.release.remote, &format!("v{}", versions.release))?;

    self.cleanup_build_branch(request);

    self.print_epilogue(&versions, &built);
    Ok(())
  }

  /// Diff every built architecture against the store baseline
  ///
  /// The baseline is resolved once and reused for every architecture; the
  /// consistency check only makes sense against a single reference point.
  /// Returns the per-arch summary texts and the freshly extracted manifests
  /// (committed and injected later).
  fn diff_manifests(
    &self,
    request: &ReleaseRequest,
    built: &[BuiltSnap],
    root: &Path,
  ) -> ShipResult<(Vec<(String, String)>, Vec<(String, Manifest)>)> {
    let manifest_dir = root.join(&self.config.snap.manifest_dir);
    let resolver = BaselineResolver::new(self.store, &self.config.store, manifest_dir);
    let exclusions = ExclusionList::new(&self.config.release.exclude)?;

    let baseline_arch = &self.config.store.default_arch;
    let baseline = resolver.resolve(&self.config.snap.name, &request.channel, baseline_arch)?;

    let scratch = std::env::temp_dir().join(format!("snapship-{}", std::process::id()));
    fs::create_dir_all(&scratch)?;

    // Scratch removal is best-effort on both branches, like the branch
    // compensator; a failed extraction must not leak the directory.
    let result = self.diff_each(built, &baseline, &exclusions, &scratch);
    let _ = fs::remove_dir_all(&scratch);
    result
  }

  fn diff_each(
    &self,
    built: &[BuiltSnap],
    baseline: &Manifest,
    exclusions: &ExclusionList,
    scratch: &Path,
  ) -> ShipResult<(Vec<(String, String)>, Vec<(String, Manifest)>)> {
    let mut summaries = Vec::new();
    let mut manifests = Vec::new();
    for snap in built {
      let arch_scratch = scratch.join(&snap.arch);
      let extracted = self.pack.extract(&snap.path, MANIFEST_PATH_IN_SNAP, &arch_scratch)?;
      let manifest = Manifest::load(&extracted)?;
      let docs = self.pack.extract(&snap.path, DOCS_DIR_IN_SNAP, &arch_scratch)?;

      let changes = diff::diff(baseline, &manifest, exclusions, Some(&docs))?;
      summaries.push((snap.arch.clone(), diff::summary(&changes)));
      manifests.push((snap.arch.clone(), manifest));
    }

    Ok((summaries, manifests))
  }

  fn print_plan(&self, request: &ReleaseRequest, versions: &VersionPlan, merges: &[CommitInfo], range: &str) {
    println!("🔍 Dry run, nothing will be built or pushed.");
    println!("  Snap:          {}", self.config.snap.name);
    println!("  Release:       {} (then {})", versions.release, versions.next_dev);
    println!("  Branch:        {} (build branch {})", request.release_branch, build_branch_name(&request.release_branch));
    println!("  Architectures: {}", request.architectures.join(", "));
    println!("  Baseline:      {}", request.channel);
    println!("  Changelog:     {} merge commits in {}", merges.len(), range);
  }

  fn print_epilogue(&self, versions: &VersionPlan, built: &[BuiltSnap]) {
    println!("\n✅ Released {} {}\n", self.config.snap.name, versions.release);
    println!("Next steps:");
    for snap in built {
      println!("  snapcraft upload {} --release={}", snap.path.display(), self.config.release.channel);
    }
  }
}
