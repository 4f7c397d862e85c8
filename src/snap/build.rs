//! Snap building via snapcraft remote build

use crate::core::error::{ShipError, ShipResult};
use crate::snap::{run_tool, BuiltSnap};
use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// Builds snap artifacts for a set of architectures
pub trait SnapBuilder {
  /// Build the current checkout, returning one artifact per architecture
  fn build(&self, architectures: &[String]) -> ShipResult<Vec<BuiltSnap>>;
}

/// Builder shelling out to `snapcraft remote-build`
///
/// Remote build uploads the working tree to Launchpad builders, so one
/// invocation covers all requested architectures and the artifacts land in
/// the output directory named `<snap>_<version>_<arch>.snap`.
pub struct SnapcraftBuilder {
  /// Directory snapcraft runs in (the packaging checkout)
  work_tree: PathBuf,

  /// Where built .snap files land
  output_dir: PathBuf,
}

impl SnapcraftBuilder {
  pub fn new(work_tree: PathBuf, output_dir: PathBuf) -> Self {
    Self { work_tree, output_dir }
  }

  /// Find the built artifact for one architecture
  fn find_artifact(&self, arch: &str) -> ShipResult<PathBuf> {
    let suffix = format!("_{}.snap", arch);
    let mut matches: Vec<PathBuf> = fs::read_dir(&self.output_dir)?
      .filter_map(|entry| entry.ok())
      .map(|entry| entry.path())
      .filter(|path| {
        path
          .file_name()
          .and_then(|name| name.to_str())
          .is_some_and(|name| name.ends_with(&suffix))
      })
      .collect();
    matches.sort();

    matches.pop().ok_or_else(|| {
      ShipError::message(format!(
        "Build produced no snap for {} in {}",
        arch,
        self.output_dir.display()
      ))
    })
  }
}

impl SnapBuilder for SnapcraftBuilder {
  fn build(&self, architectures: &[String]) -> ShipResult<Vec<BuiltSnap>> {
    fs::create_dir_all(&self.output_dir)?;

    let mut cmd = Command::new("snapcraft");
    cmd
      .current_dir(&self.work_tree)
      .args(["remote-build", "--launchpad-accept-public-upload"])
      .arg("--build-for")
      .arg(architectures.join(","));
    run_tool(&mut cmd)?;

    // remote-build drops artifacts in the working tree; move them aside
    for entry in fs::read_dir(&self.work_tree)? {
      let path = entry?.path();
      if path.extension().is_some_and(|ext| ext == "snap") {
        let name = path.file_name().ok_or_else(|| ShipError::message("unnamed snap artifact"))?;
        fs::rename(&path, self.output_dir.join(name))?;
      }
    }

    architectures
      .iter()
      .map(|arch| {
        Ok(BuiltSnap {
          arch: arch.clone(),
          path: self.find_artifact(arch)?,
        })
      })
      .collect()
  }
}
