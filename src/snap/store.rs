//! Snap store access for baseline manifests
//!
//! The system implementation downloads the last snap published on a channel
//! with `snap download` and extracts only the embedded manifest with
//! `unsquashfs`, so a multi-hundred-megabyte artifact never gets fully
//! unpacked.

use crate::core::error::{ShipError, ShipResult, StoreError};
use crate::manifest::Manifest;
use crate::snap::{run_tool, MANIFEST_PATH_IN_SNAP};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Source of published manifests, keyed by (snap, channel, architecture)
pub trait SnapStore {
  /// Fetch the manifest embedded in the last snap published on a channel
  fn fetch_manifest(&self, snap: &str, channel: &str, arch: &str) -> ShipResult<Manifest>;
}

/// Store backend shelling out to `snap download` and `unsquashfs`
pub struct SystemStore {
  /// Scratch directory for downloads and extraction
  work_dir: PathBuf,
}

impl SystemStore {
  pub fn new(work_dir: PathBuf) -> Self {
    Self { work_dir }
  }

  fn download(&self, snap: &str, channel: &str, arch: &str, dest: &Path) -> ShipResult<PathBuf> {
    fs::create_dir_all(dest)?;

    let mut cmd = Command::new("snap");
    cmd
      .args(["download", snap])
      .arg(format!("--channel={}", channel))
      .arg("--target-directory")
      .arg(dest)
      // Cross-arch downloads go through the store client's arch override
      .env("UBUNTU_STORE_ARCH", arch);

    run_tool(&mut cmd).map_err(|err| {
      ShipError::Store(StoreError::DownloadFailed {
        snap: snap.to_string(),
        channel: channel.to_string(),
        arch: arch.to_string(),
        reason: err.to_string(),
      })
    })?;

    // snap download names the file <snap>_<revision>.snap
    let mut snaps: Vec<PathBuf> = fs::read_dir(dest)?
      .filter_map(|entry| entry.ok())
      .map(|entry| entry.path())
      .filter(|path| path.extension().is_some_and(|ext| ext == "snap"))
      .collect();
    snaps.sort();

    snaps.pop().ok_or_else(|| {
      ShipError::Store(StoreError::DownloadFailed {
        snap: snap.to_string(),
        channel: channel.to_string(),
        arch: arch.to_string(),
        reason: "download produced no .snap file".to_string(),
      })
    })
  }
}

impl SnapStore for SystemStore {
  fn fetch_manifest(&self, snap: &str, channel: &str, arch: &str) -> ShipResult<Manifest> {
    let scratch = self.work_dir.join(format!("{}-{}-{}", snap, channel.replace('/', "-"), arch));
    let snap_file = self.download(snap, channel, arch, &scratch)?;

    let extracted = extract_file(&snap_file, MANIFEST_PATH_IN_SNAP, &scratch.join("squashfs-root"))?;
    let manifest = Manifest::load(&extracted)?;

    fs::remove_dir_all(&scratch)?;
    Ok(manifest)
  }
}

/// Extract one path (file or directory tree) from a squashfs image
///
/// Returns the path of the extracted copy under `dest`.
pub(crate) fn extract_file(image: &Path, inner_path: &str, dest: &Path) -> ShipResult<PathBuf> {
  let mut cmd = Command::new("unsquashfs");
  cmd
    .arg("-n") // no progress bar
    .arg("-d")
    .arg(dest)
    .arg(image)
    .arg(inner_path);
  run_tool(&mut cmd)?;

  let extracted = dest.join(inner_path);
  if !extracted.exists() {
    return Err(ShipError::message(format!(
      "{} does not contain {}",
      image.display(),
      inner_path
    )));
  }
  Ok(extracted)
}
