//! Repacking built snaps with release metadata
//!
//! The released artifact must carry the final changelog and manifest, which
//! only exist after the build. Injection unpacks the squashfs image, writes
//! the additions over it and packs it again in place.

use crate::core::error::{ShipError, ShipResult};
use crate::snap::{run_tool, store};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Read from and write into built snap artifacts
pub trait SnapPack {
  /// Extract a path (file or tree) from a snap into `dest`, returning the
  /// extracted copy's location
  fn extract(&self, snap: &Path, inner_path: &str, dest: &Path) -> ShipResult<PathBuf>;

  /// Rewrite a snap in place with `(inner_path, content)` additions
  fn inject(&self, snap: &Path, additions: &[(String, String)]) -> ShipResult<()>;
}

/// squashfs-tools implementation (unsquashfs / mksquashfs)
pub struct SystemPack {
  /// Scratch directory for unpack/repack cycles
  work_dir: PathBuf,
}

impl SystemPack {
  pub fn new(work_dir: PathBuf) -> Self {
    Self { work_dir }
  }
}

impl SnapPack for SystemPack {
  fn extract(&self, snap: &Path, inner_path: &str, dest: &Path) -> ShipResult<PathBuf> {
    store::extract_file(snap, inner_path, dest)
  }

  fn inject(&self, snap: &Path, additions: &[(String, String)]) -> ShipResult<()> {
    let name = snap
      .file_stem()
      .and_then(|stem| stem.to_str())
      .ok_or_else(|| ShipError::message(format!("Unusable snap path: {}", snap.display())))?;
    let root = self.work_dir.join(format!("repack-{}", name));
    if root.exists() {
      fs::remove_dir_all(&root)?;
    }

    let mut cmd = Command::new("unsquashfs");
    cmd.arg("-n").arg("-d").arg(&root).arg(snap);
    run_tool(&mut cmd)?;

    for (inner_path, content) in additions {
      let target = root.join(inner_path);
      if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
      }
      fs::write(&target, content)?;
    }

    // mksquashfs refuses to overwrite; pack next to the original, then swap
    let repacked = snap.with_extension("snap.new");
    let mut cmd = Command::new("mksquashfs");
    cmd
      .arg(&root)
      .arg(&repacked)
      .args(["-noappend", "-comp", "xz", "-all-root", "-no-xattrs"]);
    run_tool(&mut cmd)?;

    fs::rename(&repacked, snap)?;
    fs::remove_dir_all(&root)?;
    Ok(())
  }
}
