//! Baseline manifest resolution with track/architecture fallback
//!
//! The diff baseline is the manifest of the last snap published on the prior
//! release channel. Resolution is cache-first: a manifest already stored for
//! the requested architecture is returned without touching the store. On a
//! cache miss the fallback policy produces an ordered candidate table of
//! (channel, architecture) pairs, tried in sequence.

use crate::core::config::StorePolicy;
use crate::core::error::{ShipError, ShipResult, StoreError};
use crate::manifest::Manifest;
use crate::snap::SnapStore;
use crate::utils::Channel;
use std::path::PathBuf;

/// Resolves the last published manifest to diff against
pub struct BaselineResolver<'a> {
  store: &'a dyn SnapStore,
  policy: &'a StorePolicy,
  cache_dir: PathBuf,
}

impl<'a> BaselineResolver<'a> {
  pub fn new(store: &'a dyn SnapStore, policy: &'a StorePolicy, cache_dir: PathBuf) -> Self {
    Self {
      store,
      policy,
      cache_dir,
    }
  }

  /// Ordered (channel, architecture) candidates for a fetch
  ///
  /// 1. The requested channel and architecture.
  /// 2. The fallback track at the same risk: numeric tracks above the policy
  ///    threshold step back, anything else uses the snap's legacy track.
  /// 3. The requested channel on the policy's default architecture.
  pub fn fallback_candidates(&self, snap: &str, channel: &str, arch: &str) -> Vec<(String, String)> {
    let mut candidates = vec![(channel.to_string(), arch.to_string())];

    let parsed = Channel::parse(channel);
    let fallback_track = match parsed.numeric_track() {
      Some(track) if track > self.policy.track_threshold => (track - self.policy.track_step).to_string(),
      _ => self.policy.legacy_track(snap).to_string(),
    };
    let fallback = (parsed.with_track(&fallback_track).to_string(), arch.to_string());
    if !candidates.contains(&fallback) {
      candidates.push(fallback);
    }

    let default_arch = (channel.to_string(), self.policy.default_arch.clone());
    if !candidates.contains(&default_arch) {
      candidates.push(default_arch);
    }

    candidates
  }

  /// Resolve the baseline manifest for an architecture
  ///
  /// A cached manifest short-circuits the store entirely. A fetched manifest
  /// is persisted to the cache keyed by the requested architecture. All
  /// candidates failing is fatal; there is no empty-manifest fallback.
  pub fn resolve(&self, snap: &str, channel: &str, arch: &str) -> ShipResult<Manifest> {
    let cache_path = Manifest::cache_file(&self.cache_dir, arch);
    if cache_path.exists() {
      return Manifest::load(&cache_path);
    }

    let mut attempts = Vec::new();
    for (candidate_channel, candidate_arch) in self.fallback_candidates(snap, channel, arch) {
      match self.store.fetch_manifest(snap, &candidate_channel, &candidate_arch) {
        Ok(manifest) => {
          manifest.save(&cache_path)?;
          return Ok(manifest);
        }
        Err(_) => attempts.push((candidate_channel, candidate_arch)),
      }
    }

    Err(ShipError::Store(StoreError::BaselineExhausted {
      snap: snap.to_string(),
      attempts,
    }))
  }
}
