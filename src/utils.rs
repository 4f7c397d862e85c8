//! Channel coordinate handling
//!
//! A channel is `track/risk` (e.g. `22/beta`). A bare risk level maps to the
//! `latest` track, matching store semantics.

use std::fmt;

/// A published-release coordinate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
  pub track: String,
  pub risk: String,
}

impl Channel {
  /// Parse a channel string
  pub fn parse(s: &str) -> Self {
    match s.split_once('/') {
      Some((track, risk)) => Self {
        track: track.to_string(),
        risk: risk.to_string(),
      },
      None => Self {
        track: "latest".to_string(),
        risk: s.to_string(),
      },
    }
  }

  /// Track as a number, when the track is a numeric release line
  pub fn numeric_track(&self) -> Option<u32> {
    self.track.parse().ok()
  }

  /// Same risk level on a different track
  pub fn with_track(&self, track: &str) -> Self {
    Self {
      track: track.to_string(),
      risk: self.risk.clone(),
    }
  }
}

impl fmt::Display for Channel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.track, self.risk)
  }
}
