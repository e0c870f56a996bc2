//! Track registry: one [`TrackState`] per active track id.
//!
//! # Lifecycle policy
//! - **Birth**: the first update for an unseen id creates a track.
//! - **Update**: later updates are routed to the existing track.
//! - **Eviction**: [`TrackRegistry::evict_stale`] removes every track whose
//!   last update is older than the staleness threshold. The owning loop
//!   decides when to sweep; nothing here reads a clock.
//! - **Re-entry**: an update for an evicted id starts a brand new track.
//!
//! `ingest` and `evict_stale` take `&mut self`; callers sharing a registry
//! across threads must serialise them (e.g. behind one `Mutex`).

use crate::{
    error::CoreError,
    track::TrackState,
    types::{FeatureMatrix, FeatureRow, FeatureVector, TrackId, Update},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Configuration for the registry lifecycle policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Seconds without an update before a track is evicted
    pub staleness_threshold: f64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            staleness_threshold: 60.0,
        }
    }
}

/// Owns every active track.
#[derive(Clone, Debug, Default)]
pub struct TrackRegistry {
    config: RegistryConfig,
    tracks: HashMap<TrackId, TrackState>,
}

impl TrackRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            tracks: HashMap::new(),
        }
    }

    /// Route an update to its track, creating the track on first sight.
    pub fn ingest(&mut self, update: &Update) {
        match self.tracks.get_mut(&update.track_id) {
            Some(track) => {
                track.ingest(update);
            }
            None => {
                debug!(track = %update.track_id, t = update.timestamp, "new track");
                self.tracks
                    .insert(update.track_id.clone(), TrackState::new(update));
            }
        }
    }

    /// Feature vector of one track. Unknown ids are an error, never zeros.
    pub fn feature_vector(&self, id: &TrackId) -> Result<FeatureVector, CoreError> {
        self.tracks
            .get(id)
            .map(TrackState::snapshot)
            .ok_or_else(|| CoreError::TrackNotFound(id.clone()))
    }

    pub fn get(&self, id: &TrackId) -> Option<&TrackState> {
        self.tracks.get(id)
    }

    pub fn contains(&self, id: &TrackId) -> bool {
        self.tracks.contains_key(id)
    }

    /// One row per tracked id, ordered by id.
    pub fn snapshot_all(&self) -> FeatureMatrix {
        let rows: Vec<FeatureRow> = self
            .tracks
            .values()
            .map(|t| FeatureRow {
                track_id: t.track_id().clone(),
                update_count: t.update_count(),
                features: t.snapshot(),
            })
            .collect();
        FeatureMatrix::from(rows)
    }

    /// Remove all stale tracks. Returns count of removed tracks.
    pub fn evict_stale(&mut self, now: f64) -> usize {
        let threshold = self.config.staleness_threshold;
        let before = self.tracks.len();
        self.tracks.retain(|id, t| {
            let stale = t.is_stale(now, threshold);
            if stale {
                debug!(track = %id, last = t.last_update_time(), now, "evicting stale track");
            }
            !stale
        });
        before - self.tracks.len()
    }

    /// Remove one track explicitly (e.g. a sensor track-drop message).
    pub fn drop_track(&mut self, id: &TrackId) -> bool {
        self.tracks.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn staleness_threshold(&self) -> f64 {
        self.config.staleness_threshold
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
