//! Batch feature extraction for completed historical tracks.
//!
//! Training and offline inference replay each track through the same
//! [`TrackState`] used live, so batch and streaming features are identical.
//!
//! # Processing steps
//! 1. Group updates by track id, keeping arrival order within each group
//! 2. Replay every group through its own `TrackState` (parallel across ids)
//! 3. Collect one row per track, ordered by id

use crate::{
    track::TrackState,
    types::{FeatureMatrix, FeatureRow, TrackId, Update},
};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Group updates by track id. Order within a group is arrival order.
pub fn group_by_track(updates: &[Update]) -> BTreeMap<TrackId, Vec<&Update>> {
    let mut groups: BTreeMap<TrackId, Vec<&Update>> = BTreeMap::new();
    for u in updates {
        groups.entry(u.track_id.clone()).or_default().push(u);
    }
    groups
}

/// Replay one track's updates in order and return its final state.
pub fn replay_track(updates: &[&Update]) -> Option<TrackState> {
    let (first, rest) = updates.split_first()?;
    let mut track = TrackState::new(first);
    for u in rest {
        track.ingest(u);
    }
    Some(track)
}

/// Feature matrix of every track in `updates`, without eviction.
pub fn extract_features(updates: &[Update]) -> FeatureMatrix {
    let groups: Vec<(TrackId, Vec<&Update>)> = group_by_track(updates).into_iter().collect();

    let rows: Vec<FeatureRow> = groups
        .par_iter()
        .filter_map(|(id, ups)| {
            replay_track(ups).map(|track| FeatureRow {
                track_id: id.clone(),
                update_count: track.update_count(),
                features: track.snapshot(),
            })
        })
        .collect();

    FeatureMatrix::from(rows)
}
