//! TrackState: every running statistic of one track, updated in arrival order.
//!
//! # Per-update steps
//! 1. Bump the update count
//! 2. Heading of motion from the previous position (`atan2(Δlon, Δlat)` with
//!    the previous position as the minuend)
//! 3. Feed speed / heading / azimuth / elevation / range into their
//!    accumulators and smoothness trackers
//! 4. Running mean of radar cross-section
//! 5. Three-point curvature and its running mean
//! 6. Remember the position and the update time
//!
//! No heading exists at birth, so the heading accumulator and smoothness
//! tracker are seeded with 0. The heading spread accumulates from the third
//! update on; before that it is 0.

use crate::{
    curvature::CurvatureWindow,
    smoothness::SmoothnessTracker,
    stats::StatAccumulator,
    types::{FeatureVector, TrackId, Update},
};

/// Guard added to `std_heading` in the maneuverability ratio.
pub const MANEUVERABILITY_EPSILON: f64 = 1e-6;

/// Updates required before the heading spread is reported.
const MIN_UPDATES_FOR_HEADING_STD: u64 = 3;

/// Per-signal smoothness trackers, fixed cardinality.
#[derive(Clone, Debug)]
struct SmoothnessSet {
    speed: SmoothnessTracker,
    heading: SmoothnessTracker,
    azimuth: SmoothnessTracker,
    elevation: SmoothnessTracker,
    range: SmoothnessTracker,
}

/// Accumulated statistics for a single track.
#[derive(Clone, Debug)]
pub struct TrackState {
    track_id: TrackId,
    update_count: u64,
    last_update_time: f64,
    speed_stats: StatAccumulator,
    heading_stats: StatAccumulator,
    az_stats: StatAccumulator,
    el_stats: StatAccumulator,
    range_stats: StatAccumulator,
    smoothness: SmoothnessSet,
    curvature_window: CurvatureWindow,
    curvature_samples: u64,
    running_avg_curvature: f64,
    running_avg_rcs: f64,
    prev_lat: f64,
    prev_lon: f64,
    prev_alt_msl: f64,
}

impl TrackState {
    /// Create a track from its first update.
    pub fn new(first: &Update) -> Self {
        Self {
            track_id: first.track_id.clone(),
            update_count: 1,
            last_update_time: first.timestamp,
            speed_stats: StatAccumulator::seeded(first.speed),
            heading_stats: StatAccumulator::seeded(0.0),
            az_stats: StatAccumulator::seeded(first.azimuth),
            el_stats: StatAccumulator::seeded(first.elevation),
            range_stats: StatAccumulator::seeded(first.range),
            smoothness: SmoothnessSet {
                speed: SmoothnessTracker::new(first.speed),
                heading: SmoothnessTracker::new(0.0),
                azimuth: SmoothnessTracker::new(first.azimuth),
                elevation: SmoothnessTracker::new(first.elevation),
                range: SmoothnessTracker::new(first.range),
            },
            curvature_window: CurvatureWindow::seeded(first.position()),
            curvature_samples: 0,
            running_avg_curvature: 0.0,
            running_avg_rcs: first.radar_cross_section,
            prev_lat: first.lat,
            prev_lon: first.lon,
            prev_alt_msl: first.alt_msl,
        }
    }

    /// Absorb the next update for this track and return the refreshed features.
    /// Updates must arrive in time order; nothing here checks it.
    pub fn ingest(&mut self, update: &Update) -> FeatureVector {
        self.update_count += 1;
        let n = self.update_count;

        let heading = (self.prev_lon - update.lon).atan2(self.prev_lat - update.lat);

        self.speed_stats.update(update.speed);
        self.az_stats.update(update.azimuth);
        self.el_stats.update(update.elevation);
        self.range_stats.update(update.range);
        if n < MIN_UPDATES_FOR_HEADING_STD {
            self.heading_stats.update_mean(heading);
        } else {
            self.heading_stats.update(heading);
        }

        let s = &mut self.smoothness;
        s.speed.update(update.speed, n);
        s.heading.update(heading, n);
        s.azimuth.update(update.azimuth, n);
        s.elevation.update(update.elevation, n);
        s.range.update(update.range, n);

        let nf = n as f64;
        self.running_avg_rcs = ((nf - 1.0) * self.running_avg_rcs + update.radar_cross_section) / nf;

        if let Some(angle) = self.curvature_window.push(update.position()) {
            self.curvature_samples += 1;
            let k = self.curvature_samples as f64;
            self.running_avg_curvature = ((k - 1.0) * self.running_avg_curvature + angle) / k;
        }

        self.prev_lat = update.lat;
        self.prev_lon = update.lon;
        self.prev_alt_msl = update.alt_msl;
        self.last_update_time = update.timestamp;

        self.snapshot()
    }

    /// Current feature vector. Anything not yet computable is 0.
    pub fn snapshot(&self) -> FeatureVector {
        let avg_speed = self.speed_stats.mean();
        let std_heading = self.std_heading();

        FeatureVector {
            avg_speed,
            std_speed: self.speed_stats.std_dev(),
            avg_heading: self.heading_stats.mean(),
            std_heading,
            maneuverability: avg_speed / (std_heading + MANEUVERABILITY_EPSILON),
            avg_curvature: self.running_avg_curvature,
            avg_rcs: self.running_avg_rcs,
            m1_speed: self.smoothness.speed.m1(),
            m2_speed: self.smoothness.speed.m2(),
            m1_heading: self.smoothness.heading.m1(),
            m2_heading: self.smoothness.heading.m2(),
            m1_azimuth: self.smoothness.azimuth.m1(),
            m2_azimuth: self.smoothness.azimuth.m2(),
            m1_elevation: self.smoothness.elevation.m1(),
            m2_elevation: self.smoothness.elevation.m2(),
            m1_range: self.smoothness.range.m1(),
            m2_range: self.smoothness.range.m2(),
        }
    }

    fn std_heading(&self) -> f64 {
        if self.update_count < MIN_UPDATES_FOR_HEADING_STD {
            0.0
        } else {
            self.heading_stats.std_dev()
        }
    }

    /// True when no update arrived within `threshold` of `now`.
    pub fn is_stale(&self, now: f64, threshold: f64) -> bool {
        now - self.last_update_time > threshold
    }

    pub fn track_id(&self) -> &TrackId {
        &self.track_id
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    pub fn last_update_time(&self) -> f64 {
        self.last_update_time
    }

    /// Most recent `[lat, lon, alt_msl]`.
    pub fn last_position(&self) -> [f64; 3] {
        [self.prev_lat, self.prev_lon, self.prev_alt_msl]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
