//! Fundamental types used across the entire workspace.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identifier type — newtype wrapper so IDs are never confused at compile time
// ---------------------------------------------------------------------------

/// Opaque track key. CSV exports carry UUID strings, the CTC wire format
/// carries integer track numbers; both map into this type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub String);

impl TrackId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for TrackId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u32> for TrackId {
    fn from(n: u32) -> Self {
        Self(n.to_string())
    }
}

impl From<u64> for TrackId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// One timestamped radar measurement for a track, already decoded into
/// physical units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub track_id: TrackId,
    /// Seconds; monotonic clock reading or wall time, caller's choice
    pub timestamp: f64,
    /// m/s
    pub speed: f64,
    /// degrees clockwise from true north
    pub azimuth: f64,
    /// degrees above the tangent plane
    pub elevation: f64,
    /// meters
    pub range: f64,
    pub lat: f64,
    pub lon: f64,
    /// meters above mean sea level
    pub alt_msl: f64,
    pub radar_cross_section: f64,
}

impl Update {
    /// Position as `[lat, lon, alt_msl]`.
    pub fn position(&self) -> [f64; 3] {
        [self.lat, self.lon, self.alt_msl]
    }
}

// ---------------------------------------------------------------------------
// Feature vector
// ---------------------------------------------------------------------------

/// Number of columns in a [`FeatureVector`].
pub const FEATURE_COUNT: usize = 17;

/// Column names in classifier order. Models are trained against this exact
/// order; never reorder.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "avg_speed",
    "std_speed",
    "avg_heading",
    "std_heading",
    "maneuverability",
    "avg_curvature",
    "avg_rcs",
    "m1_speed",
    "m2_speed",
    "m1_heading",
    "m2_heading",
    "m1_azimuth",
    "m2_azimuth",
    "m1_elevation",
    "m2_elevation",
    "m1_range",
    "m2_range",
];

/// Fixed-order summary of one track's statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub avg_speed: f64,
    pub std_speed: f64,
    pub avg_heading: f64,
    pub std_heading: f64,
    pub maneuverability: f64,
    pub avg_curvature: f64,
    pub avg_rcs: f64,
    pub m1_speed: f64,
    pub m2_speed: f64,
    pub m1_heading: f64,
    pub m2_heading: f64,
    pub m1_azimuth: f64,
    pub m2_azimuth: f64,
    pub m1_elevation: f64,
    pub m2_elevation: f64,
    pub m1_range: f64,
    pub m2_range: f64,
}

impl FeatureVector {
    /// Values in [`FEATURE_NAMES`] order.
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.avg_speed,
            self.std_speed,
            self.avg_heading,
            self.std_heading,
            self.maneuverability,
            self.avg_curvature,
            self.avg_rcs,
            self.m1_speed,
            self.m2_speed,
            self.m1_heading,
            self.m2_heading,
            self.m1_azimuth,
            self.m2_azimuth,
            self.m1_elevation,
            self.m2_elevation,
            self.m1_range,
            self.m2_range,
        ]
    }

    /// Value of the column at `index` in [`FEATURE_NAMES`] order.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.as_array().get(index).copied()
    }

    /// Index of a column name, if it exists.
    pub fn column_index(name: &str) -> Option<usize> {
        FEATURE_NAMES.iter().position(|n| *n == name)
    }
}

// ---------------------------------------------------------------------------
// FeatureMatrix — one row per tracked id
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub track_id: TrackId,
    pub update_count: u64,
    pub features: FeatureVector,
}

/// Feature rows ordered by track id. Every constructor sorts, so lookups
/// can binary search.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<FeatureRow>", into = "Vec<FeatureRow>")]
pub struct FeatureMatrix {
    rows: Vec<FeatureRow>,
}

impl From<Vec<FeatureRow>> for FeatureMatrix {
    fn from(mut rows: Vec<FeatureRow>) -> Self {
        rows.sort_by(|a, b| a.track_id.cmp(&b.track_id));
        Self { rows }
    }
}

impl From<FeatureMatrix> for Vec<FeatureRow> {
    fn from(matrix: FeatureMatrix) -> Self {
        matrix.rows
    }
}

impl FeatureMatrix {
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<FeatureRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, id: &TrackId) -> Option<&FeatureRow> {
        self.rows
            .binary_search_by(|r| r.track_id.cmp(id))
            .ok()
            .map(|i| &self.rows[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureRow> {
        self.rows.iter()
    }
}
