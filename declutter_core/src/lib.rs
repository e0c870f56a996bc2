//! `declutter_core` — Incremental per-track features for bird/drone classification.
//!
//! # Module layout
//! - [`types`]      — Update, TrackId, FeatureVector / FeatureMatrix
//! - [`stats`]      — Running mean / sample standard deviation
//! - [`smoothness`] — m1 / m2 smoothness factors of a signal's increments
//! - [`curvature`]  — Three-point interior-angle window
//! - [`track`]      — Per-track accumulator
//! - [`registry`]   — Birth / routing / stale eviction of tracks
//! - [`batch`]      — Replay of historical tracks through the same accumulator
//! - [`classifier`] — Classifier seam and stump-ensemble model artifact
//! - [`metrics`]    — Accuracy, precision/recall
//! - [`error`]      — Core error type

pub mod batch;
pub mod classifier;
pub mod curvature;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod smoothness;
pub mod stats;
pub mod track;
pub mod types;

pub use classifier::{Classification, Classifier, Label, StumpEnsemble};
pub use error::CoreError;
pub use registry::{RegistryConfig, TrackRegistry};
pub use track::TrackState;
pub use types::{FeatureMatrix, FeatureRow, FeatureVector, TrackId, Update, FEATURE_NAMES};
