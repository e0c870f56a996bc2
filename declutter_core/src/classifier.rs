//! Classifier seam and the persisted stump-ensemble model.
//!
//! The registry only guarantees feature shape and order; any model that maps
//! a [`FeatureVector`] to a [`Classification`] plugs in through [`Classifier`].
//!
//! # Model artifact (JSON)
//! ```json
//! { "stumps": [
//!     { "feature": "std_heading", "threshold": 0.35,
//!       "below": "Bird", "above": "Drone", "weight": 1.5 } ] }
//! ```
//! Prediction is the weighted vote of all stumps; confidence is the share of
//! total weight behind the winning label. Ties go to `Bird`.

use crate::{
    error::CoreError,
    types::{FeatureMatrix, FeatureVector, TrackId, FEATURE_NAMES},
};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, str::FromStr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Bird,
    Drone,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Bird => f.write_str("Bird"),
            Label::Drone => f.write_str("Drone"),
        }
    }
}

impl FromStr for Label {
    type Err = String;

    /// Accepts `Bird`/`Drone` in any case, or the numeric encodings `0`/`1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bird" | "0" | "0.0" => Ok(Label::Bird),
            "drone" | "1" | "1.0" => Ok(Label::Drone),
            other => Err(format!("unknown label '{other}'")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: Label,
    /// Share of the deciding evidence, in `[0, 1]`
    pub confidence: f64,
}

/// Anything that labels a feature vector.
pub trait Classifier {
    fn classify(&self, features: &FeatureVector) -> Classification;

    /// Classify every row of a matrix, keeping row order.
    fn classify_matrix(&self, matrix: &FeatureMatrix) -> Vec<(TrackId, Classification)> {
        matrix
            .iter()
            .map(|row| (row.track_id.clone(), self.classify(&row.features)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Stump ensemble
// ---------------------------------------------------------------------------

/// One stump as stored in the artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StumpSpec {
    /// Column name from [`FEATURE_NAMES`]
    pub feature: String,
    pub threshold: f64,
    /// Vote when `value < threshold`
    pub below: Label,
    /// Vote when `value >= threshold`
    pub above: Label,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// Serialized form of a [`StumpEnsemble`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub stumps: Vec<StumpSpec>,
}

#[derive(Clone, Debug)]
struct Stump {
    column: usize,
    threshold: f64,
    below: Label,
    above: Label,
    weight: f64,
}

/// Weighted vote of single-feature threshold rules.
#[derive(Clone, Debug)]
pub struct StumpEnsemble {
    stumps: Vec<Stump>,
}

impl StumpEnsemble {
    /// Validate an artifact: non-empty, known feature names, finite
    /// thresholds, positive weights.
    pub fn from_artifact(artifact: &ModelArtifact) -> Result<Self, CoreError> {
        if artifact.stumps.is_empty() {
            return Err(CoreError::InvalidModel("ensemble has no stumps".into()));
        }
        let stumps = artifact
            .stumps
            .iter()
            .map(|s| {
                let column = FeatureVector::column_index(&s.feature).ok_or_else(|| {
                    CoreError::InvalidModel(format!(
                        "unknown feature '{}' (expected one of {:?})",
                        s.feature, FEATURE_NAMES
                    ))
                })?;
                if !s.threshold.is_finite() {
                    return Err(CoreError::InvalidModel(format!(
                        "non-finite threshold on '{}'",
                        s.feature
                    )));
                }
                if !(s.weight.is_finite() && s.weight > 0.0) {
                    return Err(CoreError::InvalidModel(format!(
                        "weight on '{}' must be positive",
                        s.feature
                    )));
                }
                Ok(Stump {
                    column,
                    threshold: s.threshold,
                    below: s.below,
                    above: s.above,
                    weight: s.weight,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { stumps })
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let artifact: ModelArtifact = serde_json::from_str(json)?;
        Self::from_artifact(&artifact)
    }

    /// Load a JSON artifact from disk.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let file = std::fs::File::open(path)?;
        let artifact: ModelArtifact = serde_json::from_reader(std::io::BufReader::new(file))?;
        Self::from_artifact(&artifact)
    }

    pub fn len(&self) -> usize {
        self.stumps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stumps.is_empty()
    }
}

impl Classifier for StumpEnsemble {
    fn classify(&self, features: &FeatureVector) -> Classification {
        let values = features.as_array();
        let (mut bird, mut drone) = (0.0, 0.0);
        for s in &self.stumps {
            // NaN compares false, so it votes `above`.
            let vote = if values[s.column] < s.threshold { s.below } else { s.above };
            match vote {
                Label::Bird => bird += s.weight,
                Label::Drone => drone += s.weight,
            }
        }
        let total = bird + drone;
        let (label, winner) = if drone > bird {
            (Label::Drone, drone)
        } else {
            (Label::Bird, bird)
        };
        Classification {
            label,
            confidence: if total > 0.0 { winner / total } else { 0.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const MODEL: &str = r#"{
        "stumps": [
            { "feature": "std_heading", "threshold": 0.5, "below": "Bird", "above": "Drone", "weight": 2.0 },
            { "feature": "avg_speed", "threshold": 15.0, "below": "Bird", "above": "Drone" },
            { "feature": "m1_range", "threshold": 3.0, "below": "Drone", "above": "Bird", "weight": 1.0 }
        ]
    }"#;

    #[test]
    fn weighted_vote_and_confidence() {
        let model = StumpEnsemble::from_json(MODEL).unwrap();
        assert_eq!(model.len(), 3);

        let fv = FeatureVector {
            std_heading: 0.9,
            avg_speed: 5.0,
            m1_range: 0.1,
            ..Default::default()
        };
        // Drone: 2.0 + 1.0, Bird: 1.0
        let c = model.classify(&fv);
        assert_eq!(c.label, Label::Drone);
        assert_relative_eq!(c.confidence, 0.75);

        let calm = FeatureVector {
            std_heading: 0.1,
            avg_speed: 5.0,
            m1_range: 10.0,
            ..Default::default()
        };
        let c = model.classify(&calm);
        assert_eq!(c.label, Label::Bird);
        assert_relative_eq!(c.confidence, 1.0);
    }

    #[test]
    fn tie_goes_to_bird() {
        let model = StumpEnsemble::from_json(
            r#"{ "stumps": [
                { "feature": "avg_speed", "threshold": 1.0, "below": "Bird", "above": "Drone" },
                { "feature": "avg_rcs", "threshold": 1.0, "below": "Drone", "above": "Bird" }
            ] }"#,
        )
        .unwrap();
        let c = model.classify(&FeatureVector::default());
        assert_eq!(c.label, Label::Bird);
        assert_relative_eq!(c.confidence, 0.5);
    }

    #[test]
    fn rejects_bad_artifacts() {
        assert!(matches!(
            StumpEnsemble::from_json(r#"{ "stumps": [] }"#),
            Err(CoreError::InvalidModel(_))
        ));
        assert!(matches!(
            StumpEnsemble::from_json(
                r#"{ "stumps": [ { "feature": "wingspan", "threshold": 1.0, "below": "Bird", "above": "Drone" } ] }"#
            ),
            Err(CoreError::InvalidModel(_))
        ));
        assert!(matches!(
            StumpEnsemble::from_json(
                r#"{ "stumps": [ { "feature": "avg_speed", "threshold": 1.0, "below": "Bird", "above": "Drone", "weight": 0.0 } ] }"#
            ),
            Err(CoreError::InvalidModel(_))
        ));
        assert!(matches!(
            StumpEnsemble::from_json("not json"),
            Err(CoreError::ModelFormat(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = StumpEnsemble::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, CoreError::ModelIo(_)));
    }

    #[test]
    fn label_parsing() {
        assert_eq!("Drone".parse::<Label>().unwrap(), Label::Drone);
        assert_eq!(" bird ".parse::<Label>().unwrap(), Label::Bird);
        assert_eq!("1".parse::<Label>().unwrap(), Label::Drone);
        assert_eq!("0".parse::<Label>().unwrap(), Label::Bird);
        assert!("plane".parse::<Label>().is_err());
        assert_eq!(Label::Drone.to_string(), "Drone");
    }
}
