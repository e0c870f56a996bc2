//! CSV writers for feature matrices and predictions.

use anyhow::{Context, Result};
use declutter_core::{
    classifier::Classification,
    types::{FeatureMatrix, FeatureRow, FEATURE_NAMES},
};
use std::io::Write;
use std::path::Path;

fn feature_fields(row: &FeatureRow) -> impl Iterator<Item = String> + '_ {
    row.features.as_array().into_iter().map(|v| v.to_string())
}

/// `track_id, update_count, <features...>`
pub fn write_feature_matrix<W: Write>(writer: W, matrix: &FeatureMatrix) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    let mut header = vec!["track_id", "update_count"];
    header.extend(FEATURE_NAMES);
    w.write_record(&header)?;

    for row in matrix.iter() {
        let mut record = vec![row.track_id.to_string(), row.update_count.to_string()];
        record.extend(feature_fields(row));
        w.write_record(&record)?;
    }
    w.flush()?;
    Ok(())
}

/// `track_id, update_count, prediction, confidence, <features...>`.
/// `predictions` must be in matrix row order.
pub fn write_predictions<W: Write>(
    writer: W,
    matrix: &FeatureMatrix,
    predictions: &[Classification],
) -> Result<()> {
    anyhow::ensure!(
        matrix.len() == predictions.len(),
        "{} feature rows but {} predictions",
        matrix.len(),
        predictions.len()
    );
    let mut w = csv::Writer::from_writer(writer);
    let mut header = vec!["track_id", "update_count", "prediction", "confidence"];
    header.extend(FEATURE_NAMES);
    w.write_record(&header)?;

    for (row, pred) in matrix.iter().zip(predictions) {
        let mut record = vec![
            row.track_id.to_string(),
            row.update_count.to_string(),
            pred.label.to_string(),
            format!("{:.4}", pred.confidence),
        ];
        record.extend(feature_fields(row));
        w.write_record(&record)?;
    }
    w.flush()?;
    Ok(())
}

/// Write to `path`, or to stdout when `path` is `None`.
pub fn with_output<F>(path: Option<&Path>, write: F) -> Result<()>
where
    F: FnOnce(Box<dyn Write>) -> Result<()>,
{
    let sink: Box<dyn Write> = match path {
        Some(p) => Box::new(std::io::BufWriter::new(
            std::fs::File::create(p).with_context(|| format!("cannot create {}", p.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    write(sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use declutter_core::{
        classifier::Label,
        types::{FeatureVector, TrackId},
    };

    fn matrix() -> FeatureMatrix {
        FeatureMatrix::from(vec![FeatureRow {
            track_id: TrackId::from("A"),
            update_count: 3,
            features: FeatureVector {
                avg_speed: 11.0,
                std_speed: 1.0,
                ..Default::default()
            },
        }])
    }

    #[test]
    fn feature_csv_has_fixed_header() {
        let mut buf = Vec::new();
        write_feature_matrix(&mut buf, &matrix()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert_eq!(header.split(',').count(), 2 + FEATURE_NAMES.len());
        assert!(header.starts_with("track_id,update_count,avg_speed,std_speed,avg_heading"));
        assert!(lines.next().unwrap().starts_with("A,3,11,1,0"));
    }

    #[test]
    fn predictions_csv() {
        let mut buf = Vec::new();
        let preds = [Classification {
            label: Label::Drone,
            confidence: 0.875,
        }];
        write_predictions(&mut buf, &matrix(), &preds).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.lines().nth(1).unwrap().starts_with("A,3,Drone,0.8750,11"));

        assert!(write_predictions(Vec::new(), &matrix(), &[]).is_err());
    }
}
