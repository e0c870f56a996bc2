//! CSV batch loader: source column names → canonical [`Update`] records.
//!
//! # Columns
//! Required: `UUID, Speed, AZ, EL, Range, Position (lat), Position (lon)`.
//! Optional: `Position (alt MSL)` (0), `Radar Cross Section` (0),
//! `Update Time` (numeric seconds; row index when absent or non-numeric),
//! `Class` / `Label` (ground truth for evaluation).
//! Any other column is ignored.

use anyhow::{Context, Result};
use declutter_core::{
    classifier::Label,
    types::{TrackId, Update},
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SourceRow {
    #[serde(rename = "UUID")]
    uuid: String,
    #[serde(rename = "Update Time", default)]
    update_time: Option<String>,
    #[serde(rename = "Speed")]
    speed: f64,
    #[serde(rename = "AZ")]
    azimuth: f64,
    #[serde(rename = "EL")]
    elevation: f64,
    #[serde(rename = "Range")]
    range: f64,
    #[serde(rename = "Position (lat)")]
    lat: f64,
    #[serde(rename = "Position (lon)")]
    lon: f64,
    #[serde(rename = "Position (alt MSL)", default)]
    alt_msl: Option<f64>,
    #[serde(rename = "Radar Cross Section", default)]
    radar_cross_section: Option<f64>,
    #[serde(rename = "Class", alias = "Label", default)]
    label: Option<String>,
}

/// An update with its optional ground-truth label.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelledUpdate {
    pub update: Update,
    pub label: Option<Label>,
}

/// Parse updates from any CSV source. Rows keep file order.
pub fn read_updates<R: Read>(reader: R) -> Result<Vec<LabelledUpdate>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut out = Vec::new();
    for (idx, record) in rdr.deserialize::<SourceRow>().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let row = record.with_context(|| format!("malformed CSV row at line {line}"))?;

        let timestamp = row
            .update_time
            .as_deref()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .unwrap_or(idx as f64);
        let label = match row.label.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<Label>()
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("bad label at line {line}"))?,
            ),
        };

        out.push(LabelledUpdate {
            update: Update {
                track_id: TrackId::from(row.uuid),
                timestamp,
                speed: row.speed,
                azimuth: row.azimuth,
                elevation: row.elevation,
                range: row.range,
                lat: row.lat,
                lon: row.lon,
                alt_msl: row.alt_msl.unwrap_or(0.0),
                radar_cross_section: row.radar_cross_section.unwrap_or(0.0),
            },
            label,
        });
    }
    Ok(out)
}

/// Load updates from a CSV file.
pub fn load_updates(path: &Path) -> Result<Vec<LabelledUpdate>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("cannot open CSV file {}", path.display()))?;
    read_updates(std::io::BufReader::new(file))
        .with_context(|| format!("while reading {}", path.display()))
}

/// Load several files, concatenated in the given order.
pub fn load_many<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<LabelledUpdate>> {
    let mut all = Vec::new();
    for p in paths {
        all.extend(load_updates(p.as_ref())?);
    }
    Ok(all)
}

/// Strip labels.
pub fn updates_only(rows: &[LabelledUpdate]) -> Vec<Update> {
    rows.iter().map(|r| r.update.clone()).collect()
}

/// Per-track ground truth: majority of the row labels, ties to `Drone`.
/// Tracks without any labelled row are absent.
pub fn track_labels(rows: &[LabelledUpdate]) -> BTreeMap<TrackId, Label> {
    let mut votes: BTreeMap<TrackId, (u64, u64)> = BTreeMap::new();
    for r in rows {
        if let Some(label) = r.label {
            let v = votes.entry(r.update.track_id.clone()).or_default();
            match label {
                Label::Bird => v.0 += 1,
                Label::Drone => v.1 += 1,
            }
        }
    }
    votes
        .into_iter()
        .map(|(id, (bird, drone))| {
            let label = if drone >= bird { Label::Drone } else { Label::Bird };
            (id, label)
        })
        .collect()
}
