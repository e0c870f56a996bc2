//! Replay CSV tracks to a listener as CTC datagrams.
//!
//! Frame `k` carries the `k`-th row of every track that still has one,
//! followed by an end-of-frame marker. Tracks get sequential track numbers
//! from [`FIRST_TRACK_NUMBER`] in ascending id order.

use crate::csv_loader::LabelledUpdate;
use anyhow::{Context, Result};
use ctc_protocol::message::{
    encode, encode_end_of_frame, CtcBody, CtcHeader, Measurement3D, MSG_TYPE_MEASUREMENT_3D,
};
use declutter_core::{classifier::Label, types::TrackId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::UdpSocket;
use std::time::Duration;
use tracing::{debug, info};

pub const FIRST_TRACK_NUMBER: u32 = 46_626;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransmitConfig {
    pub host: String,
    pub port: u16,
    /// Seconds between frames
    pub frame_delay: f64,
}

impl Default for TransmitConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 10001,
            frame_delay: 1.0,
        }
    }
}

/// Ground truth rides in the descriptor flag: 1 for drones, 0 otherwise.
fn descriptor_flag(label: Option<Label>) -> u16 {
    match label {
        Some(Label::Drone) => 1,
        _ => 0,
    }
}

/// Pre-encoded frames ready to send.
pub struct Transmitter {
    config: TransmitConfig,
    track_numbers: BTreeMap<TrackId, u32>,
    frames: Vec<Vec<Vec<u8>>>,
}

impl Transmitter {
    pub fn new(config: TransmitConfig, rows: &[LabelledUpdate]) -> Result<Self> {
        let mut by_track: BTreeMap<TrackId, Vec<&LabelledUpdate>> = BTreeMap::new();
        for r in rows {
            by_track.entry(r.update.track_id.clone()).or_default().push(r);
        }

        let track_numbers: BTreeMap<TrackId, u32> = by_track
            .keys()
            .cloned()
            .zip(FIRST_TRACK_NUMBER..)
            .collect();

        let depth = by_track.values().map(Vec::len).max().unwrap_or(0);
        let mut msg_number = 0u32;
        let mut frames = Vec::with_capacity(depth);
        for k in 0..depth {
            let mut frame = Vec::new();
            for (id, track_rows) in &by_track {
                let Some(row) = track_rows.get(k) else { continue };
                let m = Measurement3D::from_update(
                    &row.update,
                    track_numbers[id],
                    descriptor_flag(row.label),
                );
                let header = CtcHeader::for_type(MSG_TYPE_MEASUREMENT_3D, msg_number);
                msg_number = msg_number.wrapping_add(1);
                frame.push(encode(&header, &CtcBody::Measurement3D(m))?);
            }
            frame.push(encode_end_of_frame().to_vec());
            frames.push(frame);
        }

        Ok(Self {
            config,
            track_numbers,
            frames,
        })
    }

    /// CSV track id → wire track number.
    pub fn track_numbers(&self) -> &BTreeMap<TrackId, u32> {
        &self.track_numbers
    }

    /// Each frame's datagrams, end-of-frame marker last.
    pub fn frames(&self) -> &[Vec<Vec<u8>>] {
        &self.frames
    }

    /// Send every frame, sleeping `frame_delay` between frames.
    /// Returns the number of datagrams sent.
    pub fn send(&self) -> Result<usize> {
        let delay = Duration::try_from_secs_f64(self.config.frame_delay.max(0.0))
            .with_context(|| format!("frame_delay {} is not a usable duration", self.config.frame_delay))?;
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let socket = UdpSocket::bind("0.0.0.0:0").context("cannot bind UDP sender")?;
        socket
            .connect(&addr)
            .with_context(|| format!("cannot reach {addr}"))?;
        info!(%addr, frames = self.frames.len(), tracks = self.track_numbers.len(), "transmitting");

        let mut sent = 0;
        for (k, frame) in self.frames.iter().enumerate() {
            for datagram in frame {
                socket
                    .send(datagram)
                    .with_context(|| format!("send failed in frame {k}"))?;
                sent += 1;
            }
            debug!(frame = k, datagrams = frame.len(), "frame sent");
            if k + 1 < self.frames.len() {
                std::thread::sleep(delay);
            }
        }
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctc_protocol::message::{decode, Datagram};
    use declutter_core::types::Update;

    fn row(id: &str, t: f64, label: Option<Label>) -> LabelledUpdate {
        LabelledUpdate {
            update: Update {
                track_id: TrackId::from(id),
                timestamp: t,
                speed: 10.0,
                azimuth: 45.0,
                elevation: 2.0,
                range: 500.0,
                lat: 0.0,
                lon: 0.0,
                alt_msl: 0.0,
                radar_cross_section: 0.01,
            },
            label,
        }
    }

    fn measurement(bytes: &[u8]) -> Measurement3D {
        match decode(bytes).unwrap() {
            Datagram::Message {
                body: CtcBody::Measurement3D(m),
                ..
            } => m,
            other => panic!("expected measurement, got {other:?}"),
        }
    }

    #[test]
    fn one_row_per_track_per_frame() {
        let rows = vec![
            row("b", 0.0, Some(Label::Bird)),
            row("a", 0.0, Some(Label::Drone)),
            row("b", 1.0, Some(Label::Bird)),
            row("b", 2.0, Some(Label::Bird)),
        ];
        let tx = Transmitter::new(TransmitConfig::default(), &rows).unwrap();

        assert_eq!(tx.track_numbers()[&TrackId::from("a")], FIRST_TRACK_NUMBER);
        assert_eq!(tx.track_numbers()[&TrackId::from("b")], FIRST_TRACK_NUMBER + 1);

        let sizes: Vec<usize> = tx.frames().iter().map(Vec::len).collect();
        // measurements + end-of-frame
        assert_eq!(sizes, vec![3, 2, 2]);
        for frame in tx.frames() {
            assert_eq!(decode(frame.last().unwrap()).unwrap(), Datagram::EndOfFrame);
        }

        let first = measurement(&tx.frames()[0][0]);
        assert_eq!(first.track_number, FIRST_TRACK_NUMBER);
        assert_eq!(first.track_descriptor_flag, 1);
        let second = measurement(&tx.frames()[0][1]);
        assert_eq!(second.track_descriptor_flag, 0);
    }

    #[test]
    fn oversized_frame_delay_is_an_error() {
        let config = TransmitConfig {
            port: 9,
            frame_delay: 1e20,
            ..Default::default()
        };
        let tx = Transmitter::new(config, &[row("a", 0.0, None)]).unwrap();
        assert!(tx.send().is_err());
    }

    #[test]
    fn empty_input_has_no_frames() {
        let tx = Transmitter::new(TransmitConfig::default(), &[]).unwrap();
        assert!(tx.frames().is_empty());
    }
}
