//! Live listen mode: CTC datagrams over UDP → registry → classifier.
//!
//! # Loop (single thread)
//! 1. Wait for a datagram, at most `sweep_interval`
//! 2. Decode; measurements are ingested, track drops remove the track,
//!    an end-of-frame marker classifies every active track
//! 3. When `sweep_interval` has elapsed since the last sweep, evict stale
//!    tracks and classify the survivors
//!
//! Ingest and eviction share the loop, so they never interleave. Update
//! timestamps are seconds since the listener started.

use anyhow::{Context, Result};
use ctc_protocol::{
    message::{decode, CtcBody, Datagram},
    SensorSite,
};
use declutter_core::{
    classifier::{Classification, Classifier},
    registry::{RegistryConfig, TrackRegistry},
    types::TrackId,
};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::net::UdpSocket;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Configuration for the live listener.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds between eviction sweeps
    pub sweep_interval: f64,
    /// Receive buffer size in bytes
    pub recv_buf_size: usize,
    pub site: SensorSite,
    pub registry: RegistryConfig,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 10001,
            sweep_interval: 5.0,
            recv_buf_size: 1024,
            site: SensorSite::default(),
            registry: RegistryConfig::default(),
        }
    }
}

/// Why a report was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportTrigger {
    EndOfFrame,
    Sweep,
}

/// Classification of every active track at one instant.
#[derive(Clone, Debug)]
pub struct FrameReport {
    pub trigger: ReportTrigger,
    /// Listener clock (s)
    pub time: f64,
    pub evicted: usize,
    pub classifications: Vec<(TrackId, Classification)>,
}

/// Socket read timeout for a sweep cadence of `seconds`, at least 1 ms.
pub fn sweep_timeout(seconds: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds.max(0.001))
        .with_context(|| format!("sweep_interval {seconds} is not a usable duration"))
}

/// Owns the registry for one listening session.
pub struct Listener<C: Classifier> {
    config: ListenerConfig,
    registry: TrackRegistry,
    classifier: C,
    last_sweep: f64,
    rejected: u64,
}

impl<C: Classifier> Listener<C> {
    pub fn new(config: ListenerConfig, classifier: C) -> Self {
        let registry = TrackRegistry::new(config.registry.clone());
        Self {
            config,
            registry,
            classifier,
            last_sweep: 0.0,
            rejected: 0,
        }
    }

    pub fn registry(&self) -> &TrackRegistry {
        &self.registry
    }

    /// Datagrams that failed to decode so far.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    fn report(&self, trigger: ReportTrigger, time: f64, evicted: usize) -> FrameReport {
        FrameReport {
            trigger,
            time,
            evicted,
            classifications: self.classifier.classify_matrix(&self.registry.snapshot_all()),
        }
    }

    /// Handle one datagram received at listener time `now`.
    pub fn handle_datagram(&mut self, bytes: &[u8], now: f64) -> Option<FrameReport> {
        let datagram = match decode(bytes) {
            Ok(d) => d,
            Err(e) => {
                self.rejected += 1;
                warn!(len = bytes.len(), error = %e, "dropping malformed datagram");
                return None;
            }
        };

        match datagram {
            Datagram::EndOfFrame => Some(self.report(ReportTrigger::EndOfFrame, now, 0)),
            Datagram::Message { body, .. } => {
                match body {
                    CtcBody::Measurement3D(m) => {
                        self.registry.ingest(&m.to_update(&self.config.site, now));
                    }
                    CtcBody::TrackDrop(d) => {
                        let id = TrackId::from(d.track_number);
                        if self.registry.drop_track(&id) {
                            debug!(track = %id, "track dropped by sensor");
                        }
                    }
                    CtcBody::SensorStatus(s) => {
                        debug!(status = s.sensor_status, warning = s.warning_flag, "sensor status");
                    }
                }
                None
            }
        }
    }

    /// Evict stale tracks if a sweep is due at `now`.
    pub fn maybe_sweep(&mut self, now: f64) -> Option<FrameReport> {
        if now - self.last_sweep < self.config.sweep_interval {
            return None;
        }
        self.last_sweep = now;
        let evicted = self.registry.evict_stale(now);
        if evicted > 0 {
            info!(evicted, active = self.registry.len(), "stale tracks evicted");
        }
        Some(self.report(ReportTrigger::Sweep, now, evicted))
    }

    /// Bind and serve forever, handing every report to `on_report`.
    /// Returns only on a socket error.
    pub fn run<F: FnMut(&FrameReport)>(&mut self, mut on_report: F) -> Result<()> {
        let interval = sweep_timeout(self.config.sweep_interval)?;
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let socket = UdpSocket::bind(&addr).with_context(|| format!("cannot bind {addr}"))?;
        socket.set_read_timeout(Some(interval))?;
        info!(%addr, "listening for CTC datagrams");

        let start = Instant::now();
        let mut buf = vec![0u8; self.config.recv_buf_size];
        loop {
            match socket.recv(&mut buf) {
                Ok(n) => {
                    let now = start.elapsed().as_secs_f64();
                    if let Some(report) = self.handle_datagram(&buf[..n], now) {
                        on_report(&report);
                    }
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
                Err(e) => return Err(e).context("UDP receive failed"),
            }
            if let Some(report) = self.maybe_sweep(start.elapsed().as_secs_f64()) {
                on_report(&report);
            }
        }
    }
}
