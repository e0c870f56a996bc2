//! `ctc_protocol` — Codec for the CTC binary radar message format.
//!
//! # Module layout
//! - [`message`]    — Header and body layouts, `decode` / `encode`
//! - [`conversion`] — Encoded units → physical units, sensor-relative geolocation
//! - [`error`]      — Wire decoding errors

pub mod conversion;
pub mod error;
pub mod message;

pub use conversion::SensorSite;
pub use error::WireError;
pub use message::{decode, encode, CtcBody, CtcHeader, Datagram, Measurement3D, SensorStatus, TrackDrop};
