//! Encoded-integer ↔ physical-unit conversion and sensor-relative geolocation.
//!
//! # Scale factors
//! - azimuth:   `raw · 360 / 2³²` degrees
//! - elevation: `raw · 180 / 2¹⁶` degrees
//! - range, velocities: `raw / 16` (m, m/s)
//! - RCS: `raw / 1000`

use crate::message::Measurement3D;
use declutter_core::types::{TrackId, Update};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

const AZIMUTH_SCALE: f64 = 4_294_967_296.0; // 2^32
const ELEVATION_SCALE: f64 = 65_536.0; // 2^16
const DISTANCE_SCALE: f64 = 16.0;
const RCS_SCALE: f64 = 1000.0;

/// Flat-earth approximation: meters per degree of latitude/longitude.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Values written into replayed measurements for fields the core ignores.
pub const DEFAULT_SNR: u16 = 1024;
pub const DEFAULT_DOPPLER: u16 = 61_440;

pub fn azimuth_degrees(raw: u32) -> f64 {
    raw as f64 * 360.0 / AZIMUTH_SCALE
}

pub fn elevation_degrees(raw: i16) -> f64 {
    raw as f64 * 180.0 / ELEVATION_SCALE
}

pub fn distance(raw: u32) -> f64 {
    raw as f64 / DISTANCE_SCALE
}

pub fn velocity(raw: i16) -> f64 {
    raw as f64 / DISTANCE_SCALE
}

pub fn rcs(raw: u16) -> f64 {
    raw as f64 / RCS_SCALE
}

// Float → int `as` casts saturate, so out-of-range values clamp.

pub fn encode_azimuth(degrees: f64) -> u32 {
    (degrees.rem_euclid(360.0) * AZIMUTH_SCALE / 360.0) as u32
}

pub fn encode_elevation(degrees: f64) -> i16 {
    (degrees * ELEVATION_SCALE / 180.0) as i16
}

pub fn encode_distance(meters: f64) -> u32 {
    (meters * DISTANCE_SCALE) as u32
}

pub fn encode_velocity(mps: f64) -> i16 {
    (mps * DISTANCE_SCALE) as i16
}

pub fn encode_rcs(value: f64) -> u16 {
    (value * RCS_SCALE) as u16
}

/// Geodetic position of the radar.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorSite {
    pub lat: f64,
    pub lon: f64,
    /// meters MSL
    pub alt: f64,
}

impl Default for SensorSite {
    fn default() -> Self {
        Self {
            lat: 40.0,
            lon: -90.0,
            alt: 200.0,
        }
    }
}

impl SensorSite {
    /// Position of a target at `range` meters, azimuth (clockwise from north)
    /// and elevation in degrees. Returns `(lat, lon, alt_msl)`.
    pub fn locate(&self, range: f64, azimuth_deg: f64, elevation_deg: f64) -> (f64, f64, f64) {
        let (az, el) = (azimuth_deg.to_radians(), elevation_deg.to_radians());
        let horizontal = range * el.cos();
        let north = horizontal * az.cos();
        let east = horizontal * az.sin();
        let up = range * el.sin();
        (
            self.lat + north / METERS_PER_DEGREE,
            self.lon + east / METERS_PER_DEGREE,
            self.alt + up,
        )
    }
}

impl Measurement3D {
    /// Velocity `[north, east, up]` in m/s.
    pub fn velocity(&self) -> Vector3<f64> {
        Vector3::new(
            velocity(self.velocity_north),
            velocity(self.velocity_east),
            velocity(self.velocity_up),
        )
    }

    pub fn speed(&self) -> f64 {
        self.velocity().norm()
    }

    /// Physical-unit update for this measurement, seen from `site` at `timestamp`.
    pub fn to_update(&self, site: &SensorSite, timestamp: f64) -> Update {
        let range = distance(self.range);
        let azimuth = azimuth_degrees(self.azimuth);
        let elevation = elevation_degrees(self.elevation);
        let (lat, lon, alt_msl) = site.locate(range, azimuth, elevation);
        Update {
            track_id: TrackId::from(self.track_number),
            timestamp,
            speed: self.speed(),
            azimuth,
            elevation,
            range,
            lat,
            lon,
            alt_msl,
            radar_cross_section: rcs(self.rcs),
        }
    }

    /// Encode an update for transmission. Speed has no direction, so it is
    /// split equally over the three velocity axes.
    pub fn from_update(update: &Update, track_number: u32, descriptor_flag: u16) -> Self {
        let axis = encode_velocity(update.speed / 3f64.sqrt());
        Self {
            track_number,
            range: encode_distance(update.range),
            azimuth: encode_azimuth(update.azimuth),
            elevation: encode_elevation(update.elevation),
            velocity_north: axis,
            velocity_east: axis,
            velocity_up: axis,
            snr: DEFAULT_SNR,
            rcs: encode_rcs(update.radar_cross_section),
            doppler: DEFAULT_DOPPLER,
            track_descriptor_flag: descriptor_flag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn scale_factors() {
        assert_abs_diff_eq!(azimuth_degrees(0x4000_0000), 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(azimuth_degrees(u32::MAX), 360.0, epsilon = 1e-6);
        assert_abs_diff_eq!(elevation_degrees(16_384), 45.0, epsilon = 1e-9);
        assert_abs_diff_eq!(elevation_degrees(-16_384), -45.0, epsilon = 1e-9);
        assert_abs_diff_eq!(distance(1600), 100.0);
        assert_abs_diff_eq!(velocity(-32), -2.0);
        assert_abs_diff_eq!(rcs(250), 0.25);
    }

    #[test]
    fn speed_is_velocity_magnitude() {
        let m = Measurement3D {
            velocity_north: 48,  // 3 m/s
            velocity_east: 64,   // 4 m/s
            velocity_up: 0,
            ..Default::default()
        };
        assert_abs_diff_eq!(m.speed(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn locate_due_north_and_overhead() {
        let site = SensorSite::default();
        let (lat, lon, alt) = site.locate(METERS_PER_DEGREE, 0.0, 0.0);
        assert_abs_diff_eq!(lat, 41.0, epsilon = 1e-9);
        assert_abs_diff_eq!(lon, -90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(alt, 200.0, epsilon = 1e-9);

        let (lat, lon, alt) = site.locate(100.0, 0.0, 90.0);
        assert_abs_diff_eq!(lat, 40.0, epsilon = 1e-9);
        assert_abs_diff_eq!(lon, -90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(alt, 300.0, epsilon = 1e-9);

        let (_, lon, _) = site.locate(METERS_PER_DEGREE, 90.0, 0.0);
        assert_abs_diff_eq!(lon, -89.0, epsilon = 1e-9);
    }

    #[test]
    fn update_survives_encoding_within_quantisation() {
        let site = SensorSite::default();
        let original = Update {
            track_id: TrackId::from(46626u32),
            timestamp: 3.0,
            speed: 12.0,
            azimuth: 123.4,
            elevation: 5.5,
            range: 850.25,
            lat: 0.0,
            lon: 0.0,
            alt_msl: 0.0,
            radar_cross_section: 0.031,
        };
        let decoded = Measurement3D::from_update(&original, 46626, 1).to_update(&site, 3.0);

        assert_eq!(decoded.track_id, original.track_id);
        assert_abs_diff_eq!(decoded.range, original.range, epsilon = 1.0 / 16.0);
        assert_abs_diff_eq!(decoded.azimuth, original.azimuth, epsilon = 1e-6);
        assert_abs_diff_eq!(decoded.elevation, original.elevation, epsilon = 180.0 / 65_536.0);
        assert_abs_diff_eq!(decoded.speed, original.speed, epsilon = 0.2);
        assert_abs_diff_eq!(decoded.radar_cross_section, original.radar_cross_section, epsilon = 2e-3);
        let (lat, lon, alt) = site.locate(decoded.range, decoded.azimuth, decoded.elevation);
        assert_eq!((decoded.lat, decoded.lon, decoded.alt_msl), (lat, lon, alt));
    }

    #[test]
    fn negative_azimuth_wraps() {
        assert_abs_diff_eq!(azimuth_degrees(encode_azimuth(-90.0)), 270.0, epsilon = 1e-6);
    }
}
