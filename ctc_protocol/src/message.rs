//! CTC message layouts and their byte codec.
//!
//! All fields are little-endian and packed (no padding).
//!
//! ```text
//! header (14 B): src_id u8 | block_series u8 | msg_type u8 | src_type u8 |
//!                msg_length u16 | msg_number u32 | time_lsw u16 | time_msw u16
//! type 1  (28 B): track u32 | range u32 | az u32 | el i16 | vn i16 | ve i16 |
//!                 vu i16 | snr u16 | rcs u16 | doppler u16 | descriptor u16
//! type 2   (4 B): track u32
//! type 3  (30 B): secs u32 | nanos u32 | sync u32 | status u8 | warning u8 |
//!                 lat u32 | lon u32 | alt i32 | antenna_az u32
//! ```
//! A datagram of exactly one byte marks the end of a frame.

use crate::error::WireError;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::io::{self, Cursor, Write};

pub const HEADER_LEN: usize = 14;
pub const MEASUREMENT_BODY_LEN: usize = 28;
pub const TRACK_DROP_BODY_LEN: usize = 4;
pub const SENSOR_STATUS_BODY_LEN: usize = 30;

pub const MSG_TYPE_MEASUREMENT_3D: u8 = 1;
pub const MSG_TYPE_TRACK_DROP: u8 = 2;
pub const MSG_TYPE_SENSOR_STATUS: u8 = 3;

/// Byte sent as the whole end-of-frame datagram.
pub const END_OF_FRAME: u8 = b'A';

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtcHeader {
    pub src_id: u8,
    pub msg_block_series: u8,
    pub msg_type: u8,
    pub src_type: u8,
    /// Total length including header (bytes)
    pub msg_length: u16,
    pub msg_number: u32,
    pub measurement_time_lsw: u16,
    pub measurement_time_msw: u16,
}

impl CtcHeader {
    /// Header for a message of `msg_type`, with `msg_length` filled in.
    pub fn for_type(msg_type: u8, msg_number: u32) -> Self {
        let body = match msg_type {
            MSG_TYPE_MEASUREMENT_3D => MEASUREMENT_BODY_LEN,
            MSG_TYPE_TRACK_DROP => TRACK_DROP_BODY_LEN,
            MSG_TYPE_SENSOR_STATUS => SENSOR_STATUS_BODY_LEN,
            _ => 0,
        };
        Self {
            msg_type,
            msg_length: (HEADER_LEN + body) as u16,
            msg_number,
            ..Default::default()
        }
    }

    /// Measurement time since UTC midnight, both words combined.
    pub fn measurement_time(&self) -> u32 {
        ((self.measurement_time_msw as u32) << 16) | self.measurement_time_lsw as u32
    }
}

/// 3D position measurement, still in encoded integer units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement3D {
    pub track_number: u32,
    pub range: u32,
    pub azimuth: u32,
    pub elevation: i16,
    pub velocity_north: i16,
    pub velocity_east: i16,
    pub velocity_up: i16,
    pub snr: u16,
    pub rcs: u16,
    pub doppler: u16,
    /// Carries the ground-truth class in replayed captures
    pub track_descriptor_flag: u16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDrop {
    pub track_number: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorStatus {
    pub global_seconds: u32,
    pub global_nanos: u32,
    pub sync_word: u32,
    pub sensor_status: u8,
    pub warning_flag: u8,
    pub sensor_lat: u32,
    pub sensor_lon: u32,
    pub sensor_alt: i32,
    pub antenna_az: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CtcBody {
    Measurement3D(Measurement3D),
    TrackDrop(TrackDrop),
    SensorStatus(SensorStatus),
}

/// Anything that can arrive in one UDP datagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Datagram {
    Message { header: CtcHeader, body: CtcBody },
    EndOfFrame,
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn truncated(needed: usize, got: usize) -> impl Fn(io::Error) -> WireError {
    move |_| WireError::Truncated { needed, got }
}

fn decode_header(buf: &[u8]) -> Result<CtcHeader, WireError> {
    let short = truncated(HEADER_LEN, buf.len());
    let mut c = Cursor::new(buf);
    Ok(CtcHeader {
        src_id: c.read_u8().map_err(&short)?,
        msg_block_series: c.read_u8().map_err(&short)?,
        msg_type: c.read_u8().map_err(&short)?,
        src_type: c.read_u8().map_err(&short)?,
        msg_length: c.read_u16::<LittleEndian>().map_err(&short)?,
        msg_number: c.read_u32::<LittleEndian>().map_err(&short)?,
        measurement_time_lsw: c.read_u16::<LittleEndian>().map_err(&short)?,
        measurement_time_msw: c.read_u16::<LittleEndian>().map_err(&short)?,
    })
}

fn check_body(msg_type: u8, body: &[u8], expected: usize) -> Result<(), WireError> {
    if body.len() != expected {
        return Err(WireError::BodyLength {
            msg_type,
            expected,
            got: body.len(),
        });
    }
    Ok(())
}

fn read_measurement(c: &mut Cursor<&[u8]>) -> io::Result<Measurement3D> {
    Ok(Measurement3D {
        track_number: c.read_u32::<LittleEndian>()?,
        range: c.read_u32::<LittleEndian>()?,
        azimuth: c.read_u32::<LittleEndian>()?,
        elevation: c.read_i16::<LittleEndian>()?,
        velocity_north: c.read_i16::<LittleEndian>()?,
        velocity_east: c.read_i16::<LittleEndian>()?,
        velocity_up: c.read_i16::<LittleEndian>()?,
        snr: c.read_u16::<LittleEndian>()?,
        rcs: c.read_u16::<LittleEndian>()?,
        doppler: c.read_u16::<LittleEndian>()?,
        track_descriptor_flag: c.read_u16::<LittleEndian>()?,
    })
}

fn read_sensor_status(c: &mut Cursor<&[u8]>) -> io::Result<SensorStatus> {
    Ok(SensorStatus {
        global_seconds: c.read_u32::<LittleEndian>()?,
        global_nanos: c.read_u32::<LittleEndian>()?,
        sync_word: c.read_u32::<LittleEndian>()?,
        sensor_status: c.read_u8()?,
        warning_flag: c.read_u8()?,
        sensor_lat: c.read_u32::<LittleEndian>()?,
        sensor_lon: c.read_u32::<LittleEndian>()?,
        sensor_alt: c.read_i32::<LittleEndian>()?,
        antenna_az: c.read_u32::<LittleEndian>()?,
    })
}

/// Read the body of `msg_type`. A body shorter than its layout is `Truncated`.
fn read_body(msg_type: u8, body: &[u8]) -> Result<CtcBody, WireError> {
    let mut c = Cursor::new(body);
    let (needed, parsed) = match msg_type {
        MSG_TYPE_MEASUREMENT_3D => (
            MEASUREMENT_BODY_LEN,
            read_measurement(&mut c).map(CtcBody::Measurement3D),
        ),
        MSG_TYPE_TRACK_DROP => (
            TRACK_DROP_BODY_LEN,
            c.read_u32::<LittleEndian>()
                .map(|track_number| CtcBody::TrackDrop(TrackDrop { track_number })),
        ),
        MSG_TYPE_SENSOR_STATUS => (
            SENSOR_STATUS_BODY_LEN,
            read_sensor_status(&mut c).map(CtcBody::SensorStatus),
        ),
        other => return Err(WireError::UnknownMessageType(other)),
    };
    parsed.map_err(truncated(needed, body.len()))
}

/// Decode one datagram. Never panics on malformed input.
pub fn decode(buf: &[u8]) -> Result<Datagram, WireError> {
    if buf.len() == 1 {
        return Ok(Datagram::EndOfFrame);
    }
    let header = decode_header(buf)?;
    let body_bytes = &buf[HEADER_LEN..];

    let expected = match header.msg_type {
        MSG_TYPE_MEASUREMENT_3D => MEASUREMENT_BODY_LEN,
        MSG_TYPE_TRACK_DROP => TRACK_DROP_BODY_LEN,
        MSG_TYPE_SENSOR_STATUS => SENSOR_STATUS_BODY_LEN,
        other => return Err(WireError::UnknownMessageType(other)),
    };
    check_body(header.msg_type, body_bytes, expected)?;
    let body = read_body(header.msg_type, body_bytes)?;

    Ok(Datagram::Message { header, body })
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn write_header<W: Write>(w: &mut W, h: &CtcHeader) -> io::Result<()> {
    w.write_u8(h.src_id)?;
    w.write_u8(h.msg_block_series)?;
    w.write_u8(h.msg_type)?;
    w.write_u8(h.src_type)?;
    w.write_u16::<LittleEndian>(h.msg_length)?;
    w.write_u32::<LittleEndian>(h.msg_number)?;
    w.write_u16::<LittleEndian>(h.measurement_time_lsw)?;
    w.write_u16::<LittleEndian>(h.measurement_time_msw)
}

/// Write a header and body as one message.
pub fn write_message<W: Write>(w: &mut W, header: &CtcHeader, body: &CtcBody) -> io::Result<()> {
    write_header(w, header)?;
    match body {
        CtcBody::Measurement3D(m) => {
            w.write_u32::<LittleEndian>(m.track_number)?;
            w.write_u32::<LittleEndian>(m.range)?;
            w.write_u32::<LittleEndian>(m.azimuth)?;
            w.write_i16::<LittleEndian>(m.elevation)?;
            w.write_i16::<LittleEndian>(m.velocity_north)?;
            w.write_i16::<LittleEndian>(m.velocity_east)?;
            w.write_i16::<LittleEndian>(m.velocity_up)?;
            w.write_u16::<LittleEndian>(m.snr)?;
            w.write_u16::<LittleEndian>(m.rcs)?;
            w.write_u16::<LittleEndian>(m.doppler)?;
            w.write_u16::<LittleEndian>(m.track_descriptor_flag)
        }
        CtcBody::TrackDrop(d) => w.write_u32::<LittleEndian>(d.track_number),
        CtcBody::SensorStatus(s) => {
            w.write_u32::<LittleEndian>(s.global_seconds)?;
            w.write_u32::<LittleEndian>(s.global_nanos)?;
            w.write_u32::<LittleEndian>(s.sync_word)?;
            w.write_u8(s.sensor_status)?;
            w.write_u8(s.warning_flag)?;
            w.write_u32::<LittleEndian>(s.sensor_lat)?;
            w.write_u32::<LittleEndian>(s.sensor_lon)?;
            w.write_i32::<LittleEndian>(s.sensor_alt)?;
            w.write_u32::<LittleEndian>(s.antenna_az)
        }
    }
}

/// Encode a header and body into one datagram.
pub fn encode(header: &CtcHeader, body: &CtcBody) -> io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(HEADER_LEN + SENSOR_STATUS_BODY_LEN);
    write_message(&mut out, header, body)?;
    Ok(out)
}

/// The one-byte end-of-frame datagram.
pub fn encode_end_of_frame() -> [u8; 1] {
    [END_OF_FRAME]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
