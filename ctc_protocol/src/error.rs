use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WireError {
    #[error("Datagram too short: need {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },

    #[error("Message type {msg_type} expects a {expected}-byte body, got {got}")]
    BodyLength {
        msg_type: u8,
        expected: usize,
        got: usize,
    },

    #[error("Unknown CTC message type: {0}")]
    UnknownMessageType(u8),
}
