use crate::aps::ecu::Inverter;

/// Protocol-level errors.
///
/// Decoders are pure and never return partial data on failure, with one
/// exception: an unrecognised model discriminator still yields the fields
/// common to every inverter record, carried inside the error so the caller
/// can decide whether to keep them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The body failed validation against its own header: bad terminator,
    /// length mismatch, or an unparsable length-derived sub-field.
    #[error("binary body not as expected: {0}")]
    MalformedBody(String),

    /// Model discriminator outside the known set ('1', '2', '3').
    #[error("unknown inverter type {discriminator:?}")]
    UnknownInverterType {
        discriminator: char,
        partial: Inverter,
    },

    /// The underlying stream failed or closed mid-frame.
    #[error("{phase} read failed")]
    Read {
        phase: ReadPhase,
        #[source]
        source: std::io::Error,
    },

    /// A per-inverter sub-record failed to decode; index is 1-based and
    /// follows on-wire order.
    #[error("inverter {index}: {source}")]
    InverterRecord {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("unknown IANA timezone {0:?}")]
    UnknownTimezone(String),

    #[error("not connected to ECU-R")]
    NotConnected,
}

/// Which of the two reads of a frame fetch failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReadPhase {
    Header,
    Body,
}

impl std::fmt::Display for ReadPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadPhase::Header => write!(f, "header"),
            ReadPhase::Body => write!(f, "body"),
        }
    }
}
