use std::ops::Range;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::ReadPhase;
use crate::prelude::*;

// Commands understood by the ECU-R. The parameterised ones take the ECU id
// between prefix and suffix. The energy report variants are sent with a
// period selector embedded in the suffix; no decoder for their responses
// exists yet.
pub const CMD_ECU_INFO: &str = "APS1100160001END\n";
pub const CMD_INVERTER_INFO_PREFIX: &str = "APS1100280002";
pub const CMD_INVERTER_INFO_SUFFIX: &str = "END\n";
pub const CMD_INVERTER_SIGNAL_PREFIX: &str = "APS1100280030";
pub const CMD_INVERTER_SIGNAL_SUFFIX: &str = "END\n";
pub const CMD_ENERGY_PREFIX: &str = "APS1100390004";
pub const CMD_ENERGY_WEEK_SUFFIX: &str = "END00END\n";
pub const CMD_ENERGY_MONTH_SUFFIX: &str = "END01END\n";
pub const CMD_ENERGY_YEAR_SUFFIX: &str = "END02END\n";

/// Every response ends with this literal, over and above the declared length.
pub const TERMINATOR: [u8; 4] = *b"END\n";

/// Fixed response header: "APS11" marker plus the 4-digit length field.
pub const HEADER_LEN: usize = 9;

/// Zero-padded ASCII decimal, equal to the total frame length minus one.
const LENGTH_FIELD: Range<usize> = 5..9;

/// Checks a body against its own framing: minimum length, `END\n`
/// terminator, and the declared length matching the actual length less one
/// (the trailing newline is not counted by the device).
pub fn validate(body: &[u8]) -> Result<(), Error> {
    if body.len() < 8 {
        return Err(Error::MalformedBody(format!(
            "body length less than 8, got {}",
            body.len()
        )));
    }

    if body[body.len() - TERMINATOR.len()..] != TERMINATOR {
        return Err(Error::MalformedBody("body does not end with 'END\\n'".to_string()));
    }

    let declared = Utils::ascii_number(body, LENGTH_FIELD, "body length")?;
    if body.len() - 1 != declared {
        return Err(Error::MalformedBody(format!(
            "body length does not match header; expected {}, got {}",
            declared,
            body.len() - 1
        )));
    }

    Ok(())
}

/// Reads one complete response frame from `source` and validates it.
///
/// The header is read first and is mandatory in full; a short read there is
/// a hard failure, never a partial-frame event. The declared length then
/// drives a single exact read of the remainder. The `+ 1` below accounts
/// for the device counting the trailing newline separately from the
/// declared length.
pub async fn read<R>(source: &mut R) -> Result<Bytes, Error>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    source
        .read_exact(&mut header)
        .await
        .map_err(|source| Error::Read { phase: ReadPhase::Header, source })?;

    let declared = Utils::ascii_number(&header, LENGTH_FIELD, "body length")?;
    let total = declared + 1;
    if total < HEADER_LEN {
        return Err(Error::MalformedBody(format!(
            "declared length {} shorter than the header itself",
            declared
        )));
    }

    let mut body = BytesMut::with_capacity(total);
    body.extend_from_slice(&header);
    body.resize(total, 0);
    source
        .read_exact(&mut body[HEADER_LEN..])
        .await
        .map_err(|source| Error::Read { phase: ReadPhase::Body, source })?;

    if body.len() != total {
        return Err(Error::MalformedBody(format!(
            "response length did not match header; expected {}, got {}",
            total,
            body.len()
        )));
    }

    validate(&body)?;
    trace!("read {} byte frame", body.len());

    Ok(body.freeze())
}
