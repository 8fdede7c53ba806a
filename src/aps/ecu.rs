use std::ops::Range;

use chrono::DateTime;
use chrono_tz::Tz;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::Serialize;

use crate::aps::frame;
use crate::prelude::*;

pub const DEFAULT_TZ: &str = "UTC";

/// One full collection round: the three queries the gateway answers, in the
/// order they are made.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EcuResponse {
    pub ecu_info: EcuInfo,
    pub array_info: ArrayInfo,
    pub signal_info: SignalInfo,
}

// EcuInfo {{{

// Offsets into the 0001 response. Fields after the version string float on
// its length; their positions are computed at decode time.
const ECU_ID: Range<usize> = 13..25;
const LIFETIME_ENERGY: Range<usize> = 27..31;
const LAST_POWER: Range<usize> = 31..35;
const TODAY_ENERGY: Range<usize> = 35..39;
const INVERTERS_REGISTERED: Range<usize> = 46..48;
const INVERTERS_ONLINE: Range<usize> = 48..50;
const VERSION_LEN: Range<usize> = 52..55;
const VERSION_START: usize = 55;
const TZ_LEN_LEN: usize = 3;
const MAC_LEN: usize = 6;

/// Snapshot of the gateway itself, from the 0001 query.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EcuInfo {
    pub ecu_id: String,
    pub version: String,
    pub inverters_registered: u16,
    pub inverters_online: u16,
    pub ethernet_mac: String,
    pub wireless_mac: String,
    /// Wh. The wire value is in units of 100 Wh.
    pub lifetime_energy: u64,
    /// Wh. The wire value is in units of 10 Wh.
    pub today_energy: u64,
    /// W.
    pub last_power: u32,
    /// Original frame, kept for diagnostics.
    #[serde(skip)]
    pub raw: Bytes,
}

impl EcuInfo {
    pub fn decode(raw: Bytes) -> Result<Self, Error> {
        frame::validate(&raw)?;

        let version_len = Utils::ascii_number(&raw, VERSION_LEN, "version length")?;
        let version_end = VERSION_START + version_len;
        let version =
            String::from_utf8_lossy(Utils::field(&raw, VERSION_START..version_end, "version")?)
                .into_owned();

        // The timezone string itself is unused here; its length locates the
        // MAC fields that follow it.
        let tz_len =
            Utils::ascii_number(&raw, version_end..version_end + TZ_LEN_LEN, "timezone length")?;
        let macs = version_end + TZ_LEN_LEN + tz_len;

        Ok(Self {
            ecu_id: String::from_utf8_lossy(Utils::field(&raw, ECU_ID, "ECU id")?).into_owned(),
            version,
            inverters_registered: Utils::be_u16(&raw, INVERTERS_REGISTERED, "registered count")?,
            inverters_online: Utils::be_u16(&raw, INVERTERS_ONLINE, "online count")?,
            ethernet_mac: Utils::hex_string(Utils::field(
                &raw,
                macs..macs + MAC_LEN,
                "ethernet MAC",
            )?),
            wireless_mac: Utils::hex_string(Utils::field(
                &raw,
                macs + MAC_LEN..macs + 2 * MAC_LEN,
                "wireless MAC",
            )?),
            lifetime_energy: u64::from(Utils::be_u32(&raw, LIFETIME_ENERGY, "lifetime energy")?)
                * 100,
            today_energy: u64::from(Utils::be_u32(&raw, TODAY_ENERGY, "today energy")?) * 10,
            last_power: Utils::be_u32(&raw, LAST_POWER, "last power")?,
            raw,
        })
    }
}
// }}}

// ArrayInfo {{{

const INVERTER_COUNT: Range<usize> = 17..19;
const TIMESTAMP: Range<usize> = 19..26;
const RECORDS_START: usize = 26;
const RECORD_LEN: usize = 23;

/// Per-inverter production data from the 0002 query.
///
/// Inverter order matches the wire and lines up positionally with
/// [`SignalInfo`]; the protocol gives no identifier-based correlation
/// between the two calls.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArrayInfo {
    pub timestamp: DateTime<Tz>,
    pub inverters: Vec<Inverter>,
    #[serde(skip)]
    pub raw: Bytes,
}

impl ArrayInfo {
    pub fn decode(raw: Bytes, tz: Tz) -> Result<Self, Error> {
        frame::validate(&raw)?;

        let timestamp =
            Utils::decimal_timestamp(Utils::field(&raw, TIMESTAMP, "timestamp")?, tz)?;

        let count = usize::from(Utils::be_u16(&raw, INVERTER_COUNT, "inverter count")?);
        let mut inverters = Vec::with_capacity(count);
        for i in 0..count {
            let start = RECORDS_START + i * RECORD_LEN;
            // Records sit on a fixed 23-byte stride, but the decoder gets
            // the rest of the frame: the YC1000 layout reads power D past
            // the stride boundary.
            Utils::field(&raw, start..start + RECORD_LEN, "inverter record")?;
            let inverter = Inverter::decode(&raw[start..]).map_err(|source| {
                Error::InverterRecord {
                    index: i + 1,
                    source: Box::new(source),
                }
            })?;
            inverters.push(inverter);
        }

        Ok(Self { timestamp, inverters, raw })
    }
}
// }}}

// Inverter {{{

const INVERTER_ID: Range<usize> = 0..6;
const ONLINE: usize = 6;
const DISCRIMINATOR: usize = 8;
const FREQUENCY: Range<usize> = 9..11;
const TEMPERATURE: Range<usize> = 11..13;
const POWER_A: Range<usize> = 13..15;
const VOLTAGE_A: Range<usize> = 15..17;
const POWER_B: Range<usize> = 17..19;
const QS1_POWER_C: Range<usize> = 19..21;
const QS1_POWER_D: Range<usize> = 21..23;
const YC1000_POWER_C: Range<usize> = 21..23;
const YC1000_POWER_D: Range<usize> = 25..27;
const MIN_RECORD_LEN: usize = 22;

/// Model discriminator as it appears on the wire: a single ASCII digit.
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ModelKind {
    Yc600 = b'1',
    Yc1000 = b'2',
    Qs1 = b'3',
}

/// Channel layout differs per model, so each variant carries only the
/// fields that exist for it. `Other` is what an unknown discriminator
/// decodes to; it travels inside [`Error::UnknownInverterType`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "model")]
pub enum Model {
    #[serde(rename = "YC600")]
    Yc600 {
        /// Hz, 0.1 Hz resolution on the wire.
        frequency: f64,
        /// Celsius.
        temperature: i32,
        power_a: u16,
        voltage_a: u16,
        power_b: u16,
    },
    #[serde(rename = "YC1000")]
    Yc1000 {
        frequency: f64,
        temperature: i32,
        power_a: u16,
        voltage_a: u16,
        power_b: u16,
        power_c: u16,
        power_d: u16,
    },
    #[serde(rename = "QS1")]
    Qs1 {
        frequency: f64,
        temperature: i32,
        power_a: u16,
        voltage_a: u16,
        power_b: u16,
        power_c: u16,
        power_d: u16,
    },
    Other,
}

impl Model {
    pub fn name(&self) -> &'static str {
        match self {
            Model::Yc600 { .. } => "YC600",
            Model::Yc1000 { .. } => "YC1000",
            Model::Qs1 { .. } => "QS1",
            Model::Other => "Other",
        }
    }
}

/// One inverter's record within an [`ArrayInfo`] response.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Inverter {
    /// 6-byte identifier, hex encoded.
    pub id: String,
    pub online: bool,
    #[serde(flatten)]
    pub model: Model,
}

impl Inverter {
    pub fn decode(raw: &[u8]) -> Result<Self, Error> {
        if raw.len() < MIN_RECORD_LEN {
            return Err(Error::MalformedBody(format!(
                "inverter record too short ({} bytes) to parse",
                raw.len()
            )));
        }

        let id = Utils::hex_string(&raw[INVERTER_ID]);
        let online = raw[ONLINE] != 0;

        let kind = match ModelKind::try_from(raw[DISCRIMINATOR]) {
            Ok(kind) => kind,
            Err(_) => {
                return Err(Error::UnknownInverterType {
                    discriminator: raw[DISCRIMINATOR] as char,
                    partial: Inverter { id, online, model: Model::Other },
                });
            }
        };

        let frequency = f64::from(Utils::be_u16(raw, FREQUENCY, "frequency")?) / 10.0;
        let temperature = i32::from(Utils::be_u16(raw, TEMPERATURE, "temperature")?) - 100;
        let power_a = Utils::be_u16(raw, POWER_A, "power A")?;
        let voltage_a = Utils::be_u16(raw, VOLTAGE_A, "voltage A")?;
        let power_b = Utils::be_u16(raw, POWER_B, "power B")?;

        let model = match kind {
            ModelKind::Yc600 => Model::Yc600 {
                frequency,
                temperature,
                power_a,
                voltage_a,
                power_b,
            },
            ModelKind::Yc1000 => Model::Yc1000 {
                frequency,
                temperature,
                power_a,
                voltage_a,
                power_b,
                power_c: Utils::be_u16(raw, YC1000_POWER_C, "power C")?,
                power_d: Utils::be_u16(raw, YC1000_POWER_D, "power D")?,
            },
            ModelKind::Qs1 => Model::Qs1 {
                frequency,
                temperature,
                power_a,
                voltage_a,
                power_b,
                power_c: Utils::be_u16(raw, QS1_POWER_C, "power C")?,
                power_d: Utils::be_u16(raw, QS1_POWER_D, "power D")?,
            },
        };

        Ok(Self { id, online, model })
    }
}
// }}}

// SignalInfo {{{

const STATUS: Range<usize> = 13..15;
const ENTRIES_START: usize = 15;
const ENTRY_LEN: usize = 7;
const ENTRY_ID_LEN: usize = 6;

/// Radio signal strength per inverter, from the 0030 query. Entries line up
/// positionally with [`ArrayInfo::inverters`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SignalInfo {
    pub status: u8,
    pub inverters: Vec<InverterSignal>,
    #[serde(skip)]
    pub raw: Bytes,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InverterSignal {
    /// 6-byte identifier, hex encoded.
    pub id: String,
    /// 0-255, where 255 is full strength.
    pub signal: u8,
}

impl SignalInfo {
    pub fn decode(raw: Bytes) -> Result<Self, Error> {
        frame::validate(&raw)?;

        let status = Utils::ascii_number(&raw, STATUS, "status")? as u8;

        // The entry count is implied by the frame length rather than an
        // explicit field. A remainder means the frame is desynchronised.
        let tail = raw
            .len()
            .saturating_sub(ENTRIES_START + frame::TERMINATOR.len());
        if tail % ENTRY_LEN != 0 {
            return Err(Error::MalformedBody(format!(
                "signal entries occupy {} bytes, not a multiple of {}",
                tail, ENTRY_LEN
            )));
        }

        let mut inverters = Vec::with_capacity(tail / ENTRY_LEN);
        for i in 0..tail / ENTRY_LEN {
            let start = ENTRIES_START + i * ENTRY_LEN;
            inverters.push(InverterSignal {
                id: Utils::hex_string(Utils::field(
                    &raw,
                    start..start + ENTRY_ID_LEN,
                    "signal entry id",
                )?),
                signal: raw[start + ENTRY_ID_LEN],
            });
        }

        Ok(Self { status, inverters, raw })
    }
}
// }}}
