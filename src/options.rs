use clap::Parser;

use crate::aps::client::DEFAULT_PORT;
use crate::aps::ecu::DEFAULT_TZ;

/// Reads inverter status, production statistics and zigbee signal strength
/// from an APsystems ECU-R solar gateway over its local TCP interface
#[derive(Debug, Parser)]
#[clap(author, version)]
pub struct Options {
    /// Address of the ECU-R
    #[clap(short = 'a', long = "host", default_value = "localhost")]
    pub host: String,

    /// Port on which to connect with the ECU-R
    #[clap(short = 'p', long = "port", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// IANA timezone of the ECU-R (used to parse the provided timestamp)
    #[clap(long = "tz", default_value = DEFAULT_TZ)]
    pub timezone: String,

    /// Output results as JSON
    #[clap(short = 'j', long = "json")]
    pub json: bool,

    /// Overall time limit for one collection round, in seconds
    #[clap(short = 't', long = "timeout", default_value_t = 30)]
    pub timeout: u64,
}

impl Options {
    pub fn new() -> Self {
        Self::parse()
    }
}
