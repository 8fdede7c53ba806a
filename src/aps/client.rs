use std::time::Duration;

use chrono_tz::Tz;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::aps::ecu::{ArrayInfo, EcuInfo, EcuResponse, SignalInfo};
use crate::aps::frame;
use crate::prelude::*;

pub const DEFAULT_PORT: u16 = 8899;

// Pause between queries; the gateway drops the connection when polled
// back-to-back.
const QUERY_COOLDOWN: Duration = Duration::from_millis(25);

/// Request/response client for one ECU-R gateway.
///
/// The gateway answers three queries over a plain TCP stream; there is no
/// handshake or session beyond the connection itself. Timeouts are the
/// caller's concern: every call here blocks until the gateway answers or
/// the stream fails.
#[derive(Debug)]
pub struct Client {
    host: String,
    port: u16,
    tz: Tz,
    conn: Option<TcpStream>,
    ecu_id: Option<String>,
}

impl Client {
    /// `tz` is the IANA zone the gateway reports its timestamps in; an
    /// empty string means UTC.
    pub fn new(host: &str, port: u16, tz: &str) -> Result<Self, Error> {
        let tz = if tz.is_empty() {
            Tz::UTC
        } else {
            tz.parse()
                .map_err(|_| Error::UnknownTimezone(tz.to_string()))?
        };

        Ok(Self {
            host: host.to_string(),
            port,
            tz,
            conn: None,
            ecu_id: None,
        })
    }

    pub async fn connect(&mut self) -> Result<()> {
        debug!("connecting to {}:{}", self.host, self.port);
        let stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        self.conn = Some(stream);
        Ok(())
    }

    /// Closes the connection; typically called after collecting all data.
    pub async fn close(&mut self) -> Result<()> {
        match self.conn.take() {
            Some(mut conn) => Ok(conn.shutdown().await?),
            None => Err(Error::NotConnected.into()),
        }
    }

    /// Connects and runs all three queries in order, pausing between them
    /// so the gateway is not overrun.
    pub async fn get_data(&mut self) -> Result<EcuResponse> {
        self.connect().await?;

        let ecu_info = self.get_ecu_info().await?;
        tokio::time::sleep(QUERY_COOLDOWN).await;

        let array_info = self.get_inverter_info().await?;
        tokio::time::sleep(QUERY_COOLDOWN).await;

        let signal_info = self.get_inverter_signal().await?;

        Ok(EcuResponse { ecu_info, array_info, signal_info })
    }

    /// First query of a round; the returned ECU id parameterises the other
    /// two, so it is cached here.
    pub async fn get_ecu_info(&mut self) -> Result<EcuInfo> {
        let raw = self
            .roundtrip(frame::CMD_ECU_INFO.to_string())
            .await
            .context("ECU info query")?;
        let info = EcuInfo::decode(raw)?;
        debug!("ECU {} answered, version {}", info.ecu_id, info.version);
        self.ecu_id = Some(info.ecu_id.clone());
        Ok(info)
    }

    /// Per-inverter production data.
    pub async fn get_inverter_info(&mut self) -> Result<ArrayInfo> {
        let ecu_id = self.cached_ecu_id().await?;
        let command = format!(
            "{}{}{}",
            frame::CMD_INVERTER_INFO_PREFIX,
            ecu_id,
            frame::CMD_INVERTER_INFO_SUFFIX
        );
        let raw = self
            .roundtrip(command)
            .await
            .context("inverter info query")?;
        Ok(ArrayInfo::decode(raw, self.tz)?)
    }

    /// Zigbee signal strength per inverter (0x00-0xFF).
    pub async fn get_inverter_signal(&mut self) -> Result<SignalInfo> {
        let ecu_id = self.cached_ecu_id().await?;
        let command = format!(
            "{}{}{}",
            frame::CMD_INVERTER_SIGNAL_PREFIX,
            ecu_id,
            frame::CMD_INVERTER_SIGNAL_SUFFIX
        );
        let raw = self
            .roundtrip(command)
            .await
            .context("inverter signal query")?;
        Ok(SignalInfo::decode(raw)?)
    }

    async fn cached_ecu_id(&mut self) -> Result<String> {
        match &self.ecu_id {
            Some(id) => Ok(id.clone()),
            None => Ok(self.get_ecu_info().await?.ecu_id),
        }
    }

    async fn roundtrip(&mut self, command: String) -> Result<Bytes> {
        let conn = self.conn.as_mut().ok_or(Error::NotConnected)?;
        conn.write_all(command.as_bytes()).await?;
        conn.flush().await?;
        Ok(frame::read(conn).await?)
    }
}
