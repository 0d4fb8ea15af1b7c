//! Driver for an RHF76-052 style LoRaWAN modem controlled over AT commands.
//!
//! Provisioning runs as a fixed, ordered list of commands. Apart from the
//! connectivity probe, replies are not interpreted: every step is considered
//! done once the modem has answered something.

pub mod at;
pub mod channel;
pub mod command;
pub mod config;

use embedded_hal_async::delay::DelayNs;
use embedded_io::ReadReady;
use embedded_io_async::{Read, Write};
use heapless::String;

use self::at::{trim_terminator, AtTransport, REPLY_CAPACITY};
use self::command::{Command, Identifier, Key};
pub use self::config::{AuthMode, Band, DataRate, DeviceClass, LoRaConfig, Switch, TxPower};
use crate::error::Error;

pub const MODEM_BAUD_RATE: u32 = 9600;

/// The only reply accepted from the connectivity probe.
pub const PROBE_ACK: &str = "+AT: OK\r\n";
pub const DONE_MARKER: &str = "Done";

/// Length of `+VER: ` in front of the version string.
pub const VERSION_PREFIX_LEN: usize = 6;

const RESET_SETTLE_MS: u32 = 500;
const BUSY_POLL_MS: u32 = 1;

/// Progress of the current uplink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxState {
    Idle,
    PortSet,
    MessageSent,
    Done,
}

pub struct LoRaModem<'a, S, D> {
    at: AtTransport<S, D>,
    config: Option<LoRaConfig<'a>>,
    busy: bool,
    tx_state: TxState,
}

impl<'a, S, D> LoRaModem<'a, S, D>
where
    S: Read + Write + ReadReady,
    D: DelayNs,
{
    pub fn new(serial: S, delay: D) -> Self {
        Self {
            at: AtTransport::new(serial, delay),
            config: None,
            busy: false,
            tx_state: TxState::Idle,
        }
    }

    pub fn with_read_timeout(mut self, read_timeout_ms: u32) -> Self {
        self.at = self.at.with_read_timeout(read_timeout_ms);
        self
    }

    pub fn config(&self) -> Option<&LoRaConfig<'a>> {
        self.config.as_ref()
    }

    /// Set while a join or an uplink waits for the modem's `Done`.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn tx_state(&self) -> TxState {
        self.tx_state
    }

    /// Store `config` and provision the modem with it.
    ///
    /// Fails fast with [`Error::UartFailure`] when the link is not ready or
    /// the probe is not acknowledged. `AT+RESET` never fails. The steps from
    /// band to DevEUI and the authentication mode abort on the first error.
    /// DevAddr, NwkSKey and AppSKey are then written unconditionally and the
    /// result is the one of the AppSKey step.
    pub async fn init(&mut self, config: LoRaConfig<'a>) -> Result<(), Error> {
        self.config = Some(config);
        self.busy = false;
        self.tx_state = TxState::Idle;
        self.at.set_echo(config.debug);

        if let Err(e) = self.at.flush().await {
            error!("modem: serial link not ready: {}", e);
            return Err(Error::UartFailure);
        }

        self.probe().await?;
        self.reset().await;

        if config.debug {
            match self.firmware_version().await {
                Ok(version) => info!("modem: firmware {}", version.as_str()),
                Err(e) => warn!("modem: unreadable firmware version: {}", e),
            }
        }

        self.configure(&Command::Band(config.band)).await?;
        self.set_sub_band(config.sub_band).await?;
        self.configure(&Command::Class(config.class)).await?;
        self.configure(&Command::Power(config.tx_power)).await?;
        self.configure(&Command::Adr(config.adr)).await?;
        self.configure(&Command::DataRate(config.uplink_dr)).await?;
        self.configure(&Command::Id(Identifier::DevEui, config.dev_eui))
            .await?;

        self.configure(&Command::Mode(config.auth_mode)).await?;

        // only the last key decides the outcome
        let _ = self
            .configure(&Command::Id(Identifier::DevAddr, config.dev_addr))
            .await;
        let _ = self
            .configure(&Command::Key(Key::NwkSKey, config.nwk_s_key))
            .await;
        self.configure(&Command::Key(Key::AppSKey, config.app_s_key))
            .await
    }

    async fn probe(&mut self) -> Result<(), Error> {
        let reply = match self.at.execute(&Command::Probe).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("modem: probe failed: {}", e);
                return Err(Error::UartFailure);
            }
        };

        if reply.as_str() != PROBE_ACK {
            error!("modem: unexpected probe reply '{}'", trim_terminator(reply.as_str()));
            return Err(Error::UartFailure);
        }

        debug!("modem: probe acknowledged");
        Ok(())
    }

    async fn reset(&mut self) {
        match self.at.execute(&Command::Reset).await {
            Ok(reply) => debug!("modem: reset '{}'", trim_terminator(reply.as_str())),
            Err(e) => warn!("modem: reset not confirmed: {}", e),
        }
        self.at.pause(RESET_SETTLE_MS).await;
    }

    async fn configure(&mut self, command: &Command<'_>) -> Result<(), Error> {
        self.at.execute(command).await.map(|_| ())
    }

    async fn set_sub_band(&mut self, sub_band: u8) -> Result<(), Error> {
        if channel::plan(sub_band).is_none() {
            debug!("modem: no channel mask for sub-band {}", sub_band);
            return Ok(());
        }

        for index in channel::disabled_channels(sub_band) {
            self.configure(&Command::ChannelOff(index)).await?;
        }
        Ok(())
    }

    /// Version string between the `+VER: ` prefix and the line terminator.
    pub async fn firmware_version(&mut self) -> Result<String<REPLY_CAPACITY>, Error> {
        let reply = self.at.execute(&Command::Version).await?;
        let end = reply
            .len()
            .checked_sub(2)
            .filter(|end| *end >= VERSION_PREFIX_LEN)
            .ok_or(Error::MalformedReply)?;
        let text = reply.get(VERSION_PREFIX_LEN..end).ok_or(Error::MalformedReply)?;

        let mut version = String::new();
        version.push_str(text).map_err(|_| Error::MalformedReply)?;
        Ok(version)
    }

    /// Unconfirmed uplink of `hex` on `port`.
    ///
    /// Returns once a chunk of modem output contains `Done`, however long
    /// the chunk. Without `tx_deadline_ms` this waits forever; with it the
    /// wait ends in [`Error::TxTimeout`], leaving the modem busy. A failure
    /// before the message is out clears the busy flag.
    pub async fn send_unconfirmed_hex(&mut self, port: u8, hex: &str) -> Result<(), Error> {
        self.transmit(port, Command::MsgHex(hex)).await
    }

    /// Confirmed uplink, same contract as [`Self::send_unconfirmed_hex`].
    pub async fn send_confirmed_hex(&mut self, port: u8, hex: &str) -> Result<(), Error> {
        self.transmit(port, Command::CMsgHex(hex)).await
    }

    async fn transmit(&mut self, port: u8, message: Command<'_>) -> Result<(), Error> {
        let config = self.config.ok_or(Error::Uninitialized)?;

        self.busy = true;
        self.tx_state = TxState::Idle;

        // nothing is in flight until the message went out
        if let Err(e) = self.start_uplink(port, &message).await {
            self.busy = false;
            return Err(e);
        }

        self.await_done(config.tx_deadline_ms).await?;
        self.tx_state = TxState::Done;
        debug!("modem: uplink done on port {}", port);
        Ok(())
    }

    async fn start_uplink(&mut self, port: u8, message: &Command<'_>) -> Result<(), Error> {
        self.at.execute(&Command::Port(port)).await?;
        self.tx_state = TxState::PortSet;

        self.at.send(message).await?;
        self.tx_state = TxState::MessageSent;
        Ok(())
    }

    /// OTAA join with the stored AppEUI and AppKey.
    pub async fn join(&mut self) -> Result<(), Error> {
        let config = self.config.ok_or(Error::Uninitialized)?;

        self.configure(&Command::Id(Identifier::AppEui, config.app_eui))
            .await?;
        self.configure(&Command::Key(Key::AppKey, config.app_key))
            .await?;

        self.busy = true;
        if let Err(e) = self.at.send(&Command::Join).await {
            self.busy = false;
            return Err(e);
        }
        self.await_done(config.tx_deadline_ms).await?;
        info!("modem: joined");
        Ok(())
    }

    async fn await_done(&mut self, deadline_ms: Option<u32>) -> Result<(), Error> {
        let mut waited_ms: u32 = 0;

        while self.busy {
            match self.at.poll_for(DONE_MARKER).await? {
                Some(true) => self.busy = false,
                Some(false) => waited_ms = waited_ms.saturating_add(self.at.read_timeout_ms()),
                None => {
                    self.at.pause(BUSY_POLL_MS).await;
                    waited_ms = waited_ms.saturating_add(BUSY_POLL_MS);
                }
            }

            if let Some(deadline) = deadline_ms {
                if self.busy && waited_ms >= deadline {
                    warn!("modem: no completion after {} ms", waited_ms);
                    return Err(Error::TxTimeout);
                }
            }
        }

        Ok(())
    }
}
