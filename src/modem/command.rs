use core::fmt::{self, Write};

use heapless::String;

use super::config::{AuthMode, Band, DataRate, DeviceClass, Switch, TxPower};
use crate::error::Error;

/// Longest command line the transport renders, terminator excluded.
pub const COMMAND_CAPACITY: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Identifier {
    DevEui,
    AppEui,
    DevAddr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    NwkSKey,
    AppSKey,
    AppKey,
}

impl Identifier {
    fn token(self) -> &'static str {
        match self {
            Identifier::DevEui => "DevEui",
            Identifier::AppEui => "AppEui",
            Identifier::DevAddr => "DevAddr",
        }
    }
}

impl Key {
    fn token(self) -> &'static str {
        match self {
            Key::NwkSKey => "NwkSKey",
            Key::AppSKey => "AppSKey",
            Key::AppKey => "AppKey",
        }
    }
}

/// AT commands understood by the modem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    Probe,
    Reset,
    Version,
    Band(Band),
    DataRate(DataRate),
    ChannelOff(u8),
    Class(DeviceClass),
    Power(TxPower),
    Adr(Switch),
    Mode(AuthMode),
    Id(Identifier, &'a str),
    Key(Key, &'a str),
    Port(u8),
    MsgHex(&'a str),
    CMsgHex(&'a str),
    Join,
}

impl fmt::Display for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Probe => f.write_str("AT"),
            Command::Reset => f.write_str("AT+RESET"),
            Command::Version => f.write_str("AT+VER"),
            Command::Band(band) => write!(f, "AT+DR={}", band.token()),
            Command::DataRate(dr) => write!(f, "AT+DR={}", dr.token()),
            Command::ChannelOff(channel) => write!(f, "AT+CH={}, 0", channel),
            Command::Class(class) => write!(f, "AT+CLASS={}", class.token()),
            Command::Power(power) => write!(f, "AT+POWER={}", power.dbm()),
            Command::Adr(adr) => write!(f, "AT+ADR={}", adr.token()),
            Command::Mode(mode) => write!(f, "AT+MODE={}", mode.token()),
            Command::Id(id, value) => write!(f, "AT+ID={},\"{}\"", id.token(), value),
            Command::Key(key, value) => write!(f, "AT+KEY={},\"{}\"", key.token(), value),
            Command::Port(port) => write!(f, "AT+PORT={}", port),
            Command::MsgHex(payload) => write!(f, "AT+MSGHEX=\"{}\"", payload),
            Command::CMsgHex(payload) => write!(f, "AT+CMSGHEX=\"{}\"", payload),
            Command::Join => f.write_str("AT+JOIN"),
        }
    }
}

impl<'a> Command<'a> {
    /// Head and payload of a hex uplink. These are streamed to the link in
    /// pieces, so the payload is not bound by [`COMMAND_CAPACITY`].
    pub fn message(&self) -> Option<(&'static str, &'a str)> {
        match *self {
            Command::MsgHex(payload) => Some(("AT+MSGHEX", payload)),
            Command::CMsgHex(payload) => Some(("AT+CMSGHEX", payload)),
            _ => None,
        }
    }

    pub fn render(&self) -> Result<String<COMMAND_CAPACITY>, Error> {
        let mut line = String::new();
        write!(line, "{}", self).map_err(|_| Error::CommandOverflow)?;
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(command: Command<'_>) -> std::string::String {
        command.render().expect("command should fit").as_str().into()
    }

    #[test]
    fn verbatim_tokens() {
        assert_eq!(line(Command::Probe), "AT");
        assert_eq!(line(Command::Reset), "AT+RESET");
        assert_eq!(line(Command::Version), "AT+VER");
        assert_eq!(line(Command::Band(Band::Us915)), "AT+DR=US915");
        assert_eq!(line(Command::DataRate(DataRate::Dr3)), "AT+DR=DR3");
        assert_eq!(line(Command::ChannelOff(17)), "AT+CH=17, 0");
        assert_eq!(line(Command::Class(DeviceClass::A)), "AT+CLASS=A");
        assert_eq!(line(Command::Power(TxPower::Dbm22)), "AT+POWER=22");
        assert_eq!(line(Command::Adr(Switch::Off)), "AT+ADR=OFF");
        assert_eq!(line(Command::Mode(AuthMode::Abp)), "AT+MODE=LWABP");
        assert_eq!(line(Command::Port(8)), "AT+PORT=8");
        assert_eq!(line(Command::Join), "AT+JOIN");
    }

    #[test]
    fn identifiers_and_keys_are_quoted() {
        assert_eq!(line(Command::Id(Identifier::DevEui, "0011223344556677")), "AT+ID=DevEui,\"0011223344556677\"");
        assert_eq!(line(Command::Id(Identifier::AppEui, "70b3")), "AT+ID=AppEui,\"70b3\"");
        assert_eq!(line(Command::Id(Identifier::DevAddr, "26011bda")), "AT+ID=DevAddr,\"26011bda\"");
        assert_eq!(line(Command::Key(Key::NwkSKey, "ab")), "AT+KEY=NwkSKey,\"ab\"");
        assert_eq!(line(Command::Key(Key::AppSKey, "cd")), "AT+KEY=AppSKey,\"cd\"");
        assert_eq!(line(Command::Key(Key::AppKey, "ef")), "AT+KEY=AppKey,\"ef\"");
        assert_eq!(line(Command::MsgHex("0a0b")), "AT+MSGHEX=\"0a0b\"");
        assert_eq!(line(Command::CMsgHex("0a0b")), "AT+CMSGHEX=\"0a0b\"");
    }

    #[test]
    fn malformed_identifiers_are_forwarded_verbatim() {
        assert_eq!(line(Command::Id(Identifier::DevEui, "not hex!")), "AT+ID=DevEui,\"not hex!\"");
    }

    #[test]
    fn oversized_payload_does_not_render_in_one_line() {
        let payload = "ab".repeat(COMMAND_CAPACITY);
        assert_eq!(Command::MsgHex(&payload).render(), Err(Error::CommandOverflow));
        assert_eq!(Command::MsgHex(&payload).message(), Some(("AT+MSGHEX", payload.as_str())));
    }

    #[test]
    fn only_uplinks_carry_a_message() {
        assert_eq!(Command::CMsgHex("0a").message(), Some(("AT+CMSGHEX", "0a")));
        assert_eq!(Command::Port(8).message(), None);
        assert_eq!(Command::Key(Key::AppKey, "ef").message(), None);
    }
}
