use crate::error::{Error, Setting};

/// Regional frequency plan, sent through `AT+DR=<band>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Band {
    Eu868,
    Us915,
    Au920,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceClass {
    A,
    B,
    C,
}

/// Transmit power, 30 dBm down to 10 dBm in 2 dBm steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxPower {
    Dbm30,
    Dbm28,
    Dbm26,
    Dbm24,
    Dbm22,
    Dbm20,
    Dbm18,
    Dbm16,
    Dbm14,
    Dbm12,
    Dbm10,
}

/// Uplink data rate. The spreading factor and bandwidth behind each index
/// depend on the band, e.g. DR0 is SF12/125kHz on EU868 but SF10/125kHz on
/// US915/AU920.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataRate {
    Dr0,
    Dr1,
    Dr2,
    Dr3,
    Dr4,
    Dr5,
    Dr6,
    Dr7,
    Dr8,
    Dr9,
    Dr10,
    Dr11,
    Dr12,
    Dr13,
    Dr14,
    Dr15,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Switch {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AuthMode {
    /// Activation by personalisation
    Abp,
    /// Over the air activation
    Otaa,
    Test,
}

const BANDS: [Band; 3] = [Band::Eu868, Band::Us915, Band::Au920];
const BAND_TOKENS: [&str; 3] = ["EU868", "US915", "AU920"];

const CLASSES: [DeviceClass; 3] = [DeviceClass::A, DeviceClass::B, DeviceClass::C];

const TX_POWERS: [TxPower; 11] = [
    TxPower::Dbm30,
    TxPower::Dbm28,
    TxPower::Dbm26,
    TxPower::Dbm24,
    TxPower::Dbm22,
    TxPower::Dbm20,
    TxPower::Dbm18,
    TxPower::Dbm16,
    TxPower::Dbm14,
    TxPower::Dbm12,
    TxPower::Dbm10,
];

const DATA_RATES: [DataRate; 16] = [
    DataRate::Dr0,
    DataRate::Dr1,
    DataRate::Dr2,
    DataRate::Dr3,
    DataRate::Dr4,
    DataRate::Dr5,
    DataRate::Dr6,
    DataRate::Dr7,
    DataRate::Dr8,
    DataRate::Dr9,
    DataRate::Dr10,
    DataRate::Dr11,
    DataRate::Dr12,
    DataRate::Dr13,
    DataRate::Dr14,
    DataRate::Dr15,
];
const DATA_RATE_TOKENS: [&str; 16] = [
    "DR0", "DR1", "DR2", "DR3", "DR4", "DR5", "DR6", "DR7", "DR8", "DR9", "DR10", "DR11", "DR12", "DR13", "DR14", "DR15",
];

const AUTH_MODES: [AuthMode; 3] = [AuthMode::Abp, AuthMode::Otaa, AuthMode::Test];

fn lookup<T: Copy>(table: &[T], setting: Setting, value: u8) -> Result<T, Error> {
    table
        .get(usize::from(value))
        .copied()
        .ok_or(Error::Unmapped { setting, value })
}

impl Band {
    pub fn token(self) -> &'static str {
        BAND_TOKENS[self as usize]
    }
}

impl DeviceClass {
    pub fn token(self) -> &'static str {
        match self {
            DeviceClass::A => "A",
            DeviceClass::B => "B",
            DeviceClass::C => "C",
        }
    }
}

impl TxPower {
    pub fn dbm(self) -> u8 {
        30 - 2 * self as u8
    }
}

impl DataRate {
    pub fn token(self) -> &'static str {
        DATA_RATE_TOKENS[self as usize]
    }
}

impl Switch {
    pub fn token(self) -> &'static str {
        match self {
            Switch::On => "ON",
            Switch::Off => "OFF",
        }
    }
}

impl From<bool> for Switch {
    fn from(value: bool) -> Self {
        if value {
            Switch::On
        } else {
            Switch::Off
        }
    }
}

impl AuthMode {
    pub fn token(self) -> &'static str {
        match self {
            AuthMode::Abp => "LWABP",
            AuthMode::Otaa => "LWOTAA",
            AuthMode::Test => "LWTEST",
        }
    }
}

impl TryFrom<u8> for Band {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        lookup(&BANDS, Setting::Band, value)
    }
}

impl TryFrom<u8> for DeviceClass {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        lookup(&CLASSES, Setting::Class, value)
    }
}

impl TryFrom<u8> for TxPower {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        lookup(&TX_POWERS, Setting::TxPower, value)
    }
}

impl TryFrom<u8> for DataRate {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        lookup(&DATA_RATES, Setting::DataRate, value)
    }
}

impl TryFrom<u8> for Switch {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        lookup(&[Switch::On, Switch::Off], Setting::Switch, value)
    }
}

impl TryFrom<u8> for AuthMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        lookup(&AUTH_MODES, Setting::AuthMode, value)
    }
}

/// Modem session settings. Identifiers and keys are hex strings forwarded to
/// the modem as they are, nothing checks their length or alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoRaConfig<'a> {
    pub band: Band,
    /// 1 and 2 mask the channel plan, anything else leaves it untouched
    pub sub_band: u8,
    pub class: DeviceClass,
    pub tx_power: TxPower,
    pub uplink_dr: DataRate,
    pub adr: Switch,
    pub auth_mode: AuthMode,
    pub dev_eui: &'a str,
    pub app_eui: &'a str,
    pub dev_addr: &'a str,
    pub app_key: &'a str,
    pub nwk_s_key: &'a str,
    pub app_s_key: &'a str,
    /// Mirror commands and raw replies to the debug log.
    pub debug: bool,
    /// Upper bound for the wait on a `Done` marker. `None` waits forever.
    pub tx_deadline_ms: Option<u32>,
}

impl<'a> LoRaConfig<'a> {
    pub const fn new(band: Band) -> Self {
        Self {
            band,
            sub_band: 0,
            class: DeviceClass::A,
            tx_power: TxPower::Dbm14,
            uplink_dr: DataRate::Dr0,
            adr: Switch::Off,
            auth_mode: AuthMode::Abp,
            dev_eui: "",
            app_eui: "",
            dev_addr: "",
            app_key: "",
            nwk_s_key: "",
            app_s_key: "",
            debug: false,
            tx_deadline_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_steps_down_by_two() {
        assert_eq!(TxPower::Dbm30.dbm(), 30);
        assert_eq!(TxPower::Dbm20.dbm(), 20);
        assert_eq!(TxPower::Dbm10.dbm(), 10);
        for (index, power) in TX_POWERS.iter().enumerate() {
            assert_eq!(power.dbm() as usize, 30 - 2 * index);
        }
    }

    #[test]
    fn tokens() {
        assert_eq!(Band::Au920.token(), "AU920");
        assert_eq!(DataRate::Dr0.token(), "DR0");
        assert_eq!(DataRate::Dr15.token(), "DR15");
        assert_eq!(DeviceClass::C.token(), "C");
        assert_eq!(Switch::from(true).token(), "ON");
        assert_eq!(AuthMode::Otaa.token(), "LWOTAA");
    }

    #[test]
    fn raw_values_outside_the_tables_are_rejected() {
        assert_eq!(Band::try_from(1), Ok(Band::Us915));
        assert_eq!(DataRate::try_from(15), Ok(DataRate::Dr15));
        assert_eq!(TxPower::try_from(10), Ok(TxPower::Dbm10));
        assert_eq!(
            DeviceClass::try_from(3),
            Err(Error::Unmapped {
                setting: Setting::Class,
                value: 3
            })
        );
        assert_eq!(
            DataRate::try_from(16),
            Err(Error::Unmapped {
                setting: Setting::DataRate,
                value: 16
            })
        );
        assert!(AuthMode::try_from(200).is_err());
        assert!(Switch::try_from(2).is_err());
        assert!(TxPower::try_from(11).is_err());
    }
}
