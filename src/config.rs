//! Compile-time station configuration.
//!
//! LoRaWAN identifiers and keys are read from the build environment
//! (`ATS02_DEV_EUI`, `ATS02_APP_EUI`, `ATS02_DEV_ADDR`, `ATS02_APP_KEY`,
//! `ATS02_NWK_S_KEY`, `ATS02_APP_S_KEY`) and fall back to zeroes.

use crate::modem::{AuthMode, Band, DataRate, DeviceClass, LoRaConfig, Switch, TxPower};

macro_rules! env_or {
    ($name:literal, $default:literal) => {
        match option_env!($name) {
            Some(value) => value,
            None => $default,
        }
    };
}

pub struct Config;

impl Config {
    pub const SYSTEM_PERIOD_MS: u32 = 1_000;
    pub const SAMPLING_PERIOD_MS: u32 = 10_000;
    pub const TX_PERIOD_MS: u32 = 50_000;
    /// Tick of the orchestrator, the schedule decides what is due.
    pub const POLL_PERIOD_MS: u64 = 100;
    /// Wait before provisioning is attempted again after a failure.
    pub const PROVISION_RETRY_SECS: u64 = 60;
    pub const PROVISION_ATTEMPTS: u8 = 5;

    pub const FW_VERSION: &'static str = env!("CARGO_PKG_VERSION");
    pub const HW_VERSION: &'static str = "0.1.0";
    pub const MCU_BOARD: &'static str = "RP2040";
    pub const COMM_IF: &'static str = "LoRaWAN - RHF76-052";
    pub const SENSOR_LIST: &'static str = "SCD4x | STEMMA soil | BH1750 | BMP280 | GUVA-S12SD | leaf wetness | wind vane | anemometer | rain gauge";

    pub const I2C_ADDR_AIR_SENSOR: u16 = 0x62;
    pub const I2C_ADDR_SOIL_SENSOR: u8 = 0x36;
    pub const I2C_ADDR_LIGHT_SENSOR: u8 = 0x23;
    pub const I2C_ADDR_PRESSURE_SENSOR: u8 = 0x76;

    pub const RGB_COMMON_ANODE: bool = true;

    /// Calibration of the capacitive soil probe, raw counts.
    pub const SOIL_DRY: u16 = 200;
    pub const SOIL_WET: u16 = 2000;
    /// Calibration of the resistive leaf wetness sensor, ADC counts.
    pub const LEAF_DRY: u16 = 4095;
    pub const LEAF_WET: u16 = 1000;

    pub const LORA_PORT: u8 = 8;
    pub const LORA_BAND: Band = Band::Au920;
    pub const LORA_SUB_BAND: u8 = 2;
    pub const LORA_DEBUG: bool = true;

    pub const DEV_EUI: &'static str = env_or!("ATS02_DEV_EUI", "0000000000000000");
    pub const APP_EUI: &'static str = env_or!("ATS02_APP_EUI", "0000000000000000");
    pub const DEV_ADDR: &'static str = env_or!("ATS02_DEV_ADDR", "00000000");
    pub const APP_KEY: &'static str = env_or!("ATS02_APP_KEY", "00000000000000000000000000000000");
    pub const NWK_S_KEY: &'static str = env_or!("ATS02_NWK_S_KEY", "00000000000000000000000000000000");
    pub const APP_S_KEY: &'static str = env_or!("ATS02_APP_S_KEY", "00000000000000000000000000000000");

    pub const fn lora() -> LoRaConfig<'static> {
        LoRaConfig {
            sub_band: Self::LORA_SUB_BAND,
            class: DeviceClass::A,
            tx_power: TxPower::Dbm14,
            uplink_dr: DataRate::Dr2,
            adr: Switch::Off,
            auth_mode: AuthMode::Abp,
            dev_eui: Self::DEV_EUI,
            app_eui: Self::APP_EUI,
            dev_addr: Self::DEV_ADDR,
            app_key: Self::APP_KEY,
            nwk_s_key: Self::NWK_S_KEY,
            app_s_key: Self::APP_S_KEY,
            debug: Self::LORA_DEBUG,
            ..LoRaConfig::new(Self::LORA_BAND)
        }
    }
}
