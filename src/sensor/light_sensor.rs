use ats02::config::Config;
use ats02::station::Quantity;
use embassy_rp::adc;
use embassy_time::Timer;
use embedded_hal_async::i2c::I2c;

use super::{BusSensorError, Reading, Sensor};

const POWER_DOWN: u8 = 0x00;
const POWER_ON: u8 = 0x01;
const ONE_TIME_HIGH_RES: u8 = 0x20;

/// Counts per lux in high resolution mode.
const COUNTS_PER_LUX: f32 = 1.2;

/// BH1750 ambient light sensor on the shared I2C1 bus.
pub struct LightSensor<I> {
    addr: u8,
    bus: I,
}

impl<I: I2c> LightSensor<I> {
    pub fn new(bus: I) -> Self {
        Self {
            addr: Config::I2C_ADDR_LIGHT_SENSOR,
            bus,
        }
    }

    async fn command(&mut self, opcode: u8) -> Result<(), BusSensorError> {
        self.bus.write(self.addr, &[opcode]).await.map_err(BusSensorError::from_bus)
    }
}

impl<I: I2c> Sensor<1> for LightSensor<I> {
    type Error = BusSensorError;

    async fn on(&mut self) -> Result<(), Self::Error> {
        self.command(POWER_ON).await
    }

    async fn off(&mut self) -> Result<(), Self::Error> {
        self.command(POWER_DOWN).await
    }

    async fn verify(&mut self) -> Result<(), Self::Error> {
        // no id register, an acknowledged power on has to do
        self.command(POWER_ON).await
    }

    async fn probe(&mut self, _adc: &mut adc::Adc<'static, adc::Async>) -> Result<[Reading; 1], Self::Error> {
        // one time measurements power the sensor down afterwards
        self.command(ONE_TIME_HIGH_RES).await?;
        Timer::after_millis(180).await;

        let mut buffer = [0u8; 2];
        self.bus
            .read(self.addr, &mut buffer)
            .await
            .map_err(BusSensorError::from_bus)?;

        let lux = u16::from_be_bytes(buffer) as f32 / COUNTS_PER_LUX;

        defmt::info!("light sensor: {=f32} lux", lux);

        Ok([(Quantity::Light, lux)])
    }
}
