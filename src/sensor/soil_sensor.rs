use ats02::config::Config;
use ats02::station::conversion::moisture_percent;
use ats02::station::Quantity;
use embassy_rp::adc;
use embassy_time::Timer;
use embedded_hal_async::i2c::I2c;

use super::{BusSensorError, Reading, Sensor};

const STATUS_BASE: u8 = 0x00;
const STATUS_HW_ID: u8 = 0x01;
const STATUS_VERSION: u8 = 0x02;
const STATUS_TEMP: u8 = 0x04;
const TOUCH_BASE: u8 = 0x0f;
const TOUCH_CHANNEL_OFFSET: u8 = 0x10;

const HW_ID: u8 = 0x55;

/// Capacitive soil probe behind a seesaw controller: soil temperature and
/// moisture over the shared I2C1 bus.
pub struct SoilSensor<I> {
    addr: u8,
    bus: I,
}

impl<I: I2c> SoilSensor<I> {
    pub fn new(bus: I) -> Self {
        Self {
            addr: Config::I2C_ADDR_SOIL_SENSOR,
            bus,
        }
    }

    async fn get_temperature(&mut self) -> Result<f32, BusSensorError> {
        let mut buffer = [0u8; 4];

        self.write(STATUS_BASE, STATUS_TEMP).await?;
        Timer::after_millis(1).await;
        self.read(&mut buffer).await?;

        Ok(u32::from_be_bytes(buffer) as f32 / 65536.0)
    }

    async fn get_moisture(&mut self) -> Result<u16, BusSensorError> {
        let mut buffer = [0u8; 2];

        self.write(TOUCH_BASE, TOUCH_CHANNEL_OFFSET).await?;
        Timer::after_millis(5).await;
        self.read(&mut buffer).await?;

        Ok(u16::from_be_bytes(buffer))
    }

    async fn write(&mut self, base_reg: u8, fn_reg: u8) -> Result<(), BusSensorError> {
        self.bus
            .write(self.addr, &[base_reg, fn_reg])
            .await
            .map_err(BusSensorError::from_bus)
    }

    async fn read(&mut self, buffer: &mut [u8]) -> Result<(), BusSensorError> {
        self.bus.read(self.addr, buffer).await.map_err(BusSensorError::from_bus)
    }
}

impl<I: I2c> Sensor<2> for SoilSensor<I> {
    type Error = BusSensorError;

    async fn on(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn off(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn verify(&mut self) -> Result<(), Self::Error> {
        let mut hw_id = [0u8; 1];
        self.write(STATUS_BASE, STATUS_HW_ID).await?;
        self.read(&mut hw_id).await?;

        if hw_id[0] != HW_ID {
            return Err(BusSensorError::Identity(hw_id[0]));
        }

        let mut status = [0u8; 4];
        self.write(STATUS_BASE, STATUS_VERSION).await?;
        self.read(&mut status).await?;

        let status = u32::from_be_bytes(status);
        defmt::debug!(
            "soil sensor: product code {=u16}, manufactured {=u8}/{=u8}/{=u8}",
            (status >> 16) as u16,
            ((status >> 11) & 0x1f) as u8,
            ((status >> 7) & 0xf) as u8,
            (status & 0x3f) as u8,
        );

        Ok(())
    }

    async fn probe(&mut self, _adc: &mut adc::Adc<'static, adc::Async>) -> Result<[Reading; 2], Self::Error> {
        let temp = self.get_temperature().await?;
        let raw = self.get_moisture().await?;
        let moisture = moisture_percent(raw, Config::SOIL_DRY, Config::SOIL_WET);

        defmt::info!("soil sensor: tmp {=f32}°C moist {=f32}% ({=u16})", temp, moisture, raw);

        Ok([(Quantity::SoilTemperature, temp), (Quantity::SoilMoisture, moisture)])
    }
}
