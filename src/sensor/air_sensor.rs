use ats02::config::Config;
use ats02::station::Quantity;
use embassy_rp::adc;
use embassy_rp::i2c::{self, Async};
use embassy_rp::peripherals::I2C0;
use embassy_time::Timer;

use super::{BusSensorError, Reading, Sensor};
use crate::{AirSensorRes, Irqs};

const SERIAL_NUMBER_COMMAND: u16 = 0x3682;
const READ_MEASUREMENT_COMMAND: u16 = 0xec05;
const MEASURE_SINGLE_SHOT_COMMAND: u16 = 0x219d;
const POWER_DOWN: u16 = 0x36e0;
const WAKE_UP: u16 = 0x36f6;

const CRC8_POLYNOMIAL: u8 = 0x31;
const CRC8_INIT: u8 = 0xff;

/// Sensirion CRC over one 16 bit word.
fn crc8(data: &[u8]) -> u8 {
    let mut crc = CRC8_INIT;
    for byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ CRC8_POLYNOMIAL } else { crc << 1 };
        }
    }
    crc
}

/// Splits a `word, crc, word, crc, ...` response into words.
fn words<const W: usize>(buffer: &[u8]) -> Result<[u16; W], BusSensorError> {
    let mut words = [0u16; W];
    for (word, chunk) in words.iter_mut().zip(buffer.chunks_exact(3)) {
        if crc8(&chunk[..2]) != chunk[2] {
            return Err(BusSensorError::Crc);
        }
        *word = u16::from_be_bytes([chunk[0], chunk[1]]);
    }
    Ok(words)
}

/// SCD4x CO2, temperature and humidity sensor, alone on I2C0.
pub struct AirSensor {
    adr: u16,
    bus: i2c::I2c<'static, I2C0, Async>,
    powered: bool,
}

impl AirSensor {
    pub fn new(r: AirSensorRes) -> Self {
        let i2c_0_bus = i2c::I2c::new_async(r.i2c0, r.scl, r.sda, Irqs, i2c::Config::default());

        Self {
            adr: Config::I2C_ADDR_AIR_SENSOR,
            bus: i2c_0_bus,
            powered: true,
        }
    }

    async fn write(&mut self, command: u16) -> Result<(), BusSensorError> {
        self.bus
            .write_async(self.adr, command.to_be_bytes())
            .await
            .map_err(BusSensorError::from_bus)
    }

    async fn read(&mut self, buffer: &mut [u8]) -> Result<(), BusSensorError> {
        self.bus.read_async(self.adr, buffer).await.map_err(BusSensorError::from_bus)
    }
}

impl Sensor<2> for AirSensor {
    type Error = BusSensorError;

    async fn on(&mut self) -> Result<(), Self::Error> {
        if self.powered {
            return Ok(());
        }

        // the sensor does not acknowledge the wake up command
        let _ = self.write(WAKE_UP).await;
        Timer::after_millis(30).await;
        self.powered = true;

        Ok(())
    }

    async fn off(&mut self) -> Result<(), Self::Error> {
        if !self.powered {
            return Ok(());
        }

        self.write(POWER_DOWN).await?;
        Timer::after_millis(1).await;
        self.powered = false;

        Ok(())
    }

    async fn verify(&mut self) -> Result<(), Self::Error> {
        let mut buffer = [0u8; 9];

        self.write(SERIAL_NUMBER_COMMAND).await?;
        Timer::after_millis(1).await;
        self.read(&mut buffer).await?;

        let [word0, word1, word2] = words::<3>(&buffer)?;
        let serial_number: u64 = (u64::from(word0) << 32) | (u64::from(word1) << 16) | u64::from(word2);

        defmt::debug!("air sensor: serial number {=u64}", serial_number);

        Ok(())
    }

    async fn probe(&mut self, _adc: &mut adc::Adc<'static, adc::Async>) -> Result<[Reading; 2], Self::Error> {
        self.write(MEASURE_SINGLE_SHOT_COMMAND).await?;
        Timer::after_millis(5000).await;

        self.write(READ_MEASUREMENT_COMMAND).await?;
        Timer::after_millis(1).await;

        let mut buffer = [0u8; 9];
        self.read(&mut buffer).await?;

        let [co2, raw_temp, raw_hum] = words::<3>(&buffer)?;
        let temp = raw_temp as f32 * 175.0 / (u16::MAX as f32) - 45.0;
        let hum = raw_hum as f32 * 100.0 / (u16::MAX as f32);

        defmt::info!("air sensor: tmp {=f32}°C hum {=f32}% co2 {=u16}ppm", temp, hum, co2);

        Ok([(Quantity::AirTemperature, temp), (Quantity::AirHumidity, hum)])
    }
}

