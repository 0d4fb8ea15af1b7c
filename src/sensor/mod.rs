use ats02::station::Quantity;
use embassy_rp::adc::{self, Async};
use embedded_hal_1::i2c::{self, Error as _};

pub mod air_sensor;
pub mod leaf_sensor;
pub mod light_sensor;
pub mod pressure_sensor;
pub mod soil_sensor;
pub mod system_sensor;
pub mod uv_sensor;
pub mod wind_sensor;

/// One measured value tagged with what it measures.
pub type Reading = (Quantity, f32);

/// Trait to describe generic functionality of a sensor.
/// Probing gathers `N` readings from the environment, power can be switched
/// around it where the hardware allows.
///
/// For example the leaf wetness grid should be turned off after probing,
/// otherwise constant current accelerates electrolysis of its traces.
pub trait Sensor<const N: usize> {
    /// Error type representation, left up to the implementor
    type Error;

    async fn on(&mut self) -> Result<(), Self::Error>;

    async fn off(&mut self) -> Result<(), Self::Error>;

    /// Check the device answers and is the expected part
    async fn verify(&mut self) -> Result<(), Self::Error>;

    async fn probe(&mut self, adc: &mut adc::Adc<'static, Async>) -> Result<[Reading; N], Self::Error>;
}

/// Errors of the sensors sitting on an I2C bus.
#[derive(defmt::Format)]
pub enum BusSensorError {
    I2c(i2c::ErrorKind),
    /// unexpected chip or hardware id
    Identity(u8),
    Crc,
}

impl BusSensorError {
    pub fn from_bus<E: i2c::Error>(err: E) -> Self {
        Self::I2c(err.kind())
    }
}

/// Errors of the sensors read through the ADC.
#[derive(defmt::Format)]
pub enum AnalogSensorError {
    Adc(adc::Error),
}

impl From<adc::Error> for AnalogSensorError {
    fn from(value: adc::Error) -> Self {
        Self::Adc(value)
    }
}
