use ats02::station::conversion::adc_to_millivolts;
use ats02::station::Quantity;
use embassy_rp::adc;
use embassy_rp::gpio::Pull;

use super::{AnalogSensorError, Reading, Sensor};
use crate::UvSensorRes;

/// Analog UV photodiode module, output voltage proportional to UV index.
pub struct UvSensor {
    sig: adc::Channel<'static>,
}

impl UvSensor {
    pub fn new(r: UvSensorRes) -> Self {
        let sig = adc::Channel::new_pin(r.sig, Pull::None);

        Self { sig }
    }
}

impl Sensor<1> for UvSensor {
    type Error = AnalogSensorError;

    async fn on(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn off(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn verify(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn probe(&mut self, adc: &mut adc::Adc<'static, adc::Async>) -> Result<[Reading; 1], Self::Error> {
        let adc_raw = adc.read(&mut self.sig).await?;
        let millivolts = adc_to_millivolts(adc_raw);

        defmt::info!("uv sensor: {=f32} mV ({=u16})", millivolts, adc_raw);

        Ok([(Quantity::UvVoltage, millivolts)])
    }
}
