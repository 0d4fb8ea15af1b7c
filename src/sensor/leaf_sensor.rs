use ats02::config::Config;
use ats02::station::conversion::moisture_percent;
use ats02::station::Quantity;
use embassy_rp::adc;
use embassy_rp::gpio::{self, Level, Pull};
use embassy_time::Timer;

use super::{AnalogSensorError, Reading, Sensor};
use crate::LeafSensorRes;

/// Resistive leaf wetness grid, powered from a GPIO only while probing.
pub struct LeafSensor {
    pwr: gpio::Output<'static>,
    sig: adc::Channel<'static>,
}

impl LeafSensor {
    pub fn new(r: LeafSensorRes) -> Self {
        let pwr = gpio::Output::new(r.pwr, Level::Low);
        let sig = adc::Channel::new_pin(r.sig, Pull::None);

        Self { pwr, sig }
    }
}

impl Sensor<1> for LeafSensor {
    type Error = AnalogSensorError;

    async fn on(&mut self) -> Result<(), Self::Error> {
        if self.pwr.is_set_low() {
            self.pwr.set_high();
            // let the divider settle
            Timer::after_millis(10).await;
        }

        Ok(())
    }

    async fn off(&mut self) -> Result<(), Self::Error> {
        if self.pwr.is_set_high() {
            self.pwr.set_low();
        }

        Ok(())
    }

    async fn verify(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn probe(&mut self, adc: &mut adc::Adc<'static, adc::Async>) -> Result<[Reading; 1], Self::Error> {
        let adc_raw = adc.read(&mut self.sig).await?;
        let wetness = moisture_percent(adc_raw, Config::LEAF_DRY, Config::LEAF_WET);

        defmt::info!("leaf sensor: wet {=f32}% ({=u16})", wetness, adc_raw);

        Ok([(Quantity::LeafMoisture, wetness)])
    }
}
