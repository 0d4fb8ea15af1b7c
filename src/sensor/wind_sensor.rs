use ats02::station::conversion::{adc_to_volts, wind_speed_kmh};
use ats02::station::{PulseCounter, Quantity};
use embassy_rp::adc;
use embassy_rp::gpio::Pull;
use embassy_time::Instant;

use super::{AnalogSensorError, Reading, Sensor};
use crate::WindSensorRes;

/// Wind vane on the ADC plus the anemometer, whose pulses are counted by a
/// separate task.
pub struct WindSensor {
    vane: adc::Channel<'static>,
    anemometer: &'static PulseCounter,
    last_probe: Instant,
}

impl WindSensor {
    pub fn new(r: WindSensorRes, anemometer: &'static PulseCounter) -> Self {
        let vane = adc::Channel::new_pin(r.vane, Pull::None);

        Self {
            vane,
            anemometer,
            last_probe: Instant::now(),
        }
    }
}

impl Sensor<2> for WindSensor {
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

    async fn probe(&mut self, adc: &mut adc::Adc<'static, adc::Async>) -> Result<[Reading; 2], Self::Error> {
        let now = Instant::now();
        let pulses = self.anemometer.take();
        let interval_ms = now.duration_since(self.last_probe).as_millis() as u32;
        self.last_probe = now;

        let speed = wind_speed_kmh(pulses, interval_ms);
        let adc_raw = adc.read(&mut self.vane).await?;
        let direction = adc_to_volts(adc_raw);

        defmt::info!(
            "wind sensor: {=f32} km/h ({=u32} pulses in {=u32} ms) vane {=f32}V",
            speed,
            pulses,
            interval_ms,
            direction
        );

        Ok([(Quantity::WindSpeed, speed), (Quantity::WindDirection, direction)])
    }
}
