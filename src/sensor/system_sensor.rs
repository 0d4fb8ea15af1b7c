use ats02::station::conversion::{chip_temperature, vsys_voltage};
use ats02::station::Quantity;
use embassy_rp::adc;
use embassy_rp::gpio::{Input, Pull};

use super::{AnalogSensorError, Reading, Sensor};
use crate::SystemRes;

/// RP2040 die temperature and the VSYS rail, with the USB sense pin telling
/// where the power comes from.
pub struct SystemSensor {
    die_temp: adc::Channel<'static>,
    vsys: adc::Channel<'static>,
    usb_sense: Input<'static>,
}

#[derive(defmt::Format)]
pub enum PowerSource {
    Supply,
    Usb,
}

impl SystemSensor {
    pub fn new(r: SystemRes) -> Self {
        Self {
            die_temp: adc::Channel::new_temp_sensor(r.adc_tmp),
            vsys: adc::Channel::new_pin(r.vsys, Pull::None),
            usb_sense: Input::new(r.usb, Pull::None),
        }
    }

    fn power_source(&self) -> PowerSource {
        match self.usb_sense.is_high() {
            true => PowerSource::Usb,
            false => PowerSource::Supply,
        }
    }
}

impl Sensor<2> for SystemSensor {
    type Error = AnalogSensorError;

    async fn on(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn off(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn verify(&mut self) -> Result<(), Self::Error> {
        defmt::info!("system sensor: powered from {}", self.power_source());
        Ok(())
    }

    async fn probe(&mut self, adc: &mut adc::Adc<'static, adc::Async>) -> Result<[Reading; 2], Self::Error> {
        let temp_raw = adc.read(&mut self.die_temp).await?;
        let vsys_raw = adc.read(&mut self.vsys).await?;
        let temp = chip_temperature(temp_raw);
        let vsys = vsys_voltage(vsys_raw);

        defmt::debug!("system sensor: raw tmp {=u16} vsys {=u16}", temp_raw, vsys_raw);
        defmt::info!("system sensor: tmp {=f32}°C vsys {=f32}V", temp, vsys);

        Ok([(Quantity::DeviceTemperature, temp), (Quantity::SupplyVoltage, vsys)])
    }
}
