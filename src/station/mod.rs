//! Station bookkeeping shared by the sampling loop: what gets measured,
//! how readings are averaged, when the cycle runs and how it is signalled.

use core::ops::RangeInclusive;

pub mod accumulator;
pub mod conversion;
pub mod counter;
pub mod indicator;
pub mod schedule;

pub use accumulator::{Accumulators, RunningAverage};
pub use counter::PulseCounter;
pub use indicator::{Indicator, Rgb};
pub use schedule::{Period, Schedule};

/// Averaged physical quantities of one transmission cycle. Rain is counted,
/// not averaged, and does not appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Quantity {
    AirTemperature,
    AirHumidity,
    SoilTemperature,
    SoilMoisture,
    LeafMoisture,
    /// UV sensor output in millivolts, turned into an index on transmit
    UvVoltage,
    Light,
    /// wind vane output voltage
    WindDirection,
    WindSpeed,
    Pressure,
    DeviceTemperature,
    SupplyVoltage,
}

impl Quantity {
    pub const COUNT: usize = 12;

    pub const ALL: [Quantity; Quantity::COUNT] = [
        Quantity::AirTemperature,
        Quantity::AirHumidity,
        Quantity::SoilTemperature,
        Quantity::SoilMoisture,
        Quantity::LeafMoisture,
        Quantity::UvVoltage,
        Quantity::Light,
        Quantity::WindDirection,
        Quantity::WindSpeed,
        Quantity::Pressure,
        Quantity::DeviceTemperature,
        Quantity::SupplyVoltage,
    ];

    /// Physically plausible readings; anything outside is a sensor fault.
    pub fn range(self) -> RangeInclusive<f32> {
        match self {
            Quantity::AirTemperature => -40.0..=85.0,
            Quantity::AirHumidity => 0.0..=100.0,
            Quantity::SoilTemperature => -40.0..=85.0,
            Quantity::SoilMoisture => 0.0..=100.0,
            Quantity::LeafMoisture => 0.0..=100.0,
            Quantity::UvVoltage => 0.0..=3300.0,
            Quantity::Light => 0.0..=65535.0,
            Quantity::WindDirection => 0.0..=3.3,
            Quantity::WindSpeed => 0.0..=250.0,
            Quantity::Pressure => 300.0..=1100.0,
            Quantity::DeviceTemperature => -40.0..=125.0,
            Quantity::SupplyVoltage => 0.0..=6.0,
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Quantity::AirTemperature | Quantity::SoilTemperature | Quantity::DeviceTemperature => "°C",
            Quantity::AirHumidity => "%RH",
            Quantity::SoilMoisture | Quantity::LeafMoisture => "%",
            Quantity::UvVoltage => "mV",
            Quantity::Light => "lux",
            Quantity::WindDirection | Quantity::SupplyVoltage => "V",
            Quantity::WindSpeed => "km/h",
            Quantity::Pressure => "hPa",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_lists_every_quantity_at_its_index() {
        for (index, quantity) in Quantity::ALL.iter().enumerate() {
            assert_eq!(*quantity as usize, index);
        }
    }

    #[test]
    fn ranges_are_not_empty() {
        for quantity in Quantity::ALL {
            let range = quantity.range();
            assert!(range.start() < range.end(), "{:?}", quantity);
            assert!(!quantity.unit().is_empty());
        }
    }
}
