use super::conversion::uv_index;
use super::Quantity;
use crate::codec::Measurements;
use crate::error::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunningAverage {
    sum: f32,
    count: u16,
}

impl RunningAverage {
    pub const EMPTY: RunningAverage = RunningAverage { sum: 0.0, count: 0 };

    pub fn add(&mut self, value: f32) {
        self.sum += value;
        self.count = self.count.saturating_add(1);
    }

    pub fn count(&self) -> u16 {
        self.count
    }

    pub fn mean(&self) -> Option<f32> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / f32::from(self.count))
        }
    }
}

/// Per-quantity running averages of one transmission cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulators {
    averages: [RunningAverage; Quantity::COUNT],
}

impl Default for Accumulators {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulators {
    pub const fn new() -> Self {
        Self {
            averages: [RunningAverage::EMPTY; Quantity::COUNT],
        }
    }

    /// Add `value` to the average of `quantity`. NaN and implausible values
    /// are rejected and leave the average untouched.
    pub fn record(&mut self, quantity: Quantity, value: f32) -> Result<(), Error> {
        if value.is_nan() || !quantity.range().contains(&value) {
            warn!("accumulator: rejected {} for {}", value, quantity);
            return Err(Error::InvalidReading(quantity));
        }

        self.averages[quantity as usize].add(value);
        Ok(())
    }

    pub fn average(&self, quantity: Quantity) -> Option<f32> {
        self.averages[quantity as usize].mean()
    }

    pub fn count(&self, quantity: Quantity) -> u16 {
        self.averages[quantity as usize].count()
    }

    /// Averages ready for encoding; quantities without a single valid sample
    /// are sent as zero.
    pub fn snapshot(&self, rain_pulses: u16) -> Measurements {
        let mean = |quantity| self.average(quantity).unwrap_or(0.0);

        Measurements {
            air_temperature: mean(Quantity::AirTemperature),
            air_humidity: mean(Quantity::AirHumidity),
            soil_temperature: mean(Quantity::SoilTemperature),
            soil_moisture: mean(Quantity::SoilMoisture),
            leaf_moisture: mean(Quantity::LeafMoisture),
            uv_index: self
                .average(Quantity::UvVoltage)
                .map(|millivolts| uv_index(millivolts as u16))
                .unwrap_or(0),
            light: mean(Quantity::Light),
            wind_direction: mean(Quantity::WindDirection),
            wind_speed: mean(Quantity::WindSpeed),
            rain_pulses,
            pressure: mean(Quantity::Pressure),
            device_temperature: mean(Quantity::DeviceTemperature),
            supply_voltage: mean(Quantity::SupplyVoltage),
        }
    }

    pub fn reset(&mut self) {
        self.averages = [RunningAverage::EMPTY; Quantity::COUNT];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_only_accepted_samples() {
        let mut acc = Accumulators::new();

        acc.record(Quantity::AirTemperature, 20.0).unwrap();
        acc.record(Quantity::AirTemperature, 22.0).unwrap();
        assert_eq!(
            acc.record(Quantity::AirTemperature, f32::NAN),
            Err(Error::InvalidReading(Quantity::AirTemperature))
        );
        assert_eq!(
            acc.record(Quantity::AirTemperature, 150.0),
            Err(Error::InvalidReading(Quantity::AirTemperature))
        );

        assert_eq!(acc.count(Quantity::AirTemperature), 2);
        assert_eq!(acc.average(Quantity::AirTemperature), Some(21.0));
    }

    #[test]
    fn missing_quantities_snapshot_as_zero() {
        let mut acc = Accumulators::new();
        acc.record(Quantity::Pressure, 1000.0).unwrap();
        acc.record(Quantity::Pressure, 1010.0).unwrap();

        let m = acc.snapshot(7);
        assert_eq!(m.pressure, 1005.0);
        assert_eq!(m.rain_pulses, 7);
        assert_eq!(m.air_humidity, 0.0);
        assert_eq!(m.uv_index, 0);
    }

    #[test]
    fn uv_average_becomes_an_index() {
        let mut acc = Accumulators::new();
        acc.record(Quantity::UvVoltage, 400.0).unwrap();
        acc.record(Quantity::UvVoltage, 420.0).unwrap();

        assert_eq!(acc.snapshot(0).uv_index, 3);
    }

    #[test]
    fn reset_clears_everything() {
        let mut acc = Accumulators::new();
        for quantity in Quantity::ALL {
            let value = *quantity.range().start();
            acc.record(quantity, value).unwrap();
        }

        acc.reset();

        for quantity in Quantity::ALL {
            assert_eq!(acc.count(quantity), 0);
            assert_eq!(acc.average(quantity), None);
        }
        assert_eq!(acc, Accumulators::default());
    }
}
