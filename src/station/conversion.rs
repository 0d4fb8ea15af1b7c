//! Raw sensor values to physical units.

/// RP2040 ADC reference voltage.
pub const ADC_REFERENCE_V: f32 = 3.3;
/// 12 bit converter.
pub const ADC_STEPS: f32 = 4096.0;

/// VSYS reaches the ADC through a 1:3 divider.
const VSYS_DIVIDER: f32 = 3.0;

/// Anemometer: one pulse per second is 2.4 km/h.
const WIND_KMH_PER_HZ: f32 = 2.4;

/// Upper bounds (mV, exclusive) of UV index 0 to 10. Anything above the last
/// entry is index 11.
const UV_INDEX_THRESHOLDS_MV: [u16; 11] = [227, 318, 408, 503, 606, 696, 795, 881, 976, 1079, 1170];

pub fn adc_to_volts(raw: u16) -> f32 {
    f32::from(raw) * ADC_REFERENCE_V / ADC_STEPS
}

pub fn adc_to_millivolts(raw: u16) -> f32 {
    adc_to_volts(raw) * 1000.0
}

/// Die temperature from the internal sensor, rounded to one decimal.
pub fn chip_temperature(raw: u16) -> f32 {
    let temp = 27.0 - (adc_to_volts(raw) - 0.706) / 0.001721;
    let sign = if temp < 0.0 { -1.0 } else { 1.0 };
    let rounded_x10 = ((temp * 10.0) + 0.5 * sign) as i16;

    f32::from(rounded_x10) / 10.0
}

pub fn vsys_voltage(raw: u16) -> f32 {
    adc_to_volts(raw) * VSYS_DIVIDER
}

pub fn uv_index(millivolts: u16) -> u8 {
    UV_INDEX_THRESHOLDS_MV
        .iter()
        .position(|threshold| millivolts < *threshold)
        .unwrap_or(UV_INDEX_THRESHOLDS_MV.len()) as u8
}

/// Average wind speed over `interval_ms` from anemometer pulses.
pub fn wind_speed_kmh(pulses: u32, interval_ms: u32) -> f32 {
    if interval_ms == 0 {
        return 0.0;
    }

    let hz = pulses as f32 * 1000.0 / interval_ms as f32;
    hz * WIND_KMH_PER_HZ
}

/// Linear moisture between the calibration points `dry` (0 %) and `wet`
/// (100 %), clamped. Works for sensors whose reading falls with moisture too.
pub fn moisture_percent(raw: u16, dry: u16, wet: u16) -> f32 {
    if dry == wet {
        return 0.0;
    }

    let span = f32::from(wet) - f32::from(dry);
    let percent = (f32::from(raw) - f32::from(dry)) / span * 100.0;
    percent.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn uv_index_steps() {
        assert_eq!(uv_index(0), 0);
        assert_eq!(uv_index(226), 0);
        assert_eq!(uv_index(227), 1);
        assert_eq!(uv_index(317), 1);
        assert_eq!(uv_index(318), 2);
        assert_eq!(uv_index(1169), 10);
        assert_eq!(uv_index(1170), 11);
        assert_eq!(uv_index(u16::MAX), 11);
    }

    #[test]
    fn adc_scaling() {
        assert_eq!(adc_to_volts(0), 0.0);
        assert!(close(adc_to_volts(4096), 3.3));
        assert!(close(adc_to_millivolts(2048), 1650.0));
        assert!(close(vsys_voltage(2048), 4.95));
    }

    #[test]
    fn die_temperature_near_reference_point() {
        // 0.706 V is 27 °C
        let raw = (0.706 * ADC_STEPS / ADC_REFERENCE_V) as u16;
        assert!((chip_temperature(raw) - 27.0).abs() < 1.0);
    }

    #[test]
    fn wind_from_pulses() {
        assert!(close(wind_speed_kmh(10, 10_000), 2.4));
        assert!(close(wind_speed_kmh(50, 10_000), 12.0));
        assert_eq!(wind_speed_kmh(5, 0), 0.0);
    }

    #[test]
    fn moisture_is_clamped_either_direction() {
        assert!(close(moisture_percent(200, 200, 2000), 0.0));
        assert!(close(moisture_percent(1100, 200, 2000), 50.0));
        assert!(close(moisture_percent(3000, 200, 2000), 100.0));
        // resistive probes read lower when wet
        assert!(close(moisture_percent(4095, 4095, 1000), 0.0));
        assert!(close(moisture_percent(500, 4095, 1000), 100.0));
        assert_eq!(moisture_percent(10, 7, 7), 0.0);
    }
}
