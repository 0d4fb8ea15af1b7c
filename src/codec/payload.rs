use heapless::String;

use super::convert::{float_to_int15, float_to_uint16, Decimals};

pub const PAYLOAD_SIZE: usize = 25;
pub const PAYLOAD_HEX_SIZE: usize = PAYLOAD_SIZE * 2;

/// One transmission worth of averaged readings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurements {
    /// °C
    pub air_temperature: f32,
    /// %RH
    pub air_humidity: f32,
    /// °C
    pub soil_temperature: f32,
    /// %
    pub soil_moisture: f32,
    /// %
    pub leaf_moisture: f32,
    pub uv_index: u8,
    /// lux
    pub light: f32,
    /// wind vane output, V
    pub wind_direction: f32,
    /// km/h
    pub wind_speed: f32,
    /// rain gauge tips since the previous transmission
    pub rain_pulses: u16,
    /// hPa
    pub pressure: f32,
    /// °C
    pub device_temperature: f32,
    /// V
    pub supply_voltage: f32,
}

impl From<&Measurements> for [u8; PAYLOAD_SIZE] {
    fn from(m: &Measurements) -> Self {
        let fields: [u16; 12] = [
            float_to_int15(m.air_temperature, Decimals::Two),
            float_to_uint16(m.air_humidity, Decimals::Two),
            float_to_int15(m.soil_temperature, Decimals::Two),
            float_to_uint16(m.soil_moisture, Decimals::Two),
            float_to_uint16(m.leaf_moisture, Decimals::Two),
            float_to_uint16(m.light, Decimals::Zero),
            float_to_uint16(m.wind_direction, Decimals::Two),
            float_to_uint16(m.wind_speed, Decimals::Two),
            m.rain_pulses,
            float_to_uint16(m.pressure, Decimals::Zero),
            float_to_int15(m.device_temperature, Decimals::Two),
            float_to_uint16(m.supply_voltage, Decimals::Two),
        ];

        let mut buf = [0u8; PAYLOAD_SIZE];
        let mut at = 0;
        for (index, field) in fields.iter().enumerate() {
            // uv index sits between leaf moisture and light
            if index == 5 {
                buf[at] = m.uv_index;
                at += 1;
            }
            buf[at..at + 2].copy_from_slice(&field.to_be_bytes());
            at += 2;
        }

        buf
    }
}

impl Measurements {
    pub fn encode(&self) -> [u8; PAYLOAD_SIZE] {
        self.into()
    }

    /// Payload as the lowercase hex text carried by `AT+MSGHEX`.
    pub fn to_hex(&self) -> String<PAYLOAD_HEX_SIZE> {
        let mut text = [0u8; PAYLOAD_HEX_SIZE];
        let mut hex = String::new();

        if hex::encode_to_slice(self.encode(), &mut text).is_ok() {
            for byte in text {
                let _ = hex.push(char::from(byte));
            }
        }

        hex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Measurements {
        Measurements {
            air_temperature: -12.34,
            air_humidity: 56.78,
            soil_temperature: 18.5,
            soil_moisture: 41.0,
            leaf_moisture: 3.25,
            uv_index: 7,
            light: 1234.0,
            wind_direction: 1.65,
            wind_speed: 12.0,
            rain_pulses: 0x0102,
            pressure: 1013.0,
            device_temperature: 27.1,
            supply_voltage: 4.98,
        }
    }

    #[test]
    fn fields_land_big_endian_in_order() {
        let bytes = sample().encode();

        assert_eq!(bytes.len(), PAYLOAD_SIZE);
        assert_eq!(&bytes[0..2], &(0x8000u16 | 1234).to_be_bytes());
        assert_eq!(&bytes[2..4], &5678u16.to_be_bytes());
        assert_eq!(&bytes[4..6], &1850u16.to_be_bytes());
        assert_eq!(&bytes[6..8], &4100u16.to_be_bytes());
        assert_eq!(&bytes[8..10], &325u16.to_be_bytes());
        assert_eq!(bytes[10], 7);
        assert_eq!(&bytes[11..13], &1234u16.to_be_bytes());
        assert_eq!(&bytes[13..15], &165u16.to_be_bytes());
        assert_eq!(&bytes[15..17], &1200u16.to_be_bytes());
        assert_eq!(&bytes[17..19], &[0x01, 0x02]);
        assert_eq!(&bytes[19..21], &1013u16.to_be_bytes());
        assert_eq!(&bytes[21..23], &2710u16.to_be_bytes());
        assert_eq!(&bytes[23..25], &498u16.to_be_bytes());
    }

    #[test]
    fn hex_text_is_two_digits_per_byte() {
        let hex = sample().to_hex();

        assert_eq!(hex.len(), PAYLOAD_HEX_SIZE);
        assert!(hex.starts_with("84d2162e"));
        assert_eq!(&hex[20..22], "07");
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn empty_cycle_encodes_zeros() {
        assert_eq!(Measurements::default().encode(), [0u8; PAYLOAD_SIZE]);
    }
}
