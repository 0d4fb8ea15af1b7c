//! Fixed-point and hexadecimal helpers used to pack measurements.

use core::fmt::Write;

use heapless::String;

use crate::error::{Error, Setting};

pub const SIGN_BIT: u16 = 0x8000;
pub const MAGNITUDE_MASK: u16 = 0x7fff;

/// Decimal digits kept when a reading is scaled to an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Decimals {
    Zero,
    One,
    Two,
}

impl Decimals {
    const fn scale(self) -> f32 {
        match self {
            Decimals::Zero => 1.0,
            Decimals::One => 10.0,
            Decimals::Two => 100.0,
        }
    }
}

impl TryFrom<u8> for Decimals {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Decimals::Zero),
            1 => Ok(Decimals::One),
            2 => Ok(Decimals::Two),
            _ => Err(Error::Unmapped {
                setting: Setting::Decimals,
                value,
            }),
        }
    }
}

// Scaled values are rounded to the nearest integer; plain truncation turns
// 655.35 into 65534 because of the binary representation of the float.
fn scaled_magnitude(value: f32, decimals: Decimals) -> f32 {
    let magnitude = if value < 0.0 { -value } else { value };
    magnitude * decimals.scale() + 0.5
}

/// Sign and magnitude encoding: bit 15 carries the sign, bits 0..15 the
/// scaled magnitude (saturating at `0x7fff`).
///
/// | decimals | range |
/// |----------|-------|
/// | 0 | -32767 ..= 32767 |
/// | 1 | -3276.7 ..= 3276.7 |
/// | 2 | -327.67 ..= 327.67 |
pub fn float_to_int15(value: f32, decimals: Decimals) -> u16 {
    let magnitude = (scaled_magnitude(value, decimals) as u16).min(MAGNITUDE_MASK);

    if value < 0.0 {
        magnitude | SIGN_BIT
    } else {
        magnitude
    }
}

/// Unsigned encoding of the absolute value, saturating at `u16::MAX`.
pub fn float_to_uint16(value: f32, decimals: Decimals) -> u16 {
    scaled_magnitude(value, decimals) as u16
}

pub fn byte_to_hex(value: u8) -> String<2> {
    let mut hex = String::new();
    let _ = write!(hex, "{:02x}", value);
    hex
}

/// Low byte first, the order the modem expects for 16-bit hex arguments.
pub fn short_to_hex(value: u16) -> String<4> {
    let [low, high] = value.to_le_bytes();
    let mut hex = String::new();
    let _ = write!(hex, "{:02x}{:02x}", low, high);
    hex
}

pub fn long_to_hex(value: u32) -> String<8> {
    let mut hex = String::new();
    let _ = write!(hex, "{:08x}", value);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int15_keeps_sign_apart_from_magnitude() {
        let negative = float_to_int15(-12.34, Decimals::Two);
        assert_eq!(negative & MAGNITUDE_MASK, 1234);
        assert_eq!(negative & SIGN_BIT, SIGN_BIT);

        let positive = float_to_int15(12.34, Decimals::Two);
        assert_eq!(positive, 1234);
        assert_eq!(positive & SIGN_BIT, 0);
    }

    #[test]
    fn int15_scales_by_decimals() {
        assert_eq!(float_to_int15(21.7, Decimals::Zero), 22);
        assert_eq!(float_to_int15(21.7, Decimals::One), 217);
        assert_eq!(float_to_int15(-3.0, Decimals::Zero), SIGN_BIT | 3);
    }

    #[test]
    fn int15_saturates_instead_of_touching_the_sign() {
        assert_eq!(float_to_int15(400.0, Decimals::Two), MAGNITUDE_MASK);
        assert_eq!(float_to_int15(-400.0, Decimals::Two), SIGN_BIT | MAGNITUDE_MASK);
    }

    #[test]
    fn uint16_boundaries() {
        assert_eq!(float_to_uint16(655.35, Decimals::Two), 65535);
        assert_eq!(float_to_uint16(0.0, Decimals::Zero), 0);
        assert_eq!(float_to_uint16(1013.2, Decimals::Zero), 1013);
        assert_eq!(float_to_uint16(70000.0, Decimals::Zero), u16::MAX);
        assert_eq!(float_to_uint16(f32::NAN, Decimals::Two), 0);
    }

    #[test]
    fn decimals_from_raw() {
        assert_eq!(Decimals::try_from(2), Ok(Decimals::Two));
        assert_eq!(
            Decimals::try_from(3),
            Err(Error::Unmapped {
                setting: Setting::Decimals,
                value: 3
            })
        );
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(byte_to_hex(0x0a).as_str(), "0a");
        assert_eq!(byte_to_hex(0xff).as_str(), "ff");
        assert_eq!(short_to_hex(0x1234).as_str(), "3412");
        assert_eq!(short_to_hex(0x000f).as_str(), "0f00");
        assert_eq!(long_to_hex(0x12345678).as_str(), "12345678");
        assert_eq!(long_to_hex(0x0000_00ab).as_str(), "000000ab");
    }
}
