/// What the RGB status LED shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indicator {
    Off,
    /// magenta
    Setup,
    /// green
    Sampling,
    /// blue
    Transmitting,
    /// red
    Error,
}

/// Lit channels of the LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

impl Indicator {
    pub fn color(self) -> Rgb {
        let (red, green, blue) = match self {
            Indicator::Off => (false, false, false),
            Indicator::Setup => (true, false, true),
            Indicator::Sampling => (false, true, false),
            Indicator::Transmitting => (false, false, true),
            Indicator::Error => (true, false, false),
        };

        Rgb { red, green, blue }
    }
}

impl Rgb {
    /// Pin levels (`true` = high) for red, green and blue. A common anode LED
    /// lights a channel by pulling it low.
    pub fn levels(self, common_anode: bool) -> [bool; 3] {
        [self.red, self.green, self.blue].map(|lit| lit != common_anode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_anode_inverts_levels() {
        let setup = Indicator::Setup.color();
        assert_eq!(setup.levels(false), [true, false, true]);
        assert_eq!(setup.levels(true), [false, true, false]);
        assert_eq!(Indicator::Off.color().levels(true), [true, true, true]);
    }

    #[test]
    fn one_color_per_state() {
        assert_eq!(Indicator::Sampling.color().levels(false), [false, true, false]);
        assert_eq!(Indicator::Transmitting.color().levels(false), [false, false, true]);
        assert_eq!(Indicator::Error.color().levels(false), [true, false, false]);
    }
}
