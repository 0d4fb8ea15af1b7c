use ats02::config::Config;
use ats02::station::Indicator;
use embassy_rp::gpio::{Level, Output};

use crate::StatusLedRes;

/// Onboard heartbeat LED plus the RGB status LED.
pub struct StatusLed {
    heartbeat: Output<'static>,
    rgb: [Output<'static>; 3],
    showing: Indicator,
}

impl StatusLed {
    pub fn new(r: StatusLedRes) -> Self {
        let off = Level::from(Config::RGB_COMMON_ANODE);

        let mut led = Self {
            heartbeat: Output::new(r.heartbeat, Level::Low),
            rgb: [
                Output::new(r.red, off),
                Output::new(r.green, off),
                Output::new(r.blue, off),
            ],
            showing: Indicator::Off,
        };
        led.show(Indicator::Off);
        led
    }

    pub fn toggle_heartbeat(&mut self) {
        self.heartbeat.toggle();
    }

    pub fn showing(&self) -> Indicator {
        self.showing
    }

    pub fn show(&mut self, indicator: Indicator) {
        let levels = indicator.color().levels(Config::RGB_COMMON_ANODE);

        for (pin, high) in self.rgb.iter_mut().zip(levels) {
            pin.set_level(Level::from(high));
        }
        self.showing = indicator;
    }
}
