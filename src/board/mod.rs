use ats02::codec::Measurements;
use ats02::config::Config;
use ats02::modem::{AuthMode, LoRaModem};
use ats02::station::{Accumulators, Indicator, PulseCounter, Quantity, Schedule};
use ats02::StatusCode;
use embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice;
use embassy_rp::adc::{self, Async};
use embassy_rp::i2c;
use embassy_rp::peripherals::I2C1;
use embassy_rp::uart::BufferedUart;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Delay, Instant};
use heapless::Vec;

pub mod status_led;

use crate::sensor::air_sensor::AirSensor;
use crate::sensor::leaf_sensor::LeafSensor;
use crate::sensor::light_sensor::LightSensor;
use crate::sensor::pressure_sensor::PressureSensor;
use crate::sensor::soil_sensor::SoilSensor;
use crate::sensor::system_sensor::SystemSensor;
use crate::sensor::uv_sensor::UvSensor;
use crate::sensor::wind_sensor::WindSensor;
use crate::sensor::Sensor;
use status_led::StatusLed;

pub type I2c1Bus = Mutex<NoopRawMutex, i2c::I2c<'static, I2C1, i2c::Async>>;
pub type SharedI2c = I2cDevice<'static, NoopRawMutex, i2c::I2c<'static, I2C1, i2c::Async>>;
pub type Modem = LoRaModem<'static, BufferedUart, Delay>;

const SENSOR_COUNT: usize = 8;

#[derive(defmt::Format)]
pub enum BoardError {
    FailedToInitialize,
    Modem(ats02::Error),
}

pub struct Board {
    adc: adc::Adc<'static, Async>,
    system_sensor: SystemSensor,
    air_sensor: AirSensor,
    soil_sensor: SoilSensor<SharedI2c>,
    light_sensor: LightSensor<SharedI2c>,
    pressure_sensor: PressureSensor<SharedI2c>,
    uv_sensor: UvSensor,
    leaf_sensor: LeafSensor,
    wind_sensor: WindSensor,
    rain_gauge: &'static PulseCounter,
    status_led: StatusLed,
    modem: Modem,
    accumulators: Accumulators,
    schedule: Schedule,
}

pub struct BoardBuilder {
    adc: Option<adc::Adc<'static, Async>>,
    system_sensor: Option<SystemSensor>,
    air_sensor: Option<AirSensor>,
    soil_sensor: Option<SoilSensor<SharedI2c>>,
    light_sensor: Option<LightSensor<SharedI2c>>,
    pressure_sensor: Option<PressureSensor<SharedI2c>>,
    uv_sensor: Option<UvSensor>,
    leaf_sensor: Option<LeafSensor>,
    wind_sensor: Option<WindSensor>,
    rain_gauge: Option<&'static PulseCounter>,
    status_led: Option<StatusLed>,
    modem: Option<Modem>,
}

/// Milliseconds on the free running clock, wrapping like the schedule expects.
fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

async fn verify<const N: usize, S>(name: &'static str, sensor: &mut S) -> Result<(), &'static str>
where
    S: Sensor<N>,
    S::Error: defmt::Format,
{
    sensor
        .verify()
        .await
        .inspect(|_| defmt::info!("{=str}: verified", name))
        .map_err(|e| {
            defmt::error!("{=str}: verification failed {}", name, e);
            name
        })
}

/// Power `sensor` up, probe it and power it down again, adding its readings
/// to the averages. False when any step or any of its readings failed.
async fn sample_into<const N: usize, S>(
    name: &'static str,
    sensor: &mut S,
    adc: &mut adc::Adc<'static, Async>,
    accumulators: &mut Accumulators,
) -> bool
where
    S: Sensor<N>,
    S::Error: defmt::Format,
{
    if let Err(e) = sensor.on().await {
        defmt::error!("{=str}: power up failed {}", name, e);
        return false;
    }

    let probed = sensor.probe(adc).await;

    let mut ok = true;
    if let Err(e) = sensor.off().await {
        defmt::warn!("{=str}: power down failed {}", name, e);
        ok = false;
    }

    let readings = match probed {
        Ok(readings) => readings,
        Err(e) => {
            defmt::error!("{=str}: probe failed {}", name, e);
            return false;
        }
    };

    for (quantity, value) in readings {
        if let Err(e) = accumulators.record(quantity, value) {
            defmt::warn!("{=str}: dropped {=f32} {=str}: {}", name, value, quantity.unit(), e);
            ok = false;
        }
    }
    ok
}

impl Board {
    /// Check the sensors and bring the modem up. Sensor faults are only
    /// reported, the modem has to come up.
    pub async fn provision(&mut self) -> Result<(), BoardError> {
        let mut errors = Vec::<&'static str, SENSOR_COUNT>::new();

        self.status_led.show(Indicator::Setup);

        defmt::info!(
            "ATS-02 fw {=str} hw {=str} on {=str} via {=str}",
            Config::FW_VERSION,
            Config::HW_VERSION,
            Config::MCU_BOARD,
            Config::COMM_IF
        );
        defmt::info!("sensors: {=str}", Config::SENSOR_LIST);

        let _ = verify::<2, _>("system sensor", &mut self.system_sensor).await.map_err(|e| errors.push(e));
        let _ = verify::<2, _>("air sensor", &mut self.air_sensor).await.map_err(|e| errors.push(e));
        let _ = verify::<2, _>("soil sensor", &mut self.soil_sensor).await.map_err(|e| errors.push(e));
        let _ = verify::<1, _>("light sensor", &mut self.light_sensor).await.map_err(|e| errors.push(e));
        let _ = verify::<1, _>("pressure sensor", &mut self.pressure_sensor).await.map_err(|e| errors.push(e));
        let _ = verify::<1, _>("uv sensor", &mut self.uv_sensor).await.map_err(|e| errors.push(e));
        let _ = verify::<1, _>("leaf sensor", &mut self.leaf_sensor).await.map_err(|e| errors.push(e));
        let _ = verify::<2, _>("wind sensor", &mut self.wind_sensor).await.map_err(|e| errors.push(e));

        for name in &errors {
            defmt::warn!("board: {=str} unavailable, its readings will be missing", name);
        }

        let lora = Config::lora();
        let result = self.modem.init(lora).await;
        defmt::info!("modem: init status {=u8}", StatusCode::from(&result) as u8);

        if let Err(e) = result {
            self.status_led.show(Indicator::Error);
            return Err(BoardError::Modem(e));
        }

        if lora.auth_mode == AuthMode::Otaa {
            if let Err(e) = self.modem.join().await {
                self.status_led.show(Indicator::Error);
                return Err(BoardError::Modem(e));
            }
        }

        self.status_led.show(if errors.is_empty() { Indicator::Off } else { Indicator::Error });
        Ok(())
    }

    /// One pass of the station loop, does nothing until the next heartbeat.
    pub async fn run_cycle(&mut self) {
        let now = now_ms();
        if !self.schedule.heartbeat(now) {
            return;
        }

        self.status_led.toggle_heartbeat();

        if self.schedule.sampling_due(now) {
            self.sample().await;
        }

        if self.schedule.transmission_due(now_ms()) {
            self.transmit().await;
        }
    }

    async fn sample(&mut self) {
        self.status_led.show(Indicator::Sampling);

        let adc = &mut self.adc;
        let acc = &mut self.accumulators;
        let mut ok = true;

        ok &= sample_into::<2, _>("system sensor", &mut self.system_sensor, adc, acc).await;
        ok &= sample_into::<2, _>("air sensor", &mut self.air_sensor, adc, acc).await;
        ok &= sample_into::<2, _>("soil sensor", &mut self.soil_sensor, adc, acc).await;
        ok &= sample_into::<1, _>("light sensor", &mut self.light_sensor, adc, acc).await;
        ok &= sample_into::<1, _>("pressure sensor", &mut self.pressure_sensor, adc, acc).await;
        ok &= sample_into::<1, _>("uv sensor", &mut self.uv_sensor, adc, acc).await;
        ok &= sample_into::<1, _>("leaf sensor", &mut self.leaf_sensor, adc, acc).await;
        ok &= sample_into::<2, _>("wind sensor", &mut self.wind_sensor, adc, acc).await;

        self.status_led.show(if ok { Indicator::Off } else { Indicator::Error });
    }

    async fn transmit(&mut self) {
        self.status_led.show(Indicator::Transmitting);

        for quantity in Quantity::ALL {
            match self.accumulators.average(quantity) {
                Some(average) => defmt::info!(
                    "average {}: {=f32} {=str} ({=u16} samples)",
                    quantity,
                    average,
                    quantity.unit(),
                    self.accumulators.count(quantity)
                ),
                None => defmt::warn!("average {}: no samples", quantity),
            }
        }

        let rain_pulses = self.rain_gauge.take_u16();
        let measurements: Measurements = self.accumulators.snapshot(rain_pulses);
        let hex = measurements.to_hex();

        defmt::info!("rain gauge: {=u16} pulses", rain_pulses);
        defmt::info!("payload {=str}", hex.as_str());

        let result = self.modem.send_unconfirmed_hex(Config::LORA_PORT, &hex).await;
        match &result {
            Ok(()) => defmt::info!("modem: uplink sent"),
            Err(e) => defmt::error!("modem: uplink failed {}", e),
        }

        self.accumulators.reset();
        self.status_led.show(if result.is_ok() { Indicator::Off } else { Indicator::Error });
    }
}

impl BoardBuilder {
    pub fn new() -> BoardBuilder {
        BoardBuilder {
            adc: None,
            system_sensor: None,
            air_sensor: None,
            soil_sensor: None,
            light_sensor: None,
            pressure_sensor: None,
            uv_sensor: None,
            leaf_sensor: None,
            wind_sensor: None,
            rain_gauge: None,
            status_led: None,
            modem: None,
        }
    }

    pub fn with_adc(mut self, adc: adc::Adc<'static, Async>) -> BoardBuilder {
        self.adc = Some(adc);
        self
    }

    pub fn with_system_sensor(mut self, system_sensor: SystemSensor) -> BoardBuilder {
        self.system_sensor = Some(system_sensor);
        self
    }

    pub fn with_air_sensor(mut self, air_sensor: AirSensor) -> BoardBuilder {
        self.air_sensor = Some(air_sensor);
        self
    }

    pub fn with_soil_sensor(mut self, soil_sensor: SoilSensor<SharedI2c>) -> BoardBuilder {
        self.soil_sensor = Some(soil_sensor);
        self
    }

    pub fn with_light_sensor(mut self, light_sensor: LightSensor<SharedI2c>) -> BoardBuilder {
        self.light_sensor = Some(light_sensor);
        self
    }

    pub fn with_pressure_sensor(mut self, pressure_sensor: PressureSensor<SharedI2c>) -> BoardBuilder {
        self.pressure_sensor = Some(pressure_sensor);
        self
    }

    pub fn with_uv_sensor(mut self, uv_sensor: UvSensor) -> BoardBuilder {
        self.uv_sensor = Some(uv_sensor);
        self
    }

    pub fn with_leaf_sensor(mut self, leaf_sensor: LeafSensor) -> BoardBuilder {
        self.leaf_sensor = Some(leaf_sensor);
        self
    }

    pub fn with_wind_sensor(mut self, wind_sensor: WindSensor) -> BoardBuilder {
        self.wind_sensor = Some(wind_sensor);
        self
    }

    pub fn with_rain_gauge(mut self, rain_gauge: &'static PulseCounter) -> BoardBuilder {
        self.rain_gauge = Some(rain_gauge);
        self
    }

    pub fn with_status_led(mut self, status_led: StatusLed) -> BoardBuilder {
        self.status_led = Some(status_led);
        self
    }

    pub fn with_modem(mut self, modem: Modem) -> BoardBuilder {
        self.modem = Some(modem);
        self
    }

    pub fn build(self) -> Result<Board, BoardError> {
        if let (
            Some(adc),
            Some(system_sensor),
            Some(air_sensor),
            Some(soil_sensor),
            Some(light_sensor),
            Some(pressure_sensor),
            Some(uv_sensor),
            Some(leaf_sensor),
            Some(wind_sensor),
            Some(rain_gauge),
            Some(status_led),
            Some(modem),
        ) = (
            self.adc,
            self.system_sensor,
            self.air_sensor,
            self.soil_sensor,
            self.light_sensor,
            self.pressure_sensor,
            self.uv_sensor,
            self.leaf_sensor,
            self.wind_sensor,
            self.rain_gauge,
            self.status_led,
            self.modem,
        ) {
            Ok(Board {
                adc,
                system_sensor,
                air_sensor,
                soil_sensor,
                light_sensor,
                pressure_sensor,
                uv_sensor,
                leaf_sensor,
                wind_sensor,
                rain_gauge,
                status_led,
                modem,
                accumulators: Accumulators::new(),
                schedule: Schedule::new(Config::SYSTEM_PERIOD_MS, Config::SAMPLING_PERIOD_MS, Config::TX_PERIOD_MS),
            })
        } else {
            Err(BoardError::FailedToInitialize)
        }
    }
}
