#![no_std]
#![no_main]

mod board;
mod sensor;

use assign_resources::assign_resources;
use ats02::config::Config;
use ats02::modem::{LoRaModem, MODEM_BAUD_RATE};
use ats02::station::PulseCounter;
use board::status_led::StatusLed;
use board::{Board, BoardBuilder, I2c1Bus};
use defmt::{error, info, warn};
use embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice;
use embassy_executor::Spawner;
use embassy_rp::adc;
use embassy_rp::gpio::{AnyPin, Input, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{self, I2C0, I2C1, UART0};
use embassy_rp::uart::{self, BufferedUart};
use embassy_rp::{bind_interrupts, Peri};
use embassy_sync::mutex::Mutex;
use embassy_time::{Delay, Duration, Ticker, Timer};
use sensor::air_sensor::AirSensor;
use sensor::leaf_sensor::LeafSensor;
use sensor::light_sensor::LightSensor;
use sensor::pressure_sensor::PressureSensor;
use sensor::soil_sensor::SoilSensor;
use sensor::system_sensor::SystemSensor;
use sensor::uv_sensor::UvSensor;
use sensor::wind_sensor::WindSensor;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => adc::InterruptHandler;
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
    I2C1_IRQ => i2c::InterruptHandler<I2C1>;
    UART0_IRQ => uart::BufferedInterruptHandler<UART0>;
});

assign_resources! {
    system: SystemRes {
        adc_tmp: ADC_TEMP_SENSOR,
        usb: PIN_24,
        vsys: PIN_29,
    },
    air: AirSensorRes {
        scl: PIN_17,
        sda: PIN_16,
        i2c0: I2C0,
    },
    bus: SharedBusRes {
        scl: PIN_19,
        sda: PIN_18,
        i2c1: I2C1,
    },
    uv: UvSensorRes {
        sig: PIN_26,
    },
    leaf: LeafSensorRes {
        pwr: PIN_20,
        sig: PIN_27,
    },
    wind: WindSensorRes {
        vane: PIN_28,
    },
    pulses: PulseRes {
        anemometer: PIN_21,
        rain: PIN_22,
    },
    led: StatusLedRes {
        heartbeat: PIN_25,
        red: PIN_13,
        green: PIN_14,
        blue: PIN_15,
    },
    modem: ModemRes {
        uart0: UART0,
        tx: PIN_0,
        rx: PIN_1,
    },
    adc: AdcRes {
        adc: ADC,
    },
}

const UART_BUFFER_SIZE: usize = 256;

static WIND_PULSES: PulseCounter = PulseCounter::new();
static RAIN_PULSES: PulseCounter = PulseCounter::new();

static I2C1_BUS: StaticCell<I2c1Bus> = StaticCell::new();
static UART_TX_BUFFER: StaticCell<[u8; UART_BUFFER_SIZE]> = StaticCell::new();
static UART_RX_BUFFER: StaticCell<[u8; UART_BUFFER_SIZE]> = StaticCell::new();

enum State {
    Provision,
    Run,
    Halt,
}

#[embassy_executor::main]
async fn main(s: Spawner) {
    let p = embassy_rp::init(Default::default());
    let r = split_resources! {p};

    let bus: &'static I2c1Bus = I2C1_BUS.init(Mutex::new(I2c::new_async(
        r.bus.i2c1,
        r.bus.scl,
        r.bus.sda,
        Irqs,
        i2c::Config::default(),
    )));

    let mut uart_config = uart::Config::default();
    uart_config.baudrate = MODEM_BAUD_RATE;
    let uart = BufferedUart::new(
        r.modem.uart0,
        r.modem.tx,
        r.modem.rx,
        Irqs,
        UART_TX_BUFFER.init([0; UART_BUFFER_SIZE]),
        UART_RX_BUFFER.init([0; UART_BUFFER_SIZE]),
        uart_config,
    );

    let board = BoardBuilder::new()
        .with_adc(adc::Adc::new(r.adc.adc, Irqs, Default::default()))
        .with_system_sensor(SystemSensor::new(r.system))
        .with_air_sensor(AirSensor::new(r.air))
        .with_soil_sensor(SoilSensor::new(I2cDevice::new(bus)))
        .with_light_sensor(LightSensor::new(I2cDevice::new(bus)))
        .with_pressure_sensor(PressureSensor::new(I2cDevice::new(bus)))
        .with_uv_sensor(UvSensor::new(r.uv))
        .with_leaf_sensor(LeafSensor::new(r.leaf))
        .with_wind_sensor(WindSensor::new(r.wind, &WIND_PULSES))
        .with_rain_gauge(&RAIN_PULSES)
        .with_status_led(StatusLed::new(r.led))
        .with_modem(LoRaModem::new(uart, Delay))
        .build()
        .expect("all devices should be assigned");

    s.spawn(pulse_counter("anemometer", r.pulses.anemometer.into(), &WIND_PULSES))
        .expect("executor should be initialized");
    s.spawn(pulse_counter("rain gauge", r.pulses.rain.into(), &RAIN_PULSES))
        .expect("executor should be initialized");
    s.spawn(orchestrator(board)).expect("executor should be initialized");
}

/// Counts falling edges of a reed switch input.
#[embassy_executor::task(pool_size = 2)]
async fn pulse_counter(name: &'static str, pin: Peri<'static, AnyPin>, counter: &'static PulseCounter) {
    let mut input = Input::new(pin, Pull::Up);
    info!("{=str}: counting pulses", name);

    loop {
        input.wait_for_falling_edge().await;
        counter.increment();
    }
}

#[embassy_executor::task]
async fn orchestrator(mut board: Board) {
    let mut ticker = Ticker::every(Duration::from_millis(Config::POLL_PERIOD_MS));
    let mut state = State::Provision;
    let mut attempts: u8 = 0;

    loop {
        state = match state {
            State::Provision => match board.provision().await {
                Ok(()) => {
                    info!("board: provisioned, sampling every {=u32} ms", Config::SAMPLING_PERIOD_MS);
                    attempts = 0;
                    State::Run
                }
                Err(e) => {
                    attempts += 1;
                    warn!("board: provisioning failed {}, attempt {=u8}", e, attempts);

                    if attempts >= Config::PROVISION_ATTEMPTS {
                        error!(
                            "board: provisioning failed {=u8} times, halting for {=u64} s",
                            attempts,
                            Config::PROVISION_RETRY_SECS
                        );
                        State::Halt
                    } else {
                        State::Provision
                    }
                }
            },
            State::Run => {
                board.run_cycle().await;
                State::Run
            }
            State::Halt => {
                Timer::after_secs(Config::PROVISION_RETRY_SECS).await;
                attempts = 0;
                State::Provision
            }
        };
        ticker.next().await;
    }
}
