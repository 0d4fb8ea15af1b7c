use ats02::config::Config;
use ats02::station::Quantity;
use embassy_rp::adc;
use embassy_time::Timer;
use embedded_hal_async::i2c::I2c;

use super::{BusSensorError, Reading, Sensor};

const REG_CALIBRATION: u8 = 0x88;
const REG_CHIP_ID: u8 = 0xd0;
const REG_CTRL_MEAS: u8 = 0xf4;
const REG_DATA: u8 = 0xf7;

const CHIP_ID: u8 = 0x58;
/// Temperature and pressure oversampling x1, forced mode.
const FORCED_MEASUREMENT: u8 = 0b001_001_01;
const SLEEP: u8 = 0x00;

/// Factory trimming parameters.
#[derive(Clone, Copy)]
struct Calibration {
    t: [f64; 3],
    p: [f64; 9],
}

impl Calibration {
    fn parse(raw: &[u8; 24]) -> Self {
        let unsigned = |i: usize| f64::from(u16::from_le_bytes([raw[i], raw[i + 1]]));
        let signed = |i: usize| f64::from(i16::from_le_bytes([raw[i], raw[i + 1]]));

        let mut p = [0f64; 9];
        p[0] = unsigned(6);
        for (n, value) in p.iter_mut().enumerate().skip(1) {
            *value = signed(6 + 2 * n);
        }

        Self {
            t: [unsigned(0), signed(2), signed(4)],
            p,
        }
    }

    /// Temperature in °C and pressure in Pa from raw 20 bit samples.
    fn compensate(&self, adc_t: i32, adc_p: i32) -> (f64, f64) {
        let [t1, t2, t3] = self.t;
        let [p1, p2, p3, p4, p5, p6, p7, p8, p9] = self.p;
        let adc_t = f64::from(adc_t);
        let adc_p = f64::from(adc_p);

        let var1 = (adc_t / 16384.0 - t1 / 1024.0) * t2;
        let var2 = (adc_t / 131072.0 - t1 / 8192.0) * (adc_t / 131072.0 - t1 / 8192.0) * t3;
        let t_fine = var1 + var2;
        let temperature = t_fine / 5120.0;

        let var1 = t_fine / 2.0 - 64000.0;
        let var2 = var1 * var1 * p6 / 32768.0;
        let var2 = var2 + var1 * p5 * 2.0;
        let var2 = var2 / 4.0 + p4 * 65536.0;
        let var1 = (p3 * var1 * var1 / 524288.0 + p2 * var1) / 524288.0;
        let var1 = (1.0 + var1 / 32768.0) * p1;
        if var1 == 0.0 {
            return (temperature, 0.0);
        }

        let pressure = 1048576.0 - adc_p;
        let pressure = (pressure - var2 / 4096.0) * 6250.0 / var1;
        let var1 = p9 * pressure * pressure / 2147483648.0;
        let var2 = pressure * p8 / 32768.0;

        (temperature, pressure + (var1 + var2 + p7) / 16.0)
    }
}

/// BMP280 barometer on the shared I2C1 bus.
pub struct PressureSensor<I> {
    addr: u8,
    bus: I,
    calibration: Option<Calibration>,
}

impl<I: I2c> PressureSensor<I> {
    pub fn new(bus: I) -> Self {
        Self {
            addr: Config::I2C_ADDR_PRESSURE_SENSOR,
            bus,
            calibration: None,
        }
    }

    async fn read_register(&mut self, reg: u8, buffer: &mut [u8]) -> Result<(), BusSensorError> {
        self.bus
            .write_read(self.addr, &[reg], buffer)
            .await
            .map_err(BusSensorError::from_bus)
    }

    async fn write_register(&mut self, reg: u8, value: u8) -> Result<(), BusSensorError> {
        self.bus
            .write(self.addr, &[reg, value])
            .await
            .map_err(BusSensorError::from_bus)
    }

    async fn calibration(&mut self) -> Result<Calibration, BusSensorError> {
        if let Some(calibration) = self.calibration {
            return Ok(calibration);
        }

        let mut raw = [0u8; 24];
        self.read_register(REG_CALIBRATION, &mut raw).await?;
        let calibration = Calibration::parse(&raw);
        self.calibration = Some(calibration);

        Ok(calibration)
    }
}

impl<I: I2c> Sensor<1> for PressureSensor<I> {
    type Error = BusSensorError;

    async fn on(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn off(&mut self) -> Result<(), Self::Error> {
        self.write_register(REG_CTRL_MEAS, SLEEP).await
    }

    async fn verify(&mut self) -> Result<(), Self::Error> {
        let mut id = [0u8; 1];
        self.read_register(REG_CHIP_ID, &mut id).await?;

        if id[0] != CHIP_ID {
            return Err(BusSensorError::Identity(id[0]));
        }

        self.calibration().await.map(|_| ())
    }

    async fn probe(&mut self, _adc: &mut adc::Adc<'static, adc::Async>) -> Result<[Reading; 1], Self::Error> {
        let calibration = self.calibration().await?;

        self.write_register(REG_CTRL_MEAS, FORCED_MEASUREMENT).await?;
        // x1 oversampling takes at most 6.4 ms
        Timer::after_millis(10).await;

        let mut data = [0u8; 6];
        self.read_register(REG_DATA, &mut data).await?;

        let sample = |msb: u8, lsb: u8, xlsb: u8| (i32::from(msb) << 12) | (i32::from(lsb) << 4) | (i32::from(xlsb) >> 4);
        let adc_p = sample(data[0], data[1], data[2]);
        let adc_t = sample(data[3], data[4], data[5]);

        let (temp, pascal) = calibration.compensate(adc_t, adc_p);
        let pressure = (pascal / 100.0) as f32;

        defmt::info!("pressure sensor: {=f32} hPa, tmp {=f32}°C", pressure, temp as f32);

        Ok([(Quantity::Pressure, pressure)])
    }
}
