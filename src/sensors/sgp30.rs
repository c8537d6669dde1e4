//! SGP30 VOC/eCO2 gas sensor (I2C).
//!
//! Measurements come back as two 16-bit words (eCO2 ppm, TVOC ppb), each
//! followed by a CRC-8 byte (polynomial 0x31, init 0xFF).

use crate::error::{MonitorError, Result};

/// CRC-8 as specified in the Sensirion datasheet.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for byte in data {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ 0x31;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Values decoded from one air-quality measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AirQualityWords {
    /// Estimated CO2 in ppm
    pub eco2_ppm: u16,
    /// Total VOC in ppb
    pub tvoc_ppb: u16,
}

/// Decode the 6-byte measurement buffer: two CRC-protected words.
pub fn decode_measurement(buf: &[u8]) -> Result<AirQualityWords> {
    if buf.len() < 6 {
        return Err(MonitorError::decode_error(format!(
            "SGP30 measurement too short: {} bytes",
            buf.len()
        )));
    }
    if crc8(&buf[0..2]) != buf[2] || crc8(&buf[3..5]) != buf[5] {
        return Err(MonitorError::decode_error("SGP30 CRC mismatch"));
    }

    Ok(AirQualityWords {
        eco2_ppm: u16::from_be_bytes([buf[0], buf[1]]),
        tvoc_ppb: u16::from_be_bytes([buf[3], buf[4]]),
    })
}

#[cfg(feature = "hardware")]
pub use self::hardware::Sgp30;

#[cfg(feature = "hardware")]
mod hardware {
    use super::*;
    use crate::sensors::{SensorDriver, SensorValues};
    use async_trait::async_trait;
    use rppal::i2c::I2c;
    use std::time::Duration;

    const I2C_ADDRESS: u16 = 0x58;
    const CMD_IAQ_INIT: [u8; 2] = [0x20, 0x03];
    const CMD_IAQ_MEASURE: [u8; 2] = [0x20, 0x08];
    const CMD_SET_IAQ_BASELINE: [u8; 2] = [0x20, 0x1E];
    // Baseline captured during the original deployment's burn-in.
    const BASELINE_ECO2: u16 = 0x8973;
    const BASELINE_TVOC: u16 = 0x8AAE;

    /// I2C-attached SGP30 driver.
    pub struct Sgp30 {
        i2c: I2c,
    }

    impl Sgp30 {
        /// Open the I2C bus and start the on-chip IAQ algorithm.
        pub fn open(bus: u8) -> Result<Self> {
            let mut i2c = I2c::with_bus(bus)
                .map_err(|e| MonitorError::driver_error("sgp30", e.to_string()))?;
            i2c.set_slave_address(I2C_ADDRESS)
                .map_err(|e| MonitorError::driver_error("sgp30", e.to_string()))?;

            i2c.write(&CMD_IAQ_INIT)
                .map_err(|e| MonitorError::driver_error("sgp30", e.to_string()))?;

            let mut baseline = Vec::with_capacity(8);
            baseline.extend_from_slice(&CMD_SET_IAQ_BASELINE);
            for word in [BASELINE_TVOC, BASELINE_ECO2] {
                let bytes = word.to_be_bytes();
                baseline.extend_from_slice(&bytes);
                baseline.push(crc8(&bytes));
            }
            i2c.write(&baseline)
                .map_err(|e| MonitorError::driver_error("sgp30", e.to_string()))?;

            tracing::info!("SGP30 initialized on I2C bus {bus}");
            Ok(Self { i2c })
        }
    }

    #[async_trait]
    impl SensorDriver for Sgp30 {
        fn name(&self) -> &'static str {
            "sgp30"
        }

        async fn read(&mut self) -> Result<SensorValues> {
            self.i2c
                .write(&CMD_IAQ_MEASURE)
                .map_err(|e| MonitorError::driver_error("sgp30", e.to_string()))?;

            // Measurement takes up to 12ms per the datasheet.
            tokio::time::sleep(Duration::from_millis(15)).await;

            let mut buf = [0u8; 6];
            self.i2c
                .read(&mut buf)
                .map_err(|e| MonitorError::driver_error("sgp30", e.to_string()))?;

            let decoded = decode_measurement(&buf)?;
            Ok(SensorValues {
                eco2: Some(decoded.eco2_ppm as f64),
                tvoc: Some(decoded.tvoc_ppb as f64),
                ..Default::default()
            })
        }
    }
}
