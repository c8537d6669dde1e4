//! MH-Z19 NDIR CO2 sensor (UART).
//!
//! A read command gets a 9-byte response: 0xFF, the command echo 0x86,
//! the CO2 concentration as a big-endian word, the sensor temperature
//! offset by 40, and a one-byte checksum over bytes 1-7.

use crate::error::{MonitorError, Result};

/// Length of one command response.
pub const RESPONSE_LEN: usize = 9;

/// "Read CO2 concentration" command.
pub const CMD_READ_CO2: [u8; 9] = [0xFF, 0x01, 0x86, 0x00, 0x00, 0x00, 0x00, 0x00, 0x79];

/// Values decoded from one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Co2Response {
    /// CO2 concentration in ppm
    pub co2_ppm: u16,
    /// Internal sensor temperature in °C
    pub temperature_c: i16,
}

/// Checksum over a response or command: negate the sum of bytes 1-7.
pub fn checksum(frame: &[u8]) -> u8 {
    let sum = frame[1..8].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    (!sum).wrapping_add(1)
}

/// Decode a 9-byte MH-Z19 response to the read command.
pub fn decode_response(response: &[u8]) -> Result<Co2Response> {
    if response.len() < RESPONSE_LEN {
        return Err(MonitorError::decode_error(format!(
            "MH-Z19 response too short: {} bytes",
            response.len()
        )));
    }
    if response[0] != 0xFF || response[1] != 0x86 {
        return Err(MonitorError::decode_error(format!(
            "MH-Z19 bad response header: {:02x} {:02x}",
            response[0], response[1]
        )));
    }
    if checksum(response) != response[8] {
        return Err(MonitorError::decode_error("MH-Z19 checksum mismatch"));
    }

    Ok(Co2Response {
        co2_ppm: u16::from_be_bytes([response[2], response[3]]),
        temperature_c: response[4] as i16 - 40,
    })
}

#[cfg(feature = "hardware")]
pub use self::hardware::Mhz19;

#[cfg(feature = "hardware")]
mod hardware {
    use super::*;
    use crate::sensors::{SensorDriver, SensorValues};
    use async_trait::async_trait;
    use rppal::uart::{Parity, Uart};
    use std::time::Duration;

    /// UART-attached MH-Z19 driver.
    pub struct Mhz19 {
        uart: Uart,
    }

    impl Mhz19 {
        /// Open the serial device the sensor is wired to.
        pub fn open(port: &str, baud_rate: u32) -> Result<Self> {
            let mut uart = Uart::with_path(port, baud_rate, Parity::None, 8, 1)
                .map_err(|e| MonitorError::driver_error("mhz19", e.to_string()))?;
            uart.set_read_mode(RESPONSE_LEN as u8, Duration::from_secs(1))
                .map_err(|e| MonitorError::driver_error("mhz19", e.to_string()))?;
            tracing::info!("MH-Z19 initialized on {port}");
            Ok(Self { uart })
        }
    }

    #[async_trait]
    impl SensorDriver for Mhz19 {
        fn name(&self) -> &'static str {
            "mhz19"
        }

        async fn read(&mut self) -> Result<SensorValues> {
            self.uart
                .write(&CMD_READ_CO2)
                .map_err(|e| MonitorError::driver_error("mhz19", e.to_string()))?;

            tokio::time::sleep(Duration::from_millis(100)).await;

            let mut response = [0u8; RESPONSE_LEN];
            let n = self
                .uart
                .read(&mut response)
                .map_err(|e| MonitorError::driver_error("mhz19", e.to_string()))?;

            let decoded = decode_response(&response[..n])?;
            // The internal temperature is coarse; the DHT22 owns the
            // temperature column, so only log it here.
            tracing::debug!("MH-Z19 internal temperature: {}°C", decoded.temperature_c);

            Ok(SensorValues {
                co2: Some(decoded.co2_ppm as f64),
                ..Default::default()
            })
        }
    }
}
