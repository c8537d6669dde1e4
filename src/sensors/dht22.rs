//! DHT22 temperature/humidity sensor (single-wire GPIO).
//!
//! The sensor answers a start pulse with 40 data bits: 16 bits of
//! humidity in tenths of a percent, 16 bits of temperature in tenths of
//! a degree (top bit is the sign), and an 8-bit parity byte equal to the
//! truncated sum of the first four bytes.

use crate::error::{MonitorError, Result};

/// A decoded temperature/humidity pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    /// Temperature in °C
    pub temperature_c: f64,
    /// Relative humidity in %
    pub humidity_percent: f64,
}

/// Decode the five data bytes of one transfer.
pub fn decode_bytes(bytes: [u8; 5]) -> Result<ClimateReading> {
    let parity = bytes[0]
        .wrapping_add(bytes[1])
        .wrapping_add(bytes[2])
        .wrapping_add(bytes[3]);
    if parity != bytes[4] {
        return Err(MonitorError::decode_error(format!(
            "DHT22 parity mismatch: computed {parity:#04x}, got {:#04x}",
            bytes[4]
        )));
    }

    let humidity_raw = u16::from_be_bytes([bytes[0], bytes[1]]);
    let humidity_percent = humidity_raw as f64 / 10.0;
    if humidity_percent > 100.0 {
        return Err(MonitorError::decode_error(format!(
            "DHT22 humidity out of range: {humidity_percent}%"
        )));
    }

    let temperature_raw = u16::from_be_bytes([bytes[2] & 0x7F, bytes[3]]);
    let mut temperature_c = temperature_raw as f64 / 10.0;
    if bytes[2] & 0x80 != 0 {
        temperature_c = -temperature_c;
    }

    Ok(ClimateReading {
        temperature_c,
        humidity_percent,
    })
}

/// Pack 40 sampled bits (one per slot, MSB first) into data bytes.
pub fn pack_bits(bits: &[bool; 40]) -> [u8; 5] {
    let mut bytes = [0u8; 5];
    for (i, bit) in bits.iter().enumerate() {
        if *bit {
            bytes[i / 8] |= 1 << (7 - (i % 8));
        }
    }
    bytes
}

#[cfg(feature = "hardware")]
pub use self::hardware::Dht22;

#[cfg(feature = "hardware")]
mod hardware {
    use super::*;
    use crate::sensors::{SensorDriver, SensorValues};
    use async_trait::async_trait;
    use rppal::gpio::{Gpio, IoPin, Level, Mode};
    use std::time::{Duration, Instant};

    /// A high pulse longer than this is a 1-bit (zeros run ~26-28μs,
    /// ones ~70μs).
    const ONE_THRESHOLD: Duration = Duration::from_micros(50);
    const LEVEL_TIMEOUT: Duration = Duration::from_millis(2);

    /// GPIO bit-banged DHT22 driver.
    pub struct Dht22 {
        pin: IoPin,
    }

    impl Dht22 {
        /// Claim the BCM pin the sensor's data line is wired to.
        pub fn open(pin: u8) -> Result<Self> {
            let gpio =
                Gpio::new().map_err(|e| MonitorError::driver_error("dht22", e.to_string()))?;
            let pin = gpio
                .get(pin)
                .map_err(|e| MonitorError::driver_error("dht22", e.to_string()))?
                .into_io(Mode::Input);
            tracing::info!("DHT22 initialized on GPIO pin");
            Ok(Self { pin })
        }

        fn wait_for(&self, level: Level) -> Result<()> {
            let start = Instant::now();
            while self.pin.read() != level {
                if start.elapsed() > LEVEL_TIMEOUT {
                    return Err(MonitorError::driver_error(
                        "dht22",
                        format!("timeout waiting for {level:?} level"),
                    ));
                }
            }
            Ok(())
        }

        fn transfer(&mut self) -> Result<[u8; 5]> {
            // Start signal: pull the line low for at least 1ms, then
            // release and let the sensor answer.
            self.pin.set_mode(Mode::Output);
            self.pin.set_low();
            std::thread::sleep(Duration::from_millis(2));
            self.pin.set_high();
            self.pin.set_mode(Mode::Input);

            // Sensor response preamble: 80μs low, 80μs high.
            self.wait_for(Level::Low)?;
            self.wait_for(Level::High)?;
            self.wait_for(Level::Low)?;

            let mut bits = [false; 40];
            for bit in bits.iter_mut() {
                self.wait_for(Level::High)?;
                let start = Instant::now();
                self.wait_for(Level::Low)?;
                *bit = start.elapsed() > ONE_THRESHOLD;
            }

            Ok(pack_bits(&bits))
        }
    }

    #[async_trait]
    impl SensorDriver for Dht22 {
        fn name(&self) -> &'static str {
            "dht22"
        }

        async fn read(&mut self) -> Result<SensorValues> {
            // The transfer is timing-critical busy-waiting; keep it off
            // the async executor threads.
            let bytes = tokio::task::block_in_place(|| self.transfer())?;
            let decoded = decode_bytes(bytes)?;

            Ok(SensorValues {
                temperature: Some((decoded.temperature_c * 10.0).round() / 10.0),
                humidity: Some((decoded.humidity_percent * 10.0).round() / 10.0),
                ..Default::default()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes_with_parity(b0: u8, b1: u8, b2: u8, b3: u8) -> [u8; 5] {
        [
            b0,
            b1,
            b2,
            b3,
            b0.wrapping_add(b1).wrapping_add(b2).wrapping_add(b3),
        ]
    }

    #[test]
    fn decodes_positive_temperature() {
        // humidity 65.2%, temperature 27.3°C
        let bytes = bytes_with_parity(0x02, 0x8C, 0x01, 0x11);
        let decoded = decode_bytes(bytes).unwrap();
        assert!((decoded.humidity_percent - 65.2).abs() < 1e-9);
        assert!((decoded.temperature_c - 27.3).abs() < 1e-9);
    }

    #[test]
    fn decodes_negative_temperature() {
        // temperature -10.1°C
        let bytes = bytes_with_parity(0x02, 0x8C, 0x80, 0x65);
        let decoded = decode_bytes(bytes).unwrap();
        assert!((decoded.temperature_c + 10.1).abs() < 1e-9);
    }

    #[test]
    fn rejects_parity_mismatch() {
        let mut bytes = bytes_with_parity(0x02, 0x8C, 0x01, 0x11);
        bytes[4] ^= 0x01;
        assert!(decode_bytes(bytes).is_err());
    }

    #[test]
    fn rejects_impossible_humidity() {
        // 6553.5% humidity from an all-ones transfer
        let bytes = bytes_with_parity(0xFF, 0xFF, 0x00, 0x00);
        assert!(decode_bytes(bytes).is_err());
    }

    #[test]
    fn pack_bits_is_msb_first() {
        let mut bits = [false; 40];
        bits[0] = true; // top bit of byte 0
        bits[15] = true; // bottom bit of byte 1
        let bytes = pack_bits(&bits);
        assert_eq!(bytes[0], 0x80);
        assert_eq!(bytes[1], 0x01);
    }
}
