//! PMS5003 particulate matter sensor (UART).
//!
//! The sensor answers a passive-mode read command with a 32-byte frame:
//! two magic bytes (0x42 0x4D), a big-endian length, thirteen big-endian
//! data words, and a 16-bit checksum over all preceding bytes. The
//! atmospheric-environment PM concentrations live at byte offsets 10-15.

use crate::error::{MonitorError, Result};

/// Length of one complete measurement frame.
pub const FRAME_LEN: usize = 32;

/// Passive-mode read command.
pub const CMD_READ: [u8; 7] = [0x42, 0x4D, 0xE2, 0x00, 0x00, 0x01, 0x71];

const MAGIC: [u8; 2] = [0x42, 0x4D];

/// Particulate concentrations decoded from one frame, in μg/m³.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticulateFrame {
    pub pm1_0: u16,
    pub pm2_5: u16,
    pub pm10: u16,
}

/// Decode a 32-byte PMS5003 frame.
///
/// Rejects short frames, wrong magic bytes, and checksum mismatches so a
/// desynchronized serial stream surfaces as a per-cycle decode error
/// instead of garbage concentrations.
pub fn decode_frame(frame: &[u8]) -> Result<ParticulateFrame> {
    if frame.len() < FRAME_LEN {
        return Err(MonitorError::decode_error(format!(
            "PMS5003 frame too short: {} bytes",
            frame.len()
        )));
    }
    if frame[0..2] != MAGIC {
        return Err(MonitorError::decode_error(format!(
            "PMS5003 bad frame start: {:02x} {:02x}",
            frame[0], frame[1]
        )));
    }

    let expected = u16::from_be_bytes([frame[30], frame[31]]);
    let actual: u16 = frame[..30].iter().map(|b| *b as u16).sum();
    if actual != expected {
        return Err(MonitorError::decode_error(format!(
            "PMS5003 checksum mismatch: got {actual:#06x}, frame says {expected:#06x}"
        )));
    }

    Ok(ParticulateFrame {
        pm1_0: u16::from_be_bytes([frame[10], frame[11]]),
        pm2_5: u16::from_be_bytes([frame[12], frame[13]]),
        pm10: u16::from_be_bytes([frame[14], frame[15]]),
    })
}

#[cfg(feature = "hardware")]
pub use self::hardware::Pms5003;

#[cfg(feature = "hardware")]
mod hardware {
    use super::*;
    use crate::sensors::{SensorDriver, SensorValues};
    use async_trait::async_trait;
    use rppal::uart::{Parity, Uart};
    use std::time::Duration;

    /// UART-attached PMS5003 driver.
    pub struct Pms5003 {
        uart: Uart,
    }

    impl Pms5003 {
        /// Open the serial device the sensor is wired to.
        pub fn open(port: &str, baud_rate: u32) -> Result<Self> {
            let mut uart = Uart::with_path(port, baud_rate, Parity::None, 8, 1)
                .map_err(|e| MonitorError::driver_error("pms5003", e.to_string()))?;
            uart.set_read_mode(FRAME_LEN as u8, Duration::from_secs(1))
                .map_err(|e| MonitorError::driver_error("pms5003", e.to_string()))?;
            tracing::info!("PMS5003 initialized on {port}");
            Ok(Self { uart })
        }
    }

    #[async_trait]
    impl SensorDriver for Pms5003 {
        fn name(&self) -> &'static str {
            "pms5003"
        }

        async fn read(&mut self) -> Result<SensorValues> {
            self.uart
                .write(&CMD_READ)
                .map_err(|e| MonitorError::driver_error("pms5003", e.to_string()))?;

            // The sensor needs a moment before the frame is on the wire.
            tokio::time::sleep(Duration::from_millis(100)).await;

            let mut frame = [0u8; FRAME_LEN];
            let n = self
                .uart
                .read(&mut frame)
                .map_err(|e| MonitorError::driver_error("pms5003", e.to_string()))?;

            let decoded = decode_frame(&frame[..n])?;
            Ok(SensorValues {
                pm1_0: Some(decoded.pm1_0 as f64),
                pm2_5: Some(decoded.pm2_5 as f64),
                pm10: Some(decoded.pm10 as f64),
                ..Default::default()
            })
        }
    }
}
