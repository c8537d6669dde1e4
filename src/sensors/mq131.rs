//! MQ131 ozone sensor, read as an analog voltage through an MCP3008 ADC.

/// Convert a raw 10-bit MCP3008 sample to a voltage on a 3.3V reference.
pub fn voltage_from_adc(raw: u16) -> f64 {
    raw as f64 * 3.3 / 1024.0
}

/// Convert the sense voltage to an ozone concentration in ppb.
///
/// Linear approximation around the factory calibration point; clamped to
/// zero because sub-baseline voltages just mean clean air.
pub fn ozone_ppb_from_voltage(voltage: f64) -> f64 {
    ((voltage - 0.4) * 1000.0 / 2.0).max(0.0)
}

/// Raw sample to ppb in one step.
pub fn ozone_ppb_from_adc(raw: u16) -> f64 {
    ozone_ppb_from_voltage(voltage_from_adc(raw))
}

/// Build the MCP3008 single-ended read request for a channel (0-7).
pub fn adc_request(channel: u8) -> [u8; 3] {
    [1, (8 + channel) << 4, 0]
}

/// Extract the 10-bit sample from the MCP3008's 3-byte reply.
pub fn adc_sample(reply: [u8; 3]) -> u16 {
    (((reply[1] & 0x03) as u16) << 8) | reply[2] as u16
}

#[cfg(feature = "hardware")]
pub use self::hardware::Mq131;

#[cfg(feature = "hardware")]
mod hardware {
    use super::*;
    use crate::error::{MonitorError, Result};
    use crate::sensors::{SensorDriver, SensorValues};
    use async_trait::async_trait;
    use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

    /// MQ131 driver behind an MCP3008 on SPI0.
    pub struct Mq131 {
        spi: Spi,
        channel: u8,
    }

    impl Mq131 {
        /// Open SPI0/CE0 for the ADC the sensor is wired to.
        pub fn open(channel: u8) -> Result<Self> {
            if channel > 7 {
                return Err(MonitorError::config_error(format!(
                    "MQ131 ADC channel out of range: {channel}"
                )));
            }
            let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, 1_000_000, Mode::Mode0)
                .map_err(|e| MonitorError::driver_error("mq131", e.to_string()))?;
            tracing::info!("MQ131 initialized on ADC channel {channel}");
            Ok(Self { spi, channel })
        }
    }

    #[async_trait]
    impl SensorDriver for Mq131 {
        fn name(&self) -> &'static str {
            "mq131"
        }

        async fn read(&mut self) -> Result<SensorValues> {
            let request = adc_request(self.channel);
            let mut reply = [0u8; 3];
            self.spi
                .transfer(&mut reply, &request)
                .map_err(|e| MonitorError::driver_error("mq131", e.to_string()))?;

            let ppb = ozone_ppb_from_adc(adc_sample(reply));
            Ok(SensorValues {
                ozone: Some((ppb * 100.0).round() / 100.0),
                ..Default::default()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_scale_sample_is_reference_voltage() {
        assert!((voltage_from_adc(1024) - 3.3).abs() < 1e-9);
        assert_eq!(voltage_from_adc(0), 0.0);
    }

    #[test]
    fn baseline_voltage_is_zero_ppb() {
        assert_eq!(ozone_ppb_from_voltage(0.4), 0.0);
    }

    #[test]
    fn sub_baseline_voltage_clamps_to_zero() {
        assert_eq!(ozone_ppb_from_voltage(0.1), 0.0);
    }

    #[test]
    fn conversion_is_linear_above_baseline() {
        // 0.6V -> (0.6 - 0.4) * 500 = 100 ppb
        assert!((ozone_ppb_from_voltage(0.6) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn adc_request_encodes_channel() {
        assert_eq!(adc_request(0), [1, 0x80, 0]);
        assert_eq!(adc_request(5), [1, 0xD0, 0]);
    }

    #[test]
    fn adc_sample_masks_to_ten_bits() {
        assert_eq!(adc_sample([0xFF, 0xFF, 0xFF]), 1023);
        assert_eq!(adc_sample([0x00, 0x02, 0x01]), 513);
    }
}
