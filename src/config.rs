//! Monitor configuration loaded from a JSON file.
//!
//! The configuration mirrors the layout of `config.json`: a `sensors`
//! section with one entry per supported sensor, an `alerts` section with
//! per-metric thresholds, and `logging`/`display` sections. Missing fields
//! fall back to the documented defaults and unknown fields are ignored, so
//! a partial or absent config file is always usable. The configuration is
//! loaded once at startup and read-only afterwards.

use crate::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Top-level monitor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Per-sensor enablement and connection parameters
    pub sensors: SensorsConfig,
    /// Per-metric alert thresholds
    pub alerts: AlertThresholds,
    /// CSV data log settings
    pub logging: LoggingConfig,
    /// Console display settings
    pub display: DisplayConfig,
}

/// Enablement and connection parameters for every supported sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    /// PMS5003 particulate sensor (UART)
    pub pms5003: SerialSensorConfig,
    /// MH-Z19 CO2 sensor (UART)
    pub mhz19: SerialSensorConfig,
    /// SGP30 VOC/eCO2 sensor (I2C)
    pub sgp30: BusSensorConfig,
    /// MQ131 ozone sensor (analog, via MCP3008 ADC)
    pub mq131: AdcSensorConfig,
    /// DHT22 temperature/humidity sensor (GPIO)
    pub dht22: PinSensorConfig,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            pms5003: SerialSensorConfig::on_port("/dev/ttyUSB0"),
            mhz19: SerialSensorConfig::on_port("/dev/ttyUSB1"),
            sgp30: BusSensorConfig::default(),
            mq131: AdcSensorConfig::default(),
            dht22: PinSensorConfig::default(),
        }
    }
}

impl SensorsConfig {
    /// Number of sensors currently enabled.
    pub fn enabled_count(&self) -> usize {
        [
            self.pms5003.enabled,
            self.mhz19.enabled,
            self.sgp30.enabled,
            self.mq131.enabled,
            self.dht22.enabled,
        ]
        .iter()
        .filter(|enabled| **enabled)
        .count()
    }
}

/// Configuration for a UART-attached sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSensorConfig {
    pub enabled: bool,
    /// Serial device path, e.g. "/dev/ttyUSB0"
    pub port: String,
    pub baud_rate: u32,
}

impl SerialSensorConfig {
    fn on_port(port: &str) -> Self {
        Self {
            enabled: true,
            port: port.to_string(),
            baud_rate: 9600,
        }
    }
}

impl Default for SerialSensorConfig {
    fn default() -> Self {
        Self::on_port("/dev/ttyUSB0")
    }
}

/// Configuration for an I2C-attached sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusSensorConfig {
    pub enabled: bool,
    /// I2C bus number
    pub bus: u8,
}

impl Default for BusSensorConfig {
    fn default() -> Self {
        Self { enabled: true, bus: 1 }
    }
}

/// Configuration for an analog sensor read through the MCP3008 ADC.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdcSensorConfig {
    pub enabled: bool,
    /// ADC channel the sensor is wired to (0-7)
    pub channel: u8,
}

impl Default for AdcSensorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            channel: 0,
        }
    }
}

/// Configuration for a sensor on a single GPIO pin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PinSensorConfig {
    pub enabled: bool,
    /// BCM pin number
    pub pin: u8,
}

impl Default for PinSensorConfig {
    fn default() -> Self {
        Self { enabled: true, pin: 4 }
    }
}

/// Per-metric alert thresholds.
///
/// A metric with no threshold configured never raises an alert. The field
/// names match the `alerts` section of `config.json` (`<metric>_threshold`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub pm1_0_threshold: Option<f64>,
    pub pm2_5_threshold: Option<f64>,
    pub pm10_threshold: Option<f64>,
    pub co2_threshold: Option<f64>,
    pub eco2_threshold: Option<f64>,
    pub tvoc_threshold: Option<f64>,
    pub ozone_threshold: Option<f64>,
    pub temperature_threshold: Option<f64>,
    pub humidity_threshold: Option<f64>,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            pm1_0_threshold: None,
            pm2_5_threshold: Some(35.0),
            pm10_threshold: None,
            co2_threshold: Some(1000.0),
            eco2_threshold: None,
            tvoc_threshold: None,
            ozone_threshold: Some(100.0),
            temperature_threshold: None,
            humidity_threshold: None,
        }
    }
}

impl AlertThresholds {
    /// Look up the configured threshold for a metric by name.
    pub fn get(&self, metric: &str) -> Option<f64> {
        match metric {
            "pm1_0" => self.pm1_0_threshold,
            "pm2_5" => self.pm2_5_threshold,
            "pm10" => self.pm10_threshold,
            "co2" => self.co2_threshold,
            "eco2" => self.eco2_threshold,
            "tvoc" => self.tvoc_threshold,
            "ozone" => self.ozone_threshold,
            "temperature" => self.temperature_threshold,
            "humidity" => self.humidity_threshold,
            _ => None,
        }
    }
}

/// CSV data log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// Sampling period in seconds
    #[serde(rename = "interval")]
    pub interval_secs: u64,
    /// Path of the CSV data log
    pub data_file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: crate::DEFAULT_INTERVAL_SECS,
            data_file: PathBuf::from(crate::DEFAULT_DATA_FILE),
        }
    }
}

/// Console display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub enabled: bool,
    /// Display backend; only "console" is built in
    #[serde(rename = "type")]
    pub kind: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            kind: "console".to_string(),
        }
    }
}

impl MonitorConfig {
    /// Load the configuration from a JSON file.
    ///
    /// A missing file is not an error: the documented defaults are used, as
    /// when running on a freshly provisioned system. An unparsable file is
    /// fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!("config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| {
            MonitorError::config_error(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Validate the configuration at startup.
    ///
    /// The only unrecoverable condition is a monitor with nothing to
    /// monitor: every sensor disabled.
    pub fn validate(&self) -> Result<()> {
        if self.sensors.enabled_count() == 0 {
            return Err(MonitorError::config_error(
                "no sensors enabled; enable at least one sensor in the config file",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_config() {
        let config = MonitorConfig::default();

        assert!(config.sensors.pms5003.enabled);
        assert_eq!(config.sensors.pms5003.port, "/dev/ttyUSB0");
        assert_eq!(config.sensors.mhz19.port, "/dev/ttyUSB1");
        assert_eq!(config.sensors.mq131.channel, 0);
        assert_eq!(config.sensors.dht22.pin, 4);
        assert_eq!(config.sensors.enabled_count(), 5);

        assert_eq!(config.alerts.pm2_5_threshold, Some(35.0));
        assert_eq!(config.alerts.co2_threshold, Some(1000.0));
        assert_eq!(config.alerts.ozone_threshold, Some(100.0));
        assert_eq!(config.alerts.tvoc_threshold, None);

        assert!(config.logging.enabled);
        assert_eq!(config.logging.interval_secs, 60);
        assert_eq!(config.logging.data_file, PathBuf::from("air_quality_data.csv"));

        assert!(config.display.enabled);
        assert_eq!(config.display.kind, "console");
    }

    #[test]
    fn empty_json_yields_defaults() {
        let config: MonitorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.sensors.enabled_count(), 5);
        assert_eq!(config.alerts.co2_threshold, Some(1000.0));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let json = r#"{
            "sensors": {"pms5003": {"enabled": false, "led_color": "green"}},
            "future_section": {"x": 1}
        }"#;
        let config: MonitorConfig = serde_json::from_str(json).unwrap();
        assert!(!config.sensors.pms5003.enabled);
        assert!(config.sensors.mhz19.enabled);
        assert_eq!(config.sensors.enabled_count(), 4);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let json = r#"{
            "alerts": {"co2_threshold": 800},
            "logging": {"interval": 10}
        }"#;
        let config: MonitorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.alerts.co2_threshold, Some(800.0));
        assert_eq!(config.alerts.pm2_5_threshold, Some(35.0));
        assert_eq!(config.logging.interval_secs, 10);
        assert!(config.logging.enabled);
    }

    #[test]
    fn threshold_lookup_by_metric_name() {
        let thresholds = AlertThresholds::default();
        assert_eq!(thresholds.get("co2"), Some(1000.0));
        assert_eq!(thresholds.get("tvoc"), None);
        assert_eq!(thresholds.get("not_a_metric"), None);
    }

    #[test]
    fn all_sensors_disabled_is_fatal() {
        let json = r#"{
            "sensors": {
                "pms5003": {"enabled": false},
                "mhz19": {"enabled": false},
                "sgp30": {"enabled": false},
                "mq131": {"enabled": false},
                "dht22": {"enabled": false}
            }
        }"#;
        let config: MonitorConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = MonitorConfig::load("/nonexistent/airiq-config.json").unwrap();
        assert_eq!(config.sensors.enabled_count(), 5);
    }
}
