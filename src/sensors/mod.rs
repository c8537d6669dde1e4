//! Sensor drivers and the uniform capability interface over them.
//!
//! Each physical sensor gets one adapter implementing [`SensorDriver`];
//! the sampling loop only ever sees the trait. Which adapters exist is
//! decided by the configuration, and demo mode substitutes the simulated
//! set from [`sim`] behind the same interface. The hardware-backed
//! adapters need the `hardware` feature (rppal); their wire-format
//! decoding is plain code and compiled unconditionally.

pub mod dht22;
pub mod mhz19;
pub mod mq131;
pub mod pms5003;
pub mod sgp30;
pub mod sim;

use crate::config::SensorsConfig;
use crate::error::Result;
use async_trait::async_trait;

/// The metric values one driver produced in one cycle.
///
/// Drivers fill in only the fields their sensor measures; the sampling
/// loop merges the partial structs into a complete reading.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorValues {
    pub pm1_0: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub co2: Option<f64>,
    pub eco2: Option<f64>,
    pub tvoc: Option<f64>,
    pub ozone: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

/// Uniform read interface over one physical (or simulated) sensor.
#[async_trait]
pub trait SensorDriver: Send {
    /// Short sensor name used in logs, e.g. "pms5003".
    fn name(&self) -> &'static str;

    /// Read the sensor once.
    ///
    /// A failed read is an ordinary error: the sampling loop records the
    /// affected metrics as absent for the cycle and keeps going.
    async fn read(&mut self) -> Result<SensorValues>;
}

/// Build the driver set selected by the configuration.
///
/// With `demo` set, every enabled sensor gets its simulated stand-in.
/// Otherwise hardware adapters are constructed; a sensor whose bus cannot
/// be opened is skipped with a warning rather than aborting startup, the
/// same way a monitor with one unplugged sensor keeps running.
pub fn build_drivers(config: &SensorsConfig, demo: bool) -> Result<Vec<Box<dyn SensorDriver>>> {
    if demo {
        return Ok(sim::build_demo_drivers(config));
    }

    build_hardware_drivers(config)
}

#[cfg(feature = "hardware")]
fn build_hardware_drivers(config: &SensorsConfig) -> Result<Vec<Box<dyn SensorDriver>>> {
    let mut drivers: Vec<Box<dyn SensorDriver>> = Vec::new();

    if config.pms5003.enabled {
        match pms5003::Pms5003::open(&config.pms5003.port, config.pms5003.baud_rate) {
            Ok(driver) => drivers.push(Box::new(driver)),
            Err(e) => tracing::warn!("failed to initialize PMS5003: {e}"),
        }
    }

    if config.mhz19.enabled {
        match mhz19::Mhz19::open(&config.mhz19.port, config.mhz19.baud_rate) {
            Ok(driver) => drivers.push(Box::new(driver)),
            Err(e) => tracing::warn!("failed to initialize MH-Z19: {e}"),
        }
    }

    if config.sgp30.enabled {
        match sgp30::Sgp30::open(config.sgp30.bus) {
            Ok(driver) => drivers.push(Box::new(driver)),
            Err(e) => tracing::warn!("failed to initialize SGP30: {e}"),
        }
    }

    if config.mq131.enabled {
        match mq131::Mq131::open(config.mq131.channel) {
            Ok(driver) => drivers.push(Box::new(driver)),
            Err(e) => tracing::warn!("failed to initialize MQ131: {e}"),
        }
    }

    if config.dht22.enabled {
        match dht22::Dht22::open(config.dht22.pin) {
            Ok(driver) => drivers.push(Box::new(driver)),
            Err(e) => tracing::warn!("failed to initialize DHT22: {e}"),
        }
    }

    tracing::info!("initialized {} of {} enabled sensors", drivers.len(), config.enabled_count());
    Ok(drivers)
}

#[cfg(not(feature = "hardware"))]
fn build_hardware_drivers(_config: &SensorsConfig) -> Result<Vec<Box<dyn SensorDriver>>> {
    Err(crate::error::MonitorError::config_error(
        "built without the `hardware` feature; rebuild with --features hardware \
         on a Raspberry Pi, or run with --demo",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SensorsConfig;

    #[test]
    fn demo_drivers_cover_enabled_sensors() {
        let config = SensorsConfig::default();
        let drivers = build_drivers(&config, true).unwrap();
        assert_eq!(drivers.len(), 5);
    }

    #[test]
    fn demo_drivers_skip_disabled_sensors() {
        let mut config = SensorsConfig::default();
        config.pms5003.enabled = false;
        config.dht22.enabled = false;
        let drivers = build_drivers(&config, true).unwrap();
        assert_eq!(drivers.len(), 3);

        let names: Vec<_> = drivers.iter().map(|d| d.name()).collect();
        assert!(!names.contains(&"pms5003"));
        assert!(!names.contains(&"dht22"));
        assert!(names.contains(&"mhz19"));
    }

    #[cfg(not(feature = "hardware"))]
    #[test]
    fn hardware_drivers_require_the_feature() {
        let config = SensorsConfig::default();
        assert!(build_drivers(&config, false).is_err());
    }
}
