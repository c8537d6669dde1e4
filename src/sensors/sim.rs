//! Simulated sensor drivers for demo mode.
//!
//! Each simulated driver satisfies the same [`SensorDriver`] interface as
//! its hardware counterpart and produces smoothly varying values around a
//! realistic baseline, so the dashboard, alerting, and CSV log can be
//! exercised on any machine without wiring up a single sensor.

use super::{SensorDriver, SensorValues};
use crate::config::SensorsConfig;
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::f64::consts::TAU;

/// A slow sine oscillation around a baseline, clamped to non-negative.
///
/// Deterministic on wall-clock time: two monitors started together would
/// show the same curves, which is exactly what a demo wants.
#[derive(Debug, Clone, Copy)]
pub struct Waveform {
    base: f64,
    amplitude: f64,
    period_secs: f64,
    phase: f64,
}

impl Waveform {
    pub const fn new(base: f64, amplitude: f64, period_secs: f64, phase: f64) -> Self {
        Self {
            base,
            amplitude,
            period_secs,
            phase,
        }
    }

    /// Sample the waveform at an absolute time in seconds.
    pub fn value_at(&self, epoch_secs: f64) -> f64 {
        let angle = TAU * (epoch_secs / self.period_secs + self.phase);
        let value = self.base + self.amplitude * angle.sin();
        (value.max(0.0) * 10.0).round() / 10.0
    }

    fn sample(&self) -> f64 {
        self.value_at(Utc::now().timestamp_millis() as f64 / 1000.0)
    }
}

// Baselines and swings match the original demo profile.
const PM1_0: Waveform = Waveform::new(10.0, 6.0, 540.0, 0.10);
const PM2_5: Waveform = Waveform::new(15.0, 10.0, 600.0, 0.00);
const PM10: Waveform = Waveform::new(25.0, 15.0, 660.0, 0.25);
const CO2: Waveform = Waveform::new(450.0, 100.0, 900.0, 0.40);
const ECO2: Waveform = Waveform::new(420.0, 80.0, 780.0, 0.65);
const TVOC: Waveform = Waveform::new(50.0, 30.0, 480.0, 0.80);
const OZONE: Waveform = Waveform::new(30.0, 20.0, 720.0, 0.55);
const TEMPERATURE: Waveform = Waveform::new(22.0, 5.0, 1800.0, 0.30);
const HUMIDITY: Waveform = Waveform::new(45.0, 15.0, 1500.0, 0.70);

/// Simulated PMS5003: particulate concentrations.
pub struct SimPms5003;

#[async_trait]
impl SensorDriver for SimPms5003 {
    fn name(&self) -> &'static str {
        "pms5003"
    }

    async fn read(&mut self) -> Result<SensorValues> {
        Ok(SensorValues {
            pm1_0: Some(PM1_0.sample()),
            pm2_5: Some(PM2_5.sample()),
            pm10: Some(PM10.sample()),
            ..Default::default()
        })
    }
}

/// Simulated MH-Z19: CO2 concentration.
pub struct SimMhz19;

#[async_trait]
impl SensorDriver for SimMhz19 {
    fn name(&self) -> &'static str {
        "mhz19"
    }

    async fn read(&mut self) -> Result<SensorValues> {
        Ok(SensorValues {
            co2: Some(CO2.sample()),
            ..Default::default()
        })
    }
}

/// Simulated SGP30: eCO2 and TVOC.
pub struct SimSgp30;

#[async_trait]
impl SensorDriver for SimSgp30 {
    fn name(&self) -> &'static str {
        "sgp30"
    }

    async fn read(&mut self) -> Result<SensorValues> {
        Ok(SensorValues {
            eco2: Some(ECO2.sample()),
            tvoc: Some(TVOC.sample()),
            ..Default::default()
        })
    }
}

/// Simulated MQ131: ozone concentration.
pub struct SimMq131;

#[async_trait]
impl SensorDriver for SimMq131 {
    fn name(&self) -> &'static str {
        "mq131"
    }

    async fn read(&mut self) -> Result<SensorValues> {
        Ok(SensorValues {
            ozone: Some(OZONE.sample()),
            ..Default::default()
        })
    }
}

/// Simulated DHT22: temperature and humidity.
pub struct SimDht22;

#[async_trait]
impl SensorDriver for SimDht22 {
    fn name(&self) -> &'static str {
        "dht22"
    }

    async fn read(&mut self) -> Result<SensorValues> {
        Ok(SensorValues {
            temperature: Some(TEMPERATURE.sample()),
            humidity: Some(HUMIDITY.sample()),
            ..Default::default()
        })
    }
}

/// Build the simulated stand-in for every enabled sensor.
pub fn build_demo_drivers(config: &SensorsConfig) -> Vec<Box<dyn SensorDriver>> {
    let mut drivers: Vec<Box<dyn SensorDriver>> = Vec::new();
    if config.pms5003.enabled {
        drivers.push(Box::new(SimPms5003));
    }
    if config.mhz19.enabled {
        drivers.push(Box::new(SimMhz19));
    }
    if config.sgp30.enabled {
        drivers.push(Box::new(SimSgp30));
    }
    if config.mq131.enabled {
        drivers.push(Box::new(SimMq131));
    }
    if config.dht22.enabled {
        drivers.push(Box::new(SimDht22));
    }
    drivers
}
