//! # AirIQ - DIY Air Quality Monitor
//!
//! A Rust crate for a Raspberry Pi air quality monitor: periodic
//! multi-sensor sampling, AQI derivation, threshold alerting, CSV data
//! logging, and a live web dashboard.
//!
//! ## Features
//!
//! - **Multi-sensor sampling**: PMS5003, MH-Z19, SGP30, MQ131 and DHT22
//!   behind one driver interface, with per-sensor failure isolation
//! - **AQI and alerts**: PM2.5-derived Air Quality Index plus per-metric
//!   thresholds
//! - **CSV data log**: append-only history that doubles as the chart
//!   backend
//! - **Web dashboard**: REST API and WebSocket streaming via axum
//! - **Demo mode**: simulated sensors for development on any machine
//! - **Library + Binary**: use as a crate or standalone application
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use airiq::{build_drivers, MonitorConfig, Sampler};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MonitorConfig::load("config.json")?;
//!     config.validate()?;
//!
//!     let drivers = build_drivers(&config.sensors, true)?;
//!     let readings = Sampler::new(drivers).into_stream(Duration::from_secs(60));
//!     // consume the reading stream...
//!     Ok(())
//! }
//! ```

pub mod aqi;
pub mod config;
pub mod display;
pub mod error;
pub mod sampling;
pub mod sensors;
pub mod state;
pub mod storage;
pub mod web;

// Re-export public API
pub use aqi::{aqi_from_pm2_5, evaluate, Alert, AqiCategory, AqiReport, Evaluation};
pub use config::{AlertThresholds, LoggingConfig, MonitorConfig, SensorsConfig};
pub use display::ConsoleDisplay;
pub use error::{MonitorError, Result};
pub use sampling::{Pipeline, Reading, Sampler, PARAMETERS};
pub use sensors::{build_drivers, SensorDriver, SensorValues};
pub use state::LatestReading;
pub use storage::CsvStore;
pub use web::{start_web_server, start_web_server_simple, AppState, WebConfig};

/// The default sampling interval in seconds
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// The default web server port
pub const DEFAULT_WEB_PORT: u16 = 5000;

/// The default CSV data log path
pub const DEFAULT_DATA_FILE: &str = "air_quality_data.csv";

/// The default configuration file path
pub const DEFAULT_CONFIG_FILE: &str = "config.json";
