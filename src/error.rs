//! Error handling for the AirIQ monitoring crate.

/// A specialized `Result` type for AirIQ operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// The main error type for AirIQ monitor operations.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A sensor driver failed to produce a reading
    #[error("sensor '{sensor}' read failed: {message}")]
    Driver { sensor: &'static str, message: String },

    /// Sensor data could not be decoded
    #[error("failed to decode sensor data: {0}")]
    Decode(String),

    /// Writing to or reading from the data log failed
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Web server error
    #[error("web server error: {0}")]
    WebServer(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl MonitorError {
    /// Create a new driver error for the named sensor
    pub fn driver_error(sensor: &'static str, message: impl Into<String>) -> Self {
        Self::Driver {
            sensor,
            message: message.into(),
        }
    }

    /// Create a new decode error
    pub fn decode_error(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new persistence error
    pub fn persistence_error(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a new web server error
    pub fn web_server_error(msg: impl Into<String>) -> Self {
        Self::WebServer(msg.into())
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
