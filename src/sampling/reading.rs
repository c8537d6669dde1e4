//! The per-cycle reading record.

use crate::sensors::SensorValues;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Metric names, in the stable order used by the CSV log and the API.
pub const PARAMETERS: [&str; 9] = [
    "pm1_0",
    "pm2_5",
    "pm10",
    "co2",
    "eco2",
    "tvoc",
    "ozone",
    "temperature",
    "humidity",
];

/// One timestamped snapshot of all enabled sensor values.
///
/// Every metric field is optional: a field is absent when its sensor is
/// disabled or failed during that sampling cycle. A reading is assembled
/// once per cycle and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// When this cycle was sampled
    pub timestamp: DateTime<Utc>,
    /// PM1.0 concentration in μg/m³
    pub pm1_0: Option<f64>,
    /// PM2.5 concentration in μg/m³
    pub pm2_5: Option<f64>,
    /// PM10 concentration in μg/m³
    pub pm10: Option<f64>,
    /// CO2 concentration in ppm
    pub co2: Option<f64>,
    /// Estimated CO2 in ppm, as reported by the gas sensor
    pub eco2: Option<f64>,
    /// Total VOC in ppb
    pub tvoc: Option<f64>,
    /// Ozone concentration in ppb
    pub ozone: Option<f64>,
    /// Temperature in °C
    pub temperature: Option<f64>,
    /// Relative humidity in %
    pub humidity: Option<f64>,
}

impl Reading {
    /// Create an empty reading stamped at the given time.
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            pm1_0: None,
            pm2_5: None,
            pm10: None,
            co2: None,
            eco2: None,
            tvoc: None,
            ozone: None,
            temperature: None,
            humidity: None,
        }
    }

    /// Merge the values one driver produced into this reading.
    ///
    /// Only fields the driver actually reported are overwritten, so drivers
    /// covering disjoint metrics compose into one record.
    pub fn apply(&mut self, values: SensorValues) {
        if values.pm1_0.is_some() {
            self.pm1_0 = values.pm1_0;
        }
        if values.pm2_5.is_some() {
            self.pm2_5 = values.pm2_5;
        }
        if values.pm10.is_some() {
            self.pm10 = values.pm10;
        }
        if values.co2.is_some() {
            self.co2 = values.co2;
        }
        if values.eco2.is_some() {
            self.eco2 = values.eco2;
        }
        if values.tvoc.is_some() {
            self.tvoc = values.tvoc;
        }
        if values.ozone.is_some() {
            self.ozone = values.ozone;
        }
        if values.temperature.is_some() {
            self.temperature = values.temperature;
        }
        if values.humidity.is_some() {
            self.humidity = values.humidity;
        }
    }

    /// Look up a metric value by name.
    ///
    /// Returns `None` both for absent values and for unknown metric names;
    /// use [`PARAMETERS`] to distinguish the two.
    pub fn value(&self, parameter: &str) -> Option<f64> {
        match parameter {
            "pm1_0" => self.pm1_0,
            "pm2_5" => self.pm2_5,
            "pm10" => self.pm10,
            "co2" => self.co2,
            "eco2" => self.eco2,
            "tvoc" => self.tvoc,
            "ozone" => self.ozone,
            "temperature" => self.temperature,
            "humidity" => self.humidity,
            _ => None,
        }
    }

    /// Set a metric value by name. Returns false for unknown names.
    pub fn set_value(&mut self, parameter: &str, value: f64) -> bool {
        match parameter {
            "pm1_0" => self.pm1_0 = Some(value),
            "pm2_5" => self.pm2_5 = Some(value),
            "pm10" => self.pm10 = Some(value),
            "co2" => self.co2 = Some(value),
            "eco2" => self.eco2 = Some(value),
            "tvoc" => self.tvoc = Some(value),
            "ozone" => self.ozone = Some(value),
            "temperature" => self.temperature = Some(value),
            "humidity" => self.humidity = Some(value),
            _ => return false,
        }
        true
    }

    /// Whether every metric field is absent.
    pub fn is_empty(&self) -> bool {
        PARAMETERS.iter().all(|p| self.value(p).is_none())
    }

    /// The timestamp formatted as it appears in the CSV log.
    pub fn timestamp_string(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Render this reading as one CSV row: timestamp first, then every
    /// metric in [`PARAMETERS`] order, absent values as empty fields.
    pub fn csv_record(&self) -> Vec<String> {
        let mut record = Vec::with_capacity(1 + PARAMETERS.len());
        record.push(self.timestamp_string());
        for parameter in PARAMETERS {
            record.push(match self.value(parameter) {
                Some(v) => format!("{}", v),
                None => String::new(),
            });
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timestamp() -> DateTime<Utc> {
        "2024-03-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn new_reading_is_empty() {
        let reading = Reading::new(timestamp());
        assert!(reading.is_empty());
        for parameter in PARAMETERS {
            assert_eq!(reading.value(parameter), None);
        }
    }

    #[test]
    fn apply_merges_disjoint_driver_values() {
        let mut reading = Reading::new(timestamp());

        reading.apply(SensorValues {
            pm2_5: Some(15.2),
            pm10: Some(22.1),
            ..Default::default()
        });
        reading.apply(SensorValues {
            co2: Some(450.0),
            ..Default::default()
        });

        assert_eq!(reading.pm2_5, Some(15.2));
        assert_eq!(reading.pm10, Some(22.1));
        assert_eq!(reading.co2, Some(450.0));
        assert_eq!(reading.tvoc, None);
    }

    #[test]
    fn apply_does_not_clear_earlier_values() {
        let mut reading = Reading::new(timestamp());
        reading.apply(SensorValues {
            temperature: Some(22.5),
            ..Default::default()
        });
        reading.apply(SensorValues::default());
        assert_eq!(reading.temperature, Some(22.5));
    }

    #[test]
    fn csv_record_has_stable_column_order() {
        let mut reading = Reading::new(timestamp());
        reading.pm2_5 = Some(15.2);
        reading.co2 = Some(450.0);

        let record = reading.csv_record();
        assert_eq!(record.len(), 10);
        assert_eq!(record[0], "2024-03-01T12:00:00.000Z");
        assert_eq!(record[1], ""); // pm1_0 absent
        assert_eq!(record[2], "15.2");
        assert_eq!(record[4], "450");
        assert_eq!(record[9], ""); // humidity absent
    }

    #[test]
    fn set_value_rejects_unknown_parameter() {
        let mut reading = Reading::new(timestamp());
        assert!(reading.set_value("ozone", 30.0));
        assert!(!reading.set_value("radon", 1.0));
        assert_eq!(reading.ozone, Some(30.0));
    }

    #[test]
    fn serializes_with_absent_fields_as_null() {
        let mut reading = Reading::new(timestamp());
        reading.pm2_5 = Some(40.0);

        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["pm2_5"], 40.0);
        assert!(json["co2"].is_null());

        let back: Reading = serde_json::from_value(json).unwrap();
        assert_eq!(back, reading);
    }
}
