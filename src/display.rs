//! Console display of each sampling cycle.

use crate::aqi::Evaluation;
use crate::config::DisplayConfig;
use crate::sampling::reading::Reading;
use std::fmt::Write;

/// Render one cycle as the console status block.
pub fn render(reading: &Reading, evaluation: &Evaluation) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "Air Quality Monitor - {}",
        reading.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "{rule}");

    if let Some(aqi) = &evaluation.aqi {
        let _ = writeln!(out, "AIR QUALITY INDEX: {} - {}", aqi.value, aqi.category);
    }

    let rows: [(&str, Option<f64>, &str); 9] = [
        ("PM1.0", reading.pm1_0, "ug/m3"),
        ("PM2.5", reading.pm2_5, "ug/m3"),
        ("PM10", reading.pm10, "ug/m3"),
        ("CO2", reading.co2, "ppm"),
        ("eCO2", reading.eco2, "ppm"),
        ("TVOC", reading.tvoc, "ppb"),
        ("Ozone", reading.ozone, "ppb"),
        ("Temperature", reading.temperature, "C"),
        ("Humidity", reading.humidity, "%"),
    ];

    for (label, value, unit) in rows {
        match value {
            Some(v) => {
                let _ = writeln!(out, "  {label:<12} {v:>8.1} {unit}");
            }
            None => {
                let _ = writeln!(out, "  {label:<12} {:>8} {unit}", "--");
            }
        }
    }

    if evaluation.has_alerts() {
        let _ = writeln!(out, "ALERTS:");
        for alert in &evaluation.alerts {
            let _ = writeln!(
                out,
                "  HIGH {}: {} (threshold {})",
                alert.metric, alert.value, alert.threshold
            );
        }
    } else {
        let _ = writeln!(out, "All readings within normal ranges");
    }

    let _ = writeln!(out, "{rule}");
    out
}

/// Console display backend, enabled and selected by configuration.
#[derive(Debug, Clone)]
pub struct ConsoleDisplay {
    enabled: bool,
}

impl ConsoleDisplay {
    pub fn from_config(config: &DisplayConfig) -> Self {
        let enabled = config.enabled && config.kind == "console";
        if config.enabled && !enabled {
            tracing::warn!(
                "display type '{}' is not built in, console display disabled",
                config.kind
            );
        }
        Self { enabled }
    }

    /// Print the cycle block, when the console display is enabled.
    pub fn show(&self, reading: &Reading, evaluation: &Evaluation) {
        if self.enabled {
            println!("{}", render(reading, evaluation));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aqi::evaluate;
    use crate::config::AlertThresholds;
    use chrono::Utc;

    #[test]
    fn render_includes_values_and_placeholders() {
        let mut reading = Reading::new(Utc::now());
        reading.pm2_5 = Some(15.2);
        reading.co2 = Some(450.0);
        let evaluation = evaluate(&reading, &AlertThresholds::default());

        let block = render(&reading, &evaluation);
        assert!(block.contains("AIR QUALITY INDEX"));
        assert!(block.contains("15.2"));
        assert!(block.contains("450.0"));
        assert!(block.contains("--")); // absent metrics show a placeholder
        assert!(block.contains("All readings within normal ranges"));
    }

    #[test]
    fn render_lists_active_alerts() {
        let mut reading = Reading::new(Utc::now());
        reading.co2 = Some(1500.0);
        let evaluation = evaluate(&reading, &AlertThresholds::default());

        let block = render(&reading, &evaluation);
        assert!(block.contains("ALERTS:"));
        assert!(block.contains("HIGH co2: 1500 (threshold 1000)"));
    }

    #[test]
    fn non_console_display_is_disabled() {
        let config = DisplayConfig {
            enabled: true,
            kind: "oled".to_string(),
        };
        let display = ConsoleDisplay::from_config(&config);
        assert!(!display.enabled);
    }
}
