//! AQI derivation and threshold alerting.
//!
//! Both operations are pure functions of a reading plus the configured
//! thresholds; nothing here holds state.

use crate::config::AlertThresholds;
use crate::sampling::reading::{Reading, PARAMETERS};
use serde::{Deserialize, Serialize};

/// EPA-style Air Quality Index category derived from PM2.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    UnhealthyForSensitiveGroups,
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    /// Human-readable category label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }

    /// Dashboard color for this category.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Good => "#00e400",
            Self::Moderate => "#ffff00",
            Self::UnhealthyForSensitiveGroups => "#ff7e00",
            Self::Unhealthy => "#ff0000",
            Self::VeryUnhealthy => "#8f3f97",
            Self::Hazardous => "#7e0023",
        }
    }
}

impl std::fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The derived index value and category for one reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AqiReport {
    /// Numeric AQI value
    pub value: u32,
    /// Category the PM2.5 concentration falls into
    pub category: AqiCategory,
    /// Dashboard color for the category
    pub color: &'static str,
}

// PM2.5 breakpoints (μg/m³) and the AQI band each maps onto. A
// concentration exactly on a boundary belongs to the lower, cleaner
// category.
const BREAKPOINTS: [(f64, f64, f64, f64, AqiCategory); 5] = [
    (0.0, 12.0, 0.0, 50.0, AqiCategory::Good),
    (12.0, 35.4, 50.0, 100.0, AqiCategory::Moderate),
    (35.4, 55.4, 100.0, 150.0, AqiCategory::UnhealthyForSensitiveGroups),
    (55.4, 150.4, 150.0, 200.0, AqiCategory::Unhealthy),
    (150.4, 250.4, 200.0, 300.0, AqiCategory::VeryUnhealthy),
];

/// Derive the AQI from a PM2.5 concentration in μg/m³.
///
/// Total over all non-negative concentrations; negative inputs are
/// treated as zero.
pub fn aqi_from_pm2_5(pm2_5: f64) -> AqiReport {
    let concentration = pm2_5.max(0.0);

    for (c_low, c_high, i_low, i_high, category) in BREAKPOINTS {
        if concentration <= c_high {
            let span = (concentration - c_low) / (c_high - c_low);
            let value = (i_low + span * (i_high - i_low)) as u32;
            return AqiReport {
                value,
                category,
                color: category.color(),
            };
        }
    }

    // Beyond the last breakpoint everything is hazardous.
    let value = (300.0 + (concentration - 250.4) * 100.0 / 99.6) as u32;
    AqiReport {
        value,
        category: AqiCategory::Hazardous,
        color: AqiCategory::Hazardous.color(),
    }
}

/// One metric crossing its configured threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    /// Metric name, e.g. "co2"
    pub metric: &'static str,
    /// The measured value
    pub value: f64,
    /// The threshold it reached
    pub threshold: f64,
}

/// What one sampling cycle derived: the AQI (when PM2.5 was measured)
/// and every metric currently at or above its threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub aqi: Option<AqiReport>,
    pub alerts: Vec<Alert>,
}

impl Evaluation {
    /// Whether any metric is alerting.
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }
}

/// Compare every present metric against its configured threshold.
///
/// A metric alerts when a value was measured this cycle and it is at or
/// above the threshold; absent values never alert, whatever the
/// threshold.
pub fn evaluate_alerts(reading: &Reading, thresholds: &AlertThresholds) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for metric in PARAMETERS {
        let (Some(threshold), Some(value)) = (thresholds.get(metric), reading.value(metric))
        else {
            continue;
        };
        if value >= threshold {
            alerts.push(Alert {
                metric,
                value,
                threshold,
            });
        }
    }

    alerts
}

/// Run the full per-cycle evaluation: AQI plus alert flags.
pub fn evaluate(reading: &Reading, thresholds: &AlertThresholds) -> Evaluation {
    Evaluation {
        aqi: reading.pm2_5.map(aqi_from_pm2_5),
        alerts: evaluate_alerts(reading, thresholds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn boundary_values_map_to_lower_category() {
        assert_eq!(aqi_from_pm2_5(12.0).category, AqiCategory::Good);
        assert_eq!(aqi_from_pm2_5(35.4).category, AqiCategory::Moderate);
        assert_eq!(
            aqi_from_pm2_5(55.4).category,
            AqiCategory::UnhealthyForSensitiveGroups
        );
        assert_eq!(aqi_from_pm2_5(150.4).category, AqiCategory::Unhealthy);
        assert_eq!(aqi_from_pm2_5(250.4).category, AqiCategory::VeryUnhealthy);
    }

    #[test]
    fn just_past_boundary_moves_up_a_category() {
        assert_eq!(aqi_from_pm2_5(12.1).category, AqiCategory::Moderate);
        assert_eq!(
            aqi_from_pm2_5(35.5).category,
            AqiCategory::UnhealthyForSensitiveGroups
        );
        assert_eq!(aqi_from_pm2_5(250.5).category, AqiCategory::Hazardous);
    }

    #[test]
    fn documented_examples() {
        assert_eq!(
            aqi_from_pm2_5(40.0).category,
            AqiCategory::UnhealthyForSensitiveGroups
        );
        assert_eq!(aqi_from_pm2_5(12.0).category, AqiCategory::Good);
        assert_eq!(aqi_from_pm2_5(300.0).category, AqiCategory::Hazardous);
    }

    #[test]
    fn assignment_is_total_over_non_negative_inputs() {
        // Sweep a dense grid; every concentration must land in exactly one
        // category and the index must never decrease.
        let mut last_value = 0;
        for step in 0..40_000 {
            let concentration = step as f64 * 0.01;
            let report = aqi_from_pm2_5(concentration);
            assert!(report.value >= last_value, "index decreased at {concentration}");
            last_value = report.value;
        }
    }

    #[test]
    fn index_values_at_anchors() {
        assert_eq!(aqi_from_pm2_5(0.0).value, 0);
        assert_eq!(aqi_from_pm2_5(12.0).value, 50);
        assert_eq!(aqi_from_pm2_5(35.4).value, 100);
        assert_eq!(aqi_from_pm2_5(55.4).value, 150);
        assert_eq!(aqi_from_pm2_5(150.4).value, 200);
        assert_eq!(aqi_from_pm2_5(250.4).value, 300);
    }

    #[test]
    fn negative_concentration_is_treated_as_zero() {
        let report = aqi_from_pm2_5(-3.0);
        assert_eq!(report.category, AqiCategory::Good);
        assert_eq!(report.value, 0);
    }

    fn reading_with(co2: Option<f64>) -> Reading {
        let mut reading = Reading::new(Utc::now());
        reading.co2 = co2;
        reading
    }

    #[test]
    fn value_at_threshold_alerts() {
        let thresholds = AlertThresholds::default();
        let alerts = evaluate_alerts(&reading_with(Some(1000.0)), &thresholds);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].metric, "co2");
        assert_eq!(alerts[0].threshold, 1000.0);
    }

    #[test]
    fn value_below_threshold_does_not_alert() {
        let thresholds = AlertThresholds::default();
        let alerts = evaluate_alerts(&reading_with(Some(999.0)), &thresholds);
        assert!(alerts.is_empty());
    }

    #[test]
    fn absent_value_never_alerts() {
        let mut thresholds = AlertThresholds::default();
        thresholds.co2_threshold = Some(0.0);
        let alerts = evaluate_alerts(&reading_with(None), &thresholds);
        assert!(alerts.is_empty());
    }

    #[test]
    fn unconfigured_threshold_never_alerts() {
        let thresholds = AlertThresholds::default();
        let mut reading = reading_with(None);
        reading.tvoc = Some(100_000.0);
        let alerts = evaluate_alerts(&reading, &thresholds);
        assert!(alerts.is_empty());
    }

    #[test]
    fn evaluation_includes_aqi_only_when_pm2_5_present() {
        let thresholds = AlertThresholds::default();

        let evaluation = evaluate(&reading_with(Some(500.0)), &thresholds);
        assert!(evaluation.aqi.is_none());

        let mut reading = reading_with(None);
        reading.pm2_5 = Some(40.0);
        let evaluation = evaluate(&reading, &thresholds);
        assert_eq!(
            evaluation.aqi.unwrap().category,
            AqiCategory::UnhealthyForSensitiveGroups
        );
        // 40 μg/m³ is above the 35 μg/m³ particulate threshold.
        assert!(evaluation.has_alerts());
    }
}
