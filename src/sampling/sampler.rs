//! Core sampling loop implementation.

use crate::aqi::evaluate;
use crate::config::AlertThresholds;
use crate::display::ConsoleDisplay;
use crate::sampling::reading::Reading;
use crate::sensors::SensorDriver;
use crate::state::LatestReading;
use crate::storage::CsvStore;
use crate::web::websocket;
use chrono::{DateTime, Utc};
use futures_util::stream::{self, BoxStream};
use std::time::Duration;
use tokio::time::{self, Instant};
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

/// Polls every configured driver once per cycle and assembles readings.
pub struct Sampler {
    drivers: Vec<Box<dyn SensorDriver>>,
    last_timestamp: Option<DateTime<Utc>>,
    cycles: u64,
}

impl Sampler {
    /// Create a sampler over the given driver set.
    pub fn new(drivers: Vec<Box<dyn SensorDriver>>) -> Self {
        Self {
            drivers,
            last_timestamp: None,
            cycles: 0,
        }
    }

    /// Number of completed sampling cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run one sampling cycle.
    ///
    /// Every enabled driver is read in turn; a failing driver only leaves
    /// its own metrics absent. The cycle itself never fails, and cycle
    /// timestamps are strictly increasing even against a coarse clock.
    pub async fn sample(&mut self) -> Reading {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + chrono::Duration::milliseconds(1);
            }
        }
        self.last_timestamp = Some(now);

        let mut reading = Reading::new(now);
        for driver in &mut self.drivers {
            match driver.read().await {
                Ok(values) => reading.apply(values),
                Err(e) => warn!("no reading from {}: {}", driver.name(), e),
            }
        }

        self.cycles += 1;
        debug!("completed sampling cycle {}", self.cycles);
        reading
    }

    /// Turn this sampler into a stream of readings produced at a fixed
    /// period. The first reading is sampled immediately.
    pub fn into_stream(self, period: Duration) -> BoxStream<'static, Reading> {
        let interval = time::interval(period);

        let stream = stream::unfold(
            (self, interval),
            |(mut sampler, mut interval)| async move {
                interval.tick().await;
                let reading = sampler.sample().await;
                Some((reading, (sampler, interval)))
            },
        );

        Box::pin(stream)
    }
}

/// The per-cycle side effects of the monitoring loop: persistence, alert
/// evaluation, console display, latest-state update, and live push.
pub struct Pipeline {
    pub store: CsvStore,
    pub thresholds: AlertThresholds,
    pub display: ConsoleDisplay,
    pub latest: LatestReading,
    pub logging_enabled: bool,
    /// Stop after this long; `None` runs until shutdown.
    pub duration: Option<Duration>,
}

impl Pipeline {
    /// Drive the pipeline over a stream of readings.
    ///
    /// Per-cycle failures (a skipped log row, a broadcast with no
    /// listeners) are logged and isolated to their cycle; the loop only
    /// ends when the stream does or the configured duration elapses.
    pub async fn run(self, mut readings: BoxStream<'static, Reading>) {
        let started = Instant::now();

        while let Some(reading) = readings.next().await {
            let evaluation = evaluate(&reading, &self.thresholds);

            if self.logging_enabled {
                if let Err(e) = self.store.append(&reading) {
                    warn!("skipping this cycle's log row: {e}");
                }
            }

            for alert in &evaluation.alerts {
                warn!(
                    "ALERT: HIGH {}: {} (threshold {})",
                    alert.metric, alert.value, alert.threshold
                );
            }

            self.display.show(&reading, &evaluation);
            self.latest.update(reading.clone()).await;

            if let Err(e) = websocket::broadcast_reading(reading).await {
                warn!("failed to push reading to dashboard clients: {e}");
            }

            if let Some(limit) = self.duration {
                if started.elapsed() >= limit {
                    info!("configured sampling duration elapsed, stopping");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MonitorError, Result};
    use crate::sensors::SensorValues;
    use async_trait::async_trait;

    struct StaticDriver {
        name: &'static str,
        values: SensorValues,
    }

    #[async_trait]
    impl SensorDriver for StaticDriver {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn read(&mut self) -> Result<SensorValues> {
            Ok(self.values)
        }
    }

    struct FailingDriver;

    #[async_trait]
    impl SensorDriver for FailingDriver {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn read(&mut self) -> Result<SensorValues> {
            Err(MonitorError::driver_error("failing", "device unplugged"))
        }
    }

    #[tokio::test]
    async fn one_failing_driver_does_not_suppress_the_others() {
        let mut sampler = Sampler::new(vec![
            Box::new(StaticDriver {
                name: "pms5003",
                values: SensorValues {
                    pm2_5: Some(15.0),
                    ..Default::default()
                },
            }),
            Box::new(FailingDriver),
            Box::new(StaticDriver {
                name: "dht22",
                values: SensorValues {
                    temperature: Some(22.0),
                    humidity: Some(45.0),
                    ..Default::default()
                },
            }),
        ]);

        let reading = sampler.sample().await;
        assert_eq!(reading.pm2_5, Some(15.0));
        assert_eq!(reading.temperature, Some(22.0));
        assert_eq!(reading.humidity, Some(45.0));
        assert_eq!(reading.co2, None);
    }

    #[tokio::test]
    async fn all_drivers_failing_still_yields_a_reading() {
        let mut sampler = Sampler::new(vec![Box::new(FailingDriver), Box::new(FailingDriver)]);
        let reading = sampler.sample().await;
        assert!(reading.is_empty());
        assert_eq!(sampler.cycles(), 1);
    }

    #[tokio::test]
    async fn timestamps_strictly_increase_across_cycles() {
        let mut sampler = Sampler::new(vec![Box::new(StaticDriver {
            name: "mhz19",
            values: SensorValues {
                co2: Some(450.0),
                ..Default::default()
            },
        })]);

        let mut previous = None;
        for _ in 0..50 {
            let reading = sampler.sample().await;
            if let Some(last) = previous {
                assert!(reading.timestamp > last, "timestamps must strictly increase");
            }
            previous = Some(reading.timestamp);
        }
    }

    #[tokio::test]
    async fn stream_yields_consecutive_cycles() {
        let sampler = Sampler::new(vec![Box::new(StaticDriver {
            name: "mq131",
            values: SensorValues {
                ozone: Some(30.0),
                ..Default::default()
            },
        })]);

        let mut stream = sampler.into_stream(Duration::from_millis(10));
        let first = stream.next().await.unwrap();
        let second = stream.next().await.unwrap();
        assert_eq!(first.ozone, Some(30.0));
        assert!(second.timestamp > first.timestamp);
    }
}
