//! AirIQ - DIY Air Quality Monitor Binary
//!
//! A standalone binary for Raspberry Pi air quality monitoring with CSV
//! logging and a web dashboard.

use airiq::{
    build_drivers, evaluate, AppState, ConsoleDisplay, CsvStore, LatestReading, MonitorConfig,
    Pipeline, Sampler, WebConfig, DEFAULT_CONFIG_FILE, DEFAULT_WEB_PORT,
};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "airiq")]
#[command(about = "AirIQ - DIY Air Quality Monitor for Raspberry Pi")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "AirIQ Project")]
#[command(long_about = "Monitors PM2.5, CO2, VOC, ozone, temperature & humidity, \
logs readings to CSV, and serves a live web dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Web server bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Web server port
    #[arg(short, long, default_value_t = DEFAULT_WEB_PORT)]
    port: u16,

    /// Sampling interval in seconds (overrides the config file)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Use simulated sensors instead of real hardware
    #[arg(long)]
    demo: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitoring loop and web dashboard (default)
    Serve(ServeArgs),

    /// Run a single sampling cycle and exit
    Sample(SampleArgs),

    /// Show the configured sensors and thresholds
    Sensors,
}

#[derive(Args)]
struct ServeArgs {
    /// Static files directory (optional)
    #[arg(long)]
    static_dir: Option<String>,

    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,

    /// Maximum WebSocket connections
    #[arg(long, default_value_t = 100)]
    max_connections: usize,

    /// Stop sampling after this many seconds (useful in demo mode)
    #[arg(long)]
    duration: Option<u64>,
}

#[derive(Args)]
struct SampleArgs {
    /// Output format: json or pretty
    #[arg(short, long, default_value = "pretty")]
    format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging
    init_logging(&cli)?;

    // Print banner
    print_banner();

    match &cli.command {
        Some(Commands::Serve(args)) => {
            serve_command(&cli, args).await?;
        }
        Some(Commands::Sample(args)) => {
            sample_command(&cli, args).await?;
        }
        Some(Commands::Sensors) => {
            sensors_command(&cli)?;
        }
        None => {
            // Default to serve command
            let serve_args = ServeArgs {
                static_dir: None,
                no_cors: false,
                max_connections: 100,
                duration: None,
            };
            serve_command(&cli, &serve_args).await?;
        }
    }

    Ok(())
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    Ok(())
}

fn print_banner() {
    println!("AirIQ - DIY Air Quality Monitor");
    println!("   Version: {}", env!("CARGO_PKG_VERSION"));
    println!("   PM2.5 | CO2 | VOC | Ozone | Temperature | Humidity");
    println!();
}

fn load_config(cli: &Cli) -> anyhow::Result<MonitorConfig> {
    let config = MonitorConfig::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config))?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn serve_command(cli: &Cli, args: &ServeArgs) -> anyhow::Result<()> {
    info!("Starting AirIQ monitor...");

    let config = load_config(cli)?;

    let drivers = build_drivers(&config.sensors, cli.demo)?;
    info!(
        "{} sensor drivers active ({} enabled in config)",
        drivers.len(),
        config.sensors.enabled_count()
    );

    let interval_secs = cli.interval.unwrap_or(config.logging.interval_secs);
    let readings = Sampler::new(drivers).into_stream(Duration::from_secs(interval_secs));
    info!("Started sampling with {}s interval", interval_secs);

    let store = CsvStore::new(&config.logging.data_file);
    let latest = LatestReading::new();
    let display = ConsoleDisplay::from_config(&config.display);

    let pipeline = Pipeline {
        store: store.clone(),
        thresholds: config.alerts.clone(),
        display,
        latest: latest.clone(),
        logging_enabled: config.logging.enabled,
        duration: args.duration.map(Duration::from_secs),
    };
    let pipeline_task = tokio::spawn(pipeline.run(readings));

    // Configure web server
    let mut web_config = WebConfig::new(&cli.host, cli.port);

    if let Some(static_dir) = &args.static_dir {
        web_config = web_config.with_static_path(Some(static_dir.clone()));
        info!("Using static files from: {}", static_dir);
    }

    web_config = web_config
        .with_cors(!args.no_cors)
        .with_max_websocket_connections(args.max_connections);

    if cli.demo {
        info!("Demo mode: simulated sensors active");
    }

    info!("Web server configuration:");
    info!("  - Bind address: {}:{}", cli.host, cli.port);
    info!("  - CORS enabled: {}", !args.no_cors);
    info!("  - Max WebSocket connections: {}", args.max_connections);
    info!("  - Data log: {}", config.logging.data_file.display());

    let state = AppState {
        latest,
        store: Arc::new(store),
    };

    info!("Starting web server...");
    tokio::select! {
        result = airiq::start_web_server(web_config, state) => {
            result?;
        }
        _ = pipeline_task => {
            info!("Sampling loop finished, shutting down");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received ctrl-c, shutting down");
        }
    }

    Ok(())
}

async fn sample_command(cli: &Cli, args: &SampleArgs) -> anyhow::Result<()> {
    let config = load_config(cli)?;

    let drivers = build_drivers(&config.sensors, cli.demo)?;
    let mut sampler = Sampler::new(drivers);
    let reading = sampler.sample().await;
    let evaluation = evaluate(&reading, &config.alerts);

    match args.format.as_str() {
        "json" => {
            let body = serde_json::json!({
                "readings": reading,
                "aqi": evaluation.aqi,
                "alerts": evaluation.alerts,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        "pretty" => {
            print!("{}", airiq::display::render(&reading, &evaluation));
        }
        _ => {
            error!("Unsupported format: {}. Use 'json' or 'pretty'", args.format);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn sensors_command(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;

    println!("AirIQ Configured Sensors");
    println!("========================");
    println!();

    let sensors = &config.sensors;
    println!(
        "  pms5003  (PM1.0/PM2.5/PM10)       {}  port: {} @ {} baud",
        enabled_marker(sensors.pms5003.enabled),
        sensors.pms5003.port,
        sensors.pms5003.baud_rate
    );
    println!(
        "  mhz19    (CO2)                    {}  port: {} @ {} baud",
        enabled_marker(sensors.mhz19.enabled),
        sensors.mhz19.port,
        sensors.mhz19.baud_rate
    );
    println!(
        "  sgp30    (eCO2/TVOC)              {}  i2c bus: {}",
        enabled_marker(sensors.sgp30.enabled),
        sensors.sgp30.bus
    );
    println!(
        "  mq131    (Ozone)                  {}  adc channel: {}",
        enabled_marker(sensors.mq131.enabled),
        sensors.mq131.channel
    );
    println!(
        "  dht22    (Temperature/Humidity)   {}  gpio pin: {}",
        enabled_marker(sensors.dht22.enabled),
        sensors.dht22.pin
    );

    println!();
    println!("Alert thresholds:");
    for metric in airiq::PARAMETERS {
        if let Some(threshold) = config.alerts.get(metric) {
            println!("  {metric:<12} >= {threshold}");
        }
    }

    println!();
    println!(
        "Logging: {} every {}s to {}",
        if config.logging.enabled { "enabled" } else { "disabled" },
        config.logging.interval_secs,
        config.logging.data_file.display()
    );

    Ok(())
}

fn enabled_marker(enabled: bool) -> &'static str {
    if enabled {
        "enabled "
    } else {
        "disabled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        use clap::Parser;

        let cli = Cli::try_parse_from(["airiq", "--port", "9090", "--demo"]).unwrap();
        assert_eq!(cli.port, 9090);
        assert!(cli.demo);
    }

    #[test]
    fn test_default_values() {
        use clap::Parser;

        let cli = Cli::try_parse_from(["airiq"]).unwrap();
        assert_eq!(cli.port, DEFAULT_WEB_PORT);
        assert_eq!(cli.config, DEFAULT_CONFIG_FILE);
        assert_eq!(cli.host, "0.0.0.0");
        assert_eq!(cli.interval, None);
        assert!(!cli.demo);
    }

    #[test]
    fn test_serve_duration_flag() {
        use clap::Parser;

        let cli = Cli::try_parse_from(["airiq", "serve", "--duration", "30"]).unwrap();
        match cli.command {
            Some(Commands::Serve(args)) => assert_eq!(args.duration, Some(30)),
            _ => panic!("expected serve command"),
        }
    }
}
