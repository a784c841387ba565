use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Text};
use std::{io::BufRead, path::PathBuf, sync::Arc, thread};
use tokio::{sync::mpsc, task::JoinError};
use tracing::{error, info, warn};
use weather_relay_core::{
    HostEvent, Location, MpscChannel, NwsProvider, OutboundMessage, RelayConfig, WeatherRelay,
    host,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-relay", version, about = "Relay current weather to a paired wearable")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the host loop: refresh on start, then once per line on stdin.
    Run {
        /// Config file to use instead of the platform default.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Don't emulate the wearable's periodic refresh request.
        #[arg(long)]
        no_schedule: bool,
    },

    /// Refresh once, print the delivered message and exit.
    Once {
        /// Config file to use instead of the platform default.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Set the location and provider endpoint interactively.
    Configure,

    /// Print where the config file lives.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Run { config, no_schedule } => {
                let cfg = load_config(config)?;
                run_host(cfg, no_schedule).await
            }
            Command::Once { config } => {
                let cfg = load_config(config)?;
                refresh_once(cfg).await
            }
            Command::Configure => configure(),
            Command::ConfigPath => {
                println!("{}", RelayConfig::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<RelayConfig> {
    match path {
        Some(path) => RelayConfig::load_from(&path),
        None => RelayConfig::load(),
    }
}

fn build_relay(cfg: &RelayConfig, channel: MpscChannel) -> anyhow::Result<Arc<WeatherRelay>> {
    let location = cfg.location()?;
    let provider = NwsProvider::new(cfg)?;

    Ok(Arc::new(WeatherRelay::new(Arc::new(provider), Arc::new(channel), location)))
}

/// One JSON line per delivered message, with the line the watch would show.
fn print_delivery(message: &OutboundMessage) -> anyhow::Result<()> {
    let line = serde_json::json!({
        "at": chrono::Local::now().to_rfc3339(),
        "message": message,
        "display": message.display_line(),
    });
    println!("{}", serde_json::to_string(&line)?);
    Ok(())
}

async fn run_host(cfg: RelayConfig, no_schedule: bool) -> anyhow::Result<()> {
    let (channel, mut delivered) = MpscChannel::new(16);
    let relay = build_relay(&cfg, channel)?;
    info!(location = %relay.location(), endpoint = %cfg.base_url, "starting weather relay");

    // Device side of the channel.
    let device = tokio::spawn(async move {
        while let Some(message) = delivered.recv().await {
            if let Err(e) = print_delivery(&message) {
                warn!(error = %e, "failed to print delivered message");
            }
        }
    });

    let (events, inbox) = mpsc::channel(16);

    if !no_schedule {
        if let Some(schedule) = cfg.schedule()? {
            info!(every_minutes = schedule.interval_minutes(), "wearable refresh schedule enabled");
            tokio::spawn(schedule.drive(events.clone()));
        }
    }

    events.send(HostEvent::Ready).await.context("host loop is not running")?;

    // Plain thread, never joined: a blocked stdin read must not hold up exit.
    let stdin_events = events.clone();
    thread::spawn(move || forward_refresh_requests(std::io::stdin().lock(), &stdin_events));
    drop(events);

    let mut dispatcher = tokio::spawn(host::run(relay, inbox));

    tokio::select! {
        finished = &mut dispatcher => {
            let started = finished.context("host loop panicked")?;
            info!(refreshes = started, "no more refresh requests, shutting down");
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for ctrl-c")?;
            info!("interrupted, shutting down");
            dispatcher.abort();
        }
    }

    // The dispatcher owned the last relay handle, so the device queue drains and closes.
    joined_cleanly("device", device.await);
    Ok(())
}

/// Log a task that panicked or was cancelled instead of dropping the error.
fn joined_cleanly(task: &str, joined: Result<(), JoinError>) -> bool {
    match joined {
        Ok(()) => true,
        Err(e) => {
            error!(task, error = %e, "task failed");
            false
        }
    }
}

/// Blocking: one `MessageReceived` per input line until EOF, a read error, or
/// the host loop going away. Returns how many requests were forwarded.
fn forward_refresh_requests<R: BufRead>(reader: R, events: &mpsc::Sender<HostEvent>) -> usize {
    let mut forwarded = 0;

    for line in reader.lines() {
        if let Err(e) = line {
            warn!(error = %e, "failed to read refresh requests from stdin");
            break;
        }
        if events.blocking_send(HostEvent::MessageReceived).is_err() {
            break;
        }
        forwarded += 1;
    }

    forwarded
}

async fn refresh_once(cfg: RelayConfig) -> anyhow::Result<()> {
    let (channel, mut delivered) = MpscChannel::new(1);
    let relay = build_relay(&cfg, channel)?;

    relay.try_refresh().await.context("weather refresh failed")?;

    match delivered.recv().await {
        Some(message) => print_delivery(&message),
        None => bail!("device channel closed before the message arrived"),
    }
}

fn configure() -> anyhow::Result<()> {
    let current = RelayConfig::load()?;

    let latitude = CustomType::<f64>::new("Latitude:")
        .with_default(current.latitude)
        .with_error_message("Please enter a decimal number, e.g. 42.358429")
        .prompt()?;

    let longitude = CustomType::<f64>::new("Longitude:")
        .with_default(current.longitude)
        .with_error_message("Please enter a decimal number, e.g. -71.059769")
        .prompt()?;

    Location::new(latitude, longitude)?;

    let base_url = Text::new("Provider endpoint:")
        .with_default(&current.base_url)
        .prompt()?;

    let refresh_interval_minutes = CustomType::<u32>::new("Wearable refresh interval (minutes, 0 = off):")
        .with_default(current.refresh_interval_minutes)
        .prompt()?;

    let cfg = RelayConfig {
        latitude,
        longitude,
        base_url,
        refresh_interval_minutes,
        ..current
    };

    // Validate before writing anything.
    cfg.schedule()?;
    NwsProvider::new(&cfg)?;

    let path = cfg.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}
