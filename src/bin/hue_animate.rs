//! Command-line animator for Philips Hue lights.
//!
//! Bridge address, token, lights and duration bounds come from the
//! environment (see [`hue_animator::Settings`]); the effect file and
//! everything else from the command line.
//!
//! Run with: cargo run --features cli --bin hue-animate -- --help

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use hue_animator::{
    AnimationConfig, AnimationEngine, BridgeClient, HttpTransport, Settings, StopSignal,
};
use log::{error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hue-animate")]
#[command(about = "Cycle Hue lights through randomized animation effects", long_about = None)]
struct Cli {
    /// JSON file with the animation effects
    #[arg(short, long, env = "ANIMATIONS_FILE", default_value = "animations.json")]
    effects: PathBuf,

    /// Seed for effect selection and sampling (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "10")]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Animate the configured lights until interrupted (default)
    Run,

    /// List the lights known to the bridge
    Lights,

    /// Turn a light on
    On { light: String },

    /// Turn a light off
    Off { light: String },

    /// Set a light's color
    Color {
        light: String,
        /// Hue (0-65535)
        hue: i64,
        /// Brightness (0-254)
        brightness: i64,
        /// Saturation (0-254)
        saturation: i64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run);

    // Only `run` needs the light list and duration bounds.
    let (connection, settings) = match command {
        Commands::Run => {
            let settings = Settings::from_env()?;
            (settings.bridge.clone(), Some(settings))
        }
        _ => (Settings::bridge_from_env()?, None),
    };

    let transport = HttpTransport::with_timeout(Duration::from_secs(cli.timeout_secs))?;
    let bridge = BridgeClient::connect(connection.clone(), transport).await?;
    info!(
        "connected to bridge {:?} at {}",
        bridge.name(),
        connection.address()
    );

    match command {
        Commands::Run => {
            let Some(settings) = settings else {
                unreachable!("settings are read for the run command");
            };
            let config = AnimationConfig::load(&cli.effects)?;
            info!(
                "loaded {} effects from {}",
                config.len(),
                cli.effects.display()
            );

            let engine = AnimationEngine::with_config(
                Arc::new(bridge),
                settings.lights,
                config,
                settings.min_duration,
                settings.max_duration,
            )?;
            let mut engine = match cli.seed {
                Some(seed) => engine.with_rng(StdRng::seed_from_u64(seed)),
                None => engine,
            };

            let stop = StopSignal::new();
            tokio::select! {
                report = engine.run(&stop) => {
                    info!("finished after {} iterations", report.iterations);
                }
                signal = tokio::signal::ctrl_c() => {
                    if let Err(e) = signal {
                        error!("failed to listen for ctrl-c: {e}");
                    }
                    stop.stop();
                    info!("shutting down");
                }
            }
        }

        Commands::Lights => {
            let lights = bridge.list_lights().await?;
            if lights.is_empty() {
                println!("No lights known to the bridge.");
            }
            for (id, light) in lights {
                println!(
                    "  {:>3}  {:<24} {:<24} {}",
                    id,
                    light.name,
                    light.light_type,
                    if light.state.on { "on" } else { "off" }
                );
            }
        }

        Commands::On { light } => {
            bridge.turn_on(&light).await?;
            println!("Light {light} turned ON");
        }

        Commands::Off { light } => {
            bridge.turn_off(&light).await?;
            println!("Light {light} turned OFF");
        }

        Commands::Color {
            light,
            hue,
            brightness,
            saturation,
        } => {
            bridge
                .set_color(&light, hue, brightness, saturation)
                .await?;
            println!("Light {light} set to hue {hue}, bri {brightness}, sat {saturation}");
        }
    }

    Ok(())
}
