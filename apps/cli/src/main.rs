//! Sonos Universal CLI - runs one group command against a Sonos player.
//!
//! The result patch is printed as JSON on stdout. Errors are printed as a
//! JSON error report and the process exits with status 1. Ctrl+C during a
//! notification ends the announcement early; playback is still restored.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use sonos_universal::{CommandMessage, CommandRequest, GroupController, PlayerAddress};
use tokio::signal;

use crate::config::CliConfig;

/// Sonos Universal - control a Sonos group through any of its players.
#[derive(Parser, Debug)]
#[command(name = "sonos-universal")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Command, e.g. play, player.set.volume, play.notification.
    command: String,

    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "warn", env = "SONOS_UNIVERSAL_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Player address: host, host:port, or http://host:port (overrides config file).
    #[arg(short = 'p', long)]
    player: Option<String>,

    /// Full command message as a JSON object; flags below override its fields.
    #[arg(short = 'm', long, value_name = "JSON")]
    message: Option<String>,

    /// Command topic. Parsed as JSON when possible, else taken as a string.
    #[arg(short = 't', long)]
    topic: Option<String>,

    /// Volume 1..99.
    #[arg(short = 'v', long)]
    volume: Option<i64>,

    /// Apply the volume to every group member (true) or the player only (false).
    #[arg(long)]
    same_volume: Option<bool>,

    /// Address a group member by room name instead of by address.
    #[arg(short = 'n', long)]
    player_name: Option<String>,

    /// Notification duration hh:mm:ss.
    #[arg(short = 'd', long)]
    duration: Option<String>,

    /// Skip the notification unless the group is playing.
    #[arg(long)]
    only_when_playing: bool,
}

impl Args {
    /// Builds the command message from `--message` and the individual flags.
    fn command_message(&self) -> Result<CommandMessage> {
        let mut msg: CommandMessage = match &self.message {
            Some(json) => serde_json::from_str(json).context("Failed to parse --message JSON")?,
            None => CommandMessage::default(),
        };

        if let Some(topic) = &self.topic {
            msg.topic =
                Some(serde_json::from_str(topic).unwrap_or_else(|_| Value::String(topic.clone())));
        }
        if let Some(volume) = self.volume {
            msg.volume = Some(volume.into());
        }
        if let Some(same_volume) = self.same_volume {
            msg.same_volume = Some(same_volume.into());
        }
        if let Some(name) = &self.player_name {
            msg.player_name = Some(name.clone().into());
        }
        if let Some(duration) = &self.duration {
            msg.duration = Some(duration.clone().into());
        }
        if self.only_when_playing {
            msg.only_when_playing = Some(true.into());
        }
        Ok(msg)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    let mut config =
        CliConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(player) = &args.player {
        config.player = Some(player.clone());
    }

    let player = config
        .player
        .as_deref()
        .context("No player given. Use --player or set SONOS_UNIVERSAL_PLAYER.")?;
    let anchor: PlayerAddress = player.parse().context("Invalid player address")?;
    let request = CommandRequest::new(args.command.clone(), args.command_message()?);

    log::info!("Running {} on {}", request.command, anchor);

    let controller =
        GroupController::with_http(config.to_core_config()).context("Failed to set up client")?;

    let shutdown = controller.shutdown_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutdown signal received, restoring playback...");
        shutdown.cancel();
    });

    match controller.execute(&anchor, &request).await {
        Ok(patch) => {
            println!("{}", serde_json::to_string_pretty(&patch)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            log::error!("{} failed: {}", request.command, e);
            println!("{}", serde_json::to_string_pretty(&e.report())?);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("sonos-universal").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn flags_fill_the_message() {
        let msg = args(&[
            "play.notification",
            "--topic",
            "http://nas/bell.mp3",
            "--volume",
            "30",
            "--same-volume",
            "false",
            "--duration",
            "00:00:05",
            "--only-when-playing",
        ])
        .command_message()
        .unwrap();

        assert_eq!(msg.topic, Some(json!("http://nas/bell.mp3")));
        assert_eq!(msg.volume, Some(json!(30)));
        assert_eq!(msg.same_volume, Some(json!(false)));
        assert_eq!(msg.duration, Some(json!("00:00:05")));
        assert_eq!(msg.only_when_playing, Some(json!(true)));
    }

    #[test]
    fn numeric_topic_stays_numeric() {
        let msg = args(&["player.set.volume", "-t", "45"]).command_message().unwrap();
        assert_eq!(msg.topic, Some(json!(45)));
    }

    #[test]
    fn flags_override_message_json() {
        let msg = args(&[
            "play.export",
            "--message",
            r#"{"volume": 10, "export": {"uri": "x-file-cifs://nas/a.flac", "queue": true}}"#,
            "--volume",
            "20",
        ])
        .command_message()
        .unwrap();

        assert_eq!(msg.volume, Some(json!(20)));
        assert_eq!(msg.export.unwrap().queue, Some(json!(true)));
    }

    #[test]
    fn bad_message_json_is_an_error() {
        assert!(args(&["play", "--message", "{nope"]).command_message().is_err());
    }
}
