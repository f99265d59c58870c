// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Terminal viewer for the Elytracloud platform status feed.

mod config;
mod status_card;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::warn;
use status_client::{HttpSink, LogSink, StatusClient, TelemetrySink};

use config::AppConfig;

#[derive(Debug, Parser)]
#[command(
    name = "elytra-status",
    version,
    about = "Terminal viewer for the Elytracloud platform status feed"
)]
struct Cli {
    /// Override the status endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch once and print the status card (default)
    Show,
    /// Re-render the status card on an interval
    Watch {
        /// Refresh interval in seconds (defaults to the configured value)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Print the path of the persistent configuration file
    ConfigPath,
    /// Persist a status endpoint URL to the configuration file
    SetEndpoint {
        /// Status endpoint URL to store
        url: String,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn build_client(app_config: &AppConfig) -> StatusClient {
    let telemetry: Arc<dyn TelemetrySink> = match &app_config.analytics_endpoint {
        Some(endpoint) => Arc::new(HttpSink::new(endpoint.clone())),
        None => Arc::new(LogSink),
    };
    StatusClient::with_telemetry(app_config.client_config(), telemetry)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut app_config = AppConfig::load().unwrap_or_else(|e| {
        warn!("failed to load configuration ({e}), using defaults");
        AppConfig::default()
    });
    app_config.apply_env_overrides();
    if let Some(endpoint) = cli.endpoint {
        app_config.endpoint_url = Some(endpoint);
    }

    match cli.command.unwrap_or(Command::Show) {
        Command::Show => {
            let client = build_client(&app_config);
            let document = client.fetch().await;
            println!("{}", status_card::render(&document, &app_config));
        }
        Command::Watch { interval } => {
            let client = build_client(&app_config);
            let seconds = interval.unwrap_or(app_config.watch_interval_seconds).max(1);
            let mut ticker = tokio::time::interval(Duration::from_secs(seconds));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let document = client.fetch().await;
                println!("{}", status_card::render(&document, &app_config));
                println!();
            }
        }
        Command::ConfigPath => match AppConfig::config_path() {
            Ok(path) => println!("{}", path.display()),
            Err(e) => {
                eprintln!("failed to resolve configuration path: {e}");
                std::process::exit(1);
            }
        },
        Command::SetEndpoint { url } => {
            // Write through the on-disk config, not the env-overridden view
            let mut file_config = AppConfig::load().unwrap_or_else(|e| {
                warn!("failed to load configuration ({e}), starting from defaults");
                AppConfig::default()
            });
            file_config.endpoint_url = Some(url.clone());
            match file_config.save() {
                Ok(()) => println!("status endpoint set to {url}"),
                Err(e) => {
                    eprintln!("failed to save configuration: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_set_endpoint() {
        let cli = Cli::parse_from([
            "elytra-status",
            "set-endpoint",
            "https://status.example.com/status.json",
        ]);
        assert!(matches!(
            cli.command,
            Some(Command::SetEndpoint { url }) if url == "https://status.example.com/status.json"
        ));
    }

    #[test]
    fn test_cli_defaults_to_show() {
        let cli = Cli::parse_from(["elytra-status"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }
}
