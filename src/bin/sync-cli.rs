use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use gateway_sync::sync::envelope::unix_timestamp;
use gateway_sync::sync::{Command, ConfigQueryEnvelope, Notification, PushConfigEnvelope};

#[derive(Parser)]
#[command(name = "sync-cli")]
#[command(about = "Management CLI for gateway configuration sync", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    /// The node's `secret`, used as the admin bearer token
    #[arg(short, long, env = "GATEWAY_ADMIN_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

/// Address of the node a message is meant for. Either field is enough.
#[derive(Args)]
struct Target {
    #[arg(long, default_value = "")]
    hostname: String,

    #[arg(long, default_value = "")]
    node_id: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the identity of the node behind the admin API
    Status,
    /// Show the sanitized configuration of the node behind the admin API
    Config,
    /// Push a TOML configuration document to a node over the cluster bus
    Push {
        #[command(flatten)]
        target: Target,
        /// TOML file with the fields to change
        file: PathBuf,
    },
    /// Ask a node to publish a sanitized snapshot onto the cluster bus
    Query {
        #[command(flatten)]
        target: Target,
    },
    /// Show snapshots other nodes answered with, as seen by this node
    Responses,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    match cli.command {
        Commands::Status => {
            let res = client
                .get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Config => {
            let res = client
                .get(format!("{}/admin/config", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Push { target, file } => {
            let configuration: Value = toml::from_str(&std::fs::read_to_string(&file)?)?;
            let envelope = PushConfigEnvelope {
                target_hostname: target.hostname,
                target_node_id: target.node_id,
                timestamp: unix_timestamp(),
                configuration,
            };
            let notification = Notification::wrap(Command::PushConfig, &envelope)?;
            notify(&client, &cli.url, headers, &notification).await?;
        }
        Commands::Query { target } => {
            let envelope = ConfigQueryEnvelope {
                requester_hostname: target.hostname,
                requester_node_id: target.node_id,
                timestamp: unix_timestamp(),
            };
            let notification = Notification::wrap(Command::GetConfig, &envelope)?;
            notify(&client, &cli.url, headers, &notification).await?;
            println!("Read the answer with `sync-cli responses`");
        }
        Commands::Responses => {
            let res = client
                .get(format!("{}/admin/responses", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn notify(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
    notification: &Notification,
) -> Result<(), Box<dyn std::error::Error>> {
    let res = client
        .post(format!("{}/admin/notify", url))
        .headers(headers)
        .json(notification)
        .send()
        .await?;

    let status = res.status();
    if status.is_success() {
        println!("{} published ({})", notification.command, status);
    } else {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
    }
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
