use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;

use feedwire::api::ApiClient;
use feedwire::bootstrap::Bootstrap;
use feedwire::config::ConfigManager;
use feedwire::dispatch::{EventKind, UiEvent};
use feedwire::host::RecordingHost;
use feedwire::logging;
use feedwire::page::{Page, PageSpec};
use feedwire::server_config::ServerConfigManager;

/// feedwire - replay page events against a live feed server
#[derive(Parser)]
#[command(name = "feedwire")]
#[command(about = "Replays feed page events through the interaction engine")]
#[command(version)]
struct Cli {
    /// Server URL to connect to
    #[arg(long, short, env = "FEEDWIRE_SERVER_URL")]
    server: Option<String>,

    /// Page snapshot (JSON with `head` and `body`)
    #[arg(long, short, required_unless_present = "init_config")]
    page: Option<PathBuf>,

    /// Event script, one JSON object per line; stdin when omitted
    #[arg(long, short)]
    events: Option<PathBuf>,

    /// Session cookie sent with every request (`name=value`)
    #[arg(long, env = "FEEDWIRE_SESSION_COOKIE")]
    session_cookie: Option<String>,

    /// Remember the resolved server URL for later runs
    #[arg(long)]
    save_server: bool,

    /// Write the interaction timings file with the values currently in effect
    #[arg(long)]
    init_config: bool,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,
}

/// One line of an event script
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum Step {
    Click { id: String },
    Submit { id: String },
    Input {
        id: String,
        #[serde(default)]
        value: Option<String>,
    },
    Enter { id: String },
    Leave { id: String },
    Wait { ms: u64 },
}

fn load_env() {
    let _ = dotenv::dotenv();
}

async fn read_events(path: Option<&PathBuf>) -> Result<Vec<Step>> {
    let script = match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read event script {}", path.display()))?,
        None => std::io::read_to_string(std::io::stdin()).context("Failed to read events from stdin")?,
    };

    script
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid event on line {}", n + 1))
        })
        .collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_env();

    let log_config = if cli.verbose {
        logging::LogConfig::verbose()
    } else {
        logging::LogConfig::default()
    };
    logging::init_logging(&log_config)?;

    let config_manager = ConfigManager::new()?;
    let interaction = config_manager.load_interaction_config()?;
    if cli.init_config {
        config_manager.save_interaction_config(&interaction)?;
        log::info!("Wrote interaction config to {}", config_manager.config_dir().display());
    }
    let server_config_manager = ServerConfigManager::new(config_manager);
    let server_url = server_config_manager.determine_server_url(cli.server)?;
    log::info!("Using server {}", server_url);
    if cli.save_server {
        server_config_manager.save_server_url(server_url.clone())?;
        log::info!("Saved server URL {}", server_url);
    }

    let Some(page_path) = cli.page else {
        return Ok(());
    };
    let spec: PageSpec = {
        let json = tokio::fs::read_to_string(&page_path)
            .await
            .with_context(|| format!("Failed to read page {}", page_path.display()))?;
        serde_json::from_str(&json).context("Failed to parse page snapshot")?
    };
    let steps = read_events(cli.events.as_ref()).await?;

    let mut client = ApiClient::new(server_url.clone());
    client.set_session_cookie(cli.session_cookie);
    let host = RecordingHost::new(server_url);

    let dispatcher = Bootstrap::new(interaction)
        .with_log_config(log_config)
        .start(Page::from_spec(&spec), client, host);

    for (n, step) in steps.into_iter().enumerate() {
        let (kind, id) = match step {
            Step::Wait { ms } => {
                dispatcher.advance(Duration::from_millis(ms));
                continue;
            }
            Step::Click { id } => (EventKind::Click, id),
            Step::Submit { id } => (EventKind::Submit, id),
            Step::Enter { id } => (EventKind::MouseEnter, id),
            Step::Leave { id } => (EventKind::MouseLeave, id),
            Step::Input { id, value } => {
                if let (Some(value), Some(node)) = (value, dispatcher.node_by_id(&id)) {
                    dispatcher.with_page_mut(|page| page.set_value(node, value));
                }
                (EventKind::Input, id)
            }
        };

        let Some(target) = dispatcher.node_by_id(&id) else {
            log::warn!("Step {}: no element with id {:?}", n + 1, id);
            println!("{}", json!({ "step": n + 1, "id": id, "outcome": "missing" }));
            continue;
        };

        let result = dispatcher.dispatch(UiEvent::new(kind, target)).await;
        println!(
            "{}",
            json!({
                "step": n + 1,
                "id": id,
                "intent": result.intent.map(|k| format!("{:?}", k)),
                "default_prevented": result.default_prevented,
                "outcome": format!("{:?}", result.outcome),
            })
        );
    }

    let notifications: Vec<_> = dispatcher
        .notifications()
        .into_iter()
        .map(|n| {
            json!({
                "message": n.message,
                "severity": n.severity,
                "created_at": n.created_at.to_rfc3339(),
            })
        })
        .collect();
    let report = json!({
        "elapsed_ms": dispatcher.now().as_millis() as u64,
        "notifications": notifications,
        "host_actions": dispatcher.host().actions(),
        "page": dispatcher.with_page(|page| page.to_spec()),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_required_unless_initializing_config() {
        assert!(Cli::try_parse_from(["feedwire"]).is_err());

        let cli = Cli::try_parse_from(["feedwire", "--init-config"]).unwrap();
        assert!(cli.init_config);
        assert!(cli.page.is_none());

        let cli = Cli::try_parse_from(["feedwire", "-p", "page.json", "--save-server", "-s", "http://feed:5000"])
            .unwrap();
        assert!(cli.save_server);
        assert_eq!(cli.server.as_deref(), Some("http://feed:5000"));
        assert_eq!(cli.page, Some(PathBuf::from("page.json")));
    }
}
