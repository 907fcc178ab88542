use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use gatekeeper_bot::cli::{run_console, Console};
use gatekeeper_bot::config::GatekeeperConfig;
use gatekeeper_bot::{logging, server, Gatekeeper, DEFAULT_ACTOR};

#[derive(Parser, Debug)]
#[command(name = "gatekeeper", version, about = "Approval-gated natural language data assistant")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Read settings from this dotenv file instead of the environment
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[arg(long, global = true)]
    host: Option<String>,

    #[arg(long, global = true)]
    port: Option<u16>,

    /// Filter directive, e.g. `debug` or `info,gatekeeper_bot=trace`
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log JSON lines instead of text
    #[arg(long, global = true)]
    log_json: bool,

    /// Start with empty collections
    #[arg(long, global = true)]
    no_seed: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Interactive console
    Console {
        /// Actor recorded on requests made from this console
        #[arg(long, default_value = DEFAULT_ACTOR)]
        user: String,
    },
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<GatekeeperConfig> {
        let mut config = match &self.env_file {
            Some(path) => GatekeeperConfig::from_env_file(path)?,
            None => GatekeeperConfig::from_env()?,
        };

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.log_json {
            config.logging.json = true;
        }
        if self.no_seed {
            config.seed_data = false;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config().context("loading configuration")?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = logging::init_logging(&config.logging)?;

    tracing::info!("=== Gatekeeper Starting ===");

    let gatekeeper = Gatekeeper::from_config(&config)?;
    tracing::info!(
        seed_data = config.seed_data,
        users = gatekeeper.count(gatekeeper_bot::core::TargetCollection::Users),
        projects = gatekeeper.count(gatekeeper_bot::core::TargetCollection::Projects),
        "Collections ready"
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            server::serve(gatekeeper, &config.bind_addr())
                .await
                .with_context(|| format!("serving on {}", config.bind_addr()))?;
        }
        Command::Console { user } => {
            let console = Console::new();
            tokio::task::spawn_blocking(move || run_console(&gatekeeper, &console, &user))
                .await
                .context("console task panicked")??;
        }
    }

    tracing::info!("=== Gatekeeper Shutting Down ===");

    Ok(())
}
