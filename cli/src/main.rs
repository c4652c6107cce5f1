//! # anydesk
//!
//! Command-line front-end for the AnyDesk REST management API.
//!
//! Every subcommand maps to one endpoint and prints the decoded response as
//! JSON. `--debug` additionally dumps the raw request and response to stderr.

mod commands;

use std::time::Duration;

use anyhow::Result;
use anydesk_core::config::{ENV_API_ENDPOINT, ENV_API_PASSWORD, ENV_DEBUG, ENV_LICENSE_ID, ENV_TIMEOUT_SECS};
use anydesk_core::{ClientConfig, Credentials, Transport, DEFAULT_ENDPOINT};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use commands::{ClientsArgs, CommentArgs, SessionsArgs};

/// Query and manage clients and sessions of an AnyDesk license
#[derive(Parser)]
#[command(name = "anydesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// License ID the API password belongs to
    #[arg(long, global = true, env = ENV_LICENSE_ID)]
    license_id: Option<String>,

    /// API password of the license
    #[arg(long, global = true, env = ENV_API_PASSWORD, hide_env_values = true)]
    api_password: Option<String>,

    /// Base URL of the management API
    #[arg(long, global = true, env = ENV_API_ENDPOINT, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout in whole seconds
    #[arg(long, global = true, env = ENV_TIMEOUT_SECS)]
    timeout: Option<u64>,

    /// Print the raw request and response of each call to stderr
    #[arg(long, global = true, env = ENV_DEBUG)]
    debug: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Check that the credentials are accepted
    Auth,

    /// Show license and usage information
    Sysinfo,

    /// Show one client with its recent sessions
    Client {
        /// Client ID
        cid: i64,
    },

    /// List clients
    Clients(ClientsArgs),

    /// List sessions
    Sessions(SessionsArgs),

    /// Set or clear the comment of a session
    Comment(CommentArgs),
}

impl Cli {
    fn config(&self) -> Result<ClientConfig> {
        let license_id = self
            .license_id
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("--license-id or {ENV_LICENSE_ID} is required"))?;
        let api_password = self
            .api_password
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("--api-password or {ENV_API_PASSWORD} is required"))?;

        let mut config = ClientConfig::new(Credentials::with_endpoint(license_id, api_password, &self.endpoint))
            .debug(self.debug);
        if let Some(secs) = self.timeout {
            config = config.timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let api = Transport::new(cli.config()?);

    match cli.command {
        Commands::Auth => commands::auth(&api)?,
        Commands::Sysinfo => commands::sysinfo(&api)?,
        Commands::Client { cid } => commands::client(&api, cid)?,
        Commands::Clients(args) => commands::clients(&api, args)?,
        Commands::Sessions(args) => commands::sessions(&api, args)?,
        Commands::Comment(args) => commands::comment(&api, args)?,
    }

    Ok(())
}
