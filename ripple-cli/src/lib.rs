//! Shared utilities for the ripple CLI tools.

use clap::Args;
use ripple_client::ConnectOptions;

/// Connection arguments shared between the pub and sub binaries.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Broker hostname
    #[arg(short = 'H', long, default_value = "localhost")]
    pub host: String,

    /// Broker port
    #[arg(short = 'p', long, default_value = "6789")]
    pub port: u16,

    /// Client ID (auto-generated if not specified)
    #[arg(short = 'i', long)]
    pub client_id: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl ConnectionArgs {
    pub fn to_connect_options(&self) -> ConnectOptions {
        let mut opts = ConnectOptions::new(&self.host, self.port);

        if let Some(ref id) = self.client_id {
            opts = opts.client_id(id);
        }

        opts
    }
}

/// Initialize tracing based on verbosity.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    fmt().with_env_filter(filter).init();
}
