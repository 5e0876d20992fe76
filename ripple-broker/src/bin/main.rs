//! The broker's CLI entry point: a single optional positional argument,
//! no other flags. Verbosity is controlled by `RUST_LOG`.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ripple_broker::Broker;

/// A typed boundary between CLI parsing and `Broker::start`, rather than
/// passing bare strings around.
struct BrokerConfig {
    host: String,
    port: u16,
}

impl BrokerConfig {
    /// `address` is either a bare port (default host `localhost`) or a
    /// full `host:port` pair.
    fn parse(address: &str) -> Self {
        match address.rsplit_once(':') {
            Some((host, port)) => Self {
                host: host.to_string(),
                port: port.parse().unwrap_or(DEFAULT_PORT),
            },
            None => Self {
                host: "localhost".to_string(),
                port: address.parse().unwrap_or(DEFAULT_PORT),
            },
        }
    }
}

const DEFAULT_PORT: u16 = 6789;

#[derive(Parser, Debug)]
#[command(name = "ripple-broker")]
#[command(about = "WebSocket-framed MQTT-5-subset pub/sub broker")]
struct Args {
    /// Listen address: a bare port, or `host:port`.
    #[arg(default_value_t = DEFAULT_PORT.to_string())]
    address: String,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = BrokerConfig::parse(&args.address);

    let broker = Arc::new(Broker::new());
    let serve_broker = Arc::clone(&broker);
    let host = config.host.clone();
    let port = config.port;

    let serve = tokio::spawn(async move { serve_broker.start(&host, port).await });

    tokio::signal::ctrl_c().await?;
    tracing::info!("received ctrl-c");
    broker.stop();

    match serve.await {
        Ok(result) => result,
        Err(_) => Ok(()),
    }
}
