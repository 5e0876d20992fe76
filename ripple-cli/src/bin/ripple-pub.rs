//! Publish a single message to a topic and exit.

use std::io::{self, Read};

use clap::Parser;
use ripple_cli::{init_logging, ConnectionArgs};
use ripple_client::ClientEngine;

#[derive(Parser, Debug)]
#[command(name = "ripple-pub")]
#[command(about = "Publish a message to a broker topic")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Topic to publish to
    #[arg(short = 't', long)]
    topic: String,

    /// Message payload (reads from stdin if not provided)
    #[arg(short = 'm', long)]
    message: Option<String>,

    /// Content type to attach to the message
    #[arg(short = 'c', long)]
    content_type: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    init_logging(args.connection.verbose);

    let payload = match args.message {
        Some(msg) => msg,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let options = args.connection.to_connect_options();
    let client = ClientEngine::connect(options).await?;

    client.publish(&args.topic, payload, args.content_type).await?;
    client.disconnect().await?;

    Ok(())
}
