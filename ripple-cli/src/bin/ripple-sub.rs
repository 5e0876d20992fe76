//! Subscribe to one or more topics and print messages as they arrive.

use clap::Parser;
use ripple_cli::{init_logging, ConnectionArgs};
use ripple_client::{ClientEngine, Payload};
use tokio::signal;

#[derive(Parser, Debug)]
#[command(name = "ripple-sub")]
#[command(about = "Subscribe to broker topics and print messages")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Topic(s) to subscribe to (can be specified multiple times)
    #[arg(short = 't', long, required = true)]
    topic: Vec<String>,

    /// Print the topic name before each message
    #[arg(short = 'T', long)]
    print_topic: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    init_logging(args.connection.verbose);

    let options = args.connection.to_connect_options();
    let client = ClientEngine::connect(options).await?;

    for topic in &args.topic {
        let print_topic = args.print_topic;

        client
            .subscribe(topic.clone(), move |topic, payload, _props| {
                let rendered = match payload {
                    Payload::Text(text) => text,
                    Payload::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                };

                if print_topic {
                    println!("{topic}: {rendered}");
                } else {
                    println!("{rendered}");
                }
            })
            .await?;
    }

    signal::ctrl_c().await?;
    eprintln!("\ndisconnecting...");
    client.disconnect().await?;

    Ok(())
}
