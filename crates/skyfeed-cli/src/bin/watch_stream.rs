use anyhow::Result;
use clap::Parser;
use skyfeed_cli::{describe, format_flight};
use skyfeed_core::StreamMessage;
use skyfeed_sdk::StreamClient;

#[derive(Parser, Debug)]
#[command(author, version, about = "Watch a SkyFeed server's stream", long_about = None)]
struct Args {
    /// SkyFeed server URL
    #[arg(long, default_value = "http://localhost:8765")]
    url: String,

    /// Print every flight of the latest frame
    #[arg(long)]
    flights: bool,

    /// Exit after this many messages
    #[arg(long)]
    count: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match skyfeed_sdk::fetch_health(&args.url).await {
        Ok(health) => println!(
            "Server mode: {} (synthetic: {}, viewers: {})",
            health.mode, health.synthetic, health.viewers
        ),
        Err(e) => eprintln!("Health check failed: {}", e),
    }

    let mut client = StreamClient::connect(&args.url).await?;
    println!("Connected to {}", args.url);

    let mut seen = 0;
    while let Some(message) = client.next_message().await? {
        println!("{}", describe(&message));
        if args.flights {
            if let StreamMessage::Snapshot { frames } = &message {
                for flight in frames.last().map(|f| f.flights.as_slice()).unwrap_or_default() {
                    println!("  {}", format_flight(flight));
                }
            }
        }

        seen += 1;
        if args.count.is_some_and(|limit| seen >= limit) {
            break;
        }
    }

    client.close().await?;
    Ok(())
}
