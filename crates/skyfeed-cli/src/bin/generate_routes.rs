use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use skyfeed_core::{BoundingBox, RouteGenerator, StreamMessage};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a seeded route set as JSON", long_about = None)]
struct Args {
    /// Bounding box as west,south,east,north
    #[arg(long, default_value = "-5,42,15,55")]
    bbox: String,

    /// Waypoint grid density per axis
    #[arg(long, default_value_t = 6)]
    density: usize,

    /// Number of routes
    #[arg(long, default_value_t = 40)]
    count: usize,

    /// RNG seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Pretty-print the JSON
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let bbox = BoundingBox::parse(&args.bbox)?;
    let seed = args.seed.unwrap_or_else(rand::random);

    let mut generator = RouteGenerator::new(bbox, args.density, seed)?;
    let routes = generator.generate(args.count)?;
    eprintln!(
        "Generated {} routes over {} waypoints (seed {})",
        routes.len(),
        generator.waypoint_pool().len(),
        seed
    );

    let message = StreamMessage::routes(&routes, Utc::now().timestamp());
    let json = if args.pretty {
        serde_json::to_string_pretty(&message)?
    } else {
        message.to_json()?
    };
    println!("{}", json);
    Ok(())
}
