use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use geoquery::query::{search_layout, search_store, SearchRequest};
use geoquery::Config;

#[derive(Parser)]
#[command(name = "geoquery")]
#[command(about = "Search-query assembly for geocoding and address search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a search request and print it as JSON
    Build {
        /// Main search text
        #[arg(short, long)]
        text: Option<String>,
        /// Admin field input as field=value (repeatable)
        #[arg(short, long = "admin", value_name = "FIELD=VALUE")]
        admin: Vec<String>,
        /// Read the full request from a JSON file instead
        #[arg(short, long, conflicts_with_all = ["text", "admin"])]
        request: Option<std::path::PathBuf>,
        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Print the effective configuration
    Config,
    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) | None => {
            println!("geoquery {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Config) => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Some(Commands::Build {
            text,
            admin,
            request,
            pretty,
        }) => {
            let config = Config::load()?;

            let request = match request {
                Some(path) => SearchRequest::from_json(&std::fs::read_to_string(path)?)?,
                None => SearchRequest {
                    text,
                    admin: admin
                        .iter()
                        .map(|pair| parse_admin_pair(pair))
                        .collect::<anyhow::Result<_>>()?,
                },
            };

            let vs = search_store(&config, &request)?;
            let body = search_layout(&config).render(&vs);

            if pretty {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{}", serde_json::to_string(&body)?);
            }
        }
    }

    Ok(())
}

fn parse_admin_pair(pair: &str) -> anyhow::Result<(String, String)> {
    match pair.split_once('=') {
        Some((field, value)) if !field.is_empty() => {
            Ok((field.to_string(), value.to_string()))
        }
        _ => anyhow::bail!("invalid admin input '{}', expected field=value", pair),
    }
}
