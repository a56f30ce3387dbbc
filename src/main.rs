//! parkfinder - browse National Park Service sites by state
//!
//! An interactive prompt that lists the national sites of a state and shows
//! places near a chosen site.

use std::io;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use parkfinder::cli::{Cli, StartupConfig};
use parkfinder::App;

/// Installs the stderr log subscriber, honouring `RUST_LOG` (default `warn`)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A .env file may supply MAPQUEST_API_KEY; it is fine if there is none
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let mut app = App::from_config(&config).await?;

    let stdin = io::stdin();
    app.run(stdin.lock(), io::stdout()).await?;

    Ok(())
}
