//! my-places CLI entry point
//!
//! Saved places catalog - CLI + web API

use my_places::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
