//! CLI command handlers
//!
//! Each group of subcommands has its own module with handler functions.

pub mod config;
pub mod map;
pub mod places;
pub mod serve;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Save, browse and navigate to your places
#[derive(Parser)]
#[command(name = "my-places")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save a new place
    Add(places::AddArgs),

    /// List saved places
    List(places::ListArgs),

    /// Show one place
    Show(places::ShowArgs),

    /// Change a place
    Edit(places::EditArgs),

    /// Delete a place
    Delete(places::DeleteArgs),

    /// Export a place photo or thumbnail
    Image(places::ImageArgs),

    /// Geocode an address or saved place
    Locate(map::LocateArgs),

    /// Driving directions to a saved place
    Route(map::RouteArgs),

    /// Street address at a point
    Address(map::AddressArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),
}

/// Log to stderr, filtered by `RUST_LOG` or `default_level`
fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Serve(_) => "info",
        _ => "warn",
    };
    init_tracing(default_level);

    match cli.command {
        Commands::Add(args) => places::add(args).await,
        Commands::List(args) => places::list(args).await,
        Commands::Show(args) => places::show(args).await,
        Commands::Edit(args) => places::edit(args).await,
        Commands::Delete(args) => places::delete(args).await,
        Commands::Image(args) => places::image(args).await,
        Commands::Locate(args) => map::locate(args).await,
        Commands::Route(args) => map::route(args).await,
        Commands::Address(args) => map::address(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Serve(args) => serve::run(args).await,
    }
}
