//! Map command handlers
//!
//! Geocode addresses, route to saved places and reverse geocode points.

use super::places::open_store;
use crate::bridge::MapBridge;
use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::format::get_formatter;
use crate::geo::{get_geocoder, GeoBackend};
use crate::location::DeviceLocation;
use crate::routing::get_router;
use clap::Args;

/// Locate command arguments
#[derive(Args)]
pub struct LocateArgs {
    /// Address or place id (prefix) to locate
    pub query: String,

    /// Map URL provider (google, openstreetmap, apple)
    #[arg(long, short = 'u')]
    pub url: Option<String>,

    /// Show every candidate instead of the first
    #[arg(long, short = 'a')]
    pub all: bool,
}

/// Route command arguments
#[derive(Args)]
pub struct RouteArgs {
    /// Place id or unique id prefix
    pub id: String,

    /// Start point as "lat,lng" (device position when omitted)
    #[arg(long, allow_hyphen_values = true)]
    pub from: Option<Coordinates>,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,
}

/// Address command arguments
#[derive(Args)]
pub struct AddressArgs {
    /// Point as "lat,lng" (device position when omitted)
    #[arg(allow_hyphen_values = true)]
    pub coords: Option<Coordinates>,
}

/// Run the locate command
///
/// The query is tried as a saved place id first, then as an address.
pub async fn locate(args: LocateArgs) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config)?;

    let address = match store.find_by_prefix(&args.query).await {
        Ok(record) => record
            .location()
            .map(str::to_string)
            .ok_or_else(|| Error::AddressNotFound(record.name().to_string()))?,
        Err(_) => args.query.clone(),
    };

    let geocoder = get_geocoder(&config.providers.geocoder_url);
    let placemarks = geocoder.geocode(&address).await?;
    if placemarks.is_empty() {
        return Err(Error::AddressNotFound(address));
    }

    let shown = if args.all { placemarks.len() } else { 1 };
    for placemark in placemarks.iter().take(shown) {
        println!("{}", placemark.display_name);
        println!("  {}", placemark.coords);
        let url = config.format_url(args.url.as_deref(), placemark.coords.lat, placemark.coords.lng)?;
        println!("  {}", url);
    }
    Ok(())
}

/// Run the route command
pub async fn route(args: RouteArgs) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config)?;
    let record = store.find_by_prefix(&args.id).await?;

    let location = match args.from {
        Some(from) => {
            from.validate()?;
            DeviceLocation::fixed(from)
        }
        None => DeviceLocation::from_config(&config.location),
    };
    let bridge = MapBridge::new(
        get_geocoder(&config.providers.geocoder_url),
        get_router(&config.providers.router_url),
        location,
        config.map.clone(),
    );

    if let Err(e) = bridge.check_location_services().await {
        return Err(report(e));
    }

    let Some(pin) = bridge.setup_placemark(&record.fields).await else {
        return Err(report(Error::AddressNotFound(
            record.location().unwrap_or(record.name()).to_string(),
        )));
    };
    eprintln!("Routing to {} at {}", pin.title, pin.coords);

    let routes = bridge.directions().await.map_err(report)?;

    let format = args.format.unwrap_or(config.listing.format);
    let formatter = get_formatter(&format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;
    println!("{}", formatter.format_routes(&routes)?.trim_end());
    Ok(())
}

/// Run the address command
pub async fn address(args: AddressArgs) -> Result<()> {
    let config = Config::load()?;
    let bridge = MapBridge::new(
        get_geocoder(&config.providers.geocoder_url),
        get_router(&config.providers.router_url),
        DeviceLocation::from_config(&config.location),
        config.map.clone(),
    );

    let coords = match args.coords {
        Some(coords) => coords,
        None => {
            bridge.check_location_services().await.map_err(report)?;
            bridge
                .show_user_location()
                .await
                .map(|region| region.center)
                .ok_or_else(|| report(Error::PositionUnavailable))?
        }
    };
    coords.validate()?;

    let address = bridge
        .reverse_geocode(coords)
        .await
        .ok_or_else(|| Error::Geo(format!("Reverse geocoding failed for {}", coords)))?;
    println!("{}", address);
    Ok(())
}

/// Print the user-facing alert for an error before it propagates
fn report(error: Error) -> Error {
    if let Some(alert) = error.alert() {
        eprintln!("{}: {}", alert.title, alert.message);
    }
    error
}
