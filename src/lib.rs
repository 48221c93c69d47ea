//! my-places: a catalog of saved places with map lookups
//!
//! A library and CLI tool for recording places (name, location, category,
//! photo, star rating), browsing them through live sorted and filtered
//! views, and navigating to them through geocoding and routing providers.
//!
//! ## Features
//!
//! - JSON-file catalog with atomic, transactional writes
//! - Live views sorted by date or name with case-insensitive search
//! - Forward and reverse geocoding (Nominatim)
//! - Driving directions with alternates (OSRM)
//! - Location permission flow and movement tracking
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use my_places::catalog::{CatalogStore, SortKey};
//! use my_places::place::PlaceFields;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = CatalogStore::in_memory();
//! store.add(PlaceFields::new("Cafe A").with_location("1 Main St")).await.unwrap();
//! store.add(PlaceFields::new("Cafe B").with_location("2 Main St")).await.unwrap();
//!
//! let view = store.all().sorted_by(SortKey::Name, false).search("main");
//! let names: Vec<_> = view.records().await.iter().map(|p| p.name().to_string()).collect();
//! assert_eq!(names, ["Cafe B", "Cafe A"]);
//! # });
//! ```

pub mod bridge;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod format;
pub mod geo;
pub mod location;
pub mod place;
pub mod routing;
pub mod server;

// Re-export commonly used types
pub use bridge::{BridgeState, MapBridge, RouteSet};
pub use catalog::{CatalogStore, LiveView, SortKey};
pub use config::Config;
pub use coord::Coordinates;
pub use error::{Alert, Error, Result};
pub use place::{PlaceFields, PlaceRecord};
