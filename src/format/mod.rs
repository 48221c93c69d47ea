//! Output formatters
//!
//! Trait-based rendering of places and routes for the CLI.

pub mod json;
pub mod text;

use crate::bridge::RouteSet;
use crate::error::Result;
use crate::place::PlaceRecord;
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format a listing, in display order
    fn format_places(&self, places: &[PlaceRecord]) -> Result<String>;

    /// Format one place in detail
    fn format_place(&self, place: &PlaceRecord) -> Result<String>;

    /// Format the candidate routes to a place
    fn format_routes(&self, routes: &RouteSet) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    [&json::JsonFormatter as &dyn OutputFormatter, &text::TextFormatter]
        .into_iter()
        .map(|f| FormatInfo {
            name: f.name().to_string(),
            description: f.description().to_string(),
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::bridge::RouteSet;
    use crate::coord::Coordinates;
    use crate::place::{PlaceFields, PlaceRecord};
    use crate::routing::Route;
    use std::time::Duration;

    pub fn cafe() -> PlaceRecord {
        PlaceRecord::new(
            PlaceFields::new("Cafe A")
                .with_location("1 Main St")
                .with_category("Coffee")
                .with_rating(3.5),
            0,
        )
    }

    pub fn bare() -> PlaceRecord {
        PlaceRecord::new(PlaceFields::new("Somewhere"), 1)
    }

    pub fn routes() -> RouteSet {
        RouteSet::new(vec![Route {
            polyline: vec![Coordinates::new(52.5, 13.4), Coordinates::new(52.52, 13.41)],
            distance_meters: 3249.0,
            expected_travel_time: Duration::from_secs(420),
        }])
    }
}
