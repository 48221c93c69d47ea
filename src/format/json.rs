//! JSON output formatter

use crate::bridge::RouteSet;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::place::{PlaceRecord, PlaceSummary};

/// JSON formatter - pretty-printed summaries without image bytes
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Pretty-printed JSON"
    }

    fn format_places(&self, places: &[PlaceRecord]) -> Result<String> {
        let summaries: Vec<PlaceSummary> = places.iter().map(PlaceSummary::from).collect();
        Ok(serde_json::to_string_pretty(&summaries)?)
    }

    fn format_place(&self, place: &PlaceRecord) -> Result<String> {
        Ok(serde_json::to_string_pretty(&PlaceSummary::from(place))?)
    }

    fn format_routes(&self, routes: &RouteSet) -> Result<String> {
        Ok(serde_json::to_string_pretty(routes)?)
    }
}
