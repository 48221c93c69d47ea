//! Human-readable text output formatter

use crate::bridge::RouteSet;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::place::{PlaceRecord, MAX_RATING};

/// Text formatter - one line per place, star ratings
pub struct TextFormatter;

/// Rating as five stars, rounded to the nearest whole star
pub fn stars(rating: f64) -> String {
    let filled = rating.round().clamp(0.0, MAX_RATING) as usize;
    let empty = MAX_RATING as usize - filled;
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}

fn short_id(place: &PlaceRecord) -> String {
    place.id.simple().to_string()[..8].to_string()
}

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format_places(&self, places: &[PlaceRecord]) -> Result<String> {
        if places.is_empty() {
            return Ok("No places\n".to_string());
        }

        let mut output = String::new();
        for place in places {
            output.push_str(&format!(
                "{}  {}  {}",
                short_id(place),
                stars(place.rating()),
                place.name()
            ));
            if let Some(category) = place.category() {
                output.push_str(&format!(" [{}]", category));
            }
            if let Some(location) = place.location() {
                output.push_str(&format!(" - {}", location));
            }
            output.push('\n');
        }
        Ok(output)
    }

    fn format_place(&self, place: &PlaceRecord) -> Result<String> {
        let mut output = String::new();
        output.push_str(&format!("{}\n", place.name()));
        output.push_str(&format!("  Id: {}\n", place.id));
        if let Some(location) = place.location() {
            output.push_str(&format!("  Location: {}\n", location));
        }
        if let Some(category) = place.category() {
            output.push_str(&format!("  Category: {}\n", category));
        }
        output.push_str(&format!(
            "  Rating: {} ({})\n",
            stars(place.rating()),
            place.rating()
        ));
        output.push_str(&format!(
            "  Image: {}\n",
            if place.has_image() { "yes" } else { "placeholder" }
        ));
        output.push_str(&format!(
            "  Added: {}\n",
            place.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        Ok(output)
    }

    fn format_routes(&self, routes: &RouteSet) -> Result<String> {
        if routes.routes.is_empty() {
            return Ok("No routes\n".to_string());
        }

        let mut output = String::new();
        for (i, route) in routes.routes.iter().enumerate() {
            let minutes = (route.expected_travel_time.as_secs_f64() / 60.0).round();
            output.push_str(&format!(
                "Route {}: {} km, {} min\n",
                i + 1,
                route.distance_km(),
                minutes
            ));
        }
        if let Some(viewport) = routes.viewport {
            let center = viewport.center();
            output.push_str(&format!("Viewport center: ({:.6}, {:.6})\n", center.lat, center.lng));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures::*;

    #[test]
    fn test_stars() {
        assert_eq!(stars(0.0), "☆☆☆☆☆");
        assert_eq!(stars(3.5), "★★★★☆");
        assert_eq!(stars(5.0), "★★★★★");
    }

    #[test]
    fn test_listing() {
        let output = TextFormatter.format_places(&[cafe(), bare()]).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("Cafe A [Coffee] - 1 Main St"));
        assert!(lines[1].ends_with("☆☆☆☆☆  Somewhere"));
    }

    #[test]
    fn test_empty_listing() {
        assert_eq!(TextFormatter.format_places(&[]).unwrap(), "No places\n");
    }

    #[test]
    fn test_detail() {
        let output = TextFormatter.format_place(&cafe()).unwrap();
        assert!(output.contains("Location: 1 Main St"));
        assert!(output.contains("Rating: ★★★★☆ (3.5)"));
        assert!(output.contains("Image: placeholder"));
    }

    #[test]
    fn test_routes() {
        let output = TextFormatter.format_routes(&routes()).unwrap();
        assert!(output.starts_with("Route 1: 3.2 km, 7 min"));
    }
}
