//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::location::AuthorizationStatus;
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "listing.sort")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    // Show path
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Reset config
    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        // No arguments: show all config
        (None, None) => {
            show_all_config(&config)?;
        }

        // Key only: show that value
        (Some(key), None) => {
            if let Some(value) = config.get(key) {
                println!("{}", value);
            } else {
                eprintln!("Unknown config key: {}", key);
                eprintln!("\nAvailable keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                std::process::exit(1);
            }
        }

        // Key and value: set the value
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        // Value without key: not valid
        (None, Some(_)) => {
            eprintln!("Error: Must specify a key to set a value");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Display all configuration values, then what they amount to
fn show_all_config(config: &Config) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
    print!("{}", content);

    println!("\n# Effective settings");
    for (name, value) in effective_settings(config)? {
        println!("# {:<16} {}", format!("{}:", name), value);
    }
    Ok(())
}

fn effective_settings(config: &Config) -> Result<Vec<(&'static str, String)>> {
    let position = match (config.location.lat, config.location.lng) {
        (Some(lat), Some(lng)) => format!("fixed at {:.6},{:.6}", lat, lng),
        _ => "looked up from the public IP, cached for an hour".to_string(),
    };

    let access = if !config.location.services_enabled {
        "off, location services are disabled".to_string()
    } else {
        match config.location.authorization.parse::<AuthorizationStatus>() {
            Ok(status) if status.is_authorized() => format!("granted ({})", status),
            Ok(AuthorizationStatus::NotDetermined) => "asked on first use".to_string(),
            Ok(status) => format!("refused ({}), no position is reported", status),
            Err(e) => format!("asked on first use ({})", e),
        }
    };

    let direction = if config.listing.ascending { "ascending" } else { "descending" };

    Ok(vec![
        ("catalog", config.catalog_path()?.display().to_string()),
        ("position", position),
        ("location access", access),
        (
            "tracking",
            format!(
                "recenter after moving more than {} m, {} s after the map settles",
                config.map.tracking_threshold_meters, config.map.recenter_delay_secs
            ),
        ),
        (
            "listing",
            format!("by {}, {}, as {}", config.listing.sort, direction, config.listing.format),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setting(config: &Config, name: &str) -> String {
        effective_settings(config)
            .unwrap()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
            .unwrap()
    }

    #[test]
    fn test_location_access_follows_authorization() {
        let mut config = Config::default();
        config.storage.path = "/tmp/places.json".to_string();

        config.location.authorization = "denied".to_string();
        assert!(setting(&config, "location access").starts_with("refused (denied)"));

        config.location.authorization = "always".to_string();
        assert_eq!(setting(&config, "location access"), "granted (authorized_always)");

        config.location.authorization = "not_determined".to_string();
        assert_eq!(setting(&config, "location access"), "asked on first use");

        config.location.services_enabled = false;
        assert!(setting(&config, "location access").starts_with("off"));
    }

    #[test]
    fn test_fixed_position_and_listing() {
        let mut config = Config::default();
        config.storage.path = "/tmp/places.json".to_string();
        config.location.lat = Some(48.8566);
        config.location.lng = Some(2.3522);
        config.listing.ascending = false;

        assert_eq!(setting(&config, "position"), "fixed at 48.856600,2.352200");
        assert_eq!(setting(&config, "catalog"), "/tmp/places.json");
        assert!(setting(&config, "listing").contains("descending"));
    }
}
