//! Place command handlers
//!
//! Create, list, inspect, edit and delete saved places.

use crate::catalog::{CatalogStore, SortKey};
use crate::config::Config;
use crate::constants::map::MAX_THUMBNAIL_SIZE;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use crate::place::{photo, PlaceFields, PlaceRecord};
use clap::Args;
use std::path::PathBuf;

/// Add command arguments
#[derive(Args)]
pub struct AddArgs {
    /// Place name
    pub name: String,

    /// Free-text address or description
    #[arg(long, short = 'l')]
    pub location: Option<String>,

    /// Category label
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Star rating, 0 to 5
    #[arg(long, short = 'r', default_value = "0")]
    pub rating: f64,

    /// Photo file
    #[arg(long, short = 'i')]
    pub image: Option<PathBuf>,
}

/// List command arguments
#[derive(Args)]
pub struct ListArgs {
    /// Sort key: date or name (config default when omitted)
    #[arg(long, short = 's')]
    pub sort: Option<String>,

    /// Sort ascending (config default when neither is given)
    #[arg(long, conflicts_with = "desc")]
    pub asc: bool,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Show only places whose name or location contains this text
    #[arg(long, short = 'q')]
    pub search: Option<String>,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

/// Show command arguments
#[derive(Args)]
pub struct ShowArgs {
    /// Place id or unique id prefix
    pub id: String,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,
}

/// Edit command arguments
///
/// Unset options keep their current value.
#[derive(Args)]
pub struct EditArgs {
    /// Place id or unique id prefix
    pub id: String,

    /// New name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// New location; empty clears it
    #[arg(long, short = 'l')]
    pub location: Option<String>,

    /// New category; empty clears it
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// New star rating
    #[arg(long, short = 'r')]
    pub rating: Option<f64>,

    /// New photo file
    #[arg(long, short = 'i', conflicts_with = "clear_image")]
    pub image: Option<PathBuf>,

    /// Remove the photo
    #[arg(long)]
    pub clear_image: bool,
}

/// Delete command arguments
#[derive(Args)]
pub struct DeleteArgs {
    /// Place id or unique id prefix
    pub id: String,
}

/// Image command arguments
#[derive(Args)]
pub struct ImageArgs {
    /// Place id or unique id prefix
    pub id: String,

    /// Output file
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// Write a square PNG thumbnail of this size instead of the photo
    #[arg(long, short = 't')]
    pub thumbnail: Option<u32>,
}

/// Open the catalog configured in `config`
pub fn open_store(config: &Config) -> Result<CatalogStore> {
    CatalogStore::open(config.catalog_path()?)
}

fn read_image(path: &PathBuf) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path)?;
    photo::validate(&bytes)?;
    Ok(bytes)
}

fn print_with(format: &str, render: impl FnOnce(&dyn crate::format::OutputFormatter) -> Result<String>) -> Result<()> {
    let formatter = get_formatter(format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;
    print!("{}", render(formatter.as_ref())?);
    if format == "json" {
        println!();
    }
    Ok(())
}

/// Run the add command
pub async fn add(args: AddArgs) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config)?;

    let mut fields = PlaceFields::new(args.name).with_rating(args.rating);
    if let Some(location) = args.location {
        fields = fields.with_location(location);
    }
    if let Some(category) = args.category {
        fields = fields.with_category(category);
    }
    if let Some(path) = &args.image {
        fields = fields.with_image(read_image(path)?);
    }

    let record = store.add(fields).await?;
    println!("Added {} ({})", record.name(), record.id);
    Ok(())
}

/// Run the list command
pub async fn list(args: ListArgs) -> Result<()> {
    if args.list_formats {
        println!("Available output formats:");
        for format in available_formats() {
            println!("  {:<6} - {}", format.name, format.description);
        }
        return Ok(());
    }

    let config = Config::load()?;
    let store = open_store(&config)?;

    let sort = args.sort.clone().unwrap_or_else(|| config.listing.sort.clone());
    let key: SortKey = sort.parse().map_err(Error::Config)?;
    let ascending = sort_ascending(&args, config.listing.ascending);

    let view = store
        .all()
        .sorted_by(key, ascending)
        .search(args.search.as_deref().unwrap_or(""));
    let places = view.records().await;

    let format = args.format.unwrap_or(config.listing.format);
    print_with(&format, |f| f.format_places(&places))
}

fn sort_ascending(args: &ListArgs, default: bool) -> bool {
    match (args.asc, args.desc) {
        (true, _) => true,
        (_, true) => false,
        _ => default,
    }
}

/// Run the show command
pub async fn show(args: ShowArgs) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config)?;
    let record = store.find_by_prefix(&args.id).await?;

    let format = args.format.unwrap_or(config.listing.format);
    print_with(&format, |f| f.format_place(&record))
}

/// Apply edit options on top of the stored fields
fn edited_fields(record: &PlaceRecord, args: EditArgs) -> Result<PlaceFields> {
    let mut fields = record.fields.clone();

    if let Some(name) = args.name {
        fields.name = name;
    }
    if let Some(location) = args.location {
        fields.location = Some(location);
    }
    if let Some(category) = args.category {
        fields.category = Some(category);
    }
    if let Some(rating) = args.rating {
        fields.rating = rating;
    }
    if let Some(path) = &args.image {
        fields.image = Some(read_image(path)?);
    }
    if args.clear_image {
        fields.image = None;
    }

    Ok(fields)
}

/// Run the edit command
pub async fn edit(args: EditArgs) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config)?;
    let record = store.find_by_prefix(&args.id).await?;

    let fields = edited_fields(&record, args)?;
    let updated = store.update(record.id, fields).await?;
    println!("Updated {} ({})", updated.name(), updated.id);
    Ok(())
}

/// Run the delete command
pub async fn delete(args: DeleteArgs) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config)?;
    let record = store.find_by_prefix(&args.id).await?;

    store.remove(record.id).await?;
    println!("Deleted {} ({})", record.name(), record.id);
    Ok(())
}

/// Run the image command
pub async fn image(args: ImageArgs) -> Result<()> {
    if let Some(size) = args.thumbnail {
        if size == 0 || size > MAX_THUMBNAIL_SIZE {
            return Err(Error::InvalidPlace(format!(
                "Thumbnail size must be between 1 and {}",
                MAX_THUMBNAIL_SIZE
            )));
        }
    }

    let config = Config::load()?;
    let store = open_store(&config)?;
    let record = store.find_by_prefix(&args.id).await?;

    let source = match record.fields.image {
        Some(bytes) => bytes,
        None => {
            eprintln!("{} has no photo, writing placeholder", record.fields.name);
            photo::placeholder_png()?
        }
    };

    let bytes = match args.thumbnail {
        Some(size) => photo::thumbnail(&source, size)?,
        None => source,
    };

    std::fs::write(&args.output, &bytes)?;
    eprintln!("Image written to {}", args.output.display());
    Ok(())
}
