//! Catalog file format
//!
//! The whole catalog lives in one JSON file. Writes go to a sibling temp file
//! that is renamed over the original, so a failed write never leaves a
//! half-written catalog behind.

use crate::error::{Error, Result};
use crate::place::PlaceRecord;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// On-disk shape of the catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Next insertion ordinal to hand out
    #[serde(default)]
    pub next_seq: u64,

    #[serde(default)]
    pub places: Vec<PlaceRecord>,
}

/// Load the catalog, or an empty one if the file does not exist yet
pub fn load(path: &Path) -> Result<CatalogFile> {
    if !path.exists() {
        return Ok(CatalogFile::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Storage(format!("Failed to read catalog file: {}", e)))?;

    let mut file: CatalogFile = serde_json::from_str(&content)
        .map_err(|e| Error::Storage(format!("Failed to parse catalog file: {}", e)))?;

    // Files edited by hand may lag behind their records
    let max_seq = file.places.iter().map(|p| p.seq + 1).max().unwrap_or(0);
    file.next_seq = file.next_seq.max(max_seq);

    Ok(file)
}

/// Modification time of the catalog file, `None` while it does not exist
pub fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Write the catalog atomically
pub fn save(path: &Path, file: &CatalogFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::Storage(format!("Failed to create catalog directory: {}", e)))?;
    }

    let content = serde_json::to_string_pretty(file)
        .map_err(|e| Error::Storage(format!("Failed to serialize catalog: {}", e)))?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)
        .map_err(|e| Error::Storage(format!("Failed to write catalog file: {}", e)))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(Error::Storage(format!("Failed to replace catalog file: {}", e)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::place::PlaceFields;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let file = load(&dir.path().join("places.json")).unwrap();
        assert!(file.places.is_empty());
        assert_eq!(file.next_seq, 0);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("places.json");

        let file = CatalogFile {
            next_seq: 1,
            places: vec![PlaceRecord::new(PlaceFields::new("Cafe").with_image(vec![1, 2]), 0)],
        };
        save(&path, &file).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.places.len(), 1);
        assert_eq!(loaded.places[0].fields.image, Some(vec![1, 2]));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_next_seq_catches_up_with_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("places.json");
        let file = CatalogFile {
            next_seq: 0,
            places: vec![PlaceRecord::new(PlaceFields::new("Cafe"), 9)],
        };
        save(&path, &file).unwrap();

        assert_eq!(load(&path).unwrap().next_seq, 10);
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        // A non-empty directory cannot be replaced by a file
        let path = dir.path().join("places.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "").unwrap();

        let result = save(&path, &CatalogFile::default());
        assert!(matches!(result, Err(Error::Storage(_))));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_modified_tracks_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("places.json");
        assert!(modified(&path).is_none());

        save(&path, &CatalogFile::default()).unwrap();
        assert!(modified(&path).is_some());
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("places.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(load(&path), Err(Error::Storage(_))));
    }
}
