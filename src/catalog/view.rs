//! Live catalog views
//!
//! A view is a query (sort order plus search text) bound to a store. It holds
//! no copy of the records: every read re-pulls from the store, so a view
//! always reflects the last committed mutation.

use crate::catalog::{CatalogEvent, CatalogStore};
use crate::place::PlaceRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tokio::sync::broadcast;

/// Field a listing can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[serde(rename = "date", alias = "created_at")]
    CreatedAt,
    #[serde(rename = "name")]
    Name,
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreatedAt => write!(f, "date"),
            Self::Name => write!(f, "name"),
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "date" | "created_at" | "created" => Ok(Self::CreatedAt),
            "name" => Ok(Self::Name),
            _ => Err(format!("Unknown sort key: {}", s)),
        }
    }
}

/// Sort key plus direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub key: SortKey,
    pub ascending: bool,
}

impl SortOrder {
    fn compare(&self, a: &PlaceRecord, b: &PlaceRecord) -> Ordering {
        let by_key = match self.key {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::Name => a
                .fields
                .name
                .to_lowercase()
                .cmp(&b.fields.name.to_lowercase())
                .then_with(|| a.fields.name.cmp(&b.fields.name)),
        };
        let by_key = if self.ascending { by_key } else { by_key.reverse() };
        // Equal keys keep insertion order in both directions
        by_key.then_with(|| a.seq.cmp(&b.seq))
    }
}

/// A live, order-stable query over a catalog
#[derive(Clone)]
pub struct LiveView {
    store: CatalogStore,
    order: Option<SortOrder>,
    needle: String,
}

impl LiveView {
    pub(crate) fn new(store: CatalogStore) -> Self {
        Self {
            store,
            order: None,
            needle: String::new(),
        }
    }

    /// Same view, re-ordered; records themselves are untouched
    pub fn sorted_by(&self, key: SortKey, ascending: bool) -> LiveView {
        LiveView {
            order: Some(SortOrder { key, ascending }),
            ..self.clone()
        }
    }

    /// Same view, filtered to records whose name or location contains
    /// `text` case-insensitively; empty text removes the filter
    pub fn search(&self, text: &str) -> LiveView {
        LiveView {
            needle: text.to_lowercase(),
            ..self.clone()
        }
    }

    pub fn order(&self) -> Option<SortOrder> {
        self.order
    }

    pub fn is_filtering(&self) -> bool {
        !self.needle.is_empty()
    }

    /// Current contents of the view
    pub async fn records(&self) -> Vec<PlaceRecord> {
        let mut records = self.store.snapshot().await;

        if self.is_filtering() {
            records.retain(|r| r.matches(&self.needle));
        }

        if let Some(order) = self.order {
            records.sort_by(|a, b| order.compare(a, b));
        }

        records
    }

    /// Number of records currently in the view
    pub async fn len(&self) -> usize {
        self.records().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Record at a display position
    pub async fn get(&self, index: usize) -> Option<PlaceRecord> {
        self.records().await.into_iter().nth(index)
    }

    /// Notifications for every mutation of the underlying store
    pub fn changes(&self) -> broadcast::Receiver<CatalogEvent> {
        self.store.subscribe()
    }
}
