//! Catalog types and the compiled-in station table.

use serde::{Deserialize, Serialize};

/// Local availability of an item's media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DownloadStatus {
    #[default]
    NotDownloaded,
    Downloading,
    Downloaded,
}

/// One playable entry — a station or a track — with display and playback
/// metadata. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique within a catalog.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Total length in seconds. Live streams have none.
    #[serde(default)]
    pub duration_secs: Option<f64>,
    pub media_uri: String,
    /// Artwork locator. Empty string means "no artwork".
    #[serde(default)]
    pub art_uri: String,
    #[serde(default = "default_playable")]
    pub playable: bool,
    #[serde(default)]
    pub download_status: DownloadStatus,
}

fn default_playable() -> bool {
    true
}

impl CatalogItem {
    /// Build a live radio stream entry.
    pub fn station(id: &str, title: &str, media_uri: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            subtitle: None,
            duration_secs: None,
            media_uri: media_uri.to_string(),
            art_uri: String::new(),
            playable: true,
            download_status: DownloadStatus::NotDownloaded,
        }
    }
}

/// Ordered collection of playable items. Insertion order is presentation
/// order and is preserved through every read path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn find(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The compiled-in station table: nine Prescott-area broadcast streams.
///
/// Builtin entries carry no artwork locator; remote catalogs may.
pub fn builtin_items() -> Vec<CatalogItem> {
    vec![
        CatalogItem::station(
            "KPPV",
            "KPPV 106.7 FM",
            "http://stream.affordablestreaming.com:8000/KPPV.mp3",
        ),
        CatalogItem::station(
            "KQNA",
            "KQNA 1130AM",
            "http://stream.affordablestreaming.com:8000/KQNA.mp3",
        ),
        CatalogItem::station(
            "KDDL",
            "KDDL",
            "http://stream.affordablestreaming.com:8000/KDDL.mp3",
        ),
        CatalogItem::station(
            "KPKR",
            "Jack fm 95.7 95.5",
            "http://stream.affordablestreaming.com:8000/KPKR.mp3",
        ),
        CatalogItem::station(
            "KDMM",
            "KDMM",
            "http://stream.affordablestreaming.com:8000/KDMM.mp3",
        ),
        CatalogItem::station(
            "JACKFM",
            "JACKFM 94.7",
            "http://stream.affordablestreaming.com:8000/JACKFM.mp3",
        ),
        CatalogItem::station(
            "JUAN",
            "Juan 107.1 FM",
            "http://stream.affordablestreaming.com:8000/JUANFM.mp3",
        ),
        CatalogItem::station(
            "KUGO",
            "Grand Canyon Info",
            "http://stream.affordablestreaming.com:8000/KUGO-1.mp3",
        ),
        CatalogItem::station(
            "KXBB",
            "KXBB Badass blues",
            "http://stream.affordablestreaming.com:8000/KXBB.mp3",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_shape() {
        let items = builtin_items();
        assert_eq!(items.len(), 9);
        for item in &items {
            assert!(!item.id.is_empty());
            assert!(!item.title.is_empty());
            assert!(item.media_uri.starts_with("http://"));
            assert!(item.playable);
            assert!(item.art_uri.is_empty());
            assert_eq!(item.download_status, DownloadStatus::NotDownloaded);
        }
    }

    #[test]
    fn test_builtin_ids_unique() {
        let items = builtin_items();
        let mut ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 9);
    }

    #[test]
    fn test_builtin_order() {
        let items = builtin_items();
        assert_eq!(items.first().map(|i| i.id.as_str()), Some("KPPV"));
        assert_eq!(items.last().map(|i| i.id.as_str()), Some("KXBB"));
    }

    #[test]
    fn test_catalog_find_and_iter() {
        let catalog = Catalog::new(builtin_items());
        assert_eq!(catalog.len(), 9);
        assert!(catalog.find("JUAN").is_some());
        assert!(catalog.find("WXYZ").is_none());

        // Iteration is restartable and preserves declared order.
        let first_pass: Vec<&str> = catalog.iter().map(|i| i.id.as_str()).collect();
        let second_pass: Vec<&str> = catalog.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(first_pass, second_pass);
        assert_eq!(first_pass[3], "KPKR");
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::default();
        assert!(catalog.is_empty());
        assert_eq!(catalog.iter().count(), 0);
    }
}
