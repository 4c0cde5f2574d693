//! File-backed inventory list.
//!
//! The store is a JSON array of `{"name", "stock"}` records. Every mutation
//! rewrites the whole file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info};

/// One inventory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub stock: i64,
}

#[derive(Debug)]
pub enum InventoryError {
    Io(io::Error),
    Format(serde_json::Error),
    EmptyName,
    /// 1-based id with no matching item.
    InvalidId(usize),
}

impl std::fmt::Display for InventoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InventoryError::Io(e) => write!(f, "I/O error: {}", e),
            InventoryError::Format(e) => write!(f, "malformed inventory file: {}", e),
            InventoryError::EmptyName => write!(f, "item name must not be empty"),
            InventoryError::InvalidId(id) => write!(f, "no item with id {}", id),
        }
    }
}

impl std::error::Error for InventoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InventoryError::Io(e) => Some(e),
            InventoryError::Format(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for InventoryError {
    fn from(e: io::Error) -> Self {
        InventoryError::Io(e)
    }
}

impl From<serde_json::Error> for InventoryError {
    fn from(e: serde_json::Error) -> Self {
        InventoryError::Format(e)
    }
}

/// An inventory bound to the file it was loaded from.
#[derive(Debug)]
pub struct InventoryStore {
    path: PathBuf,
    items: Vec<Item>,
}

impl InventoryStore {
    /// Loads the inventory at `path`. A missing file is an empty inventory.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, InventoryError> {
        let path = path.into();
        let items = match fs::read(&path) {
            Ok(data) => {
                // `null` is what an empty list was saved as by older writers.
                let items: Option<Vec<Item>> = serde_json::from_slice(&data)?;
                items.unwrap_or_default()
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "inventory file not found, starting empty");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), items = items.len(), "inventory loaded");
        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Writes the whole inventory, pretty-printed with a one-space indent.
    pub fn save(&self) -> Result<(), InventoryError> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b" ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.items.serialize(&mut serializer)?;

        fs::write(&self.path, buf)?;
        Ok(())
    }

    /// Appends an item and saves.
    pub fn add(&mut self, name: &str, stock: i64) -> Result<(), InventoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InventoryError::EmptyName);
        }

        self.items.push(Item {
            name: name.to_string(),
            stock,
        });
        self.save()?;
        info!(name, stock, "item added");
        Ok(())
    }

    /// Removes the item with the 1-based `id` and saves.
    pub fn delete(&mut self, id: usize) -> Result<Item, InventoryError> {
        if id == 0 || id > self.items.len() {
            return Err(InventoryError::InvalidId(id));
        }

        let removed = self.items.remove(id - 1);
        self.save()?;
        info!(id, name = %removed.name, "item deleted");
        Ok(removed)
    }

    /// Human-readable listing, one line per item.
    pub fn listing(&self) -> String {
        if self.items.is_empty() {
            return "No items in inventory.".to_string();
        }

        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("[{}] {} (Stock: {})", i + 1, item.name, item.stock))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> InventoryStore {
        InventoryStore::load(dir.path().join("inventory.json")).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.items().is_empty());
        assert_eq!(store.listing(), "No items in inventory.");
        assert!(!store.path().exists());
    }

    #[test]
    fn test_add_delete_persist() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add("bolts", 120).unwrap();
        store.add("nuts", 80).unwrap();
        store.add("washers", -3).unwrap();

        let reloaded = store_in(&dir);
        assert_eq!(reloaded.items(), store.items());
        assert_eq!(
            reloaded.listing(),
            "[1] bolts (Stock: 120)\n[2] nuts (Stock: 80)\n[3] washers (Stock: -3)"
        );

        let removed = store.delete(2).unwrap();
        assert_eq!(removed.name, "nuts");
        let reloaded = store_in(&dir);
        assert_eq!(
            reloaded.listing(),
            "[1] bolts (Stock: 120)\n[2] washers (Stock: -3)"
        );
    }

    #[test]
    fn test_save_uses_one_space_indent() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add("bolts", 5).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "[\n {\n  \"name\": \"bolts\",\n  \"stock\": 5\n }\n]");
    }

    #[test]
    fn test_rejects_empty_name_and_bad_ids() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        assert!(matches!(store.add("  ", 1), Err(InventoryError::EmptyName)));
        assert!(!store.path().exists());

        store.add("bolts", 1).unwrap();
        assert!(matches!(store.delete(0), Err(InventoryError::InvalidId(0))));
        assert!(matches!(store.delete(2), Err(InventoryError::InvalidId(2))));
        assert_eq!(store.items().len(), 1);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inventory.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            InventoryStore::load(&path),
            Err(InventoryError::Format(_))
        ));
    }

    #[test]
    fn test_null_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inventory.json");
        fs::write(&path, "null").unwrap();
        assert!(InventoryStore::load(&path).unwrap().items().is_empty());
    }
}
