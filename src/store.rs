use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::models::Product;
use crate::utils::error::AppError;
use crate::Result;

/// On-disk shape of the product document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductDocument {
    pub products: Vec<Product>,
}

/// The tracked products, in insertion order, bound to the JSON document they
/// were loaded from. Every save rewrites the whole document.
#[derive(Debug)]
pub struct ProductStore {
    path: PathBuf,
    document: ProductDocument,
}

impl ProductStore {
    /// A missing document is a first run and yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let document = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            debug!("No product document at {}, starting empty", path.display());
            ProductDocument::default()
        };

        Ok(Self { path, document })
    }

    /// Writes to a sibling temp file and renames it over the document, so a
    /// reader sees either the previous or the new collection.
    pub fn save(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        let json = serde_json::to_string_pretty(&self.document)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        debug!("Saved {} product(s) to {}", self.document.products.len(), self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn products(&self) -> &[Product] {
        &self.document.products
    }

    pub fn len(&self) -> usize {
        self.document.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.products.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Product> {
        self.document.products.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Appends and persists. The store is untouched when the name is taken.
    pub fn add(&mut self, product: Product) -> Result<()> {
        if self.contains(&product.name) {
            return Err(AppError::DuplicateName { name: product.name });
        }

        info!("Adding product '{}' (target {})", product.name, product.target_price);
        self.document.products.push(product);

        if let Err(e) = self.save() {
            self.document.products.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Removes every product called `name` and persists if anything matched.
    /// Returns how many were removed; zero means not found.
    pub fn remove(&mut self, name: &str) -> Result<usize> {
        let before = self.document.products.clone();
        self.document.products.retain(|p| p.name != name);
        let removed = before.len() - self.document.products.len();

        if removed > 0 {
            if let Err(e) = self.save() {
                self.document.products = before;
                return Err(e);
            }
            info!("Removed {} product(s) named '{}'", removed, name);
        }
        Ok(removed)
    }

    /// In-memory only; the check pass saves once at the end. Returns false if
    /// no product has that name.
    pub fn update_check_result(&mut self, name: &str, price: Decimal, checked_at: DateTime<Utc>) -> bool {
        match self.document.products.iter().position(|p| p.name == name) {
            Some(index) => self.update_check_result_at(index, price, checked_at),
            None => false,
        }
    }

    // Positional variant so repeated names each get their own result
    pub(crate) fn update_check_result_at(&mut self, index: usize, price: Decimal, checked_at: DateTime<Utc>) -> bool {
        match self.document.products.get_mut(index) {
            Some(product) => {
                product.record_check(price, checked_at);
                true
            }
            None => false,
        }
    }
}
