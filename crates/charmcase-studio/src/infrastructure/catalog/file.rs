//! Catalog loaded from a TOML file.
//!
//! ```toml
//! [[charms]]
//! id = "charm-1"
//! name = "Star Charm"
//! image_url = "star.png"
//! price = 4.99
//!
//! [[phone_models]]
//! id = "iphone-13-pro"
//! name = "iPhone 13 Pro"
//! case_image_url = "case.png"
//!
//! [[colors]]
//! id = "gold"
//! name = "gold"
//! color_code = "#F9E5C9"
//! display_name = "Gold"
//! ```
//!
//! The file is re-read on every fetch; each list is optional.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use charmcase_core::{Charm, PhoneColor, PhoneModel};
use serde::{Deserialize, Serialize};

use super::{CatalogError, CatalogProvider};

/// On-disk catalog schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogFile {
    #[serde(default)]
    pub charms: Vec<Charm>,
    #[serde(default)]
    pub phone_models: Vec<PhoneModel>,
    #[serde(default)]
    pub colors: Vec<PhoneColor>,
}

/// A [`CatalogProvider`] backed by a TOML file.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<CatalogFile, CatalogError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| CatalogError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(toml::from_str(&content)?)
    }
}

#[async_trait]
impl CatalogProvider for FileCatalog {
    async fn fetch_charms(&self) -> Result<Vec<Charm>, CatalogError> {
        Ok(self.load().await?.charms)
    }

    async fn fetch_phone_models(&self) -> Result<Vec<PhoneModel>, CatalogError> {
        Ok(self.load().await?.phone_models)
    }

    async fn fetch_colors(&self) -> Result<Vec<PhoneColor>, CatalogError> {
        Ok(self.load().await?.colors)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
