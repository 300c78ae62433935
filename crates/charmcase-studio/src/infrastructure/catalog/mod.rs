//! Catalog infrastructure: where charms, phone models, and colors come from.
//!
//! The customizer never fetches data itself.  A [`CatalogProvider`] is
//! injected at startup and each of its three lists is loaded into a
//! [`CatalogFeed`] on a background task:
//!
//! ```text
//! CatalogProvider ──fetch──► spawn_feed ──watch──► CatalogFeed { is_loading, data, error }
//! ```
//!
//! A feed starts loading, settles exactly once to either data or an error
//! message, and then never changes.  There is no retry and no timeout.  If
//! every observer has gone away before the fetch completes, the result is
//! quietly dropped.
//!
//! # Implementations
//!
//! - [`mock::MockCatalog`] – the built-in sample catalog with simulated
//!   network delay.
//! - [`file::FileCatalog`] – a catalog read from a TOML file.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use charmcase_core::{Charm, PhoneColor, PhoneModel};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::infrastructure::storage::config::{CatalogConfig, CatalogSource, ConfigError};

pub mod file;
pub mod mock;

/// Error type for catalog fetches.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The source could not deliver the list.
    #[error("failed to fetch {feed}: {reason}")]
    Fetch { feed: &'static str, reason: String },

    /// The catalog file could not be read.
    #[error("I/O error reading catalog at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog file is not valid TOML for the catalog schema.
    #[error("failed to parse catalog TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Trait abstracting catalog data retrieval.
///
/// The production implementations are [`mock::MockCatalog`] and
/// [`file::FileCatalog`]; unit tests use the generated `MockCatalogProvider`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetches every charm that can be placed on a case.
    async fn fetch_charms(&self) -> Result<Vec<Charm>, CatalogError>;

    /// Fetches the phone models whose cases can be customized.
    async fn fetch_phone_models(&self) -> Result<Vec<PhoneModel>, CatalogError>;

    /// Fetches the available phone colors.
    async fn fetch_colors(&self) -> Result<Vec<PhoneColor>, CatalogError>;
}

/// Builds the provider selected by the `[catalog]` config section.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when `source = "file"` has no `path`.
pub fn provider_from_config(config: &CatalogConfig) -> Result<Arc<dyn CatalogProvider>, ConfigError> {
    match config.source {
        CatalogSource::Mock => Ok(Arc::new(mock::MockCatalog::with_delays(mock::MockDelays {
            charms: Duration::from_millis(config.charms_delay_ms),
            phone_models: Duration::from_millis(config.phone_models_delay_ms),
            colors: Duration::from_millis(config.colors_delay_ms),
        }))),
        CatalogSource::File => {
            let path = config.path.clone().ok_or(ConfigError::Invalid {
                field: "catalog.path",
                reason: "required when catalog.source = \"file\"".to_string(),
            })?;
            Ok(Arc::new(file::FileCatalog::new(path)))
        }
    }
}

// ── Feeds ─────────────────────────────────────────────────────────────────────

/// The observable state of one catalog list.
#[derive(Debug)]
pub struct CatalogFeed<T> {
    pub is_loading: bool,
    /// Entries are shared read-only with every session that uses them.
    pub data: Vec<Arc<T>>,
    pub error: Option<String>,
}

impl<T> CatalogFeed<T> {
    /// A feed whose fetch has not completed yet.
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            data: Vec::new(),
            error: None,
        }
    }

    /// A feed that settled with an error and no data.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            is_loading: false,
            data: Vec::new(),
            error: Some(message.into()),
        }
    }

    fn settled(result: Result<Vec<T>, CatalogError>) -> Self {
        match result {
            Ok(items) => Self {
                is_loading: false,
                data: items.into_iter().map(Arc::new).collect(),
                error: None,
            },
            Err(e) => Self::failed(e.to_string()),
        }
    }
}

// Manual impl: cloning only bumps `Arc` counts, so `T: Clone` is not needed.
impl<T> Clone for CatalogFeed<T> {
    fn clone(&self) -> Self {
        Self {
            is_loading: self.is_loading,
            data: self.data.clone(),
            error: self.error.clone(),
        }
    }
}

/// Runs `fetch` on a background task and publishes its result.
///
/// The returned receiver observes `loading()` until the fetch settles.  Must be
/// called from within a Tokio runtime.
pub fn spawn_feed<T, F>(name: &'static str, fetch: F) -> watch::Receiver<CatalogFeed<T>>
where
    T: Send + Sync + 'static,
    F: Future<Output = Result<Vec<T>, CatalogError>> + Send + 'static,
{
    let (tx, rx) = watch::channel(CatalogFeed::loading());
    tokio::spawn(async move {
        let feed = CatalogFeed::settled(fetch.await);
        match &feed.error {
            Some(error) => warn!(feed = name, %error, "catalog feed failed"),
            None => info!(feed = name, items = feed.data.len(), "catalog feed loaded"),
        }
        if tx.send(feed).is_err() {
            debug!(feed = name, "no observers left; catalog result discarded");
        }
    });
    rx
}

/// Waits until the feed behind `rx` has settled and returns its final state.
pub async fn settled<T>(rx: &mut watch::Receiver<CatalogFeed<T>>) -> CatalogFeed<T> {
    match rx.wait_for(|feed| !feed.is_loading).await {
        Ok(feed) => feed.clone(),
        Err(_) => CatalogFeed::failed("catalog task ended before settling"),
    }
}

/// The three catalog feeds the customizer screen observes.
#[derive(Debug, Clone)]
pub struct CatalogFeeds {
    pub charms: watch::Receiver<CatalogFeed<Charm>>,
    pub phone_models: watch::Receiver<CatalogFeed<PhoneModel>>,
    pub colors: watch::Receiver<CatalogFeed<PhoneColor>>,
}

impl CatalogFeeds {
    /// Starts all three fetches concurrently.
    pub fn spawn(provider: Arc<dyn CatalogProvider>) -> Self {
        let p = Arc::clone(&provider);
        let charms = spawn_feed("charms", async move { p.fetch_charms().await });
        let p = Arc::clone(&provider);
        let phone_models = spawn_feed("phone_models", async move { p.fetch_phone_models().await });
        let colors = spawn_feed("colors", async move { provider.fetch_colors().await });
        Self {
            charms,
            phone_models,
            colors,
        }
    }

    /// Waits until every feed has settled.
    pub async fn wait_settled(&mut self) {
        settled(&mut self.charms).await;
        settled(&mut self.phone_models).await;
        settled(&mut self.colors).await;
    }

    /// Current state of the charm feed.
    pub fn charms(&self) -> CatalogFeed<Charm> {
        self.charms.borrow().clone()
    }

    pub fn phone_models(&self) -> CatalogFeed<PhoneModel> {
        self.phone_models.borrow().clone()
    }

    pub fn colors(&self) -> CatalogFeed<PhoneColor> {
        self.colors.borrow().clone()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
