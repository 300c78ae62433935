//! Built-in sample catalog.
//!
//! Serves a fixed catalog after a simulated network delay so that loading
//! states are exercised the same way a remote catalog would exercise them.

use std::time::Duration;

use async_trait::async_trait;
use charmcase_core::{Charm, CharmId, PhoneColor, PhoneModel, Price};

use super::{CatalogError, CatalogProvider};

/// Simulated latency per feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockDelays {
    pub charms: Duration,
    pub phone_models: Duration,
    pub colors: Duration,
}

impl Default for MockDelays {
    fn default() -> Self {
        Self {
            charms: Duration::from_millis(800),
            phone_models: Duration::from_millis(600),
            colors: Duration::from_millis(500),
        }
    }
}

impl MockDelays {
    /// No delay at all.
    pub const NONE: MockDelays = MockDelays {
        charms: Duration::ZERO,
        phone_models: Duration::ZERO,
        colors: Duration::ZERO,
    };
}

/// A [`CatalogProvider`] serving the sample catalog.
#[derive(Debug, Clone, Default)]
pub struct MockCatalog {
    delays: MockDelays,
}

impl MockCatalog {
    /// Creates a catalog with the default delays (800/600/500 ms).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delays(delays: MockDelays) -> Self {
        Self { delays }
    }
}

#[async_trait]
impl CatalogProvider for MockCatalog {
    async fn fetch_charms(&self) -> Result<Vec<Charm>, CatalogError> {
        tokio::time::sleep(self.delays.charms).await;
        Ok(sample_charms())
    }

    async fn fetch_phone_models(&self) -> Result<Vec<PhoneModel>, CatalogError> {
        tokio::time::sleep(self.delays.phone_models).await;
        Ok(sample_phone_models())
    }

    async fn fetch_colors(&self) -> Result<Vec<PhoneColor>, CatalogError> {
        tokio::time::sleep(self.delays.colors).await;
        Ok(sample_colors())
    }
}

// ── Sample data ───────────────────────────────────────────────────────────────

fn charm(id: &str, name: &str, color: &str, glyph: &str, cents: u64) -> Charm {
    Charm {
        id: CharmId::from(id),
        name: name.to_string(),
        image_url: format!("https://placehold.co/100/{color}/ffffff?text={glyph}"),
        price: Price::from_cents(cents),
        width: None,
        height: None,
    }
}

/// The eight sample charms.
pub fn sample_charms() -> Vec<Charm> {
    vec![
        charm("charm-1", "Star Charm", "f59e0b", "★", 499),
        charm("charm-2", "Heart Charm", "ef4444", "♥", 499),
        charm("charm-3", "Moon Charm", "6366f1", "☾", 599),
        charm("charm-4", "Sun Charm", "f59e0b", "☀", 599),
        charm("charm-5", "Cloud Charm", "3b82f6", "☁", 399),
        charm("charm-6", "Flower Charm", "ec4899", "✿", 699),
        charm("charm-7", "Music Charm", "8b5cf6", "♪", 499),
        charm("charm-8", "Peace Charm", "10b981", "☮", 499),
    ]
}

pub fn sample_phone_models() -> Vec<PhoneModel> {
    vec![PhoneModel {
        id: "iphone-13-pro".to_string(),
        name: "iPhone 13 Pro".to_string(),
        case_image_url: "https://placehold.co/300x600/ffffff/00000000".to_string(),
    }]
}

pub fn sample_colors() -> Vec<PhoneColor> {
    [
        ("graphite", "#54514D", "Graphite"),
        ("silver", "#E2E2E7", "Silver"),
        ("gold", "#F9E5C9", "Gold"),
        ("sierra-blue", "#A7C1D9", "Sierra Blue"),
        ("midnight", "#1F2937", "Midnight"),
        ("starlight", "#F5F5F0", "Starlight"),
        ("pink", "#FBE2DD", "Pink"),
        ("blue", "#215E7C", "Blue"),
        ("purple", "#E5DDEA", "Purple"),
        ("red", "#A50011", "Product Red"),
    ]
    .into_iter()
    .map(|(id, code, display)| PhoneColor {
        id: id.to_string(),
        name: id.to_string(),
        color_code: code.to_string(),
        display_name: display.to_string(),
    })
    .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
