//! Command bridge: exposes the customizer session to the presentation layer.
//!
//! Every command here is an `async fn` taking the shared [`AppState`] and
//! returning a [`CommandResult`].  A desktop or web shell registers them as
//! its command handlers; the headless runner in [`script`] calls them from
//! JSON-lines input.
//!
//! # Data Transfer Objects (DTOs)
//!
//! Domain types keep prices in integer cents and positions in normalized
//! percentages.  DTOs flatten them into plain JSON-friendly fields:
//!
//! - Prices become decimal numbers of currency units plus, where a total is
//!   shown, a display string rendered with the configured [`PriceFormat`].
//! - Placements carry both the stored rotation and the folded
//!   `rendered_rotation` the view should draw.
//!
//! # `CommandResult<T>` wrapper
//!
//! All commands return `CommandResult<T>` rather than `Result<T, E>`.
//! This ensures every response has the same shape:
//! `{ success: bool, data: T | null, error: string | null }`.

use std::sync::Arc;

use charmcase_core::{
    Charm, CharmId, GestureCommit, GesturePreview, PhoneColor, PhoneModel, PlacedCharm,
    PlacementId, Point, Rect,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::application::customize_case::{
    CustomizerSession, GestureOutcome, OrderSummary, PointerEvent, PreviewGeometry, SessionError,
};
use crate::application::price_format::PriceFormat;
use crate::infrastructure::catalog::{CatalogFeed, CatalogFeeds};

pub mod script;

// ── Shared application state ──────────────────────────────────────────────────

/// Application state shared between command handlers.
///
/// The session sits behind an async Tokio mutex because handlers run as
/// async tasks; the catalog feeds are `watch` receivers and need no lock.
pub struct AppState {
    /// The one editing session of this process.
    pub session: Mutex<CustomizerSession>,
    /// Live catalog feeds; may still be loading when a command arrives.
    pub catalog: CatalogFeeds,
    /// How totals are rendered for display.
    pub price_format: PriceFormat,
}

impl AppState {
    pub fn new(session: CustomizerSession, catalog: CatalogFeeds, price_format: PriceFormat) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(session),
            catalog,
            price_format,
        })
    }
}

// ── Data Transfer Objects (Presentation layer) ────────────────────────────────

/// DTO for one catalog charm in the palette.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CharmDto {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub price: f64,
    /// Rendered size in preview pixels.
    pub width: u32,
    pub height: u32,
}

impl From<&Charm> for CharmDto {
    fn from(c: &Charm) -> Self {
        let (width, height) = c.size();
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            image_url: c.image_url.clone(),
            price: c.price.as_units(),
            width,
            height,
        }
    }
}

/// DTO mirroring [`CatalogFeed`] for one list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedDto<T> {
    pub is_loading: bool,
    pub items: Vec<T>,
    pub error: Option<String>,
}

impl<T> FeedDto<T> {
    fn from_feed<S>(feed: &CatalogFeed<S>, convert: impl Fn(&S) -> T) -> Self {
        Self {
            is_loading: feed.is_loading,
            items: feed.data.iter().map(|item| convert(item.as_ref())).collect(),
            error: feed.error.clone(),
        }
    }
}

/// DTO for the whole catalog as currently loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogDto {
    pub charms: FeedDto<CharmDto>,
    pub phone_models: FeedDto<PhoneModel>,
    pub colors: FeedDto<PhoneColor>,
}

/// DTO for one charm placed on the case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlacedCharmDto {
    pub placement_id: String,
    pub charm_id: String,
    pub name: String,
    pub image_url: String,
    /// Normalized centre, percent of the case bounding box.
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub rendered_rotation: f64,
    pub width: u32,
    pub height: u32,
    pub price: f64,
}

impl From<&PlacedCharm> for PlacedCharmDto {
    fn from(p: &PlacedCharm) -> Self {
        let (width, height) = p.charm.size();
        Self {
            placement_id: p.id.to_string(),
            charm_id: p.charm.id.to_string(),
            name: p.charm.name.clone(),
            image_url: p.charm.image_url.clone(),
            x: p.position.x,
            y: p.position.y,
            rotation: p.rotation,
            rendered_rotation: p.rendered_rotation(),
            width,
            height,
            price: p.charm.price.as_units(),
        }
    }
}

/// DTO for the full session view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionDto {
    pub session_id: String,
    pub phone: Option<PhoneModel>,
    pub color: Option<PhoneColor>,
    /// In z-order: later entries render on top.
    pub placements: Vec<PlacedCharmDto>,
    pub revision: u64,
    pub base_price: f64,
    pub total_price: f64,
    pub total_display: String,
    pub case_rect: Rect,
    pub trash_rect: Option<Rect>,
}

impl SessionDto {
    fn build(session: &CustomizerSession, fmt: &PriceFormat) -> Self {
        let geometry = session.geometry();
        let total = session.total_price();
        Self {
            session_id: session.id().to_string(),
            phone: session.selected_phone().map(|p| PhoneModel::clone(p)),
            color: session.selected_color().map(|c| PhoneColor::clone(c)),
            placements: session.placements().iter().map(PlacedCharmDto::from).collect(),
            revision: session.placements().revision(),
            base_price: session.base_price().as_units(),
            total_price: total.as_units(),
            total_display: fmt.format(total),
            case_rect: geometry.case_rect,
            trash_rect: geometry.trash_rect,
        }
    }
}

/// DTO describing what a pointer event did.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome")]
pub enum GestureOutcomeDto {
    Started { placement_id: String, kind: String },
    PreviewMove { placement_id: String, x: f64, y: f64 },
    PreviewRotate { placement_id: String, degrees: f64 },
    Moved { placement_id: String, x: f64, y: f64, applied: bool },
    Rotated { placement_id: String, degrees: f64, applied: bool },
    Removed { placement_id: String, applied: bool },
    Cancelled { gestures: usize },
}

impl From<&GestureOutcome> for GestureOutcomeDto {
    fn from(outcome: &GestureOutcome) -> Self {
        match outcome {
            GestureOutcome::Started { placement, kind } => GestureOutcomeDto::Started {
                placement_id: placement.to_string(),
                kind: format!("{kind:?}"),
            },
            GestureOutcome::Preview(GesturePreview::Move { placement, position }) => {
                GestureOutcomeDto::PreviewMove {
                    placement_id: placement.to_string(),
                    x: position.x,
                    y: position.y,
                }
            }
            GestureOutcome::Preview(GesturePreview::Rotate { placement, degrees }) => {
                GestureOutcomeDto::PreviewRotate {
                    placement_id: placement.to_string(),
                    degrees: *degrees,
                }
            }
            GestureOutcome::Committed { commit, applied } => match commit {
                GestureCommit::Move { placement, position } => GestureOutcomeDto::Moved {
                    placement_id: placement.to_string(),
                    x: position.x,
                    y: position.y,
                    applied: *applied,
                },
                GestureCommit::Rotate { placement, degrees } => GestureOutcomeDto::Rotated {
                    placement_id: placement.to_string(),
                    degrees: *degrees,
                    applied: *applied,
                },
                GestureCommit::Remove { placement } => GestureOutcomeDto::Removed {
                    placement_id: placement.to_string(),
                    applied: *applied,
                },
            },
            GestureOutcome::Cancelled { gestures } => GestureOutcomeDto::Cancelled { gestures: *gestures },
        }
    }
}

/// DTO for the order summary, with the total rendered for display.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummaryDto {
    #[serde(flatten)]
    pub summary: OrderSummary,
    pub total_display: String,
}

/// Unified response wrapper used by every command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

impl<T: Serialize> From<Result<T, SessionError>> for CommandResult<T> {
    fn from(result: Result<T, SessionError>) -> Self {
        match result {
            Ok(data) => CommandResult::ok(data),
            Err(e) => CommandResult::err(e.to_string()),
        }
    }
}

// ── Catalog lookup ────────────────────────────────────────────────────────────

fn find_phone(state: &AppState, phone_id: &str) -> Result<Arc<PhoneModel>, SessionError> {
    let feed = state.catalog.phone_models();
    feed.data
        .iter()
        .find(|p| p.id == phone_id)
        .cloned()
        .ok_or_else(|| SessionError::UnknownCatalogItem {
            kind: "phone model",
            id: phone_id.to_string(),
        })
}

fn find_color(state: &AppState, color_id: &str) -> Result<Arc<PhoneColor>, SessionError> {
    let feed = state.catalog.colors();
    feed.data
        .iter()
        .find(|c| c.id == color_id)
        .cloned()
        .ok_or_else(|| SessionError::UnknownCatalogItem {
            kind: "color",
            id: color_id.to_string(),
        })
}

fn find_charm(state: &AppState, charm_id: &CharmId) -> Result<Arc<Charm>, SessionError> {
    let feed = state.catalog.charms();
    feed.data
        .iter()
        .find(|c| &c.id == charm_id)
        .cloned()
        .ok_or_else(|| SessionError::unknown_charm(charm_id))
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Returns the catalog as currently loaded, including loading and error state.
///
/// # Example (frontend)
/// ```ts
/// const catalog = await invoke<CatalogDto>('get_catalog');
/// ```
pub async fn get_catalog(state: Arc<AppState>) -> CommandResult<CatalogDto> {
    CommandResult::ok(CatalogDto {
        charms: FeedDto::from_feed(&state.catalog.charms(), |c| CharmDto::from(c)),
        phone_models: FeedDto::from_feed(&state.catalog.phone_models(), |p| p.clone()),
        colors: FeedDto::from_feed(&state.catalog.colors(), |c| c.clone()),
    })
}

/// Selects the phone model whose case is being customized.
pub async fn select_phone(state: Arc<AppState>, phone_id: String) -> CommandResult<SessionDto> {
    let phone = match find_phone(&state, &phone_id) {
        Ok(phone) => phone,
        Err(e) => return CommandResult::err(e.to_string()),
    };
    let mut session = state.session.lock().await;
    session.select_phone(phone);
    CommandResult::ok(SessionDto::build(&session, &state.price_format))
}

/// Goes back to the phone picker; placed charms are kept.
pub async fn clear_phone(state: Arc<AppState>) -> CommandResult<SessionDto> {
    let mut session = state.session.lock().await;
    session.clear_phone();
    CommandResult::ok(SessionDto::build(&session, &state.price_format))
}

pub async fn select_color(state: Arc<AppState>, color_id: String) -> CommandResult<SessionDto> {
    let color = match find_color(&state, &color_id) {
        Ok(color) => color,
        Err(e) => return CommandResult::err(e.to_string()),
    };
    let mut session = state.session.lock().await;
    session.select_color(color);
    CommandResult::ok(SessionDto::build(&session, &state.price_format))
}

/// Drops a charm from the palette at `(x, y)` in preview pixels.
pub async fn drop_charm(state: Arc<AppState>, charm_id: String, x: f64, y: f64) -> CommandResult<PlacedCharmDto> {
    let charm = match find_charm(&state, &CharmId::new(charm_id)) {
        Ok(charm) => charm,
        Err(e) => return CommandResult::err(e.to_string()),
    };
    let mut session = state.session.lock().await;
    let result = session.drop_charm(charm, Point::new(x, y)).and_then(|id| {
        session
            .placement(&id)
            .map(PlacedCharmDto::from)
            .ok_or(SessionError::UnknownCatalogItem {
                kind: "placement",
                id: id.to_string(),
            })
    });
    result.into()
}

/// Feeds one pointer event into the gesture recognizer.
pub async fn pointer_event(state: Arc<AppState>, event: PointerEvent) -> CommandResult<Option<GestureOutcomeDto>> {
    let mut session = state.session.lock().await;
    session
        .handle_pointer_event(event)
        .map(|outcome| outcome.as_ref().map(GestureOutcomeDto::from))
        .into()
}

/// Removes one placement.  `data` is `false` if it was already gone.
pub async fn remove_charm(state: Arc<AppState>, placement_id: String) -> CommandResult<bool> {
    let mut session = state.session.lock().await;
    CommandResult::ok(session.remove_charm(&PlacementId(placement_id)))
}

/// Removes every placement; `data` is how many were removed.
pub async fn clear_charms(state: Arc<AppState>) -> CommandResult<usize> {
    let mut session = state.session.lock().await;
    CommandResult::ok(session.clear_charms())
}

pub async fn get_session(state: Arc<AppState>) -> CommandResult<SessionDto> {
    let session = state.session.lock().await;
    CommandResult::ok(SessionDto::build(&session, &state.price_format))
}

/// Summarises the order.  Nothing is submitted.
pub async fn order_summary(state: Arc<AppState>) -> CommandResult<OrderSummaryDto> {
    let session = state.session.lock().await;
    session
        .order_summary()
        .map(|summary| OrderSummaryDto {
            total_display: state.price_format.format(summary.total),
            summary,
        })
        .into()
}

/// Updates the preview layout after the view is resized.  A case rect with no
/// area is rejected and the previous layout kept.
pub async fn set_preview_geometry(state: Arc<AppState>, geometry: PreviewGeometry) -> CommandResult<SessionDto> {
    let mut session = state.session.lock().await;
    let result = session.set_preview_geometry(geometry);
    result.map(|()| SessionDto::build(&session, &state.price_format)).into()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
