//! CustomizerSession: one case-customization session from phone pick to order.
//!
//! The session owns everything the user edits: the selected phone model and
//! color, the [`PlacementModel`] of charms on the case, and the
//! [`GestureRecognizer`] tracking live drags.  Presentation code feeds it
//! pointer events and reads back placements and the running total.
//!
//! # Flow
//!
//! ```text
//! select_phone ──► drop_charm ──► pointer Down/Move/Up ──► order_summary
//!       ▲                              │
//!       └────── clear_phone ◄──────────┘ (placements kept)
//! ```
//!
//! # Architecture
//!
//! The session is synchronous and exclusively owned.  Catalog entries arrive
//! as `Arc`s already fetched by the infrastructure layer, so nothing here
//! performs I/O.

use std::sync::Arc;

use charmcase_core::{
    Charm, CharmId, GestureCommit, GestureError, GestureKind, GesturePreview, GestureRecognizer,
    Modifiers, PhoneColor, PhoneModel, PlacedCharm, PlacementBounds, PlacementId, PlacementModel,
    Point, PointerId, Price, Rect, RotateModifier,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Base case price before any charms are added.
pub const DEFAULT_BASE_PRICE: Price = Price::from_cents(1999);

/// Error type for the customize-case use case.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    /// The case surface only exists once a phone model is chosen.
    #[error("no phone model selected")]
    NoPhoneSelected,

    /// A catalog id did not resolve to a loaded entry.
    #[error("unknown {kind}: {id}")]
    UnknownCatalogItem { kind: &'static str, id: String },

    /// The case rect must have a positive area to normalize against.
    #[error("case must have a positive size, got {width}x{height}")]
    InvalidGeometry { width: f64, height: f64 },

    #[error(transparent)]
    Gesture(#[from] GestureError),
}

impl SessionError {
    pub fn unknown_charm(id: &CharmId) -> Self {
        SessionError::UnknownCatalogItem {
            kind: "charm",
            id: id.to_string(),
        }
    }
}

/// Where the case and the trash zone sit in preview pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewGeometry {
    /// Bounding box of the rendered case.
    pub case_rect: Rect,
    /// Drop zone that deletes a dragged charm; `None` disables drag-to-trash.
    pub trash_rect: Option<Rect>,
}

impl Default for PreviewGeometry {
    fn default() -> Self {
        Self {
            case_rect: Rect::new(0.0, 0.0, 300.0, 600.0),
            trash_rect: Some(Rect::new(110.0, 620.0, 80.0, 60.0)),
        }
    }
}

/// Tunables for a new session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub base_price: Price,
    pub bounds: PlacementBounds,
    pub rotate_modifier: RotateModifier,
    pub geometry: PreviewGeometry,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            base_price: DEFAULT_BASE_PRICE,
            bounds: PlacementBounds::default(),
            rotate_modifier: RotateModifier::default(),
            geometry: PreviewGeometry::default(),
        }
    }
}

/// A pointer event delivered by the presentation layer.
///
/// Positions are in preview pixel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase")]
pub enum PointerEvent {
    /// Pointer pressed on a placed charm.
    Down {
        pointer: PointerId,
        placement: PlacementId,
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Move {
        pointer: PointerId,
        position: Point,
    },
    Up {
        pointer: PointerId,
        position: Point,
    },
    /// The platform aborted this pointer (e.g. touch cancel).
    Cancel { pointer: PointerId },
    /// The preview lost focus; every live gesture is abandoned.
    FocusLost,
}

/// What a pointer event did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    Started {
        placement: PlacementId,
        kind: GestureKind,
    },
    /// Live feedback; the model is unchanged.
    Preview(GesturePreview),
    /// The gesture resolved.  `applied` is `false` when the placement had
    /// already gone (e.g. cleared mid-drag).
    Committed { commit: GestureCommit, applied: bool },
    Cancelled { gestures: usize },
}

/// One charm line of an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
    pub placement_id: PlacementId,
    pub charm_id: CharmId,
    pub name: String,
    pub price: Price,
}

/// Snapshot of what would be ordered.  Nothing is submitted anywhere.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub session_id: Uuid,
    pub phone: PhoneModel,
    pub color: Option<PhoneColor>,
    pub lines: Vec<OrderLine>,
    pub base_price: Price,
    pub charms_price: Price,
    pub total: Price,
}

/// The customize-case use case.
pub struct CustomizerSession {
    id: Uuid,
    model: PlacementModel,
    recognizer: GestureRecognizer,
    base_price: Price,
    geometry: PreviewGeometry,
    selected_phone: Option<Arc<PhoneModel>>,
    selected_color: Option<Arc<PhoneColor>>,
}

impl CustomizerSession {
    /// Creates an empty session with no phone selected.
    pub fn new(settings: SessionSettings) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, base_price = %settings.base_price, "customizer session created");
        Self {
            id,
            model: PlacementModel::with_bounds(settings.bounds),
            recognizer: GestureRecognizer::new(settings.rotate_modifier),
            base_price: settings.base_price,
            geometry: settings.geometry,
            selected_phone: None,
            selected_color: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    // ── Selection ─────────────────────────────────────────────────────────────

    pub fn select_phone(&mut self, phone: Arc<PhoneModel>) {
        info!(session = %self.id, phone = %phone.id, "phone selected");
        self.selected_phone = Some(phone);
    }

    /// Returns to the phone picker.  Placed charms survive; gestures do not,
    /// because the case surface is no longer shown.
    pub fn clear_phone(&mut self) {
        self.selected_phone = None;
        self.recognizer.cancel_all();
    }

    pub fn selected_phone(&self) -> Option<&Arc<PhoneModel>> {
        self.selected_phone.as_ref()
    }

    pub fn select_color(&mut self, color: Arc<PhoneColor>) {
        debug!(session = %self.id, color = %color.id, "color selected");
        self.selected_color = Some(color);
    }

    pub fn selected_color(&self) -> Option<&Arc<PhoneColor>> {
        self.selected_color.as_ref()
    }

    // ── Placement ─────────────────────────────────────────────────────────────

    /// Places `charm` where it was dropped from the palette.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoPhoneSelected`] before a phone is chosen.
    pub fn drop_charm(&mut self, charm: Arc<Charm>, drop_point: Point) -> Result<PlacementId, SessionError> {
        if self.selected_phone.is_none() {
            return Err(SessionError::NoPhoneSelected);
        }
        let placed = self.model.place(charm, drop_point, &self.geometry.case_rect);
        Ok(placed.id.clone())
    }

    /// Routes a pointer event through the gesture recognizer and commits the
    /// result to the placement model.
    ///
    /// Returns `Ok(None)` for events that concern no gesture (e.g. a move for
    /// a pointer that never went down).
    ///
    /// # Errors
    ///
    /// - [`SessionError::NoPhoneSelected`] for a press while no case is shown.
    /// - [`SessionError::Gesture`] if the press cannot start a gesture.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> Result<Option<GestureOutcome>, SessionError> {
        let surface = self.geometry.case_rect;
        match event {
            PointerEvent::Down {
                pointer,
                placement,
                position,
                modifiers,
            } => {
                if self.selected_phone.is_none() {
                    return Err(SessionError::NoPhoneSelected);
                }
                let kind = self
                    .recognizer
                    .on_gesture_start(pointer, &placement, position, modifiers, &self.model, &surface)?;
                Ok(Some(GestureOutcome::Started { placement, kind }))
            }
            PointerEvent::Move { pointer, position } => Ok(self
                .recognizer
                .on_gesture_move(pointer, position, &self.model, &surface)
                .map(GestureOutcome::Preview)),
            PointerEvent::Up { pointer, position } => {
                let trash = self.geometry.trash_rect;
                let commit = match self.recognizer.on_gesture_end(
                    pointer,
                    position,
                    &self.model,
                    &surface,
                    trash.as_ref(),
                ) {
                    Some(commit) => commit,
                    None => return Ok(None),
                };
                let applied = commit.apply(&mut self.model);
                if let GestureCommit::Remove { placement } = &commit {
                    info!(session = %self.id, placement = %placement, applied, "charm dropped on trash");
                }
                Ok(Some(GestureOutcome::Committed { commit, applied }))
            }
            PointerEvent::Cancel { pointer } => Ok(self
                .recognizer
                .on_gesture_cancel(pointer)
                .map(|_| GestureOutcome::Cancelled { gestures: 1 })),
            PointerEvent::FocusLost => {
                let gestures = self.recognizer.cancel_all();
                Ok((gestures > 0).then_some(GestureOutcome::Cancelled { gestures }))
            }
        }
    }

    // ── Editing ───────────────────────────────────────────────────────────────

    /// Removes one placement (the per-charm ✕ button).  Returns `false` if it
    /// was already gone.
    pub fn remove_charm(&mut self, id: &PlacementId) -> bool {
        self.model.remove(id).is_some()
    }

    /// Removes every placement and abandons live gestures.
    pub fn clear_charms(&mut self) -> usize {
        self.recognizer.cancel_all();
        let removed = self.model.clear();
        info!(session = %self.id, removed, "charms cleared");
        removed
    }

    pub fn placements(&self) -> &PlacementModel {
        &self.model
    }

    pub fn placement(&self, id: &PlacementId) -> Option<&PlacedCharm> {
        self.model.get(id)
    }

    // ── Pricing ───────────────────────────────────────────────────────────────

    pub fn base_price(&self) -> Price {
        self.base_price
    }

    pub fn total_price(&self) -> Price {
        self.model.total_price(self.base_price)
    }

    /// Summarises the order behind the "Complete Order" button.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoPhoneSelected`] when there is no case to order.
    pub fn order_summary(&self) -> Result<OrderSummary, SessionError> {
        let phone = self.selected_phone.as_ref().ok_or(SessionError::NoPhoneSelected)?;
        let lines: Vec<OrderLine> = self
            .model
            .iter()
            .map(|p| OrderLine {
                placement_id: p.id.clone(),
                charm_id: p.charm.id.clone(),
                name: p.charm.name.clone(),
                price: p.charm.price,
            })
            .collect();
        Ok(OrderSummary {
            session_id: self.id,
            phone: PhoneModel::clone(phone),
            color: self.selected_color.as_deref().cloned(),
            lines,
            base_price: self.base_price,
            charms_price: self.model.charms_price(),
            total: self.total_price(),
        })
    }

    // ── Geometry ──────────────────────────────────────────────────────────────

    /// Updates the preview layout after a resize.  Stored positions are
    /// normalized, so placements keep their relative spots.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidGeometry`] and keeps the current layout
    /// when the case rect is not strictly positive in both dimensions.
    pub fn set_preview_geometry(&mut self, geometry: PreviewGeometry) -> Result<(), SessionError> {
        let case = geometry.case_rect;
        // NaN fails both comparisons, so it is rejected too.
        if !(case.width > 0.0 && case.height > 0.0) {
            return Err(SessionError::InvalidGeometry {
                width: case.width,
                height: case.height,
            });
        }
        debug!(session = %self.id, ?geometry, "preview geometry updated");
        self.geometry = geometry;
        Ok(())
    }

    pub fn geometry(&self) -> PreviewGeometry {
        self.geometry
    }
}

impl Default for CustomizerSession {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use charmcase_core::NormalizedPosition;

    const MOUSE: PointerId = PointerId(1);

    fn phone() -> Arc<PhoneModel> {
        Arc::new(PhoneModel {
            id: "iphone-13-pro".to_string(),
            name: "iPhone 13 Pro".to_string(),
            case_image_url: "case.png".to_string(),
        })
    }

    fn charm(id: &str, cents: u64) -> Arc<Charm> {
        Arc::new(Charm {
            id: CharmId::from(id),
            name: format!("{id} charm"),
            image_url: format!("{id}.png"),
            price: Price::from_cents(cents),
            width: None,
            height: None,
        })
    }

    /// Session with a phone selected and one charm centred on the case.
    fn session_with_charm() -> (CustomizerSession, PlacementId) {
        let mut session = CustomizerSession::default();
        session.select_phone(phone());
        let id = session
            .drop_charm(charm("star", 499), Point::new(150.0, 300.0))
            .expect("phone selected");
        (session, id)
    }

    fn down(placement: &PlacementId, x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            pointer: MOUSE,
            placement: placement.clone(),
            position: Point::new(x, y),
            modifiers: Modifiers::default(),
        }
    }

    // ── Selection ─────────────────────────────────────────────────────────────

    #[test]
    fn test_drop_charm_without_phone_is_rejected() {
        // Arrange
        let mut session = CustomizerSession::default();

        // Act
        let result = session.drop_charm(charm("star", 499), Point::new(150.0, 300.0));

        // Assert
        assert_eq!(result, Err(SessionError::NoPhoneSelected));
        assert!(session.placements().is_empty());
    }

    #[test]
    fn test_clear_phone_keeps_placements() {
        let (mut session, id) = session_with_charm();
        session.clear_phone();
        assert!(session.selected_phone().is_none());
        assert!(session.placement(&id).is_some());
        assert_eq!(session.total_price(), Price::from_cents(2498));
    }

    #[test]
    fn test_clear_phone_cancels_live_gesture() {
        let (mut session, id) = session_with_charm();
        session.handle_pointer_event(down(&id, 150.0, 300.0)).unwrap();

        session.clear_phone();
        session.select_phone(phone());

        let outcome = session
            .handle_pointer_event(PointerEvent::Up {
                pointer: MOUSE,
                position: Point::new(150.0, 650.0),
            })
            .unwrap();
        assert_eq!(outcome, None);
        assert!(session.placement(&id).is_some());
    }

    #[test]
    fn test_pointer_down_without_phone_is_rejected() {
        let (mut session, id) = session_with_charm();
        session.clear_phone();
        assert_eq!(
            session.handle_pointer_event(down(&id, 150.0, 300.0)),
            Err(SessionError::NoPhoneSelected)
        );
    }

    // ── Gestures ──────────────────────────────────────────────────────────────

    #[test]
    fn test_drag_and_release_moves_charm() {
        // Arrange
        let (mut session, id) = session_with_charm();

        // Act
        session.handle_pointer_event(down(&id, 150.0, 300.0)).unwrap();
        let preview = session
            .handle_pointer_event(PointerEvent::Move {
                pointer: MOUSE,
                position: Point::new(75.0, 150.0),
            })
            .unwrap();
        let commit = session
            .handle_pointer_event(PointerEvent::Up {
                pointer: MOUSE,
                position: Point::new(75.0, 150.0),
            })
            .unwrap();

        // Assert
        assert!(matches!(preview, Some(GestureOutcome::Preview(GesturePreview::Move { .. }))));
        assert!(matches!(commit, Some(GestureOutcome::Committed { applied: true, .. })));
        assert_eq!(
            session.placement(&id).map(|p| p.position),
            Some(NormalizedPosition::new(25.0, 25.0))
        );
    }

    #[test]
    fn test_release_over_trash_removes_charm_and_updates_total() {
        let (mut session, id) = session_with_charm();
        session.handle_pointer_event(down(&id, 150.0, 300.0)).unwrap();

        let outcome = session
            .handle_pointer_event(PointerEvent::Up {
                pointer: MOUSE,
                position: Point::new(150.0, 650.0),
            })
            .unwrap();

        assert_eq!(
            outcome,
            Some(GestureOutcome::Committed {
                commit: GestureCommit::Remove { placement: id.clone() },
                applied: true,
            })
        );
        assert!(session.placement(&id).is_none());
        assert_eq!(session.total_price(), DEFAULT_BASE_PRICE);
    }

    #[test]
    fn test_release_over_trash_with_trash_disabled_moves_instead() {
        let (mut session, id) = session_with_charm();
        session
            .set_preview_geometry(PreviewGeometry {
                trash_rect: None,
                ..PreviewGeometry::default()
            })
            .unwrap();
        session.handle_pointer_event(down(&id, 150.0, 300.0)).unwrap();

        session
            .handle_pointer_event(PointerEvent::Up {
                pointer: MOUSE,
                position: Point::new(150.0, 650.0),
            })
            .unwrap();

        // Dragged below the case: clamped to the 90% bound.
        assert_eq!(session.placement(&id).map(|p| p.position.y), Some(90.0));
    }

    #[test]
    fn test_zero_size_case_geometry_is_rejected_and_layout_kept() {
        // Arrange
        let (mut session, _) = session_with_charm();
        let before = session.geometry();

        // Act
        let result = session.set_preview_geometry(PreviewGeometry {
            case_rect: Rect::new(0.0, 0.0, 0.0, 600.0),
            trash_rect: None,
        });

        // Assert
        assert_eq!(result, Err(SessionError::InvalidGeometry { width: 0.0, height: 600.0 }));
        assert_eq!(session.geometry(), before);
    }

    #[test]
    fn test_negative_or_nan_case_geometry_is_rejected() {
        let mut session = CustomizerSession::default();
        for case_rect in [Rect::new(0.0, 0.0, 300.0, -1.0), Rect::new(0.0, 0.0, f64::NAN, 600.0)] {
            let result = session.set_preview_geometry(PreviewGeometry {
                case_rect,
                trash_rect: None,
            });
            assert!(matches!(result, Err(SessionError::InvalidGeometry { .. })));
        }
        assert_eq!(session.geometry(), PreviewGeometry::default());
    }

    #[test]
    fn test_shift_press_rotates_charm() {
        let (mut session, id) = session_with_charm();
        let started = session
            .handle_pointer_event(PointerEvent::Down {
                pointer: MOUSE,
                placement: id.clone(),
                position: Point::new(150.0, 250.0),
                modifiers: Modifiers {
                    shift: true,
                    ..Modifiers::default()
                },
            })
            .unwrap();
        assert_eq!(
            started,
            Some(GestureOutcome::Started {
                placement: id.clone(),
                kind: GestureKind::Rotate,
            })
        );

        // Pointer directly right of the centre: 90°.
        session
            .handle_pointer_event(PointerEvent::Up {
                pointer: MOUSE,
                position: Point::new(250.0, 300.0),
            })
            .unwrap();
        let rotation = session.placement(&id).map(|p| p.rotation).unwrap_or_default();
        assert!((rotation - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_press_on_unknown_placement_surfaces_gesture_error() {
        let (mut session, _) = session_with_charm();
        let ghost = PlacementId::from("ghost-9");
        assert_eq!(
            session.handle_pointer_event(down(&ghost, 0.0, 0.0)),
            Err(SessionError::Gesture(GestureError::UnknownPlacement(ghost)))
        );
    }

    #[test]
    fn test_cancel_commits_nothing() {
        let (mut session, id) = session_with_charm();
        let revision = session.placements().revision();
        session.handle_pointer_event(down(&id, 150.0, 300.0)).unwrap();

        let outcome = session
            .handle_pointer_event(PointerEvent::Cancel { pointer: MOUSE })
            .unwrap();

        assert_eq!(outcome, Some(GestureOutcome::Cancelled { gestures: 1 }));
        assert_eq!(session.placements().revision(), revision);
    }

    #[test]
    fn test_focus_lost_cancels_every_gesture() {
        let (mut session, a) = session_with_charm();
        let b = session.drop_charm(charm("moon", 599), Point::new(60.0, 60.0)).unwrap();
        session.handle_pointer_event(down(&a, 150.0, 300.0)).unwrap();
        session
            .handle_pointer_event(PointerEvent::Down {
                pointer: PointerId(2),
                placement: b,
                position: Point::new(60.0, 60.0),
                modifiers: Modifiers::default(),
            })
            .unwrap();

        let outcome = session.handle_pointer_event(PointerEvent::FocusLost).unwrap();

        assert_eq!(outcome, Some(GestureOutcome::Cancelled { gestures: 2 }));
    }

    #[test]
    fn test_focus_lost_without_gestures_reports_nothing() {
        let mut session = CustomizerSession::default();
        assert_eq!(session.handle_pointer_event(PointerEvent::FocusLost), Ok(None));
    }

    #[test]
    fn test_move_for_idle_pointer_is_ignored() {
        let (mut session, _) = session_with_charm();
        let outcome = session
            .handle_pointer_event(PointerEvent::Move {
                pointer: PointerId(7),
                position: Point::new(10.0, 10.0),
            })
            .unwrap();
        assert_eq!(outcome, None);
    }

    // ── Editing & pricing ─────────────────────────────────────────────────────

    #[test]
    fn test_clear_charms_resets_total_and_cancels_gestures() {
        // Arrange
        let (mut session, id) = session_with_charm();
        session.drop_charm(charm("moon", 599), Point::new(60.0, 60.0)).unwrap();
        session.handle_pointer_event(down(&id, 150.0, 300.0)).unwrap();

        // Act
        let removed = session.clear_charms();
        let late_up = session
            .handle_pointer_event(PointerEvent::Up {
                pointer: MOUSE,
                position: Point::new(10.0, 10.0),
            })
            .unwrap();

        // Assert
        assert_eq!(removed, 2);
        assert_eq!(late_up, None);
        assert_eq!(session.total_price(), DEFAULT_BASE_PRICE);
    }

    #[test]
    fn test_remove_charm_twice_is_idempotent() {
        let (mut session, id) = session_with_charm();
        assert!(session.remove_charm(&id));
        assert!(!session.remove_charm(&id));
    }

    #[test]
    fn test_order_summary_lists_charms_and_total() {
        // Arrange
        let (mut session, _) = session_with_charm();
        session.drop_charm(charm("moon", 599), Point::new(60.0, 60.0)).unwrap();
        session.select_color(Arc::new(PhoneColor {
            id: "gold".to_string(),
            name: "gold".to_string(),
            color_code: "#F9E5C9".to_string(),
            display_name: "Gold".to_string(),
        }));

        // Act
        let summary = session.order_summary().unwrap();

        // Assert
        assert_eq!(summary.session_id, session.id());
        assert_eq!(summary.phone.name, "iPhone 13 Pro");
        assert_eq!(summary.color.map(|c| c.display_name), Some("Gold".to_string()));
        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.charms_price, Price::from_cents(1098));
        assert_eq!(summary.total.to_string(), "30.97");
    }

    #[test]
    fn test_order_summary_without_phone_fails() {
        let session = CustomizerSession::default();
        assert_eq!(session.order_summary(), Err(SessionError::NoPhoneSelected));
    }

    #[test]
    fn test_custom_base_price_is_used() {
        let session = CustomizerSession::new(SessionSettings {
            base_price: Price::from_cents(2499),
            ..SessionSettings::default()
        });
        assert_eq!(session.total_price(), Price::from_cents(2499));
    }

    #[test]
    fn test_pointer_event_deserializes_from_tagged_json() {
        let json = r#"{"phase":"Down","pointer":1,"placement":"charm-1-0","position":{"x":150.0,"y":300.0}}"#;
        let event: PointerEvent = serde_json::from_str(json).expect("valid pointer event");
        assert_eq!(
            event,
            PointerEvent::Down {
                pointer: PointerId(1),
                placement: PlacementId::from("charm-1-0"),
                position: Point::new(150.0, 300.0),
                modifiers: Modifiers::default(),
            }
        );
    }
}
