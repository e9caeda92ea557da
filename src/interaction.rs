//! Pointer interaction state machine.
//!
//! ```text
//! Idle -> AddingPoint -> Idle                     (toggle, or release on the image)
//! Idle -> PanningViewport -> Idle                 (press on background, release)
//! Idle -> ConsideringPointDrag -> Idle            (press on marker, release = click)
//!             \-> DraggingPoint -> Idle           (moved past threshold, release = commit)
//! ```
//!
//! The controller mutates the viewport while panning or zooming and the point
//! store when a point is added or a drag is committed. A dragged point is not
//! written to the store until release; renderers read [`InteractionController::drag_preview`].

use crate::constants::{DRAG_THRESHOLD, ZOOM_STEP};
use crate::model::{PointId, PointStore, Position};
use crate::viewport::{DevicePoint, Viewport};

/// What a press landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    /// The image or the empty container around it.
    Background,
    /// A point marker.
    Marker(PointId),
}

/// A pointer event in device coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Down {
        position: DevicePoint,
        target: PointerTarget,
    },
    Move {
        position: DevicePoint,
    },
    Up {
        position: DevicePoint,
    },
    /// The pointer left the surface or the touch was cancelled.
    Cancel,
    Wheel {
        position: DevicePoint,
        delta_y: f64,
    },
}

/// Current interaction state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Waiting for a click on the image to place a new point.
    AddingPoint {
        /// Normalized cursor position, `None` while outside the image.
        preview: Option<Position>,
    },
    PanningViewport {
        last: DevicePoint,
    },
    /// A marker was pressed; not yet decided between click and drag.
    ConsideringPointDrag {
        id: PointId,
        origin: DevicePoint,
    },
    DraggingPoint {
        id: PointId,
        /// Last in-bounds position under the cursor.
        preview: Position,
    },
}

/// Result of handling one pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionOutcome {
    Ignored,
    /// Add-mode preview moved, or was hidden (`None`).
    PreviewMoved(Option<Position>),
    Panned,
    Zoomed,
    PointAdded(PointId),
    DragStarted(PointId),
    DragMoved(PointId),
    DragCancelled(PointId),
    /// A drag was committed to the store.
    PointMoved(PointId),
    /// A marker was pressed and released without crossing the drag threshold.
    PointClicked(PointId),
}

/// Drives pan, zoom, point placement and point dragging from pointer events.
#[derive(Debug, Clone)]
pub struct InteractionController {
    state: InteractionState,
    drag_threshold: f64,
    zoom_step: f64,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(DRAG_THRESHOLD, ZOOM_STEP)
    }
}

impl InteractionController {
    pub fn new(drag_threshold: f64, zoom_step: f64) -> Self {
        Self {
            state: InteractionState::Idle,
            drag_threshold,
            zoom_step,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn drag_threshold(&self) -> f64 {
        self.drag_threshold
    }

    pub fn zoom_step(&self) -> f64 {
        self.zoom_step
    }

    pub fn is_adding_point(&self) -> bool {
        matches!(self.state, InteractionState::AddingPoint { .. })
    }

    /// Position of the add-mode cursor preview.
    pub fn add_preview(&self) -> Option<Position> {
        match self.state {
            InteractionState::AddingPoint { preview } => preview,
            _ => None,
        }
    }

    /// The point being dragged and where it is currently drawn.
    pub fn drag_preview(&self) -> Option<(&PointId, Position)> {
        match &self.state {
            InteractionState::DraggingPoint { id, preview } => Some((id, *preview)),
            _ => None,
        }
    }

    /// Enter or leave add-point mode. Returns whether add mode is now on.
    ///
    /// Entering add mode abandons any pointer-held state without committing.
    pub fn toggle_add_point(&mut self) -> bool {
        self.state = if self.is_adding_point() {
            InteractionState::Idle
        } else {
            InteractionState::AddingPoint { preview: None }
        };
        let adding = self.is_adding_point();
        log::debug!("Add point mode {}", if adding { "on" } else { "off" });
        adding
    }

    /// Drop back to `Idle` without committing anything.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Feed one pointer event through the state machine.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        viewport: &mut Viewport,
        store: &mut PointStore,
    ) -> InteractionOutcome {
        let state = std::mem::take(&mut self.state);

        let (next, outcome) = match (state, event) {
            (state, PointerEvent::Wheel { position, delta_y }) => {
                let factor = if delta_y < 0.0 {
                    self.zoom_step
                } else {
                    1.0 / self.zoom_step
                };
                let outcome = if viewport.zoom_at(factor, position) {
                    InteractionOutcome::Zoomed
                } else {
                    InteractionOutcome::Ignored
                };
                (state, outcome)
            }

            // Add mode
            (InteractionState::AddingPoint { .. }, PointerEvent::Move { position }) => {
                let preview = viewport.to_normalized(position).checked();
                (
                    InteractionState::AddingPoint { preview },
                    InteractionOutcome::PreviewMoved(preview),
                )
            }
            (InteractionState::AddingPoint { preview }, PointerEvent::Up { position }) => {
                let target = viewport.to_normalized(position);
                match store.add(target.x, target.y) {
                    Some(point) => {
                        let id = point.id.clone();
                        log::debug!("Placed point {} at ({:.3}, {:.3})", id, target.x, target.y);
                        (InteractionState::Idle, InteractionOutcome::PointAdded(id))
                    }
                    None => (
                        InteractionState::AddingPoint { preview },
                        InteractionOutcome::Ignored,
                    ),
                }
            }
            (InteractionState::AddingPoint { .. }, PointerEvent::Cancel) => (
                InteractionState::AddingPoint { preview: None },
                InteractionOutcome::PreviewMoved(None),
            ),
            (state @ InteractionState::AddingPoint { .. }, _) => {
                (state, InteractionOutcome::Ignored)
            }

            // Presses from idle
            (
                InteractionState::Idle,
                PointerEvent::Down {
                    position,
                    target: PointerTarget::Background,
                },
            ) => {
                log::trace!("Pan started at ({:.1}, {:.1})", position.x, position.y);
                (
                    InteractionState::PanningViewport { last: position },
                    InteractionOutcome::Ignored,
                )
            }
            (
                InteractionState::Idle,
                PointerEvent::Down {
                    position,
                    target: PointerTarget::Marker(id),
                },
            ) => {
                if store.get(&id).is_some() {
                    (
                        InteractionState::ConsideringPointDrag {
                            id,
                            origin: position,
                        },
                        InteractionOutcome::Ignored,
                    )
                } else {
                    log::debug!("Press on unknown marker {}", id);
                    (InteractionState::Idle, InteractionOutcome::Ignored)
                }
            }

            // Panning
            (InteractionState::PanningViewport { last }, PointerEvent::Move { position }) => {
                viewport.pan(position.x - last.x, position.y - last.y);
                (
                    InteractionState::PanningViewport { last: position },
                    InteractionOutcome::Panned,
                )
            }

            // Click or drag
            (
                InteractionState::ConsideringPointDrag { id, origin },
                PointerEvent::Move { position },
            ) => {
                if origin.distance_to(position) <= self.drag_threshold {
                    (
                        InteractionState::ConsideringPointDrag { id, origin },
                        InteractionOutcome::Ignored,
                    )
                } else if let Some(current) = store.get(&id).map(|p| p.position()) {
                    let preview = viewport.to_normalized(position).checked().unwrap_or(current);
                    log::debug!("Dragging point {}", id);
                    (
                        InteractionState::DraggingPoint {
                            id: id.clone(),
                            preview,
                        },
                        InteractionOutcome::DragStarted(id),
                    )
                } else {
                    (InteractionState::Idle, InteractionOutcome::Ignored)
                }
            }
            (InteractionState::ConsideringPointDrag { id, .. }, PointerEvent::Up { .. }) => {
                (InteractionState::Idle, InteractionOutcome::PointClicked(id))
            }
            (
                InteractionState::DraggingPoint { id, preview },
                PointerEvent::Move { position },
            ) => match viewport.to_normalized(position).checked() {
                Some(preview) => (
                    InteractionState::DraggingPoint {
                        id: id.clone(),
                        preview,
                    },
                    InteractionOutcome::DragMoved(id),
                ),
                None => (
                    InteractionState::DraggingPoint { id, preview },
                    InteractionOutcome::Ignored,
                ),
            },
            (InteractionState::DraggingPoint { id, preview }, PointerEvent::Up { .. }) => {
                match store.move_point(&id, preview.x, preview.y) {
                    Ok(()) => {
                        log::debug!(
                            "Moved point {} to ({:.3}, {:.3})",
                            id,
                            preview.x,
                            preview.y
                        );
                        (InteractionState::Idle, InteractionOutcome::PointMoved(id))
                    }
                    Err(e) => {
                        log::warn!("Dropping drag of point {}: {}", id, e);
                        (InteractionState::Idle, InteractionOutcome::DragCancelled(id))
                    }
                }
            }
            (InteractionState::DraggingPoint { id, .. }, PointerEvent::Cancel) => {
                log::debug!("Drag of point {} cancelled", id);
                (InteractionState::Idle, InteractionOutcome::DragCancelled(id))
            }

            // Releases and cancels end every other pointer-held state
            (_, PointerEvent::Up { .. } | PointerEvent::Cancel) => {
                (InteractionState::Idle, InteractionOutcome::Ignored)
            }
            (state, _) => (state, InteractionOutcome::Ignored),
        };

        self.state = next;
        outcome
    }
}
