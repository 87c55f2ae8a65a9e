use crate::common_types::CaptureRect;

mod terminal;
pub use terminal::*;

/// Selections narrower or shorter than this (in logical pixels) are discarded.
pub const MIN_SELECTION_SIZE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionOutcome {
    Pending,
    Cancelled,
    Selected(CaptureRect),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum OverlayState {
    Idle,
    Armed,
    Selecting {
        start_x: f64,
        start_y: f64,
        current_x: f64,
        current_y: f64,
    },
}

/// Pointer-driven region selection. The overlay is fed pointer events by a
/// frontend driver and yields a device-pixel rectangle on a completed drag.
#[derive(Debug)]
pub struct SelectionOverlay {
    state: OverlayState,
    device_pixel_ratio: f64,
}

impl SelectionOverlay {
    pub fn new(device_pixel_ratio: f64) -> Self {
        Self {
            state: OverlayState::Idle,
            device_pixel_ratio,
        }
    }

    /// Starts a fresh selection session. An already showing overlay is torn
    /// down first so sessions never stack.
    pub fn activate(&mut self) {
        if self.is_active() {
            self.teardown();
        }
        self.state = OverlayState::Armed;
    }

    pub fn is_active(&self) -> bool {
        self.state != OverlayState::Idle
    }

    /// Removes all selection state. Safe to call when already clean.
    pub fn teardown(&mut self) {
        self.state = OverlayState::Idle;
    }

    /// The in-progress selection box in logical pixels, for rendering.
    pub fn selection_box(&self) -> Option<CaptureRect> {
        match self.state {
            OverlayState::Selecting {
                start_x,
                start_y,
                current_x,
                current_y,
            } => Some(CaptureRect::from_points(
                start_x, start_y, current_x, current_y,
            )),
            _ => None,
        }
    }

    pub fn handle(&mut self, event: PointerEvent) -> SelectionOutcome {
        match (self.state, event) {
            (_, PointerEvent::Cancel) => {
                self.teardown();
                SelectionOutcome::Cancelled
            }
            (OverlayState::Armed, PointerEvent::Down { x, y }) => {
                self.state = OverlayState::Selecting {
                    start_x: x,
                    start_y: y,
                    current_x: x,
                    current_y: y,
                };
                SelectionOutcome::Pending
            }
            (
                OverlayState::Selecting {
                    start_x, start_y, ..
                },
                PointerEvent::Move { x, y },
            ) => {
                self.state = OverlayState::Selecting {
                    start_x,
                    start_y,
                    current_x: x,
                    current_y: y,
                };
                SelectionOutcome::Pending
            }
            (
                OverlayState::Selecting {
                    start_x, start_y, ..
                },
                PointerEvent::Up { x, y },
            ) => {
                self.teardown();
                let logical = CaptureRect::from_points(start_x, start_y, x, y);
                if logical.width < MIN_SELECTION_SIZE || logical.height < MIN_SELECTION_SIZE {
                    SelectionOutcome::Cancelled
                } else {
                    SelectionOutcome::Selected(logical.scaled(self.device_pixel_ratio))
                }
            }
            _ => SelectionOutcome::Pending,
        }
    }

    /// Runs a whole down/up drag in one shot, applying the same minimum-size
    /// and scaling rules as interactive selection.
    pub fn select_region(&mut self, region: &CaptureRect) -> SelectionOutcome {
        self.activate();
        self.handle(PointerEvent::Down {
            x: region.x,
            y: region.y,
        });
        self.handle(PointerEvent::Up {
            x: region.x + region.width,
            y: region.y + region.height,
        })
    }
}
