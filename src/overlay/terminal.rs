use crate::common_types::CaptureRect;
use crate::overlay::{PointerEvent, SelectionOutcome, SelectionOverlay};
use crate::AppResult;
use console::{Key, Style, Term};

const MOVE_STEP: f64 = 10.0;

/// Keyboard-driven selection for terminals: arrow keys move a virtual
/// pointer, Enter anchors and completes the drag, Escape cancels.
pub struct TerminalSelectionDriver<'a> {
    term: &'a Term,
}

impl<'a> TerminalSelectionDriver<'a> {
    pub fn new(term: &'a Term) -> Self {
        Self { term }
    }

    pub fn select(&self, overlay: &mut SelectionOverlay) -> AppResult<Option<CaptureRect>> {
        let dim_style = Style::new().dim();
        overlay.activate();
        self.term.write_line(
            dim_style
                .apply_to("Arrows move the pointer, Enter anchors/completes the selection, Esc cancels")
                .to_string()
                .as_str(),
        )?;

        let mut x = 0.0_f64;
        let mut y = 0.0_f64;
        let mut anchored = false;

        loop {
            self.render_position(overlay, x, y)?;
            let event = match self.term.read_key()? {
                Key::Escape => PointerEvent::Cancel,
                Key::ArrowLeft => {
                    x = (x - MOVE_STEP).max(0.0);
                    PointerEvent::Move { x, y }
                }
                Key::ArrowRight => {
                    x += MOVE_STEP;
                    PointerEvent::Move { x, y }
                }
                Key::ArrowUp => {
                    y = (y - MOVE_STEP).max(0.0);
                    PointerEvent::Move { x, y }
                }
                Key::ArrowDown => {
                    y += MOVE_STEP;
                    PointerEvent::Move { x, y }
                }
                Key::Enter if !anchored => {
                    anchored = true;
                    PointerEvent::Down { x, y }
                }
                Key::Enter => PointerEvent::Up { x, y },
                _ => continue,
            };

            match overlay.handle(event) {
                SelectionOutcome::Pending => continue,
                SelectionOutcome::Cancelled => {
                    self.term.clear_line()?;
                    return Ok(None);
                }
                SelectionOutcome::Selected(rect) => {
                    self.term.clear_line()?;
                    return Ok(Some(rect));
                }
            }
        }
    }

    fn render_position(&self, overlay: &SelectionOverlay, x: f64, y: f64) -> AppResult<()> {
        self.term.clear_line()?;
        let status = match overlay.selection_box() {
            Some(rect) => format!("Selecting {} (pointer at {},{})", rect, x, y),
            None => format!("Pointer at {},{}", x, y),
        };
        self.term.write_str(status.as_str())?;
        Ok(())
    }
}
