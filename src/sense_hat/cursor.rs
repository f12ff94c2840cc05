//! Joystick-driven cursor that paints cells on the matrix.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use super::frame::{Frame, SIZE};
use super::stick::{StickAction, StickDirection, StickEvent};

/// Moves a cursor with the joystick; a middle press paints the cell under it.
///
/// # Example
///
/// ```rust
/// use embedded_graphics::pixelcolor::Rgb565;
/// use embedded_graphics::prelude::*;
/// use pihat_kit::sense_hat::{CursorPainter, StickAction, StickDirection, StickEvent};
///
/// let mut painter = CursorPainter::new(Rgb565::RED, Rgb565::BLACK);
/// painter.handle(StickEvent::new(StickDirection::Right, StickAction::Pressed));
/// painter.handle(StickEvent::new(StickDirection::Middle, StickAction::Pressed));
/// painter.handle(StickEvent::new(StickDirection::Down, StickAction::Pressed));
///
/// assert_eq!(painter.position(), (1, 1));
/// let frame = painter.render();
/// assert_eq!(frame.get(1, 0), Some(Rgb565::RED)); // painted
/// assert_eq!(frame.get(1, 1), Some(Rgb565::RED)); // cursor
/// ```
#[derive(Clone, Debug)]
pub struct CursorPainter {
    x: u8,
    y: u8,
    canvas: Frame,
    pen: Rgb565,
}

impl CursorPainter {
    /// Starts at the top-left corner on a blank `background`.
    pub fn new(pen: Rgb565, background: Rgb565) -> Self {
        Self {
            x: 0,
            y: 0,
            canvas: Frame::filled(background),
            pen,
        }
    }

    /// Cursor column and row.
    pub fn position(&self) -> (u8, u8) {
        (self.x, self.y)
    }

    /// Painted cells without the cursor.
    pub fn canvas(&self) -> &Frame {
        &self.canvas
    }

    /// Applies one joystick event. Only presses act; returns whether the
    /// picture changed.
    pub fn handle(&mut self, event: StickEvent) -> bool {
        if event.action != StickAction::Pressed {
            return false;
        }
        let (x, y) = (self.x, self.y);
        match event.direction {
            StickDirection::Left => self.x = self.x.saturating_sub(1),
            StickDirection::Right => self.x = (self.x + 1).min(SIZE - 1),
            StickDirection::Up => self.y = self.y.saturating_sub(1),
            StickDirection::Down => self.y = (self.y + 1).min(SIZE - 1),
            StickDirection::Middle => {
                let before = self.canvas.get(x, y);
                self.canvas.set(x, y, self.pen);
                return before != Some(self.pen);
            }
        }
        (x, y) != (self.x, self.y)
    }

    /// Painted cells with the cursor drawn on top.
    pub fn render(&self) -> Frame {
        let mut frame = self.canvas;
        frame.set(self.x, self.y, self.pen);
        frame
    }
}

impl Default for CursorPainter {
    fn default() -> Self {
        Self::new(Rgb565::RED, Rgb565::BLACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(direction: StickDirection) -> StickEvent {
        StickEvent::new(direction, StickAction::Pressed)
    }

    #[test]
    fn clamped_at_edges() {
        let mut painter = CursorPainter::default();
        assert!(!painter.handle(press(StickDirection::Left)));
        assert!(!painter.handle(press(StickDirection::Up)));
        for _ in 0..10 {
            painter.handle(press(StickDirection::Right));
            painter.handle(press(StickDirection::Down));
        }
        assert_eq!(painter.position(), (7, 7));
    }

    #[test]
    fn releases_and_holds_ignored() {
        let mut painter = CursorPainter::default();
        assert!(!painter.handle(StickEvent::new(StickDirection::Right, StickAction::Released)));
        assert!(!painter.handle(StickEvent::new(StickDirection::Right, StickAction::Held)));
        assert_eq!(painter.position(), (0, 0));
    }

    #[test]
    fn paint_only_changes_once() {
        let mut painter = CursorPainter::default();
        assert!(painter.handle(press(StickDirection::Middle)));
        assert!(!painter.handle(press(StickDirection::Middle)));
        assert_eq!(painter.canvas().get(0, 0), Some(Rgb565::RED));
    }

    #[test]
    fn render_shows_cursor_only_on_copy() {
        let mut painter = CursorPainter::default();
        painter.handle(press(StickDirection::Down));
        assert_eq!(painter.render().get(0, 1), Some(Rgb565::RED));
        assert_eq!(painter.canvas().get(0, 1), Some(Rgb565::BLACK));
    }
}
