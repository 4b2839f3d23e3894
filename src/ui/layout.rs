use ratatui::layout::{Constraint, Direction, Rect};

/// Height of the status bar
const STATUS_HEIGHT: u16 = 1;

/// Screen areas computed for one frame
pub struct Areas {
    pub body: Rect,
    pub status_bar: Rect,
}

/// Layout configuration for the UI
#[derive(Debug, Default)]
pub struct Layout;

impl Layout {
    /// Create a new layout with default settings
    pub fn new() -> Self {
        Self
    }

    /// Split the frame into body and status bar
    pub fn calculate(&self, area: Rect) -> Areas {
        let chunks = ratatui::layout::Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(STATUS_HEIGHT)])
            .split(area);

        Areas {
            body: chunks[0],
            status_bar: chunks[1],
        }
    }

    /// Centered popup area as a percentage of the frame
    pub fn popup_area(&self, area: Rect, width_pct: u16, height_pct: u16) -> Rect {
        let width = (area.width * width_pct / 100).max(1);
        let height = (area.height * height_pct / 100).max(1);
        Rect {
            x: area.x + (area.width.saturating_sub(width)) / 2,
            y: area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        }
    }
}
