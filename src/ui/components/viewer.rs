use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::state::ViewerState;

/// Scrollable read-only text viewer
pub struct Viewer;

impl Viewer {
    /// Render the viewer content at its current scroll offset
    pub fn render(frame: &mut Frame, area: Rect, viewer: &ViewerState) {
        let total_lines = viewer.content.lines().count();
        let title = format!(
            " {} ({} lines) ",
            viewer.title.trim(),
            total_lines
        );

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan));

        let paragraph = Paragraph::new(viewer.content.as_str())
            .block(block)
            .scroll((viewer.scroll, 0));

        frame.render_widget(paragraph, area);
    }
}
