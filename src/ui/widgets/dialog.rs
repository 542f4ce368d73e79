//! Dialog widgets for the TUI

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Yes/no confirmation dialog
pub struct ConfirmDialog<'a> {
    pub title: &'a str,
    pub message: &'a str,
}

impl<'a> ConfirmDialog<'a> {
    pub fn new(title: &'a str, message: &'a str) -> Self {
        Self { title, message }
    }

    pub fn render(self, area: Rect, buf: &mut Buffer) {
        let width = 48.min(area.width.saturating_sub(4));
        let height = 7.min(area.height.saturating_sub(4));
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        let dialog_area = Rect::new(x, y, width, height);

        Clear.render(dialog_area, buf);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .style(Style::default().bg(Color::Black));

        let inner = block.inner(dialog_area);
        block.render(dialog_area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(2), Constraint::Length(1)])
            .split(inner);

        Paragraph::new(self.message)
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: true })
            .render(chunks[0], buf);

        let buttons = Line::from(vec![
            Span::styled(" Yes (y) ", Style::default().fg(Color::Green)),
            Span::raw("  "),
            Span::styled(" No (n) ", Style::default().fg(Color::Red)),
        ]);
        Paragraph::new(buttons)
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
    }
}
