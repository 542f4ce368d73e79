//! Machine accelerator page
//!
//! One tab per backend. The selected tab shows its checkbox, a description
//! and the documentation link; the footer shows the machine's current
//! accelerator set.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
};

use crate::app::App;
use crate::wizard::BackendPanel;

/// Render the accelerator page
pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    let dialog_width = 76.min(area.width.saturating_sub(4));
    let dialog_height = 20.min(area.height.saturating_sub(2));
    let dialog_area = centered_rect(dialog_width, dialog_height, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(format!(" {} - {} ", app.page.title(), app.machine.name))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Tabs
            Constraint::Length(1), // Spacer
            Constraint::Min(6),    // Panel
            Constraint::Length(1), // Selection summary
            Constraint::Length(3), // Help / status
        ])
        .split(inner);

    let titles: Vec<Line> = app
        .page
        .panels()
        .iter()
        .map(|panel| {
            let mark = if panel.is_checked() { "*" } else { " " };
            Line::from(format!("{}{}", panel.accelerator().tab_label(), mark))
        })
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.page.selected())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .divider("|");
    frame.render_widget(tabs, chunks[0]);

    if let Some(panel) = app.page.selected_panel() {
        render_panel(panel, frame, chunks[2]);
    }

    let summary = Line::from(vec![
        Span::styled("Accelerators: ", Style::default().fg(Color::Yellow)),
        Span::raw(app.machine.accelerator_summary()),
        Span::styled(
            format!("   ({})", app.page.platform()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(summary), chunks[3]);

    render_help_bar(app, frame, chunks[4]);
}

fn render_panel(panel: &BackendPanel, frame: &mut Frame, area: Rect) {
    let accel = panel.accelerator();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Checkbox
            Constraint::Min(3),    // Description
            Constraint::Length(1), // Link
        ])
        .split(area);

    let checkbox = if panel.is_checked() { "[x]" } else { "[ ]" };
    let checkbox_style = if panel.is_checked() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let check_line = Line::from(vec![
        Span::styled(format!("{} ", checkbox), checkbox_style),
        Span::styled(accel.title(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
    ]);
    frame.render_widget(Paragraph::new(check_line), chunks[0]);

    let description = Paragraph::new(accel.description())
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true });
    frame.render_widget(description, chunks[1]);

    let link = accel.doc_link();
    let link_line = Line::from(Span::styled(
        link.text,
        Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::UNDERLINED),
    ));
    frame.render_widget(Paragraph::new(link_line).alignment(Alignment::Center), chunks[2]);
}

fn render_help_bar(app: &App, frame: &mut Frame, area: Rect) {
    let mut hints = vec![
        Span::styled("[←/→]", Style::default().fg(Color::Yellow)),
        Span::raw(" Tab "),
        Span::styled(" [Space]", Style::default().fg(Color::Yellow)),
        Span::raw(" Toggle "),
        Span::styled(" [o]", Style::default().fg(Color::Yellow)),
        Span::raw(" Open link "),
        Span::styled(" [Enter]", Style::default().fg(Color::Yellow)),
        Span::raw(" Save "),
        Span::styled(" [?]", Style::default().fg(Color::Yellow)),
        Span::raw(" Help "),
        Span::styled(" [q]", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit "),
    ];

    // Status message overrides the hints
    if let Some(ref msg) = app.status_message {
        hints.clear();
        let color = if msg.starts_with("Error") { Color::Red } else { Color::Green };
        hints.push(Span::styled(msg.clone(), Style::default().fg(color)));
    }

    let help = Paragraph::new(Line::from(hints))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(help, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::Platform;
    use ratatui::backend::TestBackend;
    use std::path::PathBuf;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_render_shows_tabs_and_selected_panel() {
        let app = App::new(Platform::Linux, "Debian", PathBuf::from("/tmp/unused.json"));
        let mut terminal = Terminal::new(TestBackend::new(90, 24)).unwrap();
        terminal.draw(|frame| render(&app, frame)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Machine accelerator"));
        assert!(text.contains("KVM*"));
        assert!(text.contains("XEN"));
        assert!(text.contains("TCG"));
        assert!(text.contains("[x] Kernel-based Virtual Machine (KVM)"));
        assert!(text.contains("www.linux-kvm.org"));
        assert!(text.contains("Accelerators: kvm"));
    }

    #[test]
    fn test_render_tiny_terminal_does_not_panic() {
        let app = App::new(Platform::MacOs, "Tiny", PathBuf::from("/tmp/unused.json"));
        let mut terminal = Terminal::new(TestBackend::new(10, 5)).unwrap();
        terminal.draw(|frame| render(&app, frame)).unwrap();
    }
}
