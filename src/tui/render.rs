//! Main rendering logic for the dashboard.

use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::fmt::format_title;

use super::state::{DashboardState, DisplaySlot};
use super::style::{Styles, kind_color};

/// Height of one bordered resource row.
const ROW_HEIGHT: u16 = 3;

/// Draws the three resource rows and the key hint.
///
/// `now` decides which rows are drawn as stale.
pub fn render(frame: &mut Frame, state: &DashboardState, now: Instant) {
    let area = frame.area();

    let chunks = Layout::vertical([
        Constraint::Length(ROW_HEIGHT), // CPU
        Constraint::Length(ROW_HEIGHT), // Memory
        Constraint::Length(ROW_HEIGHT), // Disk
        Constraint::Min(0),
        Constraint::Length(1), // Key hint
    ])
    .split(area);

    for (slot, chunk) in state.slots().zip(chunks.iter()) {
        render_slot(frame, *chunk, slot, slot.is_stale(now, state.stale_after()));
    }

    render_hint(frame, chunks[4]);
}

fn render_slot(frame: &mut Frame, area: Rect, slot: &DisplaySlot, stale: bool) {
    let color = kind_color(slot.kind());
    let block = Block::default()
        .title(format_title(slot.kind(), stale))
        .borders(Borders::ALL)
        .border_style(if stale {
            Styles::dim()
        } else {
            Styles::border(color)
        });

    let style = if stale || slot.reading().is_none() {
        Styles::dim()
    } else {
        Styles::value()
    };

    let paragraph = Paragraph::new(slot.text()).style(style).block(block);
    frame.render_widget(paragraph, area);
}

fn render_hint(frame: &mut Frame, area: Rect) {
    let hint = Line::from(vec![
        Span::styled("q", Styles::key()),
        Span::styled(" or ", Styles::dim()),
        Span::styled("Esc", Styles::key()),
        Span::styled(" → quit", Styles::dim()),
    ]);
    frame.render_widget(Paragraph::new(hint), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Reading;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use std::time::Duration;

    fn line(buffer: &Buffer, y: u16) -> String {
        let width = buffer.area.width;
        (0..width)
            .map(|x| buffer.content[(y * width + x) as usize].symbol())
            .collect()
    }

    /// Text inside the border of the row whose block starts at `top`.
    fn row_text(buffer: &Buffer, top: u16) -> String {
        let full = line(buffer, top + 1);
        full.trim_matches(|c: char| c == '│' || c.is_whitespace())
            .to_string()
    }

    fn draw(state: &DashboardState, now: Instant) -> Buffer {
        let backend = TestBackend::new(80, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, state, now)).unwrap();
        terminal.backend().buffer().clone()
    }

    #[test]
    fn test_rows_render_exact_text() {
        let mut state = DashboardState::new(Duration::from_secs(3));
        state.apply(Reading::cpu(42.5));
        state.apply(Reading::memory(60.0, 6_000_000_000, 10_000_000_000));
        state.apply(Reading::disk(75.0, 75_000_000_000, 100_000_000_000));

        let buffer = draw(&state, Instant::now());
        assert_eq!(row_text(&buffer, 0), "CPU Usage: 42.50%");
        assert_eq!(
            row_text(&buffer, 3),
            "Memory Usage: 60.00% (Used: 6.00 GB / Total: 10.00 GB)"
        );
        assert_eq!(
            row_text(&buffer, 6),
            "Disk Usage: 75.00% (Used: 75.00 GB / Total: 100.00 GB)"
        );
        assert!(line(&buffer, 0).contains("CPU Usage"));
        assert!(line(&buffer, 11).contains("quit"));
    }

    #[test]
    fn test_empty_rows_render_placeholder() {
        let state = DashboardState::new(Duration::from_secs(3));
        let buffer = draw(&state, Instant::now());
        assert_eq!(row_text(&buffer, 0), "CPU Usage: waiting for data");
        assert_eq!(row_text(&buffer, 3), "Memory Usage: waiting for data");
        assert_eq!(row_text(&buffer, 6), "Disk Usage: waiting for data");
    }

    #[test]
    fn test_stale_row_keeps_text_and_marks_title() {
        let mut state = DashboardState::new(Duration::from_secs(3));
        let taken = Instant::now();
        state.apply(Reading::cpu(42.5).taken_at_instant(taken));

        let buffer = draw(&state, taken + Duration::from_secs(10));
        assert_eq!(row_text(&buffer, 0), "CPU Usage: 42.50%");
        assert!(line(&buffer, 0).contains("CPU Usage (stale)"));
        assert!(!line(&buffer, 3).contains("stale"));
    }
}
