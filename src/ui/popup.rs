use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use typespeed::report::format_summary;
use unicode_width::UnicodeWidthStr;

use crate::Popup;

const MIN_POPUP_WIDTH: u16 = 30;
const POPUP_PADDING: u16 = 6;
const DISMISS_HINT: &str = "press any key";

/// Rect of at most `width` x `height` centred in `area`
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn title_and_body(popup: &Popup) -> (&'static str, String) {
    match popup {
        Popup::Results(result) => ("Results", format_summary(result)),
        Popup::Info(message) => ("Info", message.to_string()),
    }
}

pub fn render_popup(popup: &Popup, area: Rect, buf: &mut Buffer) {
    let (title, body) = title_and_body(popup);

    let widest = body.lines().map(|l| l.width()).max().unwrap_or(0) as u16;
    let width = (widest.saturating_add(POPUP_PADDING))
        .max(MIN_POPUP_WIDTH)
        .min(area.width);
    let inner_width = width.saturating_sub(2).max(1);
    let body_rows: u16 = body
        .lines()
        .map(|l| (l.width() as u16).div_ceil(inner_width).max(1))
        .sum();
    // borders, blank line, hint
    let rect = centered_rect(width, body_rows + 4, area);

    let mut lines: Vec<Line> = body.lines().map(|l| Line::from(l.to_string())).collect();
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        DISMISS_HINT,
        Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
    )));

    Clear.render(rect, buf);
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    title,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(rect, buf);
}
