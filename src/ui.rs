pub mod popup;

use std::time::SystemTime;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{App, Command};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

pub fn draw(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

/// Rows needed to show `text` wrapped into `width` columns
fn wrapped_lines(text: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    let lines = text.width().div_ceil(width).max(1);
    // word wrapping can spill one line past the naive estimate
    let lines = if lines > 1 { lines + 1 } else { lines };
    lines.min(u16::MAX as usize) as u16
}

fn sample_spans(sample: &str, typed: &str) -> Vec<Span<'static>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let underlined_dim_bold_style = Style::default()
        .patch(dim_bold_style)
        .add_modifier(Modifier::UNDERLINED);

    let typed: Vec<char> = typed.chars().collect();

    sample
        .chars()
        .enumerate()
        .map(|(idx, expected)| {
            let style = match typed.get(idx) {
                Some(&c) if c == expected => green_bold_style,
                Some(_) => red_bold_style,
                None if idx == typed.len() => underlined_dim_bold_style,
                None => dim_bold_style,
            };
            Span::styled(expected.to_string(), style)
        })
        .collect()
}

fn status_span(app: &App) -> Span<'static> {
    let (label, color) = if app.session.is_running() {
        ("running", Color::Yellow)
    } else if app.session.is_finalized() {
        ("finished", Color::Green)
    } else {
        ("idle", Color::DarkGray)
    };
    Span::styled(
        format!("[{label}]"),
        Style::default().fg(color).add_modifier(Modifier::ITALIC),
    )
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let sample = self.session.sample();
        let typed = self.typed.as_str();

        let inner_width = area
            .width
            .saturating_sub(HORIZONTAL_MARGIN * 2)
            .saturating_sub(2);
        let sample_lines = wrapped_lines(sample, inner_width);
        // input grows with what was typed, but never shrinks below the sample
        let input_lines = wrapped_lines(typed, inner_width).max(sample_lines);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Length(1),
                Constraint::Length(sample_lines + 2),
                Constraint::Length(input_lines + 2),
                Constraint::Length(1), // buttons
                Constraint::Length(1),
                Constraint::Length(1), // stats
                Constraint::Min(0),
                Constraint::Length(1), // legend
            ])
            .split(area);

        Paragraph::new(Line::from(vec![
            Span::styled("Typing Speed Tester ", bold_style),
            status_span(self),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        Paragraph::new(Line::from(sample_spans(sample, typed)))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled("Type this text:", bold_style)),
            )
            .wrap(Wrap { trim: false })
            .render(chunks[2], buf);

        Paragraph::new(Line::from(vec![
            Span::raw(typed.to_string()),
            Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)),
        ]))
        .block(Block::default().borders(Borders::ALL).title("Your input:"))
        .wrap(Wrap { trim: false })
        .render(chunks[3], buf);

        let buttons = Command::ALL
            .iter()
            .flat_map(|command| {
                [
                    Span::styled(format!("[ {command} ]"), bold_style),
                    Span::styled(format!(" {}    ", command.key_hint()), dim_style),
                ]
            })
            .collect::<Vec<Span>>();
        Paragraph::new(Line::from(buttons))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);

        let elapsed = self.display_elapsed(SystemTime::now());
        let (wpm, accuracy) = self
            .last_result
            .map_or((0.0, 0.0), |r| (r.wpm, r.accuracy));
        Paragraph::new(Span::styled(
            format!("Time: {elapsed:.2} s   WPM: {wpm:.2}   Accuracy: {accuracy:.2}%"),
            bold_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);

        Paragraph::new(Span::styled(
            "(enter) finish / (ctrl+r) reset / (ctrl+n) new text / (esc)ape",
            italic_style,
        ))
        .render(chunks[8], buf);

        if let Some(popup) = &self.popup {
            popup::render_popup(popup, area, buf);
        }
    }
}
