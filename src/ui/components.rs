//! Reusable UI pieces shared by both screens

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{accent, danger, header, inactive, text, text_dim};
use crate::form::{Draft, Field, FieldErrors};

/// Width of the label column
const LABEL_WIDTH: usize = 13;

/// Everything needed to render the eight-field form
pub struct FormView<'a> {
    pub title: &'a str,
    pub draft: &'a Draft,
    pub focus: Field,
    pub errors: &'a FieldErrors,
    pub loading: bool,
    pub button: &'a str,
}

pub fn draw_form(f: &mut Frame, area: Rect, form: &FormView) {
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", form.title),
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent()));

    let mut lines: Vec<Line> = Vec::new();

    if let Some(general) = form.errors.general() {
        lines.push(error_line(general, 1));
    }
    if form.loading {
        lines.push(Line::styled(" Loading...", Style::default().fg(text_dim())));
    }
    if !lines.is_empty() {
        lines.push(Line::from(""));
    }

    for field in Field::ALL {
        let focused = field == form.focus;
        let label_style = if focused {
            Style::default().fg(accent()).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(text_dim())
        };
        let marker = if focused { "▶ " } else { "  " };
        let cursor = if focused { "_" } else { "" };

        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(accent())),
            Span::styled(format!("{:<width$}", field.label(), width = LABEL_WIDTH), label_style),
            Span::styled("│ ", Style::default().fg(inactive())),
            Span::styled(form.draft.get(field), Style::default().fg(text())),
            Span::styled(cursor, Style::default().fg(accent())),
        ]));

        if let Some(message) = form.errors.get(field) {
            lines.push(error_line(message, LABEL_WIDTH + 4));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  [ ", Style::default().fg(text_dim())),
        Span::styled(
            form.button,
            if form.loading {
                Style::default().fg(text_dim())
            } else {
                Style::default().fg(accent()).add_modifier(Modifier::BOLD)
            },
        ),
        Span::styled(" ]", Style::default().fg(text_dim())),
    ]));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

/// Red message line indented by `indent` columns
pub fn error_line(message: &str, indent: usize) -> Line<'static> {
    Line::from(vec![
        Span::raw(" ".repeat(indent)),
        Span::styled(format!("⚠ {}", message), Style::default().fg(danger())),
    ])
}

/// `key` highlighted followed by a dim description, for footers
pub fn key_hint(key: &'static str, action: &'static str) -> Vec<Span<'static>> {
    vec![
        Span::styled(key, Style::default().fg(accent())),
        Span::styled(format!(" {} ", action), Style::default().fg(text_dim())),
    ]
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
