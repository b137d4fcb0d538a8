mod components;

use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};

use crate::app::{App, DetailsForm, PersonManager, Popup, Screen, View};
use crate::theme::Theme;
use components::{centered_rect, draw_form, error_line, key_hint, FormView};

// Theme is set once at startup; defaults apply if nothing was installed
static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the theme used for every frame. Later calls are ignored.
pub fn init_theme(theme: Theme) {
    let _ = THEME.set(theme);
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn danger() -> Color { theme().danger }
fn success() -> Color { theme().success }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }
fn inactive() -> Color { theme().inactive }
fn header() -> Color { theme().header }

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    match &app.screen {
        Screen::Manager(manager) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1), // Info line
                    Constraint::Length(3), // Tabs
                    Constraint::Min(6),    // Active view
                    Constraint::Length(1), // Footer
                ])
                .split(area);

            draw_info_line(f, app, chunks[0]);
            draw_tabs(f, manager, chunks[1]);
            match manager.view() {
                View::Form => draw_person_form(f, manager, chunks[2]),
                View::List => draw_saved_persons(f, manager, chunks[2]),
            }
            draw_manager_footer(f, manager, chunks[3]);
        }
        Screen::Simple(form) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1),
                    Constraint::Min(6),
                    Constraint::Length(1),
                ])
                .split(area);

            draw_info_line(f, app, chunks[0]);
            draw_details_form(f, form, chunks[1]);
            draw_simple_footer(f, chunks[2]);
        }
    }

    if app.popup == Popup::Help {
        draw_help_popup(f, app);
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    // Priority: status message > loading > ready
    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status, Style::default().fg(success())))
    } else if app.is_loading() {
        Line::from(Span::styled("Loading...", Style::default().fg(text_dim())))
    } else {
        Line::from(Span::styled("Ready", Style::default().fg(text_dim())))
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_tabs(f: &mut Frame, manager: &PersonManager, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!(" F{} {} ", i + 1, view.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(manager.view().index())
        .style(Style::default().fg(text_dim()))
        .highlight_style(Style::default().fg(accent()).add_modifier(Modifier::BOLD))
        .divider(Span::styled("│", Style::default().fg(inactive())))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(inactive())),
        );

    f.render_widget(tabs, area);
}

fn draw_person_form(f: &mut Frame, manager: &PersonManager, area: Rect) {
    let loading = manager.is_loading();
    let button = if loading {
        "Saving..."
    } else if manager.is_editing() {
        "Update Person"
    } else {
        "Save Person"
    };

    draw_form(
        f,
        area,
        &FormView {
            title: if manager.is_editing() { "Edit Person" } else { "Personal Details" },
            draft: &manager.draft,
            focus: manager.focus,
            errors: &manager.errors,
            loading,
            button,
        },
    );
}

fn draw_details_form(f: &mut Frame, form: &DetailsForm, area: Rect) {
    draw_form(
        f,
        area,
        &FormView {
            title: "Personal Details",
            draft: &form.draft,
            focus: form.focus,
            errors: &form.errors,
            loading: form.is_loading(),
            button: "Submit",
        },
    );
}

fn draw_saved_persons(f: &mut Frame, manager: &PersonManager, area: Rect) {
    let block = Block::default()
        .title(Span::styled(
            " Saved Persons ",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent()));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut status: Vec<Line> = Vec::new();
    if let Some(general) = manager.errors.general() {
        status.push(error_line(general, 1));
    }
    if manager.is_loading() {
        status.push(Line::styled(" Loading...", Style::default().fg(text_dim())));
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(status.len() as u16),
            Constraint::Min(1),
        ])
        .split(inner);

    f.render_widget(Paragraph::new(status).wrap(Wrap { trim: false }), chunks[0]);

    let rows: Vec<Row> = if manager.persons.is_empty() {
        vec![Row::new(vec![
            Span::styled(" No saved persons available.", Style::default().fg(text_dim())),
        ])]
    } else {
        manager
            .persons
            .iter()
            .enumerate()
            .map(|(i, person)| {
                let row_style = if i == manager.selected {
                    Style::default().bg(bg_selected()).fg(text())
                } else {
                    Style::default()
                };

                Row::new(vec![
                    Span::styled(format!("{}.", i + 1), Style::default().fg(text_dim())),
                    Span::styled(
                        format!("{} {}", person.first_name, person.last_name),
                        Style::default().fg(text()),
                    ),
                    Span::styled(person.email.as_str(), Style::default().fg(text_dim())),
                    Span::styled(format!("({})", person.phone), Style::default().fg(text_dim())),
                ])
                .style(row_style)
            })
            .collect()
    };

    let widths = [
        Constraint::Length(4),
        Constraint::Percentage(35),
        Constraint::Percentage(35),
        Constraint::Percentage(25),
    ];

    f.render_widget(Table::new(rows, widths), chunks[1]);
}

fn draw_manager_footer(f: &mut Frame, manager: &PersonManager, area: Rect) {
    let mut spans = Vec::new();
    match manager.view() {
        View::Form => {
            spans.extend(key_hint("Tab", "next"));
            spans.extend(key_hint("Enter", if manager.is_editing() { "update" } else { "save" }));
            spans.extend(key_hint("F2", "saved"));
            spans.extend(key_hint("F10", "help"));
        }
        View::List => {
            spans.extend(key_hint("j/k", "move"));
            spans.extend(key_hint("e", "edit"));
            spans.extend(key_hint("d", "delete"));
            spans.extend(key_hint("r", "refresh"));
            spans.extend(key_hint("F1", "form"));
            spans.extend(key_hint("?", "help"));
            spans.extend(key_hint("q", "quit"));
        }
    }

    f.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), area);
}

fn draw_simple_footer(f: &mut Frame, area: Rect) {
    let mut spans = Vec::new();
    spans.extend(key_hint("Tab", "next"));
    spans.extend(key_hint("Enter", "submit"));
    spans.extend(key_hint("F10", "help"));
    spans.extend(key_hint("Esc", "quit"));

    f.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), area);
}

fn help_heading(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        format!("═══ {} ═══", title),
        Style::default().fg(header()).add_modifier(Modifier::BOLD),
    ))
}

fn help_entry(keys: &'static str, description: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", keys), Style::default().fg(accent())),
        Span::raw(description),
    ])
}

fn draw_help_popup(f: &mut Frame, app: &App) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 70 },
        if area.height < 30 { 95 } else { 75 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let mut help_text = vec![
        help_heading("Form"),
        help_entry("Tab ↓", "Next field"),
        help_entry("S-Tab ↑", "Previous field"),
        help_entry("Enter", "Submit (every field is required)"),
        help_entry("Backspace", "Delete last character"),
        Line::from(""),
    ];

    if let Screen::Manager(_) = app.screen {
        help_text.extend([
            help_heading("Views"),
            help_entry("F1", "Person Data (create / edit)"),
            help_entry("F2", "Saved Persons (fetches the list)"),
            Line::from(""),
            help_heading("Saved Persons"),
            help_entry("j/k ↑/↓", "Move selection"),
            help_entry("e Enter", "Edit selected person"),
            help_entry("d Del", "Delete selected person"),
            help_entry("r", "Refresh list"),
            help_entry("q", "Quit"),
            Line::from(""),
        ]);
    } else {
        help_text.push(help_entry("Esc", "Quit"));
        help_text.push(Line::from(""));
    }

    help_text.push(help_entry("Ctrl-C", "Quit from anywhere"));
    help_text.push(Line::from(""));
    help_text.push(Line::from(vec![
        Span::styled("  Press ", Style::default().fg(text_dim())),
        Span::styled("Esc", Style::default().fg(accent())),
        Span::styled(" to close", Style::default().fg(text_dim())),
    ]));

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" persondesk Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}
