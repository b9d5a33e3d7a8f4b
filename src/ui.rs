pub mod dialog;
pub mod panels;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Widget},
};

use zenstudy::{session::Phase, storage::Store, util::format_clock};

use crate::{App, AppState};

pub const ACCENT: Color = Color::Rgb(0xD0, 0xBC, 0xFE);
pub const MUTED: Color = Color::Rgb(0x93, 0x8F, 0x99);
const BREAK_COLOR: Color = Color::Rgb(0x9C, 0xD6, 0xB0);

const PANEL_WIDTH: u16 = 34;
const COLLAPSED_WIDTH: u16 = 5;
const GAUGE_WIDTH: u16 = 40;

impl<S: Store> Widget for &App<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let tasks_width = if self.config.tasks_collapsed {
            COLLAPSED_WIDTH
        } else {
            PANEL_WIDTH
        };
        let notes_width = if self.config.notes_collapsed {
            COLLAPSED_WIDTH
        } else {
            PANEL_WIDTH
        };

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .margin(1)
            .constraints([
                Constraint::Length(tasks_width),
                Constraint::Min(20),
                Constraint::Length(notes_width),
            ])
            .split(area);

        if self.config.tasks_collapsed {
            panels::render_collapsed("Tasks", columns[0], buf);
        } else {
            panels::render_tasks(self, columns[0], buf);
        }

        render_timer(self, columns[1], buf);

        if self.config.notes_collapsed {
            panels::render_collapsed("Brain Dump", columns[2], buf);
        } else {
            panels::render_notes(self, columns[2], buf);
        }

        match self.state {
            AppState::Settings => dialog::render_settings(self, area, buf),
            AppState::ConfirmReset => dialog::render_confirm_reset(area, buf),
            AppState::Timer | AppState::Tasks | AppState::Notes => {}
        }
    }
}

fn render_timer<S: Store>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let session = app.desk.session();
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let phase_color = match session.phase() {
        Phase::Study => ACCENT,
        Phase::Break => BREAK_COLOR,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1), // session counter
            Constraint::Length(1), // status
            Constraint::Length(1), // clock
            Constraint::Length(1), // padding
            Constraint::Length(1), // gauge
            Constraint::Length(1), // goal
            Constraint::Length(1), // padding
            Constraint::Length(1), // action
            Constraint::Min(0),
            Constraint::Length(2), // legend
        ])
        .split(area);

    let line = |text: String, style: Style| {
        Paragraph::new(Span::styled(text, style)).alignment(Alignment::Center)
    };

    line(
        format!(
            "SESSION {} OF {}",
            session.session_ordinal(),
            session.goal_sessions()
        ),
        Style::default().fg(phase_color).add_modifier(Modifier::BOLD),
    )
    .render(chunks[1], buf);

    line(
        session.status_label().to_string(),
        Style::default().fg(MUTED),
    )
    .render(chunks[2], buf);

    line(format_clock(session.time_left()), bold_style).render(chunks[3], buf);

    let gauge_area = centered_row(chunks[5], GAUGE_WIDTH);
    Gauge::default()
        .gauge_style(Style::default().fg(phase_color).bg(Color::Rgb(0x49, 0x45, 0x4F)))
        .ratio(session.progress().clamp(0.0, 1.0))
        .label("")
        .render(gauge_area, buf);

    line(
        format!("Goal: {:.1}%", session.goal_percent()),
        Style::default().fg(MUTED),
    )
    .render(chunks[6], buf);

    let action = Line::from(vec![
        Span::styled("[space] ", Style::default().fg(MUTED)),
        Span::styled(
            session.action_label(),
            Style::default().fg(phase_color).add_modifier(Modifier::BOLD),
        ),
    ]);
    Paragraph::new(action)
        .alignment(Alignment::Center)
        .render(chunks[8], buf);

    let legend = match app.state {
        AppState::Tasks => "type a task, (enter) add / toggle, (↑/↓) select, (esc) back",
        AppState::Notes => "type freely, (enter) newline, (esc) back",
        _ => "(p)rev / (n)ext / (s)ettings / (t)asks / (b)rain dump / [ ] fold / (q)uit",
    };
    Paragraph::new(Span::styled(
        legend,
        Style::default().fg(MUTED).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .wrap(ratatui::widgets::Wrap { trim: true })
    .render(chunks[10], buf);
}

/// Horizontally centre a row of at most `width` columns inside `area`.
fn centered_row(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}
