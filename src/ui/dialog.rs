use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use zenstudy::{settings::SettingsField, storage::Store};

use super::{ACCENT, MUTED};
use crate::App;

const DIALOG_WIDTH: u16 = 44;
const WARN: Color = Color::Rgb(0xF2, 0xB8, 0xB5);

/// A `width` x `height` rect centred in `area`, shrunk to fit.
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

pub fn render_settings<S: Store>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let manager = app.desk.settings_manager();
    let Some(draft) = manager.draft() else {
        return;
    };

    let rect = centered_rect(DIALOG_WIDTH, 13, area);
    Clear.render(rect, buf);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(Span::styled(
            " Settings ",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(rect);
    block.render(rect, buf);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(2), // study
            Constraint::Length(2), // break
            Constraint::Length(2), // goal
            Constraint::Min(0),
            Constraint::Length(2), // actions
        ])
        .split(inner);

    for (field, row) in SettingsField::ALL.iter().zip(&rows[1..4]) {
        let selected = *field == manager.field();
        let label_style = if selected {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(MUTED)
        };
        let value = if selected {
            format!("  {}▏", draft.text(*field))
        } else {
            format!("  {}", draft.text(*field))
        };
        Paragraph::new(vec![
            Line::from(Span::styled(field.to_string(), label_style)),
            Line::from(value),
        ])
        .render(*row, buf);
    }

    Paragraph::new(vec![
        Line::from(Span::styled(
            "(enter) save & apply   (esc) cancel",
            Style::default().fg(ACCENT),
        )),
        Line::from(Span::styled("(ctrl+r) hard reset all", Style::default().fg(WARN))),
    ])
    .alignment(Alignment::Center)
    .render(rows[5], buf);
}

pub fn render_confirm_reset(area: Rect, buf: &mut Buffer) {
    let rect = centered_rect(DIALOG_WIDTH, 5, area);
    Clear.render(rect, buf);
    Paragraph::new(vec![
        Line::from(Span::styled(
            "Reset everything?",
            Style::default().fg(WARN).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "(y)es / any other key cancels",
            Style::default().fg(MUTED),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(WARN)),
    )
    .alignment(Alignment::Center)
    .render(rect, buf);
}
