use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use unicode_width::UnicodeWidthStr;
use zenstudy::{storage::Store, util::truncate_to_width};

use super::{ACCENT, MUTED};
use crate::{App, AppState};

const CARET: &str = "▏";

fn panel_block(title: String, focused: bool) -> Block<'static> {
    let border = if focused { ACCENT } else { MUTED };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            title,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
}

/// A folded side panel: just its title, one letter per row.
pub fn render_collapsed(title: &str, area: Rect, buf: &mut Buffer) {
    let letters: Vec<Line> = title
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| Line::from(c.to_string()))
        .collect();

    Paragraph::new(letters)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(MUTED)),
        )
        .style(Style::default().fg(ACCENT))
        .alignment(Alignment::Center)
        .render(area, buf);
}

pub fn render_tasks<S: Store>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let focused = app.state == AppState::Tasks;
    let tasks = app.desk.tasks();
    let title = if tasks.is_empty() {
        " Subject Tasks ".to_string()
    } else {
        format!(" Subject Tasks ({} open) ", tasks.remaining())
    };
    let block = panel_block(title, focused);
    let inner = block.inner(area);
    block.render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // input
            Constraint::Length(1), // padding
            Constraint::Min(0),    // list
        ])
        .split(inner);

    let width = inner.width as usize;
    let input = if app.task_input.is_empty() && !focused {
        Span::styled(
            "New task...",
            Style::default().fg(MUTED).add_modifier(Modifier::ITALIC),
        )
    } else {
        let caret = if focused { CARET } else { "" };
        let shown = truncate_to_width(&app.task_input, width.saturating_sub(3));
        Span::raw(format!("> {shown}{caret}"))
    };
    Paragraph::new(input).render(chunks[0], buf);

    if tasks.is_empty() {
        Paragraph::new(Span::styled(
            "No tasks added yet.",
            Style::default().fg(MUTED),
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
        return;
    }

    let visible = chunks[2].height as usize;
    let selected = app.selected_task.filter(|_| focused);
    let offset = selected
        .map(|i| (i + 1).saturating_sub(visible))
        .unwrap_or(0);

    let lines: Vec<Line> = tasks
        .tasks()
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(idx, task)| {
            let mark = if task.done { "[x] " } else { "[ ] " };
            let text = truncate_to_width(&task.text, width.saturating_sub(mark.len()));
            let mut style = if task.done {
                Style::default()
                    .fg(MUTED)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            if selected == Some(idx) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(vec![
                Span::styled(mark, Style::default().fg(ACCENT)),
                Span::styled(text, style),
            ])
        })
        .collect();

    Paragraph::new(lines).render(chunks[2], buf);
}

pub fn render_notes<S: Store>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let focused = app.state == AppState::Notes;
    let block = panel_block(" Brain Dump ".to_string(), focused);
    let inner = block.inner(area);
    let notes = app.desk.notes();

    if notes.text().is_empty() && !focused {
        Paragraph::new(Span::styled(
            "Distracting thoughts? Write them here...",
            Style::default().fg(MUTED).add_modifier(Modifier::ITALIC),
        ))
        .block(block)
        .wrap(Wrap { trim: true })
        .render(area, buf);
        return;
    }

    let content = if focused {
        let (before, after) = notes.split_at_cursor();
        format!("{before}{CARET}{after}")
    } else {
        notes.text().to_string()
    };

    // Keep the caret's row in view.
    let row = caret_row(notes.split_at_cursor().0, inner.width);
    let scroll = row.saturating_add(1).saturating_sub(inner.height);

    Paragraph::new(Text::from(content))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .render(area, buf);
}

/// Screen row of the caret once `before` is wrapped to `width` columns.
/// Wrapping is counted per column, which can undercount word wrap slightly.
fn caret_row(before: &str, width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let mut lines = before.split('\n');
    let last = lines.next_back().unwrap_or_default();
    let above: usize = lines
        .map(|line| line.width().div_ceil(width).max(1))
        .fold(0, usize::saturating_add);
    let row = above.saturating_add(last.width() / width);
    u16::try_from(row).unwrap_or(u16::MAX)
}
