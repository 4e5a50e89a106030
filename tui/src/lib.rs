//! TUI rendering for Reframe using ratatui.
//!
//! The view layer renders current session state and forwards input as
//! commands; all study logic lives in `reframe-engine`.

mod format;
mod input;
mod theme;

pub use format::{format_remaining, truncate_to_width};
pub use input::{InputPump, handle_events};
pub use theme::{Palette, palette};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use std::time::Duration;

use unicode_width::UnicodeWidthStr;

use reframe_engine::Session;
use reframe_types::{WindowId, WindowMap};

/// Per-window list scroll state, owned by the frame loop.
///
/// Fulfils the ledger-change contract: when a ledger mutates, the window's
/// list snaps back to following the newest entry.
#[derive(Debug, Default)]
pub struct ViewState {
    scroll: WindowMap<ListScroll>,
}

#[derive(Debug)]
struct ListScroll {
    offset: usize,
    follow: bool,
}

impl Default for ListScroll {
    fn default() -> Self {
        Self {
            offset: 0,
            follow: true,
        }
    }
}

/// Compute the list offset for one window this frame.
///
/// A ledger change resumes following the tail (newest entry visible);
/// moving the selection pauses following and keeps the selection in view.
fn resolve_offset(
    scroll: &mut ListScroll,
    changed: bool,
    selected: Option<usize>,
    len: usize,
    height: usize,
) -> usize {
    let height = height.max(1);
    let tail = len.saturating_sub(height);
    if changed {
        scroll.follow = true;
    } else if let Some(sel) = selected {
        scroll.follow = false;
        if sel < scroll.offset {
            scroll.offset = sel;
        } else if sel >= scroll.offset + height {
            scroll.offset = sel + 1 - height;
        }
    }
    if scroll.follow {
        scroll.offset = tail;
    }
    scroll.offset = scroll.offset.min(tail);
    scroll.offset
}

/// Main draw function.
pub fn draw(frame: &mut Frame, session: &mut Session, view: &mut ViewState) {
    let palette = palette();
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(8),  // Problem description
            Constraint::Min(12),    // Window grid
            Constraint::Length(1),  // Status bar
        ])
        .split(frame.area());

    draw_problem(frame, session, chunks[0], &palette);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    draw_window(frame, session, view, WindowId::B, top[0], &palette);
    draw_window(frame, session, view, WindowId::C, top[1], &palette);
    draw_window(frame, session, view, WindowId::D, bottom[0], &palette);
    draw_window(frame, session, view, WindowId::E, bottom[1], &palette);

    draw_status_bar(frame, session, chunks[2], &palette);
}

fn draw_problem(frame: &mut Frame, session: &Session, area: Rect, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.border))
        .title(" Problem Description ")
        .title_style(
            Style::default()
                .fg(palette.text_primary)
                .add_modifier(Modifier::BOLD),
        )
        .style(Style::default().bg(palette.bg_panel));

    let body = match session.problem() {
        Some(problem) => Line::styled(
            problem.text.clone(),
            Style::default().fg(palette.text_secondary),
        ),
        None if session.problem_pending() => {
            Line::styled("Loading...", Style::default().fg(palette.text_muted))
        }
        None => Line::styled(
            "Problem unavailable",
            Style::default().fg(palette.text_muted),
        ),
    };

    let paragraph = Paragraph::new(body).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_window(
    frame: &mut Frame,
    session: &mut Session,
    view: &mut ViewState,
    window: WindowId,
    area: Rect,
    palette: &Palette,
) {
    let focused = session.focus() == window;
    let border_style = if focused {
        Style::default().fg(palette.accent)
    } else {
        Style::default().fg(palette.border)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .title(format!(" {window} · {} ", window.title()))
        .title_style(
            Style::default()
                .fg(palette.text_primary)
                .add_modifier(Modifier::BOLD),
        )
        .style(Style::default().bg(palette.bg_panel));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(remaining) = session.unlock_remaining(window) {
        // The cover absorbs ledger-change notifications too; the list snaps
        // to the tail when the window opens.
        let _ = session.take_ledger_changed(window);
        draw_lock_cover(frame, inner, remaining, palette);
        return;
    }

    let has_footer = session.generate_visible(window);
    let mut constraints = vec![
        Constraint::Length(2), // Instruction
        Constraint::Min(1),    // Ideas
        Constraint::Length(1), // Input
    ];
    if has_footer {
        constraints.push(Constraint::Length(1));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let instruction = Paragraph::new(window.instruction())
        .style(Style::default().fg(palette.text_muted))
        .wrap(Wrap { trim: true });
    frame.render_widget(instruction, chunks[0]);

    draw_idea_list(frame, session, view, window, chunks[1], palette);
    draw_input_line(frame, session, window, focused, chunks[2], palette);

    if has_footer {
        draw_generate_footer(frame, session, window, chunks[3], palette);
    }
}

fn draw_lock_cover(frame: &mut Frame, area: Rect, remaining: Duration, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let message = format!(
        "This window will unlock in {}",
        format_remaining(remaining)
    );
    let paragraph = Paragraph::new(message)
        .style(Style::default().fg(palette.warning))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, chunks[1]);
}

fn draw_idea_list(
    frame: &mut Frame,
    session: &mut Session,
    view: &mut ViewState,
    window: WindowId,
    area: Rect,
    palette: &Palette,
) {
    let height = area.height as usize;
    let width = area.width as usize;
    let changed = session.take_ledger_changed(window);
    let selected = session.selected(window);
    let ideas = session.ledger(window);
    let offset = resolve_offset(
        &mut view.scroll[window],
        changed,
        selected,
        ideas.len(),
        height,
    );

    let mut lines = Vec::new();
    for (i, idea) in ideas.iter().enumerate().skip(offset).take(height.max(1)) {
        let style = if selected == Some(i) {
            Style::default()
                .fg(palette.text_primary)
                .bg(palette.bg_highlight)
        } else {
            Style::default().fg(palette.text_secondary)
        };
        let text = truncate_to_width(idea, width.saturating_sub(2));
        lines.push(Line::styled(format!("• {text}"), style));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_input_line(
    frame: &mut Frame,
    session: &Session,
    window: WindowId,
    focused: bool,
    area: Rect,
    palette: &Palette,
) {
    let draft = session.draft(window);
    let prompt_style = if focused {
        Style::default().fg(palette.accent)
    } else {
        Style::default().fg(palette.text_muted)
    };

    let line = if draft.is_empty() && !focused {
        Line::from(vec![
            Span::styled("› ", prompt_style),
            Span::styled(
                "Type your idea here...",
                Style::default().fg(palette.text_disabled),
            ),
        ])
    } else {
        // Keep the end of a long draft visible while typing.
        let avail = (area.width as usize).saturating_sub(3);
        let mut visible = draft.to_string();
        while visible.as_str().width() > avail {
            visible.remove(0);
        }
        let mut spans = vec![
            Span::styled("› ", prompt_style),
            Span::styled(visible, Style::default().fg(palette.text_primary)),
        ];
        if focused {
            spans.push(Span::styled("▏", Style::default().fg(palette.accent)));
        }
        Line::from(spans)
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn draw_generate_footer(
    frame: &mut Frame,
    session: &Session,
    window: WindowId,
    area: Rect,
    palette: &Palette,
) {
    let (label, style) = if session.is_generating() {
        ("Generating ...", Style::default().fg(palette.text_disabled))
    } else if session.can_generate(window) {
        ("[^G] Generate", Style::default().fg(palette.success))
    } else {
        ("[^G] Generate", Style::default().fg(palette.text_disabled))
    };
    let line = Line::styled(label, style);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Right), area);
}

fn draw_status_bar(frame: &mut Frame, session: &Session, area: Rect, palette: &Palette) {
    let mut spans = vec![
        Span::styled(
            format!(" condition: {} ", session.condition()),
            Style::default().fg(palette.text_muted),
        ),
        Span::styled(
            format!("· window {} ", session.focus()),
            Style::default().fg(palette.text_muted),
        ),
    ];

    if session.is_generating() {
        spans.push(Span::styled(
            "· Generating ... ",
            Style::default().fg(palette.warning),
        ));
    }

    if let Some(notice) = session.notice() {
        spans.push(Span::styled(
            format!("· {notice} "),
            Style::default().fg(palette.error),
        ));
    } else {
        spans.push(Span::styled(
            "· Tab focus · Enter add · Up/Down select · Del remove · ^G generate · ^C quit",
            Style::default().fg(palette.text_disabled),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
