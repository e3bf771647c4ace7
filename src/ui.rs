pub mod hourglass;
pub mod screen;

use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{ui::hourglass::Hourglass, App, ScreenModel};
use onething::{render::TimerPhase, steps::Step};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const CARET: &str = "_";

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match &self.screen {
            ScreenModel::Capture { step, error } => {
                render_capture(self, step, error.as_deref(), area, buf)
            }
            ScreenModel::Timer {
                title,
                meta,
                remaining_label,
                phase,
            } => render_timer(self, title, meta, remaining_label, *phase, area, buf),
        }
    }
}

fn render_capture(app: &App, step: &Step, error: Option<&str>, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1), // question
            Constraint::Length(1),
            Constraint::Length(1), // step label
            Constraint::Length(1), // input
            Constraint::Length(1), // hint
            Constraint::Length(1), // error
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        "What is your One Thing?",
        bold_style.fg(Color::Yellow),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    if !app.prompt_live() {
        return;
    }

    Paragraph::new(Span::styled(step.label, dim_style.add_modifier(Modifier::BOLD)))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    let field = if app.input.is_empty() {
        Line::from(vec![
            Span::styled(step.placeholder, dim_style.add_modifier(Modifier::ITALIC)),
            Span::styled(CARET, bold_style),
        ])
    } else {
        let visible = visible_tail(&app.input, chunks[4].width.saturating_sub(1) as usize);
        Line::from(vec![
            Span::styled(visible, bold_style),
            Span::styled(CARET, bold_style.add_modifier(Modifier::SLOW_BLINK)),
        ])
    };
    Paragraph::new(field)
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

    Paragraph::new(Span::styled(step.hint, dim_style))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);

    if let Some(error) = error {
        Paragraph::new(Span::styled(error, Style::default().fg(Color::Red)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[6], buf);
    }
}

fn render_timer(
    app: &App,
    title: &str,
    meta: &str,
    remaining_label: &str,
    phase: TimerPhase,
    area: Rect,
    buf: &mut Buffer,
) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let footer_lines = match phase {
        TimerPhase::Running => 1,
        TimerPhase::Completed => 3,
        TimerPhase::Extending => 6,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // badge
            Constraint::Length(1), // title
            Constraint::Length(1), // meta
            Constraint::Length(1),
            Constraint::Length(hourglass::HOURGLASS_HEIGHT),
            Constraint::Length(1), // readout label
            Constraint::Length(1), // readout value
            Constraint::Length(1),
            Constraint::Length(footer_lines),
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        " Up next ",
        Style::default().fg(Color::Black).bg(Color::Yellow),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    Paragraph::new(Span::styled(title, bold_style))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(meta, dim_style))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    Hourglass {
        fraction_remaining: app.engine.fraction_remaining().unwrap_or(0.0),
        running: phase == TimerPhase::Running,
        flipping: app.engine.is_flipping(),
    }
    .render(chunks[4], buf);

    Paragraph::new(Span::styled("Time remaining", dim_style))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);

    let mut readout = vec![Span::styled(remaining_label, bold_style.fg(Color::Yellow))];
    if phase == TimerPhase::Running {
        if let Some(remaining) = app.engine.remaining_ms() {
            let ends_at = Local::now() + chrono::Duration::milliseconds(remaining as i64);
            readout.push(Span::styled(
                format!("  until {}", ends_at.format("%H:%M")),
                dim_style,
            ));
        }
    }
    Paragraph::new(Line::from(readout))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);

    let footer: Vec<Line> = match phase {
        TimerPhase::Running => vec![Line::from(Span::styled(
            "Stay with it until the sand runs out.",
            italic_style,
        ))],
        TimerPhase::Completed | TimerPhase::Extending => {
            let mut lines = vec![
                Line::from(Span::styled("Did you finish your One Thing?", bold_style)),
                Line::from(""),
                Line::from(Span::styled(
                    "[f] Finished / [e] Not yet, extend / [esc] Quit",
                    italic_style,
                )),
            ];
            if phase == TimerPhase::Extending {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled("Add more time (minutes)", dim_style)));
                lines.push(Line::from(vec![
                    Span::styled(app.input.as_str(), bold_style),
                    Span::styled(CARET, bold_style),
                    Span::styled("  (enter) Extend timer", italic_style),
                ]));
                if let Some(notice) = &app.notice {
                    lines.push(Line::from(Span::styled(
                        notice.as_str(),
                        Style::default().fg(Color::Red),
                    )));
                }
            }
            lines
        }
    };
    Paragraph::new(footer)
        .alignment(Alignment::Center)
        .render(chunks[8], buf);
}

/// The end of `text` that fits in `max_width` columns
fn visible_tail(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }

    let mut tail: Vec<char> = Vec::new();
    let mut width = 0;
    for c in text.chars().rev() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > max_width {
            break;
        }
        width += w;
        tail.push(c);
    }
    tail.into_iter().rev().collect()
}
