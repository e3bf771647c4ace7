use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Paragraph, Widget},
};

// inner widths of the top bulb, cap to neck; the bottom bulb mirrors it
const BULB_WIDTHS: [usize; 4] = [7, 5, 3, 1];
const CAPACITY: usize = 16;
const GLASS_WIDTH: usize = 11;

pub const HOURGLASS_HEIGHT: u16 = 11;

const SAND: char = '▒';

/// Text hourglass whose top bulb empties as the countdown runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hourglass {
    pub fraction_remaining: f64,
    pub running: bool,
    pub flipping: bool,
}

impl Hourglass {
    pub fn lines(&self) -> Vec<String> {
        let top_grains =
            ((self.fraction_remaining.clamp(0.0, 1.0) * CAPACITY as f64).round()) as usize;
        let bottom_grains = CAPACITY - top_grains;

        // sand settles against the neck in the top bulb and against the base below
        let top_fill = fill_from_end(&BULB_WIDTHS, top_grains);
        let mut bottom_widths = BULB_WIDTHS;
        bottom_widths.reverse();
        let bottom_fill = fill_from_end(&bottom_widths, bottom_grains);

        let cap = "═".repeat(GLASS_WIDTH);
        let mut lines = vec![cap.clone()];
        lines.extend(
            BULB_WIDTHS
                .iter()
                .zip(&top_fill)
                .map(|(w, f)| bulb_row(*w, *f, '\\', '/')),
        );
        let streaming = self.running && top_grains > 0;
        lines.push(centered(if streaming { "|" } else { "·" }));
        lines.extend(
            bottom_widths
                .iter()
                .zip(&bottom_fill)
                .map(|(w, f)| bulb_row(*w, *f, '/', '\\')),
        );
        lines.push(cap);

        if self.flipping {
            lines.reverse();
        }
        lines
    }
}

impl Widget for Hourglass {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = if self.flipping {
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Yellow)
        };

        let lines: Vec<Line> = self.lines().into_iter().map(Line::from).collect();
        Paragraph::new(lines)
            .style(style)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

/// Distribute `grains` over rows, filling the last row first
fn fill_from_end(widths: &[usize], mut grains: usize) -> Vec<usize> {
    let mut fill = vec![0; widths.len()];
    for (slot, width) in fill.iter_mut().zip(widths).rev() {
        *slot = grains.min(*width);
        grains -= *slot;
    }
    fill
}

fn bulb_row(inner: usize, filled: usize, left: char, right: char) -> String {
    let empty = inner - filled;
    let body = format!(
        "{}{}{}",
        " ".repeat(empty / 2),
        SAND.to_string().repeat(filled),
        " ".repeat(empty - empty / 2)
    );
    centered(&format!("{}{}{}", left, body, right))
}

fn centered(s: &str) -> String {
    let width = s.chars().count();
    let pad = GLASS_WIDTH.saturating_sub(width);
    format!(
        "{}{}{}",
        " ".repeat(pad / 2),
        s,
        " ".repeat(pad - pad / 2)
    )
}
