use itertools::Itertools;

pub const MAX_TITLE_LENGTH: usize = 80;
pub const MAX_LOCATION_LENGTH: usize = 80;
pub const MAX_DURATION_INPUT_LENGTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum StepKey {
    Title,
    Location,
    Duration,
}

/// One of the capture prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub key: StepKey,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub hint: &'static str,
    pub max_length: usize,
}

pub static STEPS: [Step; 3] = [
    Step {
        key: StepKey::Title,
        label: "Title",
        placeholder: "Type your one thing",
        hint: "Press Enter to continue",
        max_length: MAX_TITLE_LENGTH,
    },
    Step {
        key: StepKey::Location,
        label: "Location",
        placeholder: "Where will you do it?",
        hint: "Studio, cafe, room, city...",
        max_length: MAX_LOCATION_LENGTH,
    },
    Step {
        key: StepKey::Duration,
        label: "Duration",
        placeholder: "e.g. 45 minutes or 1h 15m",
        hint: "Examples: 30m, 1h, 1h 30m",
        max_length: MAX_DURATION_INPUT_LENGTH,
    },
];

impl Step {
    /// Clean up raw input for this step
    pub fn sanitize(&self, raw: &str) -> String {
        sanitize_user_text(raw, self.max_length)
    }
}

/// Drop ASCII control characters, collapse whitespace runs, trim and
/// truncate to `max_chars` characters.
pub fn sanitize_user_text(input: &str, max_chars: usize) -> String {
    input
        .chars()
        .filter(|c| !matches!(*c, '\u{0000}'..='\u{001F}' | '\u{007F}'))
        .collect::<String>()
        .split_whitespace()
        .join(" ")
        .chars()
        .take(max_chars)
        .collect()
}
