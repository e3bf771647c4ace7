use crate::duration::humanize_duration;

/// The record assembled across the capture steps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Task {
    pub title: String,
    pub location: String,
    pub duration_ms: u64,
}

impl Task {
    /// `location • duration`, leaving out whichever part is empty
    pub fn meta_label(&self) -> String {
        [self.location.clone(), humanize_duration(self.duration_ms)]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" • ")
    }
}
