use thiserror::Error;

/// Everything that can go wrong while the user is typing.
///
/// None of these are fatal: the engine reports the message and keeps its
/// previous state so the user can simply try again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please add something first.")]
    EmptyInput,
    #[error("Try 30m, 1h, 1h 30m, or 90 minutes (max 24h).")]
    UnparseableDuration,
    #[error("Enter a positive number of minutes.")]
    InvalidExtension,
    #[error("{action} is not available right now")]
    NotAvailable { action: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_the_prompts() {
        assert_eq!(
            InputError::EmptyInput.to_string(),
            "Please add something first."
        );
        assert_eq!(
            InputError::UnparseableDuration.to_string(),
            "Try 30m, 1h, 1h 30m, or 90 minutes (max 24h)."
        );
        assert_eq!(
            InputError::NotAvailable { action: "extend" }.to_string(),
            "extend is not available right now"
        );
    }
}
