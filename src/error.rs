//! Crate-level error type.

use crate::validation::ValidationError;
use thiserror::Error;

/// Errors reported synchronously by [`crate::pipeline::Optimization::start`].
///
/// Everything that happens after the worker is running (dead-ends,
/// cancellation, panics) is observed through the progress handles instead.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The input was rejected before any search started.
    #[error("validation failed ({})", summarize(.0))]
    Validation(Vec<ValidationError>),
    /// The background worker thread could not be created.
    #[error("failed to spawn optimization worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<ValidationError>> for ScheduleError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Input, InputClassroom, InputDay};
    use crate::validation::validate_input;

    #[test]
    fn test_validation_message_lists_reasons() {
        let input = Input::new()
            .with_chair_persons([2])
            .with_defense(0, 1, 3)
            .with_day(InputDay::new(0).with_classroom(InputClassroom::new(0, vec![2])));
        let err: ScheduleError = validate_input(&input).unwrap_err().into();
        let text = err.to_string();
        assert!(text.starts_with("validation failed"));
        assert!(text.contains("Not enough slots (2) for defenses (3)"));
    }
}
