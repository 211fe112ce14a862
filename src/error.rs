use std::path::PathBuf;

/// Everything that can go wrong while loading, quizzing or saving.
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("invalid deck format: {0}")]
    InvalidFormat(String),

    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("{requested} distractors requested but only {available} distinct answers are available")]
    InsufficientDistractors { requested: usize, available: usize },

    #[error("multiple choice needs at least one selection, got {0}")]
    InvalidSelections(usize),

    #[error("card {question:?} has {correct} correct answers out of {attempts} attempts")]
    InvalidStatistics {
        question: String,
        attempts: u32,
        correct: u32,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, QuizError>;
