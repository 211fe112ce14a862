use crate::error::QuizError;
use chrono::{NaiveDateTime, Utc};

/// Format of the last shown timestamp on disk, sorts lexically.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// A question and answer pair with the statistics of past attempts.
///
/// Cards compare by value, two cards with the same contents and statistics are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Card {
    question: String,
    answer: String,
    attempts: u32,
    correct: u32,
    last_shown: Option<NaiveDateTime>,
}

impl Card {
    /// A card that was never asked.
    pub fn new(question: &str, answer: &str) -> Self {
        Card {
            question: question.to_owned(),
            answer: answer.to_owned(),
            attempts: 0,
            correct: 0,
            last_shown: None,
        }
    }

    /// A card with existing statistics, correct may not exceed attempts.
    pub fn with_statistics(
        question: &str,
        answer: &str,
        attempts: u32,
        correct: u32,
        last_shown: Option<NaiveDateTime>,
    ) -> Result<Self, QuizError> {
        if correct > attempts {
            return Err(QuizError::InvalidStatistics {
                question: question.to_owned(),
                attempts,
                correct,
            });
        }
        Ok(Card {
            question: question.to_owned(),
            answer: answer.to_owned(),
            attempts,
            correct,
            last_shown,
        })
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn last_shown(&self) -> Option<NaiveDateTime> {
        self.last_shown
    }

    /// Fraction of attempts answered correctly, `None` if never attempted.
    pub fn ratio(&self) -> Option<f64> {
        if self.attempts == 0 {
            None
        } else {
            Some(self.correct as f64 / self.attempts as f64)
        }
    }

    /// Tally a correct answer.
    pub fn record_correct(&mut self) {
        self.correct += 1;
        self.attempts += 1;
        self.last_shown = Some(Utc::now().naive_utc());
    }

    /// Tally an incorrect answer.
    pub fn record_incorrect(&mut self) {
        self.attempts += 1;
        self.last_shown = Some(Utc::now().naive_utc());
    }

    /// Same contents with question and answer exchanged, statistics start over.
    pub fn swapped(&self) -> Self {
        Card::new(&self.answer, &self.question)
    }
}
