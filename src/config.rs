//! Quiz settings, optionally read from a yaml file.
//!
//! ```yaml
//! card_count: all
//! quiz_type: multiple_choice
//! max_selections: 5
//! weights:
//!   hard: 3
//!   medium: 2
//!   easy: 1
//! thresholds:
//!   hard: 0.75
//!   medium: 0.9
//!   medium_min_correct: 10
//! seed: 42
//! ```
//!
//! Every field is optional and falls back to its default.

use crate::algorithm::Thresholds;
use crate::error::QuizError;
use crate::traits::{CardCount, QuizType, Weights};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct QuizConfig {
    /// Questions per run.
    pub card_count: CardCount,
    pub quiz_type: QuizType,
    /// Options offered for multiple choice, including the correct one.
    pub max_selections: usize,
    pub weights: Weights,
    pub thresholds: Thresholds,
    /// Seed for reproducible shuffles.
    pub seed: Option<u64>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        QuizConfig {
            card_count: CardCount::default(),
            quiz_type: QuizType::default(),
            max_selections: 4,
            weights: Weights::default(),
            thresholds: Thresholds::default(),
            seed: None,
        }
    }
}

impl QuizConfig {
    /// Read a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, QuizError> {
        let file = std::fs::File::open(path.as_ref())?;
        Ok(serde_yaml::from_reader(file)?)
    }

    pub fn from_yaml(text: &str) -> Result<Self, QuizError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Selections to pass to a run, only meaningful for multiple choice.
    pub fn selections(&self) -> Option<usize> {
        match self.quiz_type {
            QuizType::FillInTheBlank => None,
            QuizType::MultipleChoice => Some(self.max_selections),
        }
    }
}
