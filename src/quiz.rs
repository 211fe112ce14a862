use crate::algorithm::{DifficultyClassifier, Thresholds, Tiers, WeightedRoundRobin};
use crate::config::QuizConfig;
use crate::deck::Deck;
use crate::error::QuizError;
use crate::storage::FileStorage;
use crate::traits::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/*
    Flow of a quiz;
        Load deck from storage.

        Per run:
            Classify cards into tiers.
            Deal the requested number of cards with the weighted round robin.
            Shuffle that batch.
            Present each card as a question, answers update the card statistics.
            Save the deck when the run ends, however it ends.
*/

/// An answer given by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Typed answer for fill in the blank.
    Text(String),
    /// Index into the options for multiple choice.
    Choice(usize),
}

impl From<&str> for Answer {
    fn from(v: &str) -> Self {
        Answer::Text(v.to_owned())
    }
}

impl From<String> for Answer {
    fn from(v: String) -> Self {
        Answer::Text(v)
    }
}

impl From<usize> for Answer {
    fn from(v: usize) -> Self {
        Answer::Choice(v)
    }
}

/// The answer that was expected, reported back after submitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorrectAnswer {
    Text(String),
    Choice(usize),
}

impl CorrectAnswer {
    fn matches(&self, answer: &Answer) -> bool {
        match (self, answer) {
            (CorrectAnswer::Text(expected), Answer::Text(given)) => expected == given,
            (CorrectAnswer::Choice(expected), Answer::Choice(given)) => expected == given,
            _ => false,
        }
    }
}

/// State shared between a quiz, its session and the questions handed out.
#[derive(Debug, Default)]
struct QuizState {
    deck: Deck,
    attempts: u32,
    correct: u32,
}

/// A single question, bound to the card it was made from.
#[derive(Debug)]
pub struct Question {
    prompt: String,
    options: Option<Vec<String>>,
    expected: CorrectAnswer,
    card: usize,
    state: Rc<RefCell<QuizState>>,
}

impl Question {
    /// The question text of the card.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The shuffled options for multiple choice, `None` for fill in the blank.
    pub fn options(&self) -> Option<&[String]> {
        self.options.as_deref()
    }

    /// Check the answer and tally it on the card and the session. Every call counts, submitting
    /// twice counts twice.
    pub fn submit<A: Into<Answer>>(&self, answer: A) -> (bool, CorrectAnswer) {
        let answer = answer.into();
        let is_correct = self.expected.matches(&answer);

        let mut state = self.state.borrow_mut();
        if let Some(card) = state.deck.card_mut(self.card) {
            if is_correct {
                card.record_correct();
            } else {
                card.record_incorrect();
            }
        }
        state.attempts += 1;
        if is_correct {
            state.correct += 1;
        }
        log::debug!(
            "Answer {answer:?} to {:?} is {}",
            self.prompt,
            if is_correct { "correct" } else { "incorrect" }
        );
        (is_correct, self.expected.clone())
    }
}

/// Runs quizzes over a deck, favouring the cards that are answered wrong most often.
pub struct Quiz {
    storage: Box<dyn Storage>,
    state: Rc<RefCell<QuizState>>,
    weights: Weights,
    classifier: DifficultyClassifier,
    rng: StdRng,
}

impl Quiz {
    pub fn new(
        storage: Box<dyn Storage>,
        weights: Weights,
        thresholds: Thresholds,
    ) -> Result<Self, QuizError> {
        let deck = storage.load()?;
        Ok(Quiz {
            storage,
            state: Rc::new(RefCell::new(QuizState {
                deck,
                ..Default::default()
            })),
            weights,
            classifier: DifficultyClassifier::new(thresholds),
            rng: StdRng::from_entropy(),
        })
    }

    /// Quiz over a deck file, the file is overwritten at the end of each run.
    pub fn open<P: AsRef<Path>>(
        path: P,
        weights: Weights,
        thresholds: Thresholds,
    ) -> Result<Self, QuizError> {
        Quiz::new(Box::new(FileStorage::new(path)), weights, thresholds)
    }

    /// Quiz using the weights, thresholds and seed of a configuration.
    pub fn from_config(storage: Box<dyn Storage>, config: &QuizConfig) -> Result<Self, QuizError> {
        let quiz = Quiz::new(storage, config.weights, config.thresholds)?;
        Ok(match config.seed {
            Some(seed) => quiz.with_seed(seed),
            None => quiz,
        })
    }

    /// Make all shuffles reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Name of the deck.
    pub fn name(&self) -> String {
        self.state.borrow().deck.name().to_owned()
    }

    /// Snapshot of the deck with its current statistics.
    pub fn deck(&self) -> Deck {
        self.state.borrow().deck.clone()
    }

    /// Indices of the cards in each tier, according to their current statistics.
    pub fn tiers(&self) -> Tiers<usize> {
        let state = self.state.borrow();
        let cards = state.deck.cards();
        Tiers::split_by(0..cards.len(), |&i| self.classifier.classify(&cards[i]))
    }

    /// Correct answers and attempts of the latest run.
    pub fn score(&self) -> (u32, u32) {
        let state = self.state.borrow();
        (state.correct, state.attempts)
    }

    /// Start a run of questions. All configuration errors are reported here, before any
    /// question is produced.
    pub fn run(
        &mut self,
        count: CardCount,
        quiz_type: QuizType,
        max_selections: Option<usize>,
    ) -> Result<Session<'_>, QuizError> {
        let deck_len = self.state.borrow().deck.len();
        let count = count.resolve(deck_len);

        let (selections, answers) = match quiz_type {
            QuizType::FillInTheBlank => (0, vec![]),
            QuizType::MultipleChoice => {
                let selections = max_selections.unwrap_or(0);
                if selections == 0 {
                    return Err(QuizError::InvalidSelections(selections));
                }
                let answers = self.state.borrow().deck.distinct_answers();
                let available = answers.len().saturating_sub(1);
                if available < selections - 1 {
                    return Err(QuizError::InsufficientDistractors {
                        requested: selections - 1,
                        available,
                    });
                }
                (selections, answers.into_iter().collect())
            }
        };

        let tiers = self.tiers();
        log::info!(
            "Running quiz {:?} as a {count} question {quiz_type}.",
            self.state.borrow().deck.name()
        );
        log::info!("{} hard cards in deck.", tiers.hard.len());
        log::info!("{} medium cards in deck.", tiers.medium.len());
        log::info!("{} easy cards in deck.", tiers.easy.len());
        log::info!("{} total cards in deck.", tiers.len());

        let generator =
            WeightedRoundRobin::new(&tiers, self.weights, StdRng::seed_from_u64(self.rng.gen()));
        let mut batch: Vec<usize> = generator.take(count).collect();
        batch.shuffle(&mut self.rng);

        {
            let mut state = self.state.borrow_mut();
            state.attempts = 0;
            state.correct = 0;
        }

        Ok(Session {
            storage: &mut self.storage,
            state: self.state.clone(),
            batch: batch.into_iter(),
            quiz_type,
            selections,
            answers,
            rng: StdRng::seed_from_u64(self.rng.gen()),
            persisted: false,
        })
    }
}

/// The questions of a single run. The deck is saved exactly once, by `finish` or otherwise when
/// the session is dropped.
pub struct Session<'a> {
    storage: &'a mut Box<dyn Storage>,
    state: Rc<RefCell<QuizState>>,
    batch: std::vec::IntoIter<usize>,
    quiz_type: QuizType,
    selections: usize,
    /// Distinct answers of the deck, only for multiple choice.
    answers: Vec<String>,
    rng: StdRng,
    persisted: bool,
}

impl<'a> Session<'a> {
    /// Correct answers and attempts so far.
    pub fn score(&self) -> (u32, u32) {
        let state = self.state.borrow();
        (state.correct, state.attempts)
    }

    /// Number of questions not yet handed out.
    pub fn remaining(&self) -> usize {
        self.batch.len()
    }

    /// End the run and save the deck.
    pub fn finish(mut self) -> Result<(), QuizError> {
        self.persist()
    }

    fn persist(&mut self) -> Result<(), QuizError> {
        if self.persisted {
            return Ok(());
        }
        self.persisted = true;
        let state = self.state.borrow();
        self.storage.save(&state.deck)
    }
}

impl<'a> Iterator for Session<'a> {
    type Item = Question;

    fn next(&mut self) -> Option<Question> {
        let card = self.batch.next()?;
        let state = self.state.borrow();
        let current = &state.deck.cards()[card];
        let (options, expected) = match self.quiz_type {
            QuizType::FillInTheBlank => (None, CorrectAnswer::Text(current.answer().to_owned())),
            QuizType::MultipleChoice => {
                let (index, options) =
                    build_options(&self.answers, current.answer(), self.selections, &mut self.rng);
                (Some(options), CorrectAnswer::Choice(index))
            }
        };
        let prompt = current.question().to_owned();
        drop(state);

        Some(Question {
            prompt,
            options,
            expected,
            card,
            state: self.state.clone(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.batch.size_hint()
    }
}

impl<'a> Drop for Session<'a> {
    fn drop(&mut self) {
        if let Err(e) = self.persist() {
            log::error!("Failed to save deck: {e}");
        }
    }
}

/// Pick `selections - 1` distractors other than the correct answer and put the correct answer at
/// a random place among them. Returns the index of the correct answer and the options.
fn build_options<R: Rng>(
    answers: &[String],
    correct: &str,
    selections: usize,
    rng: &mut R,
) -> (usize, Vec<String>) {
    let remaining: Vec<&String> = answers.iter().filter(|a| a.as_str() != correct).collect();
    let mut options: Vec<String> = remaining
        .choose_multiple(rng, selections.saturating_sub(1))
        .map(|a| a.to_string())
        .collect();
    let index = rng.gen_range(0..=options.len());
    options.insert(index, correct.to_owned());
    (index, options)
}
