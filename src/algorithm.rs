use crate::card::Card;
use crate::traits::*;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Is the percentage correct at or below the threshold? Never attempted counts as below.
pub fn correct_at_or_below(correct: u32, attempts: u32, threshold: Ratio) -> bool {
    attempts == 0 || (correct as Ratio / attempts as Ratio) <= threshold
}

/// Limits that decide the difficulty of a card.
#[derive(Debug, PartialEq, Copy, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Thresholds {
    /// Cards with a ratio at or below this are hard.
    pub hard: Ratio,
    /// Cards with a ratio at or below this are medium.
    pub medium: Ratio,
    /// Cards need at least this many correct answers to be easy.
    pub medium_min_correct: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            hard: 0.75,
            medium: 0.90,
            medium_min_correct: 10,
        }
    }
}

/// Maps the statistics of a card to a difficulty tier.
#[derive(Debug, Default, Copy, Clone)]
pub struct DifficultyClassifier {
    thresholds: Thresholds,
}

impl DifficultyClassifier {
    pub fn new(thresholds: Thresholds) -> Self {
        DifficultyClassifier { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Hard is checked first, so a card without attempts is always hard.
    pub fn classify(&self, card: &Card) -> Difficulty {
        if self.is_hard(card) {
            Difficulty::Hard
        } else if self.is_medium(card) {
            Difficulty::Medium
        } else {
            Difficulty::Easy
        }
    }

    pub fn is_hard(&self, card: &Card) -> bool {
        correct_at_or_below(card.correct(), card.attempts(), self.thresholds.hard)
    }

    /// Few correct answers keep a card medium even with a perfect ratio.
    pub fn is_medium(&self, card: &Card) -> bool {
        card.correct() < self.thresholds.medium_min_correct
            || correct_at_or_below(card.correct(), card.attempts(), self.thresholds.medium)
    }

    /// Split cards into tiers, keeping their relative order.
    pub fn partition<'a, I>(&self, cards: I) -> Tiers<&'a Card>
    where
        I: IntoIterator<Item = &'a Card>,
    {
        Tiers::split_by(cards, |c| self.classify(c))
    }
}

/// Items split up by difficulty.
#[derive(Debug, Clone, PartialEq)]
pub struct Tiers<T> {
    pub hard: Vec<T>,
    pub medium: Vec<T>,
    pub easy: Vec<T>,
}

impl<T> Default for Tiers<T> {
    fn default() -> Self {
        Tiers {
            hard: vec![],
            medium: vec![],
            easy: vec![],
        }
    }
}

impl<T> Tiers<T> {
    /// Every item ends up in exactly one tier, in input order.
    pub fn split_by<I, F>(items: I, mut classify: F) -> Self
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&T) -> Difficulty,
    {
        let mut tiers = Tiers::default();
        for item in items {
            match classify(&item) {
                Difficulty::Hard => tiers.hard.push(item),
                Difficulty::Medium => tiers.medium.push(item),
                Difficulty::Easy => tiers.easy.push(item),
            }
        }
        tiers
    }

    pub fn get(&self, difficulty: Difficulty) -> &[T] {
        match difficulty {
            Difficulty::Hard => &self.hard,
            Difficulty::Medium => &self.medium,
            Difficulty::Easy => &self.easy,
        }
    }

    /// Total number of items over all tiers.
    pub fn len(&self) -> usize {
        self.hard.len() + self.medium.len() + self.easy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A shuffled copy of a tier that is dealt from front to back, and reshuffled once exhausted.
#[derive(Debug)]
struct TierCursor<T> {
    cards: Vec<T>,
    index: usize,
}

impl<T: Clone> TierCursor<T> {
    fn new<R: Rng>(mut cards: Vec<T>, rng: &mut R) -> Self {
        cards.shuffle(rng);
        TierCursor { cards, index: 0 }
    }

    fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn draw<R: Rng>(&mut self, rng: &mut R) -> Option<T> {
        if self.cards.is_empty() {
            return None;
        }
        if self.index >= self.cards.len() {
            self.cards.shuffle(rng);
            self.index = 0;
        }
        let card = self.cards[self.index].clone();
        self.index += 1;
        Some(card)
    }
}

/// Endless sequence that visits the tiers hard, medium, easy and deals as many cards from each
/// as its weight says. Empty tiers are skipped. Within a tier every card is dealt once before
/// any card repeats.
///
/// Ends immediately if no tier can contribute a card.
#[derive(Debug)]
pub struct WeightedRoundRobin<T, R: Rng> {
    cursors: [TierCursor<T>; 3],
    weights: Weights,
    /// Index into Difficulty::ORDER of the tier being dealt from.
    position: usize,
    /// Cards dealt from that tier this cycle.
    dealt: usize,
    rng: R,
}

impl<T: Clone, R: Rng> WeightedRoundRobin<T, R> {
    /// The tiers are copied, the originals are left untouched.
    pub fn new(tiers: &Tiers<T>, weights: Weights, mut rng: R) -> Self {
        let cursors = Difficulty::ORDER.map(|d| TierCursor::new(tiers.get(d).to_vec(), &mut rng));
        WeightedRoundRobin {
            cursors,
            weights,
            position: 0,
            dealt: 0,
            rng,
        }
    }

    /// Whether at least one tier has cards and a non zero weight.
    pub fn is_productive(&self) -> bool {
        Difficulty::ORDER
            .iter()
            .zip(self.cursors.iter())
            .any(|(d, c)| !c.is_empty() && self.weights.get(*d) > 0)
    }
}

impl<T: Clone, R: Rng> Iterator for WeightedRoundRobin<T, R> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if !self.is_productive() {
            return None;
        }
        loop {
            let i = self.position;
            let weight = self.weights.get(Difficulty::ORDER[i]);
            if self.dealt < weight && !self.cursors[i].is_empty() {
                self.dealt += 1;
                return self.cursors[i].draw(&mut self.rng);
            }
            self.position = (i + 1) % Difficulty::ORDER.len();
            self.dealt = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn card(attempts: u32, correct: u32) -> Card {
        Card::with_statistics("q", "a", attempts, correct, None).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1)
    }

    #[test]
    fn test_correct_at_or_below() {
        assert!(correct_at_or_below(0, 0, 0.0));
        assert!(correct_at_or_below(1, 2, 0.5));
        assert!(!correct_at_or_below(2, 3, 0.5));
    }

    #[test]
    fn test_classify() {
        let c = DifficultyClassifier::default();
        assert_eq!(c.classify(&card(0, 0)), Difficulty::Hard);
        assert_eq!(c.classify(&card(4, 3)), Difficulty::Hard);
        assert_eq!(c.classify(&card(10, 2)), Difficulty::Hard);
        // Perfect ratio but too few correct answers.
        assert_eq!(c.classify(&card(5, 5)), Difficulty::Medium);
        // Enough correct answers but ratio at or below 0.9.
        assert_eq!(c.classify(&card(20, 18)), Difficulty::Medium);
        assert_eq!(c.classify(&card(20, 19)), Difficulty::Easy);
        assert_eq!(c.classify(&card(10, 10)), Difficulty::Easy);
    }

    #[test]
    fn test_unattempted_always_hard() {
        let c = DifficultyClassifier::new(Thresholds {
            hard: 0.0,
            medium: 0.0,
            medium_min_correct: 0,
        });
        assert_eq!(c.classify(&card(0, 0)), Difficulty::Hard);
        assert_eq!(c.classify(&card(3, 3)), Difficulty::Easy);
    }

    #[test]
    fn test_partition() {
        let cards = vec![
            Card::new("h0", "a"),
            Card::with_statistics("e0", "a", 20, 20, None).unwrap(),
            Card::with_statistics("m0", "a", 3, 3, None).unwrap(),
            Card::new("h1", "a"),
            Card::with_statistics("e1", "a", 12, 12, None).unwrap(),
        ];
        let tiers = DifficultyClassifier::default().partition(&cards);
        let questions = |t: &[&Card]| t.iter().map(|c| c.question().to_owned()).collect::<Vec<_>>();
        assert_eq!(questions(&tiers.hard), ["h0", "h1"]);
        assert_eq!(questions(&tiers.medium), ["m0"]);
        assert_eq!(questions(&tiers.easy), ["e0", "e1"]);
        assert_eq!(tiers.len(), cards.len());
    }

    fn example_tiers() -> Tiers<&'static str> {
        Tiers {
            hard: vec!["h0", "h1", "h2", "h3"],
            medium: vec!["m0", "m1", "m2"],
            easy: vec!["e0", "e1"],
        }
    }

    fn count_tiers(drawn: &[&str]) -> (usize, usize, usize) {
        let n = |p: char| drawn.iter().filter(|v| v.starts_with(p)).count();
        (n('h'), n('m'), n('e'))
    }

    #[test]
    fn test_weighted_counts() {
        let tiers = example_tiers();
        let drawn: Vec<_> = WeightedRoundRobin::new(&tiers, Weights::new(3, 2, 1), rng())
            .take(6)
            .collect();
        assert_eq!(count_tiers(&drawn), (3, 2, 1));

        let drawn: Vec<_> = WeightedRoundRobin::new(&tiers, Weights::new(3, 2, 1), rng())
            .take(12)
            .collect();
        assert_eq!(count_tiers(&drawn), (6, 4, 2));
        // Tier order within a cycle is fixed.
        assert!(drawn[..3].iter().all(|v| v.starts_with('h')));
        assert!(drawn[3..5].iter().all(|v| v.starts_with('m')));
        assert!(drawn[5].starts_with('e'));
    }

    #[test]
    fn test_originals_untouched() {
        let tiers = example_tiers();
        let _: Vec<_> = WeightedRoundRobin::new(&tiers, Weights::new(3, 2, 1), rng())
            .take(50)
            .collect();
        assert_eq!(tiers, example_tiers());
    }

    #[test]
    fn test_round_robin_exhaustion() {
        let tiers = Tiers {
            hard: (0..7).collect::<Vec<u32>>(),
            ..Default::default()
        };
        let mut generator = WeightedRoundRobin::new(&tiers, Weights::default(), rng());
        for _pass in 0..5 {
            let drawn: HashSet<u32> = generator.by_ref().take(7).collect();
            assert_eq!(drawn, (0..7).collect::<HashSet<u32>>());
        }
    }

    #[test]
    fn test_reshuffle_between_passes() {
        let tiers = Tiers {
            hard: (0..20).collect::<Vec<u32>>(),
            ..Default::default()
        };
        let mut generator = WeightedRoundRobin::new(&tiers, Weights::default(), rng());
        let passes: Vec<Vec<u32>> = (0..4).map(|_| generator.by_ref().take(20).collect()).collect();
        // Four identical permutations of twenty items would be astronomically unlikely.
        assert!(passes.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_empty_tier_skipped() {
        let tiers = Tiers {
            hard: vec![],
            medium: vec!["m0", "m1"],
            easy: vec!["e0"],
        };
        let drawn: Vec<_> = WeightedRoundRobin::new(&tiers, Weights::new(5, 1, 1), rng())
            .take(10)
            .collect();
        assert_eq!(count_tiers(&drawn), (0, 5, 5));
    }

    #[test]
    fn test_zero_weight_skipped() {
        let drawn: Vec<_> = WeightedRoundRobin::new(&example_tiers(), Weights::new(0, 1, 0), rng())
            .take(9)
            .collect();
        assert_eq!(count_tiers(&drawn), (0, 9, 0));
    }

    #[test]
    fn test_nothing_to_draw() {
        let empty: Tiers<u32> = Default::default();
        let mut generator = WeightedRoundRobin::new(&empty, Weights::default(), rng());
        assert!(!generator.is_productive());
        assert_eq!(generator.next(), None);

        let mut generator = WeightedRoundRobin::new(&example_tiers(), Weights::new(0, 0, 0), rng());
        assert_eq!(generator.next(), None);

        let tiers = Tiers {
            easy: vec![1u32],
            ..Default::default()
        };
        let mut generator = WeightedRoundRobin::new(&tiers, Weights::new(4, 4, 0), rng());
        assert_eq!(generator.next(), None);
    }
}
