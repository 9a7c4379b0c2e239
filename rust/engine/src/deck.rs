use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};

/// The unseen part of a deck: every card except the ones already known.
///
/// Each [`Deck::shuffle`] starts a fresh runout from the same unseen set, so
/// a simulation can reuse one deck for all its samples. A fixed seed gives
/// the same sequence of runouts every time.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
    rng: ChaCha20Rng,
}

impl Deck {
    pub fn new_with_seed(seed: u64) -> Self {
        Self::without(&[], seed)
    }

    /// A deck missing `known`, in suit order until shuffled.
    pub fn without(known: &[Card], seed: u64) -> Self {
        let cards = full_deck()
            .into_iter()
            .filter(|c| !known.contains(c))
            .collect();
        Self {
            cards,
            position: 0,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut self.rng);
        self.position = 0;
    }

    pub fn deal_card(&mut self) -> Option<Card> {
        let c = self.cards.get(self.position).copied()?;
        self.position += 1;
        Some(c)
    }

    /// Deals `n` cards onto `into`; `false` if the deck ran out first.
    pub fn deal_into(&mut self, into: &mut Vec<Card>, n: usize) -> bool {
        for _ in 0..n {
            match self.deal_card() {
                Some(c) => into.push(c),
                None => return false,
            }
        }
        true
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }
}
