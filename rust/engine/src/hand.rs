//! Best-five-card evaluation for the equity simulator.

use crate::cards::Card;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

/// Orders like the hands it describes: category first, then kickers.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct HandStrength {
    pub category: Category,
    // ranks high -> low, unused slots are 0
    pub kickers: [u8; 5],
}

impl HandStrength {
    fn new(category: Category, kickers: [u8; 5]) -> Self {
        Self { category, kickers }
    }
}

/// Strength of the best five-card hand among `cards` (five to seven cards).
///
/// # Examples
///
/// ```
/// use arena_engine::cards::parse_cards;
/// use arena_engine::hand::{evaluate, Category};
///
/// let wheel = evaluate(&parse_cards("Ah2c3d4s5hKdKc").unwrap());
/// assert_eq!(wheel.category, Category::Straight);
/// assert_eq!(wheel.kickers[0], 5);
/// ```
pub fn evaluate(cards: &[Card]) -> HandStrength {
    debug_assert!((5..=7).contains(&cards.len()));

    let mut rank_counts = [0u8; 15];
    let mut ranks: u16 = 0;
    let mut by_suit = [0u16; 4];
    for c in cards {
        let r = c.rank.value();
        rank_counts[r as usize] += 1;
        ranks |= 1 << r;
        by_suit[c.suit as usize] |= 1 << r;
    }

    let flush = by_suit.iter().copied().find(|m| m.count_ones() >= 5);
    if let Some(high) = flush.and_then(straight_high) {
        return HandStrength::new(Category::StraightFlush, [high, 0, 0, 0, 0]);
    }

    let with_count = |n: u8| (2..=14u8).rev().filter(move |&r| rank_counts[r as usize] == n);

    if let Some(quad) = with_count(4).next() {
        let mut k = [quad, 0, 0, 0, 0];
        fill(&mut k, 1, 2, ranks, &[quad]);
        return HandStrength::new(Category::FourOfAKind, k);
    }

    let trips: Vec<u8> = with_count(3).collect();
    let pairs: Vec<u8> = with_count(2).collect();

    if let Some(&trip) = trips.first() {
        // a second set of trips plays as the pair
        let pair = trips.get(1).copied().max(pairs.first().copied());
        if let Some(pair) = pair {
            return HandStrength::new(Category::FullHouse, [trip, pair, 0, 0, 0]);
        }
    }

    if let Some(mask) = flush {
        let mut k = [0u8; 5];
        fill(&mut k, 0, 5, mask, &[]);
        return HandStrength::new(Category::Flush, k);
    }

    if let Some(high) = straight_high(ranks) {
        return HandStrength::new(Category::Straight, [high, 0, 0, 0, 0]);
    }

    if let Some(&trip) = trips.first() {
        let mut k = [trip, 0, 0, 0, 0];
        fill(&mut k, 1, 3, ranks, &[trip]);
        return HandStrength::new(Category::ThreeOfAKind, k);
    }

    if let &[high, low, ..] = pairs.as_slice() {
        let mut k = [high, low, 0, 0, 0];
        fill(&mut k, 2, 3, ranks, &[high, low]);
        return HandStrength::new(Category::TwoPair, k);
    }

    if let Some(&pair) = pairs.first() {
        let mut k = [pair, 0, 0, 0, 0];
        fill(&mut k, 1, 4, ranks, &[pair]);
        return HandStrength::new(Category::OnePair, k);
    }

    let mut k = [0u8; 5];
    fill(&mut k, 0, 5, ranks, &[]);
    HandStrength::new(Category::HighCard, k)
}

/// Writes the highest ranks in `mask`, minus `skip`, into `kickers[from..to]`.
fn fill(kickers: &mut [u8; 5], from: usize, to: usize, mask: u16, skip: &[u8]) {
    let picks = (2..=14u8)
        .rev()
        .filter(|&r| mask & (1 << r) != 0 && !skip.contains(&r));
    for (slot, r) in kickers[from..to].iter_mut().zip(picks) {
        *slot = r;
    }
}

/// High card of the best straight in a rank bitmask. The ace also plays low.
fn straight_high(mask: u16) -> Option<u8> {
    let mask = if mask & (1 << 14) != 0 { mask | (1 << 1) } else { mask };
    (5..=14u8).rev().find(|&high| {
        let window = 0b1_1111u16 << (high - 4);
        mask & window == window
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    fn eval(s: &str) -> HandStrength {
        evaluate(&parse_cards(s).unwrap())
    }

    #[test]
    fn categories_are_detected() {
        assert_eq!(eval("AhKhQhJhTh2c3d").category, Category::StraightFlush);
        assert_eq!(eval("9s9h9d9c2h3c4d").category, Category::FourOfAKind);
        assert_eq!(eval("KsKhKd2c2h7c8d").category, Category::FullHouse);
        assert_eq!(eval("As9s7s4s2sKhKd").category, Category::Flush);
        assert_eq!(eval("9c8d7h6s5c2d2h").category, Category::Straight);
        assert_eq!(eval("QsQhQd7c5h3c2d").category, Category::ThreeOfAKind);
        assert_eq!(eval("JsJh4d4c9h3c2d").category, Category::TwoPair);
        assert_eq!(eval("TsTh8d6c4h3c2d").category, Category::OnePair);
        assert_eq!(eval("AsJh9d7c5h3c2d").category, Category::HighCard);
    }

    #[test]
    fn kickers_break_ties() {
        assert!(eval("AsAhKd7c5h") > eval("AdAcQd7s5s"));
        assert_eq!(eval("AsAhKd7c5h"), eval("AdAcKs7d5c"));
        // third pair only counts as a kicker
        assert_eq!(eval("JsJh4d4c2h2c9d").kickers, [11, 4, 9, 0, 0]);
    }

    #[test]
    fn two_sets_make_a_full_house() {
        let h = eval("7s7h7d5c5h5s2d");
        assert_eq!(h.category, Category::FullHouse);
        assert_eq!(h.kickers[..2], [7, 5]);
    }

    #[test]
    fn wheel_is_the_lowest_straight() {
        let wheel = eval("As2d3c4h5s");
        let six_high = eval("2d3c4h5s6d");
        assert_eq!(wheel.kickers[0], 5);
        assert!(six_high > wheel);
    }

    #[test]
    fn flush_kickers_are_the_top_five_suited() {
        let flush = eval("Ks2s5s9sTs8h7d");
        assert_eq!(flush.category, Category::Flush);
        assert_eq!(flush.kickers, [13, 10, 9, 5, 2]);
    }
}
