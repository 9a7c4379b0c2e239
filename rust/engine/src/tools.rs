//! Equity and pot-odds values attached to a decision.
//!
//! These are the numbers a model may request through tool calls before it
//! answers. The decision pipeline only uses them to raise [`Advisory`] flags;
//! it never changes a model's action because of them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::action::{Action, ActionType};
use crate::cards::{format_cards, Card};
use crate::context::DecisionContext;
use crate::deck::Deck;
use crate::errors::ToolError;
use crate::hand::evaluate;

/// How far equity must sit from the break-even point before an advisory fires.
pub const ADVISORY_MARGIN: f64 = 0.10;

pub const MAX_OPPONENTS: u8 = 5;
pub const MIN_SAMPLES: u32 = 100;
pub const MAX_SAMPLES: u32 = 5_000;
pub const DEFAULT_SAMPLES: u32 = 1_000;

macro_rules! fraction {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
        #[serde(try_from = "f64", into = "f64")]
        pub struct $name(f64);

        impl $name {
            pub fn new(value: f64) -> Result<Self, ToolError> {
                if value.is_finite() && (0.0..=1.0).contains(&value) {
                    Ok(Self(value))
                } else {
                    Err(ToolError::OutOfRange {
                        name: $label,
                        value,
                    })
                }
            }

            /// Builds the value from a percentage such as `65.5`.
            pub fn from_percent(percent: f64) -> Result<Self, ToolError> {
                Self::new(percent / 100.0)
            }

            pub fn get(self) -> f64 {
                self.0
            }

            pub fn percent(self) -> f64 {
                self.0 * 100.0
            }
        }

        impl TryFrom<f64> for $name {
            type Error = ToolError;

            fn try_from(value: f64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for f64 {
            fn from(value: $name) -> f64 {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.1}%", self.percent())
            }
        }
    };
}

fraction!(Equity, "equity");
fraction!(PotOdds, "pot odds");

/// Tool results supplied with a decision. Either may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutputs {
    #[serde(default)]
    pub equity: Option<Equity>,
    #[serde(default)]
    pub pot_odds: Option<PotOdds>,
}

impl ToolOutputs {
    pub fn is_empty(&self) -> bool {
        self.equity.is_none() && self.pot_odds.is_none()
    }
}

/// Result of the pot-odds calculator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PotOddsReport {
    /// Equity needed for a call to break even
    pub break_even: PotOdds,
    /// Pot-to-call ratio, e.g. `3.0:1`
    pub ratio: String,
    pub recommendation: String,
}

/// Computes the break-even equity for calling `to_call` into `pot`.
///
/// # Examples
///
/// ```
/// use arena_engine::tools::pot_odds;
///
/// let report = pot_odds(300, 100);
/// assert_eq!(report.break_even.percent(), 25.0);
/// assert_eq!(report.ratio, "3.0:1");
/// ```
pub fn pot_odds(pot: u32, to_call: u32) -> PotOddsReport {
    if to_call == 0 {
        return PotOddsReport {
            break_even: PotOdds(0.0),
            ratio: "0:1".to_string(),
            recommendation:
                "No bet to call - check is free, any hand has positive expected value.".into(),
        };
    }

    let fraction = f64::from(to_call) / (f64::from(pot) + f64::from(to_call));
    let pct = fraction * 100.0;
    let ratio = f64::from(pot) / f64::from(to_call);

    let recommendation = if pct < 20.0 {
        format!("Excellent pot odds! You only need {pct:.1}% equity to call profitably.")
    } else if pct < 33.0 {
        format!("Good pot odds. You need {pct:.1}% equity to call.")
    } else if pct < 40.0 {
        format!("Marginal pot odds. You need {pct:.1}% equity to call. Only continue with strong draws or made hands.")
    } else {
        format!("Poor pot odds. You need {pct:.1}% equity to call. Fold weak hands and marginal draws.")
    };

    PotOddsReport {
        break_even: PotOdds(fraction),
        ratio: format!("{ratio:.1}:1"),
        recommendation,
    }
}

/// Result of an equity calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityEstimate {
    pub equity: Equity,
    pub opponents: u8,
    /// Simulated runouts; 0 for the table heuristic
    pub samples: u32,
    pub recommendation: String,
}

/// Monte Carlo equity of `hole` against `opponents` random hands.
///
/// Deals the opponents' cards and the rest of the board from the unseen
/// cards `samples` times. Ties split the pot evenly. `opponents` is clamped
/// to 1..=5 and `samples` to 100..=5000; the same `seed` gives the same
/// estimate.
///
/// # Examples
///
/// ```
/// use arena_engine::cards::parse_cards;
/// use arena_engine::tools::equity;
///
/// let hole = parse_cards("AsAh").unwrap();
/// let board = parse_cards("Ad7c2h").unwrap();
/// let e = equity(&hole, &board, 1, 1_000, 7).unwrap();
/// assert!(e.equity.percent() > 85.0);
/// ```
pub fn equity(
    hole: &[Card],
    board: &[Card],
    opponents: u8,
    samples: u32,
    seed: u64,
) -> Result<EquityEstimate, ToolError> {
    if hole.len() != 2 {
        return Err(ToolError::HoleCardCount {
            expected: 2,
            actual: hole.len(),
        });
    }
    if !matches!(board.len(), 0 | 3 | 4 | 5) {
        return Err(ToolError::BoardSize(board.len()));
    }
    let known: Vec<Card> = hole.iter().chain(board).copied().collect();
    let mut distinct = known.clone();
    distinct.sort_unstable();
    distinct.dedup();
    if distinct.len() != known.len() {
        return Err(ToolError::InvalidCards(format_cards(&known)));
    }

    let opponents = opponents.clamp(1, MAX_OPPONENTS);
    let samples = samples.clamp(MIN_SAMPLES, MAX_SAMPLES);
    let runout = 5 - board.len();
    let mut deck = Deck::without(&known, seed);

    let mut share = 0.0;
    let mut dealt = Vec::with_capacity(2 * usize::from(opponents) + runout);
    let mut seven = Vec::with_capacity(7);
    for _ in 0..samples {
        deck.shuffle();
        dealt.clear();
        // 52 - 7 known leaves 45, enough for five opponents and a runout
        if !deck.deal_into(&mut dealt, 2 * usize::from(opponents) + runout) {
            return Err(ToolError::InvalidCards(format_cards(&known)));
        }
        let (holes, rest) = dealt.split_at(2 * usize::from(opponents));

        let mut strength_of = |pocket: &[Card]| {
            seven.clear();
            seven.extend_from_slice(pocket);
            seven.extend_from_slice(board);
            seven.extend_from_slice(rest);
            evaluate(&seven)
        };
        let hero = strength_of(hole);
        let mut tied = 1u32;
        let mut beaten = false;
        for villain in holes.chunks_exact(2) {
            let v = strength_of(villain);
            if v > hero {
                beaten = true;
                break;
            }
            if v == hero {
                tied += 1;
            }
        }
        if !beaten {
            share += 1.0 / f64::from(tied);
        }
    }

    let pct = share / f64::from(samples) * 100.0;
    let recommendation = if pct >= 70.0 {
        format!("Very strong hand! With {pct:.1}% equity, you should bet for value and consider raising.")
    } else if pct >= 50.0 {
        format!("Solid equity at {pct:.1}%. You're ahead of random hands. Consider betting or calling.")
    } else if pct >= 35.0 {
        format!("Marginal equity at {pct:.1}%. Proceed with caution, consider pot odds before calling.")
    } else if pct >= 20.0 {
        format!("Weak equity at {pct:.1}%. Only continue with good pot odds or as a semi-bluff.")
    } else {
        format!("Very weak equity at {pct:.1}%. Consider folding unless you have great pot odds.")
    };

    Ok(EquityEstimate {
        equity: Equity::from_percent(pct)?,
        opponents,
        samples,
        recommendation,
    })
}

/// Table-driven preflop equity estimate against random hands.
///
/// Much cheaper than a simulation and good enough for a prompt hint. The
/// heads-up base figure is scaled down as the number of opponents grows.
pub fn preflop_equity(hole: &[Card], opponents: u8) -> Result<EquityEstimate, ToolError> {
    let [a, b] = hole else {
        return Err(ToolError::HoleCardCount {
            expected: 2,
            actual: hole.len(),
        });
    };
    if a == b {
        return Err(ToolError::InvalidCards(format_cards(hole)));
    }
    let (high, low) = if a.rank >= b.rank {
        (a.rank.value(), b.rank.value())
    } else {
        (b.rank.value(), a.rank.value())
    };

    let base: f64 = if high == low {
        // 22 -> 51 up to AA -> 85
        match high {
            14 => 85.0,
            13 => 82.0,
            12 => 80.0,
            11 => 78.0,
            10 => 75.0,
            r => 51.0 + 3.0 * f64::from(r - 2),
        }
    } else {
        let mut e = match high {
            14 => 60.0,
            13 => 57.0,
            12 => 54.0,
            _ => 50.0,
        };
        if low >= 10 {
            e += 5.0;
        } else if low >= 7 {
            e += 2.0;
        }
        if a.suit == b.suit {
            e += 3.0;
        }
        if high - low <= 3 {
            e += 2.0;
        }
        e
    };

    let multiplier = match opponents {
        0 | 1 => 1.0,
        2 => 0.85,
        3 => 0.75,
        4 => 0.67,
        5 => 0.60,
        _ => 0.55,
    };
    let pct = base * multiplier;

    let recommendation = if pct >= 60.0 {
        "Premium hand - raise for value."
    } else if pct >= 45.0 {
        "Solid hand - consider raising or calling."
    } else if pct >= 30.0 {
        "Speculative hand - play carefully based on position and pot odds."
    } else {
        "Weak hand - consider folding or only playing in late position."
    };

    Ok(EquityEstimate {
        equity: Equity::from_percent(pct)?,
        opponents: opponents.max(1),
        samples: 0,
        recommendation: recommendation.to_string(),
    })
}

/// Informational flag on a decision that looks questionable given the numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Folded although checking was free
    FoldWhenCheckFree,
    /// Called with equity well below what the price requires
    CallBelowBreakEven { equity: f64, required: f64 },
    /// Folded with equity well above what the price requires
    FoldAboveBreakEven { equity: f64, required: f64 },
}

/// Flags questionable choices without altering them.
pub fn advise(action: &Action, ctx: &DecisionContext) -> Vec<Advisory> {
    let mut out = Vec::new();

    if *action == Action::Fold && ctx.legal.contains(ActionType::Check) {
        out.push(Advisory::FoldWhenCheckFree);
    }

    let Some(equity) = ctx.tools.equity else {
        return out;
    };
    if ctx.to_call == 0 {
        return out;
    }
    let required = ctx
        .tools
        .pot_odds
        .unwrap_or_else(|| pot_odds(ctx.pot, ctx.to_call).break_even)
        .get();
    let equity = equity.get();

    match action {
        Action::Call if equity + ADVISORY_MARGIN < required => {
            out.push(Advisory::CallBelowBreakEven { equity, required });
        }
        Action::Fold if equity > required + ADVISORY_MARGIN => {
            out.push(Advisory::FoldAboveBreakEven { equity, required });
        }
        _ => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{parse_cards, Rank, Suit};

    #[test]
    fn fractions_reject_out_of_range() {
        assert!(Equity::new(0.0).is_ok());
        assert!(Equity::new(1.0).is_ok());
        assert!(Equity::new(1.01).is_err());
        assert!(PotOdds::new(-0.1).is_err());
        assert!(PotOdds::new(f64::NAN).is_err());
    }

    #[test]
    fn fractions_validate_on_deserialize() {
        let ok: ToolOutputs = serde_json::from_str(r#"{"equity":0.4}"#).unwrap();
        assert_eq!(ok.equity.map(Equity::get), Some(0.4));
        assert!(ok.pot_odds.is_none());
        assert!(serde_json::from_str::<ToolOutputs>(r#"{"equity":40.0}"#).is_err());
    }

    #[test]
    fn basic_pot_odds() {
        let r = pot_odds(300, 100);
        assert!((r.break_even.get() - 0.25).abs() < 1e-9);
        assert_eq!(r.ratio, "3.0:1");
    }

    #[test]
    fn zero_bet_is_free() {
        let r = pot_odds(100, 0);
        assert_eq!(r.break_even.get(), 0.0);
        assert!(r.recommendation.to_lowercase().contains("free"));
    }

    #[test]
    fn large_pot_gives_excellent_odds() {
        let r = pot_odds(1000, 100);
        assert!(r.break_even.percent() < 10.0);
        assert!(r.recommendation.to_lowercase().contains("excellent"));
    }

    #[test]
    fn overbet_gives_poor_odds() {
        let r = pot_odds(100, 200);
        assert!(r.break_even.percent() > 60.0);
        assert!(r.recommendation.to_lowercase().contains("poor"));
    }

    #[test]
    fn preflop_aces_heads_up() {
        let hole = parse_cards("AsAh").unwrap();
        let e = preflop_equity(&hole, 1).unwrap();
        assert!((e.equity.percent() - 85.0).abs() < 1e-9);
        assert!(e.recommendation.starts_with("Premium"));
    }

    #[test]
    fn preflop_equity_shrinks_with_opponents() {
        let hole = parse_cards("KsQs").unwrap();
        let hu = preflop_equity(&hole, 1).unwrap().equity.get();
        let multi = preflop_equity(&hole, 4).unwrap().equity.get();
        assert!(multi < hu);
        // 57 + 5 kicker + 3 suited + 2 connected
        assert!((hu - 0.67).abs() < 1e-9);
    }

    #[test]
    fn preflop_rejects_duplicate_cards() {
        let ace = Card::new(Rank::Ace, Suit::Spades);
        assert_eq!(
            preflop_equity(&[ace, ace], 1),
            Err(ToolError::InvalidCards("AsAs".to_string()))
        );
    }

    #[test]
    fn made_nuts_on_the_river_never_lose() {
        let hole = parse_cards("AhKh").unwrap();
        let board = parse_cards("QhJhTh2c3d").unwrap();
        let e = equity(&hole, &board, 3, 500, 1).unwrap();
        assert_eq!(e.equity.get(), 1.0);
        assert!(e.recommendation.starts_with("Very strong"));
    }

    #[test]
    fn board_changes_the_estimate() {
        let hole = parse_cards("7c2d").unwrap();
        let preflop = equity(&hole, &[], 1, 2_000, 3).unwrap();
        let trips = equity(&hole, &parse_cards("7h7sKd").unwrap(), 1, 2_000, 3).unwrap();
        assert!(preflop.equity.percent() < 45.0);
        assert!(trips.equity.percent() > 75.0);
    }

    #[test]
    fn split_pots_count_half() {
        // broadway on board, nobody can improve
        let hole = parse_cards("2c3d").unwrap();
        let board = parse_cards("AsKdQhJcTs").unwrap();
        let e = equity(&hole, &board, 1, 200, 9).unwrap();
        assert!((e.equity.get() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn simulation_is_seeded() {
        let hole = parse_cards("KsQs").unwrap();
        let board = parse_cards("Js4h2s").unwrap();
        let a = equity(&hole, &board, 2, 1_000, 11).unwrap();
        let b = equity(&hole, &board, 2, 1_000, 11).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn simulation_clamps_inputs() {
        let hole = parse_cards("9s9h").unwrap();
        let e = equity(&hole, &[], 9, 10, 0).unwrap();
        assert_eq!(e.opponents, MAX_OPPONENTS);
        assert_eq!(e.samples, MIN_SAMPLES);
        let e = equity(&hole, &[], 0, 1_000_000, 0).unwrap();
        assert_eq!(e.opponents, 1);
        assert_eq!(e.samples, MAX_SAMPLES);
    }

    #[test]
    fn simulation_rejects_bad_cards() {
        let hole = parse_cards("AsKs").unwrap();
        assert_eq!(
            equity(&hole, &parse_cards("As7d2c").unwrap(), 1, 100, 0),
            Err(ToolError::InvalidCards("AsKsAs7d2c".to_string()))
        );
        assert_eq!(
            equity(&hole, &parse_cards("7d2c").unwrap(), 1, 100, 0),
            Err(ToolError::BoardSize(2))
        );
        assert!(matches!(
            equity(&hole[..1], &[], 1, 100, 0),
            Err(ToolError::HoleCardCount { actual: 1, .. })
        ));
    }

    #[test]
    fn preflop_requires_two_cards() {
        let hole = parse_cards("As").unwrap();
        assert_eq!(
            preflop_equity(&hole, 1),
            Err(ToolError::HoleCardCount {
                expected: 2,
                actual: 1
            })
        );
    }
}
