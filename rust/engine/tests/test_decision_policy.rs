use arena_engine::action::Action;
use arena_engine::cards::{Card, Rank, Suit};
use arena_engine::context::{AmountRange, DecisionContext, LegalAction, LegalActions, Street};
use arena_engine::decide;
use arena_engine::outcome::{FallbackReason, Resolution};
use arena_engine::tools::{Advisory, Equity, PotOdds, ToolOutputs};
use rstest::rstest;

const REPLIES: &[&str] = &[
    "",
    "   ",
    "hmm not sure",
    "I fold",
    "check",
    "I call",
    "bet 50",
    "bet 0",
    "bet 999999",
    "raise to 1",
    "RAISE 1000",
    "raise to -5",
    "raise to 12.5",
    "raise to one hundred",
    "ALL IN",
    "Final answer: raise to 99999999999999",
    "I won't fold. I won't call. Decision:",
    "♠♥♦♣ 🂡",
];

fn contexts() -> Vec<DecisionContext> {
    vec![
        DecisionContext::derived(Street::Preflop, 1_000, 0, 20, 30),
        DecisionContext::derived(Street::Flop, 500, 20, 20, 60),
        DecisionContext::derived(Street::Turn, 60, 100, 100, 300),
        DecisionContext::derived(Street::River, 130, 100, 100, 400),
        DecisionContext::derived(Street::River, 0, 0, 20, 400),
        DecisionContext::new(
            Street::Flop,
            LegalActions::new(vec![
                LegalAction::Call { amount: 10 },
                LegalAction::Raise(AmountRange::new(30, 90)),
            ]),
            10,
            40,
            90,
        ),
    ]
}

#[test]
fn every_reply_yields_a_legal_action() {
    for ctx in contexts() {
        assert!(ctx.validate().is_ok());
        for reply in REPLIES.iter().map(|r| Some(*r)).chain([None]) {
            let outcome = decide(reply, &ctx);
            assert!(
                ctx.legal.permits(&outcome.action),
                "{reply:?} -> {} not legal in {:?}",
                outcome.action,
                ctx.legal
            );
            assert_eq!(outcome.used_fallback(), outcome.parse.used_fallback());
        }
    }
}

#[test]
fn same_input_same_outcome() {
    let ctx = DecisionContext::derived(Street::Flop, 500, 20, 20, 60);
    for reply in REPLIES {
        assert_eq!(decide(Some(reply), &ctx), decide(Some(reply), &ctx));
    }
}

#[rstest]
#[case::unopened(DecisionContext::derived(Street::Flop, 500, 0, 20, 60), Action::Check)]
#[case::facing_bet(DecisionContext::derived(Street::Flop, 500, 20, 20, 60), Action::Fold)]
fn fallback_checks_when_free_else_folds(#[case] ctx: DecisionContext, #[case] expected: Action) {
    let outcome = decide(Some("hmm not sure"), &ctx);
    assert_eq!(outcome.action, expected);
    assert!(outcome.used_fallback());
    assert!(!outcome.parse.success());
}

#[rstest]
#[case::over(1_000, 500)]
#[case::under(25, 40)]
#[case::at_min(40, 40)]
#[case::at_max(500, 500)]
fn raise_amounts_land_in_range(#[case] requested: u32, #[case] expected: u32) {
    let ctx = DecisionContext::derived(Street::Turn, 500, 20, 20, 60);
    let outcome = decide(Some(&format!("raise to {requested}")), &ctx);
    assert_eq!(outcome.action, Action::Raise(expected));
    assert!(!outcome.used_fallback());
    assert_eq!(outcome.was_clamped(), requested != expected);
}

#[test]
fn clamp_keeps_both_values() {
    let ctx = DecisionContext::derived(Street::Turn, 500, 20, 20, 60);
    let outcome = decide(Some("raise 1000"), &ctx);
    assert_eq!(
        outcome.resolution,
        Resolution::Clamped {
            requested: 1_000,
            clamped: 500,
            bounds: AmountRange::new(40, 500),
        }
    );
}

#[test]
fn parse_success_and_fallback_are_independent() {
    let ctx = DecisionContext::derived(Street::Flop, 500, 20, 20, 60);
    let outcome = decide(Some("I check"), &ctx);
    assert!(outcome.parse.success());
    assert!(outcome.used_fallback());
    assert!(matches!(
        outcome.fallback_reason(),
        Some(FallbackReason::Illegal { .. })
    ));
}

#[test]
fn tools_only_produce_advisories() {
    let tools = ToolOutputs {
        equity: Some(Equity::new(0.10).unwrap()),
        pot_odds: Some(PotOdds::new(0.25).unwrap()),
    };
    let ctx = DecisionContext::derived(Street::River, 500, 100, 100, 300)
        .with_tools(tools)
        .with_hole_cards([
            Card::new(Rank::Seven, Suit::Clubs),
            Card::new(Rank::Two, Suit::Diamonds),
        ]);
    let outcome = decide(Some("I call"), &ctx);
    assert_eq!(outcome.action, Action::Call);
    assert!(!outcome.used_fallback());
    assert!(matches!(
        outcome.advisories.as_slice(),
        [Advisory::CallBelowBreakEven { .. }]
    ));
}

#[test]
fn folding_when_check_is_free_is_flagged() {
    let ctx = DecisionContext::derived(Street::Flop, 500, 0, 20, 60);
    let outcome = decide(Some("fold"), &ctx);
    assert_eq!(outcome.action, Action::Fold);
    assert_eq!(outcome.advisories, vec![Advisory::FoldWhenCheckFree]);
}
