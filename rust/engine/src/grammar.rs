//! Lexical grammar for spotting action phrases in free text.
//!
//! The grammar is a table of [`Rule`]s. Each rule is a case-insensitive,
//! word-bounded pattern for one verb family plus a couple of word-level
//! guards. [`Grammar::select`] runs every rule over the text and picks the
//! phrase the model most plausibly committed to:
//!
//! 1. candidates preceded by a negation in the same clause are dropped
//!    ("I will not fold", "instead of calling"), as are verbs describing
//!    what someone else does ("they will probably call", "to make them
//!    fold") and the "bet" of "3-bet";
//! 2. bet/raise used as a noun ("call the bet") and verbs followed by a
//!    disqualifying word ("check the odds", "fold equity") are dropped;
//! 3. if the text contains a decision marker ("Action:", "Final answer:",
//!    "my decision is") the first candidate after the last marker wins;
//! 4. otherwise the last candidate in the text wins. Candidates starting at
//!    the same offset go to the rule listed first.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::action::ActionType;

/// What a rule recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    AllIn,
}

impl RuleKind {
    /// The canonical action type, `None` for all-in which depends on context.
    pub fn action_type(self) -> Option<ActionType> {
        match self {
            RuleKind::Fold => Some(ActionType::Fold),
            RuleKind::Check => Some(ActionType::Check),
            RuleKind::Call => Some(ActionType::Call),
            RuleKind::Bet => Some(ActionType::Bet),
            RuleKind::Raise => Some(ActionType::Raise),
            RuleKind::AllIn => None,
        }
    }

    pub fn takes_amount(self) -> bool {
        matches!(self, RuleKind::Bet | RuleKind::Raise)
    }
}

/// One entry of the grammar table.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: &'static str,
    pub kind: RuleKind,
    pattern: Regex,
    /// Reject the match when the next word is one of these.
    rejects_next: &'static [&'static str],
    /// Reject the match when preceded by a determiner ("the bet").
    noun_guard: bool,
}

impl Rule {
    fn new(
        name: &'static str,
        kind: RuleKind,
        pattern: &str,
        rejects_next: &'static [&'static str],
        noun_guard: bool,
    ) -> Self {
        let pattern =
            Regex::new(&format!(r"(?i)\b(?:{pattern})\b")).expect("valid grammar pattern");
        Self {
            name,
            kind,
            pattern,
            rejects_next,
            noun_guard,
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// A rule match that survived the guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'t> {
    /// Index of the rule in the table
    pub rule: usize,
    pub kind: RuleKind,
    pub start: usize,
    pub end: usize,
    pub text: &'t str,
}

/// The phrase chosen by [`Grammar::select`] plus where the next candidate
/// begins, which bounds the amount lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'t> {
    pub candidate: Candidate<'t>,
    pub next_start: Option<usize>,
}

const NEGATIONS: &[&str] = &[
    "not", "don't", "dont", "won't", "wont", "never", "shouldn't", "shouldnt", "can't",
    "cant", "cannot", "wouldn't", "wouldnt", "isn't", "instead", "than", "avoid",
];

const DETERMINERS: &[&str] = &[
    "the", "a", "an", "his", "her", "their", "your", "my", "its", "this", "that", "any",
    "villain's", "opponent's", "big", "small", "current", "previous",
];

/// Subjects that make a verb describe someone else's action.
const OTHERS: &[&str] = &[
    "they", "they'll", "they're", "they'd", "them", "their", "he", "he'll", "he's", "him",
    "she", "she'll", "she's", "villain", "villains", "villain's", "opponent", "opponents",
    "opponent's", "hands", "others", "everyone", "someone", "anyone", "nobody",
];

/// Subjects that make a verb the speaker's own.
const SELF: &[&str] = &[
    "i", "i'll", "i'm", "i've", "i'd", "me", "we", "we'll", "we're", "let's", "hero",
];

/// Words that turn a following verb into the goal of a play or a guess
/// about the future ("to make them fold", "hoping for a call").
const PURPOSE: &[&str] = &[
    "make", "makes", "making", "expect", "expects", "expecting", "hope", "hopes", "hoping",
    "induce", "inducing", "may", "might",
];

/// How many words back from a candidate a negation or purpose word still applies.
const NEGATION_REACH: usize = 3;

static STANDARD: Lazy<Grammar> = Lazy::new(Grammar::build_standard);

/// Ordered rule table plus the decision-marker pattern.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: Vec<Rule>,
    marker: Regex,
}

impl Grammar {
    /// The shared built-in grammar.
    pub fn standard() -> &'static Grammar {
        &STANDARD
    }

    fn build_standard() -> Grammar {
        let rules = vec![
            Rule::new(
                "all_in",
                RuleKind::AllIn,
                r"all[\s-]?in|shove|shoving|jam|jamming",
                &[],
                false,
            ),
            Rule::new(
                "raise",
                RuleKind::Raise,
                r"re-?raise|re-?raising|raise|raising|[345]-?bet(?:ting)?",
                &["size", "sizes", "sizing", "amount"],
                true,
            ),
            Rule::new(
                "bet",
                RuleKind::Bet,
                r"bet|betting|lead\s+out(?:\s+for)?",
                &["size", "sizes", "sizing", "amount"],
                true,
            ),
            Rule::new(
                "call",
                RuleKind::Call,
                r"flat[\s-]?call|call|calling",
                &["station"],
                false,
            ),
            Rule::new(
                "check",
                RuleKind::Check,
                r"check|checking",
                &[
                    "the", "my", "if", "whether", "what", "how", "pot", "odds", "equity", "for",
                ],
                false,
            ),
            Rule::new("fold", RuleKind::Fold, r"fold|folding|muck", &["equity"], false),
        ];

        let marker = Regex::new(
            r"(?i)\b(?:(?:final\s+)?(?:answer|decision|action)\s*[:=]|my\s+(?:final\s+)?(?:action|decision|move)\s+(?:is|will\s+be)\b)",
        )
        .expect("valid marker pattern");

        Grammar { rules, marker }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// All guarded matches, ordered by start offset then rule priority.
    pub fn candidates<'t>(&self, text: &'t str) -> Vec<Candidate<'t>> {
        let mut out = Vec::new();
        for (idx, rule) in self.rules.iter().enumerate() {
            for m in rule.pattern.find_iter(text) {
                let before = &text[..m.start()];
                let after = &text[m.end()..];
                if negated(before) || describes_others(before) || glued_to_number(before) {
                    continue;
                }
                let noun = rule.noun_guard
                    && previous_word(before).is_some_and(|w| DETERMINERS.contains(&w.as_str()));
                if noun {
                    continue;
                }
                let rejected =
                    next_word(after).is_some_and(|w| rule.rejects_next.contains(&w.as_str()));
                if rejected {
                    continue;
                }
                out.push(Candidate {
                    rule: idx,
                    kind: rule.kind,
                    start: m.start(),
                    end: m.end(),
                    text: m.as_str(),
                });
            }
        }
        out.sort_by_key(|c| (c.start, c.rule));
        out
    }

    /// Picks the committed phrase, see the module docs for the order of rules.
    pub fn select<'t>(&self, text: &'t str) -> Option<Selection<'t>> {
        let candidates = self.candidates(text);
        if candidates.is_empty() {
            return None;
        }

        let marker_end = self.marker.find_iter(text).last().map(|m| m.end());
        let chosen = marker_end
            .and_then(|end| candidates.iter().position(|c| c.start >= end))
            .unwrap_or_else(|| last_by_offset(&candidates));

        let candidate = candidates[chosen];
        let next_start = candidates
            .iter()
            .map(|c| c.start)
            .find(|&s| s >= candidate.end);
        Some(Selection {
            candidate,
            next_start,
        })
    }
}

/// Index of the latest-starting candidate, earliest rule on ties.
fn last_by_offset(candidates: &[Candidate<'_>]) -> usize {
    let last_start = candidates[candidates.len() - 1].start;
    candidates
        .iter()
        .position(|c| c.start == last_start)
        .unwrap_or(candidates.len() - 1)
}

fn clause_tail(before: &str) -> &str {
    match before.rfind(['.', ',', ';', ':', '!', '?', '\n']) {
        Some(i) => &before[i + 1..],
        None => before,
    }
}

fn normalize_word(w: &str) -> String {
    w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
        .replace('\u{2019}', "'")
        .to_lowercase()
}

fn negated(before: &str) -> bool {
    clause_tail(before)
        .split_whitespace()
        .rev()
        .take(NEGATION_REACH)
        .any(|w| NEGATIONS.contains(&normalize_word(w).as_str()))
}

/// A candidate is someone else's action when a third-person subject precedes
/// it in the clause with no first-person subject in between, or when a
/// purpose word sits just before it.
fn describes_others(before: &str) -> bool {
    let tail = clause_tail(before);
    let purpose = tail
        .split_whitespace()
        .rev()
        .take(NEGATION_REACH)
        .any(|w| PURPOSE.contains(&normalize_word(w).as_str()));
    if purpose {
        return true;
    }
    for word in tail.split_whitespace().rev() {
        let word = normalize_word(word);
        if SELF.contains(&word.as_str()) {
            return false;
        }
        if OTHERS.contains(&word.as_str()) {
            return true;
        }
    }
    false
}

/// The "bet" in "3-bet" belongs to the number in front of it.
fn glued_to_number(before: &str) -> bool {
    let mut rev = before.chars().rev();
    rev.next() == Some('-') && rev.next().is_some_and(|c| c.is_ascii_digit())
}

fn previous_word(before: &str) -> Option<String> {
    clause_tail(before)
        .split_whitespace()
        .next_back()
        .map(normalize_word)
}

fn next_word(after: &str) -> Option<String> {
    let trimmed = after.trim_start();
    if trimmed.starts_with([',', '.', ';', ':', '!', '?', '\n']) {
        return None;
    }
    trimmed.split_whitespace().next().map(normalize_word)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(text: &str) -> Option<(RuleKind, &str)> {
        Grammar::standard()
            .select(text)
            .map(|s| (s.candidate.kind, s.candidate.text))
    }

    #[test]
    fn every_rule_compiles_and_has_a_unique_name() {
        let g = Grammar::standard();
        let mut names: Vec<_> = g.rules().iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), g.rules().len());
    }

    #[test]
    fn last_phrase_wins_without_marker() {
        let got = selected("I think calling is weak... actually I'll raise to 300");
        assert_eq!(got.map(|g| g.0), Some(RuleKind::Raise));
    }

    #[test]
    fn marker_overrides_trailing_chatter() {
        let got = selected("Action: RAISE 500. If they call, I'm happy.");
        assert_eq!(got.map(|g| g.0), Some(RuleKind::Raise));
    }

    #[test]
    fn last_marker_is_used() {
        let got = selected("Decision: call\nOn reflection...\nFinal answer: fold");
        assert_eq!(got.map(|g| g.0), Some(RuleKind::Fold));
    }

    #[test]
    fn marker_without_following_action_falls_back_to_last() {
        let got = selected("I call here. Decision: pending");
        assert_eq!(got.map(|g| g.0), Some(RuleKind::Call));
    }

    #[test]
    fn negated_verbs_are_ignored() {
        assert_eq!(
            selected("I raise to 200, I will not fold").map(|g| g.0),
            Some(RuleKind::Raise)
        );
        assert_eq!(
            selected("I'll raise to 400 instead of calling").map(|g| g.0),
            Some(RuleKind::Raise)
        );
    }

    #[test]
    fn negation_does_not_cross_clauses() {
        assert_eq!(selected("No, I fold.").map(|g| g.0), Some(RuleKind::Fold));
        assert_eq!(
            selected("Checking is not an option, I fold").map(|g| g.0),
            Some(RuleKind::Fold)
        );
    }

    #[test]
    fn nouns_are_not_actions() {
        assert_eq!(selected("I CALL the bet.").map(|g| g.0), Some(RuleKind::Call));
        assert_eq!(
            selected("Facing a raise, I fold").map(|g| g.0),
            Some(RuleKind::Fold)
        );
        assert_eq!(selected("the bet sizing looks off"), None);
    }

    #[test]
    fn check_as_lookup_is_not_an_action() {
        assert_eq!(
            selected("I call. Let me check the pot odds first though").map(|g| g.0),
            Some(RuleKind::Call)
        );
    }

    #[test]
    fn ties_at_same_offset_prefer_earlier_rule() {
        let cands = Grammar::standard().candidates("re-raise to 90");
        assert!(cands.iter().all(|c| c.kind == RuleKind::Raise));
        let sel = Grammar::standard().select("re-raise to 90").unwrap();
        assert_eq!(sel.candidate.kind, RuleKind::Raise);
    }

    #[test]
    fn next_start_bounds_lookahead() {
        let sel = Grammar::standard().select("Action: bet, or call 50").unwrap();
        assert_eq!(sel.candidate.kind, RuleKind::Bet);
        assert_eq!(sel.next_start, Some("Action: bet, or ".len()));
    }

    #[test]
    fn opponents_actions_are_not_decisions() {
        for (text, kind) in [
            ("I'll raise to 300 to make them fold.", RuleKind::Raise),
            ("Raise to 300. They will probably call.", RuleKind::Raise),
            ("I bet 120 and expect weaker hands to fold", RuleKind::Bet),
            ("I call here; villain may check the river or bet.", RuleKind::Call),
            ("I bet 80 hoping for a call", RuleKind::Bet),
        ] {
            assert_eq!(selected(text).map(|g| g.0), Some(kind), "{text}");
        }
    }

    #[test]
    fn first_person_after_opponent_keeps_the_verb() {
        assert_eq!(
            selected("If villain bets I will call").map(|g| g.0),
            Some(RuleKind::Call)
        );
    }

    #[test]
    fn three_bet_is_a_raise() {
        let sel = Grammar::standard().select("raise 3-bet to 450").unwrap();
        assert_eq!(sel.candidate.kind, RuleKind::Raise);
        assert_eq!(sel.candidate.text, "3-bet");
        assert!(Grammar::standard()
            .candidates("I 3bet")
            .iter()
            .all(|c| c.kind == RuleKind::Raise));
    }

    #[test]
    fn nothing_recognised() {
        assert_eq!(selected("hmm not sure"), None);
        assert_eq!(selected(""), None);
        assert_eq!(selected("recall the callback"), None);
    }
}
