use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionType};
use crate::errors::ParseError;
use crate::grammar::{Grammar, RuleKind, Selection};

/// What the model asked for. All-in is kept apart because its size depends
/// on the legal ranges, which the parser does not see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Act(Action),
    AllIn,
}

/// Outcome of parsing one model reply. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    raw: String,
    intent: Option<Intent>,
    success: bool,
    error: Option<ParseError>,
    used_fallback: bool,
    matched: Option<String>,
}

impl ParseResult {
    fn parsed(raw: &str, intent: Intent, matched: &str) -> Self {
        Self {
            raw: raw.to_string(),
            intent: Some(intent),
            success: true,
            error: None,
            used_fallback: false,
            matched: Some(matched.to_string()),
        }
    }

    fn failed(raw: &str, error: ParseError, matched: Option<&str>) -> Self {
        Self {
            raw: raw.to_string(),
            intent: None,
            success: false,
            error: Some(error),
            used_fallback: false,
            matched: matched.map(str::to_string),
        }
    }

    /// The raw reply text; empty when the model produced nothing.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn intent(&self) -> Option<Intent> {
        self.intent
    }

    /// The concrete action, if one was read. All-in intents return `None`.
    pub fn action(&self) -> Option<Action> {
        match self.intent? {
            Intent::Act(a) => Some(a),
            Intent::AllIn => None,
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    /// The phrase the decision was read from.
    pub fn matched(&self) -> Option<&str> {
        self.matched.as_deref()
    }

    /// Same result, marked as superseded by the fallback action.
    pub fn into_fallback(self) -> Self {
        Self {
            used_fallback: true,
            ..self
        }
    }
}

fn default_lookahead() -> usize {
    32
}

fn default_excerpt_len() -> usize {
    200
}

/// Parser tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Bytes after a bet/raise verb searched for its amount
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,
    /// Bytes of an unparseable reply kept in log events
    #[serde(default = "default_excerpt_len")]
    pub excerpt_len: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            lookahead: default_lookahead(),
            excerpt_len: default_excerpt_len(),
        }
    }
}

static AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)([-\u{2212}])?\$?(\d{1,3}(?:,\d{3})+|\d+)(?:\.(\d+))?\s*(k\b|%|x\b|bbs?\b|big\s+blinds?\b|/\s*\d+)?",
    )
    .expect("valid amount pattern")
});

static NUMBER_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|fifteen|twenty|thirty|forty|fifty|sixty|seventy|eighty|ninety|hundred|thousand|half|quarter)\b",
    )
    .expect("valid number-word pattern")
});

/// Turns free-form model replies into [`ParseResult`]s.
///
/// Pure: the same text always yields the same result.
#[derive(Debug, Clone, Copy)]
pub struct ActionParser {
    grammar: &'static Grammar,
    config: ParserConfig,
}

impl Default for ActionParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl ActionParser {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            grammar: Grammar::standard(),
            config,
        }
    }

    pub fn config(&self) -> ParserConfig {
        self.config
    }

    /// Parses a reply that may be missing altogether (timeout, transport error).
    pub fn parse_reply(&self, reply: Option<&str>) -> ParseResult {
        match reply {
            Some(text) => self.parse(text),
            None => ParseResult::failed("", ParseError::NoResponse, None),
        }
    }

    /// Extracts the committed action from `text`.
    ///
    /// # Examples
    ///
    /// ```
    /// use arena_engine::action::Action;
    /// use arena_engine::parser::ActionParser;
    ///
    /// let parser = ActionParser::default();
    /// let result = parser.parse("Pot odds look fine... I'll raise to 1,200.");
    /// assert!(result.success());
    /// assert_eq!(result.action(), Some(Action::Raise(1200)));
    /// ```
    pub fn parse(&self, text: &str) -> ParseResult {
        if text.trim().is_empty() {
            return ParseResult::failed(text, ParseError::EmptyResponse, None);
        }

        let Some(selection) = self.grammar.select(text) else {
            tracing::debug!(
                excerpt = %excerpt(text, self.config.excerpt_len),
                "no action verb in reply"
            );
            return ParseResult::failed(text, ParseError::NoActionVerb, None);
        };

        let cand = selection.candidate;
        let (intent, end) = match cand.kind {
            RuleKind::Fold => (Intent::Act(Action::Fold), cand.end),
            RuleKind::Check => (Intent::Act(Action::Check), cand.end),
            RuleKind::Call => (Intent::Act(Action::Call), cand.end),
            RuleKind::AllIn => (Intent::AllIn, cand.end),
            RuleKind::Bet | RuleKind::Raise => {
                let kind = if cand.kind == RuleKind::Bet {
                    ActionType::Bet
                } else {
                    ActionType::Raise
                };
                let window = self.amount_window(text, &selection);
                match extract_amount(window, kind) {
                    Ok((amount, consumed)) => {
                        let action = match kind {
                            ActionType::Bet => Action::Bet(amount),
                            _ => Action::Raise(amount),
                        };
                        (Intent::Act(action), cand.end + consumed)
                    }
                    Err(err) => {
                        tracing::debug!(verb = cand.text, window, error = %err, "bad amount");
                        return ParseResult::failed(text, err, Some(cand.text));
                    }
                }
            }
        };

        ParseResult::parsed(text, intent, text[cand.start..end].trim_end())
    }

    /// Text after the verb where its amount may appear: bounded by the
    /// lookahead, the next action phrase, and the end of the line.
    fn amount_window<'t>(&self, text: &'t str, selection: &Selection<'_>) -> &'t str {
        let start = selection.candidate.end;
        let mut end = floor_char_boundary(text, start.saturating_add(self.config.lookahead));
        if let Some(next) = selection.next_start {
            end = end.min(next);
        }
        let window = &text[start..end.max(start)];
        match window.find('\n') {
            Some(i) => &window[..i],
            None => window,
        }
    }
}

/// Parses with the default configuration.
pub fn parse(text: &str) -> ParseResult {
    ActionParser::default().parse(text)
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn excerpt(text: &str, len: usize) -> &str {
    &text[..floor_char_boundary(text, len)]
}

/// Reads the first amount token in `window`, returning the chip count and
/// how many bytes of the window the token spans.
///
/// Digits glued to letters belong to another word (`K9`, `A5s`, `3-bet`)
/// and are skipped.
fn extract_amount(window: &str, action: ActionType) -> Result<(u32, usize), ParseError> {
    let Some(caps) = AMOUNT
        .captures_iter(window)
        .find(|caps| !glued_to_word(window, caps))
    else {
        return Err(match NUMBER_WORD.find(window) {
            Some(m) => ParseError::AmountInWords {
                action,
                raw: m.as_str().to_string(),
            },
            None => ParseError::MissingAmount { action },
        });
    };
    let whole = caps.get(0).map_or(0..0, |m| m.range());
    let raw = window[whole.clone()].trim_end().to_string();

    if caps.get(1).is_some() {
        return Err(ParseError::NegativeAmount { action, raw });
    }
    let rest = &window[number_end(&caps)..];
    let mut rest_chars = rest.chars();
    if rest_chars.next() == Some(',') && rest_chars.next().is_some_and(|c| c.is_ascii_digit()) {
        let token_end = rest
            .find(|c: char| c.is_whitespace())
            .unwrap_or(rest.len());
        let raw = format!("{}{}", raw.trim_end(), &rest[..token_end]);
        return Err(ParseError::MalformedAmount {
            action,
            raw: raw.trim_end_matches(['.', ',', '!', '?', ';', ':', ')']).to_string(),
        });
    }
    let thousands = match caps.get(4).map(|m| m.as_str().to_ascii_lowercase()) {
        None => false,
        Some(suffix) if suffix == "k" => true,
        Some(_) => return Err(ParseError::RelativeAmount { action, raw }),
    };

    match chips(&caps, thousands) {
        Some(Ok(0)) => Err(ParseError::ZeroAmount { action }),
        Some(Ok(amount)) => Ok((amount, whole.end)),
        Some(Err(())) => Err(ParseError::FractionalAmount { action, raw }),
        None => Err(ParseError::AmountOverflow { action, raw }),
    }
}

/// End of the digits (and size suffix, if any) of an amount match.
fn number_end(caps: &Captures<'_>) -> usize {
    caps.get(4)
        .or_else(|| caps.get(3))
        .or_else(|| caps.get(2))
        .map_or(0, |m| m.end())
}

fn glued_to_word(window: &str, caps: &Captures<'_>) -> bool {
    let start = caps.get(0).map_or(0, |m| m.start());
    if window[..start]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_alphanumeric() || c == '_')
    {
        return true;
    }
    let mut after = window[number_end(caps)..].chars();
    match after.next() {
        Some(c) if c.is_alphabetic() || c == '_' => true,
        Some('-') => after.next().is_some_and(char::is_alphabetic),
        _ => false,
    }
}

/// Whole-chip value of the captured number; `None` on overflow,
/// `Some(Err(()))` when a fractional chip remains.
fn chips(caps: &Captures<'_>, thousands: bool) -> Option<Result<u32, ()>> {
    let int_part: String = caps.get(2)?.as_str().chars().filter(|c| *c != ',').collect();
    let frac_part = caps.get(3).map_or("", |m| m.as_str());
    if int_part.len() + frac_part.len() > 30 {
        return None;
    }
    let mantissa: u128 = format!("{int_part}{frac_part}").parse().ok()?;
    let scale = 10u128.checked_pow(u32::try_from(frac_part.len()).ok()?)?;
    let total = mantissa.checked_mul(if thousands { 1_000 } else { 1 })?;
    if total % scale != 0 {
        return Some(Err(()));
    }
    u32::try_from(total / scale).ok().map(Ok)
}
