//! Recovering a JSON document from free-form model output.
//!
//! The agent is asked for bare JSON but frequently wraps it in a markdown
//! fence anyway. Extraction tries a fixed list of [`Strategy`] values in
//! order and the first one that finds a candidate wins. Only that candidate
//! is parsed: a later strategy is never consulted because an earlier
//! candidate failed to parse.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

lazy_static! {
    static ref JSON_FENCE: Regex = Regex::new(r"(?s)```json(.*?)(?:```|\z)").unwrap();
    static ref ANY_FENCE: Regex = Regex::new(r"(?s)```(.*?)(?:```|\z)").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Interior of the first fence labelled `json`.
    JsonFence,
    /// Interior of the first fence, whatever its label.
    AnyFence,
    /// The whole text.
    Bare,
}

pub const STRATEGIES: [Strategy; 3] = [Strategy::JsonFence, Strategy::AnyFence, Strategy::Bare];

impl Strategy {
    pub fn apply<'t>(&self, text: &'t str) -> Option<&'t str> {
        match self {
            Strategy::JsonFence => fence_interior(&JSON_FENCE, text),
            Strategy::AnyFence => fence_interior(&ANY_FENCE, text),
            Strategy::Bare => Some(text),
        }
    }
}

fn fence_interior<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|interior| interior.as_str())
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Output is not valid JSON ({strategy:?} candidate): {source}")]
    Malformed {
        strategy: Strategy,
        #[source]
        source: serde_json::Error,
    },
}

/// Candidate JSON text and the strategy that selected it, trimmed.
pub fn extract_json_text(text: &str) -> (Strategy, &str) {
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy.apply(text).map(|found| (*strategy, found.trim())))
        .unwrap_or((Strategy::Bare, text.trim()))
}

pub fn parse_narrative(text: &str) -> Result<Value, ExtractError> {
    let (strategy, candidate) = extract_json_text(text);
    serde_json::from_str(candidate).map_err(|source| ExtractError::Malformed { strategy, source })
}
