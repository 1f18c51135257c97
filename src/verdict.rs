//! Verdict types and the extraction pipeline.
//!
//! The judge model is asked for strict JSON but routinely returns fenced
//! JSON, JSON buried in prose, objects with trailing commas, or no JSON at
//! all. `extract` turns any of those into a structurally valid [`Verdict`]:
//!
//! ```text
//! raw → strip fences → balanced {…} scan → strict parse ─┐
//!                            │                           ├─ normalize → Verdict
//!                            └─ trailing-comma repair ───┘
//!                                       │
//!                                       └─ regex heuristic (degraded) → Verdict
//! ```
//!
//! Every path returns a verdict with scores in range and a valid winner;
//! the [`Provenance`] tag tells callers how much to trust it.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::error;

use crate::normalize::strip_fences;

/// Reasoning text attached to heuristically reconstructed verdicts.
pub const HEURISTIC_REASONING: &str =
    "Model did not return strict JSON; applied heuristic parse to extract scores and winner.";

/// Which side the judge declared as winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Emotional,
    Logical,
    Tie,
}

impl Winner {
    /// Derive a winner purely from the two overall scores.
    pub fn from_scores(emotional: u8, logical: u8) -> Self {
        if emotional > logical {
            Self::Emotional
        } else if logical > emotional {
            Self::Logical
        } else {
            Self::Tie
        }
    }
}

impl std::fmt::Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Emotional => write!(f, "emotional"),
            Self::Logical => write!(f, "logical"),
            Self::Tie => write!(f, "tie"),
        }
    }
}

/// Rubric component scores, each in [0, 20].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaScores {
    pub relevance: u8,
    pub coherence: u8,
    pub evidence: u8,
    pub persuasiveness: u8,
    pub rebuttal: u8,
}

impl CriteriaScores {
    /// All-zero scores, used for placeholders.
    pub fn zero() -> Self {
        Self {
            relevance: 0,
            coherence: 0,
            evidence: 0,
            persuasiveness: 0,
            rebuttal: 0,
        }
    }

    /// Neutral midpoint scores, used by the heuristic fallback.
    pub fn neutral() -> Self {
        Self {
            relevance: 10,
            coherence: 10,
            evidence: 10,
            persuasiveness: 10,
            rebuttal: 10,
        }
    }
}

/// Judge verdict with overall scores and rubric details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Emotional lawyer's total score in [0, 100].
    pub emotional_score: u8,
    /// Logical lawyer's total score in [0, 100].
    pub logical_score: u8,
    pub winner: Winner,
    /// Judge reasoning text (soft target 300-400 words).
    pub reasoning: String,
    pub criteria_scores: CriteriaScores,
}

impl Verdict {
    /// Placeholder verdict stored while a debate is still running.
    pub fn placeholder() -> Self {
        Self {
            emotional_score: 0,
            logical_score: 0,
            winner: Winner::Tie,
            reasoning: "Pending: debate is still in progress; a detailed verdict will appear when all rounds finish.".to_string(),
            criteria_scores: CriteriaScores::zero(),
        }
    }
}

/// How a verdict was obtained from raw judge output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// The candidate object parsed as-is.
    CleanParse,
    /// Parsed only after trailing-comma repair.
    Repaired,
    /// Reconstructed from regex scans; degraded confidence.
    Heuristic,
}

impl Provenance {
    pub fn is_heuristic(self) -> bool {
        matches!(self, Self::Heuristic)
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CleanParse => write!(f, "clean_parse"),
            Self::Repaired => write!(f, "repaired"),
            Self::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// A verdict together with its extraction provenance.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub verdict: Verdict,
    pub provenance: Provenance,
    /// Whether both overall scores were genuine JSON integers in the
    /// decoded object (not coerced, defaulted, or regex-recovered).
    /// Gates adoption of a repaired verdict over an earlier one.
    pub integer_scores: bool,
}

/// Extract a verdict from raw judge output. Total: never fails, always
/// returns in-range scores and a valid winner.
pub fn extract(raw: &str) -> Extraction {
    let cleaned = strip_fences(raw);
    let candidate = extract_first_object(&cleaned).unwrap_or(&cleaned);

    match parse_object(candidate) {
        Some((map, provenance)) => Extraction {
            integer_scores: is_integer(map.get("emotional_score"))
                && is_integer(map.get("logical_score")),
            verdict: normalize_object(&map),
            provenance,
        },
        None => {
            error!("verdict JSON parse failed; applying heuristic extraction");
            Extraction {
                verdict: heuristic(&cleaned),
                provenance: Provenance::Heuristic,
                integer_scores: false,
            }
        }
    }
}

fn is_integer(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Number(n)) if n.as_i64().is_some() || n.as_u64().is_some())
}

/// Find the first balanced `{…}` substring, skipping braces inside string
/// literals (quote and escape state tracked character by character).
fn extract_first_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_str = false;
    let mut esc = false;
    for (offset, ch) in s[start..].char_indices() {
        if in_str {
            if esc {
                esc = false;
            } else if ch == '\\' {
                esc = true;
            } else if ch == '"' {
                in_str = false;
            }
            continue;
        }
        match ch {
            '"' => in_str = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strict parse, then one reparse after removing trailing commas before a
/// closing brace or bracket.
fn parse_object(candidate: &str) -> Option<(Map<String, Value>, Provenance)> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(candidate) {
        return Some((map, Provenance::CleanParse));
    }
    let repaired = trailing_comma_re().replace_all(candidate, "$1");
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&repaired) {
        return Some((map, Provenance::Repaired));
    }
    None
}

/// Coerce a JSON value into an integer score clamped to [0, max].
/// Accepts integers, floats (rounded), and numeric strings.
fn clamp_score(value: Option<&Value>, max: i64) -> u8 {
    let n = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    };
    n.clamp(0, max) as u8
}

/// Normalize a parsed JSON object into a typed verdict.
///
/// Winner reconciliation: a declared winner that is one of the three valid
/// tokens is trusted even when the scores disagree; an invalid or missing
/// winner is recomputed from the clamped scores.
fn normalize_object(map: &Map<String, Value>) -> Verdict {
    let emotional_score = clamp_score(map.get("emotional_score"), 100);
    let logical_score = clamp_score(map.get("logical_score"), 100);

    let winner = match map.get("winner").and_then(Value::as_str) {
        Some(token) => match token.trim().to_ascii_lowercase().as_str() {
            "emotional" => Winner::Emotional,
            "logical" => Winner::Logical,
            "tie" => Winner::Tie,
            _ => Winner::from_scores(emotional_score, logical_score),
        },
        None => Winner::from_scores(emotional_score, logical_score),
    };

    let reasoning = match map.get("reasoning") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    let criteria = map.get("criteria_scores");
    let sub = |key: &str| clamp_score(criteria.and_then(|c| c.get(key)), 20);
    let criteria_scores = CriteriaScores {
        relevance: sub("relevance"),
        coherence: sub("coherence"),
        evidence: sub("evidence"),
        persuasiveness: sub("persuasiveness"),
        rebuttal: sub("rebuttal"),
    };

    Verdict {
        emotional_score,
        logical_score,
        winner,
        reasoning,
        criteria_scores,
    }
}

fn emotional_score_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)emotional[_\s-]*score\D{0,10}(\d{1,3})").expect("valid regex")
    })
}

fn logical_score_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)logical[_\s-]*score\D{0,10}(\d{1,3})").expect("valid regex")
    })
}

fn winner_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)winner\D{0,10}(emotional|logical|tie)").expect("valid regex"))
}

fn trailing_comma_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*([}\]])").expect("valid regex"))
}

fn capture_int(re: &Regex, s: &str) -> Option<i64> {
    re.captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

/// Last-resort reconstruction from free text: scan for the two scores
/// (default 50/50), derive the winner from them, and fall back to a literal
/// winner-token scan only on a score tie.
fn heuristic(cleaned: &str) -> Verdict {
    let emotional_score = capture_int(emotional_score_re(), cleaned)
        .unwrap_or(50)
        .clamp(0, 100) as u8;
    let logical_score = capture_int(logical_score_re(), cleaned)
        .unwrap_or(50)
        .clamp(0, 100) as u8;

    let winner = if emotional_score == logical_score {
        winner_token_re()
            .captures(cleaned)
            .and_then(|c| c.get(1))
            .map(|m| match m.as_str().to_ascii_lowercase().as_str() {
                "emotional" => Winner::Emotional,
                "logical" => Winner::Logical,
                _ => Winner::Tie,
            })
            .unwrap_or(Winner::Tie)
    } else {
        Winner::from_scores(emotional_score, logical_score)
    };

    Verdict {
        emotional_score,
        logical_score,
        winner,
        reasoning: HEURISTIC_REASONING.to_string(),
        criteria_scores: CriteriaScores::neutral(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_json(emotional: i64, logical: i64, winner: &str) -> String {
        format!(
            r#"{{"emotional_score": {}, "logical_score": {}, "winner": "{}",
                "reasoning": "A neutral analysis of both sides, well over thirty characters long.",
                "criteria_scores": {{"relevance": 15, "coherence": 14, "evidence": 13,
                                     "persuasiveness": 12, "rebuttal": 11}}}}"#,
            emotional, logical, winner
        )
    }

    fn assert_in_range(v: &Verdict) {
        assert!(v.emotional_score <= 100);
        assert!(v.logical_score <= 100);
        for s in [
            v.criteria_scores.relevance,
            v.criteria_scores.coherence,
            v.criteria_scores.evidence,
            v.criteria_scores.persuasiveness,
            v.criteria_scores.rebuttal,
        ] {
            assert!(s <= 20);
        }
    }

    #[test]
    fn test_clean_parse() {
        let e = extract(&valid_json(65, 58, "emotional"));
        assert_eq!(e.provenance, Provenance::CleanParse);
        assert_eq!(e.verdict.emotional_score, 65);
        assert_eq!(e.verdict.logical_score, 58);
        assert_eq!(e.verdict.winner, Winner::Emotional);
        assert_eq!(e.verdict.criteria_scores.relevance, 15);
    }

    #[test]
    fn test_fenced_json_with_surrounding_prose() {
        let raw = format!("Here is my verdict:\n{}\nThank you.", valid_json(40, 70, "logical"));
        let e = extract(&raw);
        assert_eq!(e.provenance, Provenance::CleanParse);
        assert_eq!(e.verdict.winner, Winner::Logical);
    }

    #[test]
    fn test_fence_wrapper_stripped() {
        let raw = format!("```json\n{}\n```", valid_json(70, 70, "tie"));
        let e = extract(&raw);
        assert_eq!(e.provenance, Provenance::CleanParse);
        assert_eq!(e.verdict.winner, Winner::Tie);
    }

    #[test]
    fn test_missing_winner_derived_from_scores() {
        let raw = r#"{"emotional_score": 65, "logical_score": 58,
            "reasoning": "A reasonable verdict explanation of sufficient length here.",
            "criteria_scores": {"relevance": 10, "coherence": 10, "evidence": 10,
                                "persuasiveness": 10, "rebuttal": 10}}"#;
        let e = extract(raw);
        assert_eq!(e.verdict.winner, Winner::Emotional);
    }

    #[test]
    fn test_invalid_winner_token_overridden() {
        let raw = valid_json(80, 20, "draw");
        let e = extract(&raw);
        assert_eq!(e.verdict.winner, Winner::Emotional);
    }

    #[test]
    fn test_valid_declared_winner_trusted_over_scores() {
        // Declared token is one of the three valid values, so it stands
        // even though the scores point the other way.
        let e = extract(&valid_json(30, 90, "emotional"));
        assert_eq!(e.verdict.winner, Winner::Emotional);
    }

    #[test]
    fn test_scores_clamped() {
        let raw = r#"{"emotional_score": 150, "logical_score": -5, "winner": "emotional",
            "reasoning": "Out-of-range scores must be clamped into their bands.",
            "criteria_scores": {"relevance": 99, "coherence": -3}}"#;
        let e = extract(raw);
        assert_eq!(e.verdict.emotional_score, 100);
        assert_eq!(e.verdict.logical_score, 0);
        assert_eq!(e.verdict.criteria_scores.relevance, 20);
        assert_eq!(e.verdict.criteria_scores.coherence, 0);
        // Missing criteria keys default to zero.
        assert_eq!(e.verdict.criteria_scores.rebuttal, 0);
        assert_in_range(&e.verdict);
    }

    #[test]
    fn test_numeric_string_scores_coerced() {
        let raw = r#"{"emotional_score": "61", "logical_score": 59.6, "winner": "emotional",
            "reasoning": "Scores arrive as strings and floats more often than one would like.",
            "criteria_scores": {}}"#;
        let e = extract(raw);
        assert_eq!(e.verdict.emotional_score, 61);
        assert_eq!(e.verdict.logical_score, 60);
    }

    #[test]
    fn test_integer_scores_flag() {
        assert!(extract(&valid_json(65, 58, "emotional")).integer_scores);

        // Coerced strings and floats do not count as integer scores.
        let coerced = r#"{"emotional_score": "61", "logical_score": 59.6, "winner": "emotional",
            "reasoning": "Coerced values still produce a verdict, just not an adoptable one.",
            "criteria_scores": {}}"#;
        assert!(!extract(coerced).integer_scores);

        // A parseable object with no scores at all: valid verdict shape,
        // flag off, scores defaulted.
        let e = extract(r#"{"note": "I could not reconstruct the requested scores"}"#);
        assert_eq!(e.provenance, Provenance::CleanParse);
        assert!(!e.integer_scores);
        assert_eq!(e.verdict.emotional_score, 0);
        assert_eq!(e.verdict.logical_score, 0);

        // Regex-recovered scores never set the flag.
        let h = extract("Emotional score: 40, logical score: 72. No JSON today.");
        assert_eq!(h.provenance, Provenance::Heuristic);
        assert!(!h.integer_scores);
    }

    #[test]
    fn test_trailing_comma_repaired() {
        let raw = r#"{"emotional_score": 55, "logical_score": 45, "winner": "emotional",
            "reasoning": "Trailing commas are the most common malformation we see.",
            "criteria_scores": {"relevance": 12, "coherence": 12, "evidence": 12,
                                "persuasiveness": 12, "rebuttal": 12,},}"#;
        let e = extract(raw);
        assert_eq!(e.provenance, Provenance::Repaired);
        assert_eq!(e.verdict.emotional_score, 55);
    }

    #[test]
    fn test_heuristic_from_prose() {
        let raw = "The winner is logical. Emotional score: 40, logical score: 72. Well argued.";
        let e = extract(raw);
        assert_eq!(e.provenance, Provenance::Heuristic);
        assert_eq!(e.verdict.emotional_score, 40);
        assert_eq!(e.verdict.logical_score, 72);
        assert_eq!(e.verdict.winner, Winner::Logical);
        assert_eq!(e.verdict.reasoning, HEURISTIC_REASONING);
        assert_eq!(e.verdict.criteria_scores, CriteriaScores::neutral());
    }

    #[test]
    fn test_heuristic_tie_falls_back_to_winner_token() {
        let raw = "Emotional score 60 and logical score 60, but the winner: logical side.";
        let e = extract(raw);
        assert_eq!(e.provenance, Provenance::Heuristic);
        assert_eq!(e.verdict.winner, Winner::Logical);
    }

    #[test]
    fn test_heuristic_defaults_without_scores() {
        let e = extract("no usable content at all");
        assert_eq!(e.provenance, Provenance::Heuristic);
        assert_eq!(e.verdict.emotional_score, 50);
        assert_eq!(e.verdict.logical_score, 50);
        assert_eq!(e.verdict.winner, Winner::Tie);
    }

    #[test]
    fn test_never_fails_on_hostile_input() {
        for raw in [
            "",
            "{",
            "}{",
            "{\"unterminated",
            "[1, 2, 3]",
            "42",
            "\u{0}\u{1}\u{2} garbage \u{fffd}",
            "{\"emotional_score\": {\"nested\": \"}\"}}",
        ] {
            let e = extract(raw);
            assert_in_range(&e.verdict);
        }
    }

    #[test]
    fn test_braces_inside_strings_skipped() {
        let raw = r#"prefix {"emotional_score": 10, "logical_score": 20, "winner": "logical",
            "reasoning": "note the literal brace } inside this string stays put",
            "criteria_scores": {}} suffix"#;
        let e = extract(raw);
        assert_eq!(e.provenance, Provenance::CleanParse);
        assert_eq!(e.verdict.logical_score, 20);
    }

    #[test]
    fn test_placeholder_verdict_shape() {
        let v = Verdict::placeholder();
        assert_eq!(v.winner, Winner::Tie);
        assert!(v.reasoning.len() >= 30);
        assert_eq!(v.criteria_scores, CriteriaScores::zero());
    }

    #[test]
    fn test_winner_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Winner::Emotional).unwrap(), "\"emotional\"");
        let parsed: Winner = serde_json::from_str("\"tie\"").unwrap();
        assert_eq!(parsed, Winner::Tie);
    }

    #[test]
    fn test_verdict_json_roundtrip() {
        let e = extract(&valid_json(65, 58, "emotional"));
        let json = serde_json::to_string(&e.verdict).unwrap();
        let parsed: Verdict = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, e.verdict);
    }
}
