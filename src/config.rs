//! Runtime settings: model, temperatures, word bands, retry budgets, paths.
//!
//! Defaults match the deployed configuration; `AI_JUDGE_*` environment
//! variables override the endpoint, model, and data directory.

use std::path::PathBuf;
use std::time::Duration;

use crate::transcript::AgentKind;

/// Word band enforced on every lawyer argument.
pub const WORD_LIMIT_MIN: usize = 250;
pub const WORD_LIMIT_MAX: usize = 350;

/// Soft target band for judge reasoning (not hard-enforced).
pub const JUDGE_WORD_LIMIT_MIN: usize = 300;
pub const JUDGE_WORD_LIMIT_MAX: usize = 400;

/// Fixed number of debate rounds.
pub const NUM_ROUNDS: u32 = 3;

/// Token ceiling for a word target: 1 word is roughly 1.33 tokens.
pub fn max_tokens_for(words: usize) -> u32 {
    (words as f64 * 1.33).ceil() as u32
}

/// Top-level configuration for a debate run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Ollama server base URL.
    pub ollama_url: String,
    /// Model identifier (must be pulled in Ollama).
    pub model: String,
    /// Sampling temperature for the emotional lawyer persona.
    pub emotional_temperature: f32,
    /// Sampling temperature for the logical lawyer persona.
    pub logical_temperature: f32,
    /// Judge temperature; 0.0 for deterministic verdicts.
    pub judge_temperature: f32,
    /// Token ceiling for one argument.
    pub max_tokens_argument: u32,
    /// Token ceiling for the verdict; extra headroom over the word target
    /// reduces truncation of the strict JSON body.
    pub max_tokens_verdict: u32,
    /// Hard wall-clock timeout for one generation request.
    pub request_timeout: Duration,
    /// Transport attempts inside the Ollama client.
    pub transport_attempts: u32,
    /// Attempts per orchestration stage (lawyer round, judge call).
    pub stage_attempts: u32,
    /// Length-correction attempts inside a lawyer agent.
    pub length_attempts: u32,
    /// Base delay for linear backoff.
    pub backoff_base: Duration,
    /// Debate store file.
    pub debates_path: PathBuf,
    /// Statistics file.
    pub statistics_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = PathBuf::from(
            std::env::var("AI_JUDGE_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
        );
        Self {
            ollama_url: std::env::var("AI_JUDGE_OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            model: std::env::var("AI_JUDGE_MODEL").unwrap_or_else(|_| "llama3:8b".to_string()),
            emotional_temperature: 0.8,
            logical_temperature: 0.25,
            judge_temperature: 0.0,
            max_tokens_argument: max_tokens_for(WORD_LIMIT_MAX),
            max_tokens_verdict: 700,
            request_timeout: Duration::from_secs(120),
            transport_attempts: 3,
            stage_attempts: 3,
            length_attempts: 2,
            backoff_base: Duration::from_millis(1500),
            debates_path: data_dir.join("debates.json"),
            statistics_path: data_dir.join("statistics.json"),
        }
    }
}

impl Settings {
    /// Sampling temperature for a lawyer persona.
    pub fn temperature_for(&self, kind: AgentKind) -> f32 {
        match kind {
            AgentKind::Emotional => self.emotional_temperature,
            AgentKind::Logical => self.logical_temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_tokens_rounding() {
        assert_eq!(max_tokens_for(350), 466);
        assert_eq!(max_tokens_for(0), 0);
        assert_eq!(max_tokens_for(100), 133);
    }

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert_eq!(s.judge_temperature, 0.0);
        assert!(s.emotional_temperature > s.logical_temperature);
        assert_eq!(s.max_tokens_argument, max_tokens_for(WORD_LIMIT_MAX));
        assert!(s.max_tokens_verdict >= max_tokens_for(JUDGE_WORD_LIMIT_MAX));
        assert_eq!(s.stage_attempts, 3);
        assert_eq!(s.length_attempts, 2);
    }

    #[test]
    fn test_temperature_for_kind() {
        let s = Settings::default();
        assert_eq!(s.temperature_for(AgentKind::Emotional), s.emotional_temperature);
        assert_eq!(s.temperature_for(AgentKind::Logical), s.logical_temperature);
    }
}
