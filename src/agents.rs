//! Lawyer and judge agents.
//!
//! A lawyer agent is a plain composition of persona configuration, prompt
//! assembly, one completion call, and the response normalizer; there is no
//! inheritance hierarchy, just two persona configs over the same routine.
//! The judge agent drives the verdict extractor and its one-shot repair
//! escalation.

use tracing::warn;

use crate::config::{Settings, WORD_LIMIT_MAX, WORD_LIMIT_MIN};
use crate::normalize;
use crate::ollama::{CompletionClient, GenerationOptions, ServiceError};
use crate::prompts;
use crate::transcript::{AgentKind, Argument, Case, Role};
use crate::verdict::{self, Extraction, Provenance};

/// Persona configuration for one lawyer agent.
#[derive(Debug, Clone, Copy)]
pub struct PersonaConfig {
    pub kind: AgentKind,
    pub role: Role,
    pub temperature: f32,
}

/// A role-configured argument generator.
pub struct LawyerAgent<'a> {
    client: &'a dyn CompletionClient,
    persona: PersonaConfig,
    settings: &'a Settings,
}

impl<'a> LawyerAgent<'a> {
    pub fn new(
        client: &'a dyn CompletionClient,
        persona: PersonaConfig,
        settings: &'a Settings,
    ) -> Self {
        Self {
            client,
            persona,
            settings,
        }
    }

    pub fn kind(&self) -> AgentKind {
        self.persona.kind
    }

    /// Round 1: opening argument from the case alone.
    pub async fn opening(&self, case: &Case) -> Result<String, ServiceError> {
        self.generate(case, prompts::ROUND_LABELS[0], "", "").await
    }

    /// Round 2: counter-argument against the opponent's opening.
    pub async fn counter(&self, case: &Case, opponent_round1: &str) -> Result<String, ServiceError> {
        self.generate(case, prompts::ROUND_LABELS[1], opponent_round1, "")
            .await
    }

    /// Round 3: rebuttal of the opponent's counter, consistent with the
    /// agent's own round-2 argument.
    pub async fn rebuttal(
        &self,
        case: &Case,
        opponent_round2: &str,
        own_round2: &str,
    ) -> Result<String, ServiceError> {
        self.generate(case, prompts::ROUND_LABELS[2], opponent_round2, own_round2)
            .await
    }

    /// One argument: up to `length_attempts` completion calls with an
    /// escalated length hint, then a pad-and-trim last resort on the final
    /// text so the word band always holds.
    async fn generate(
        &self,
        case: &Case,
        round_label: &str,
        opponent_argument: &str,
        your_previous_argument: &str,
    ) -> Result<String, ServiceError> {
        let system = prompts::lawyer_system_prompt(
            self.persona.kind,
            self.persona.role,
            &case.description,
            opponent_argument,
            your_previous_argument,
        );
        let mut user = prompts::lawyer_user_prompt(self.persona.kind, self.persona.role, round_label);

        let mut last = String::new();
        for _ in 0..self.settings.length_attempts.max(1) {
            let raw = self
                .client
                .generate(
                    &user,
                    &system,
                    self.persona.temperature,
                    self.settings.max_tokens_argument,
                    &GenerationOptions::default(),
                )
                .await?;
            // Overlong text is recoverable by trimming; a short response
            // gets one escalated retry before the pad-and-trim last resort.
            let text = normalize::clean(&raw);
            let text = normalize::trim_to_max(&text, WORD_LIMIT_MAX);
            if normalize::within_limits(&text, WORD_LIMIT_MIN, WORD_LIMIT_MAX) {
                return Ok(text);
            }
            last = text;
            user =
                prompts::length_escalation_prompt(self.persona.kind, self.persona.role, round_label);
        }

        warn!(
            "{} lawyer produced text outside limits in {}; returning padded result",
            self.persona.kind, round_label
        );
        Ok(normalize::normalize(&last, WORD_LIMIT_MIN, WORD_LIMIT_MAX))
    }
}

/// Deterministic evaluator producing a verdict from the full transcript.
pub struct JudgeAgent<'a> {
    client: &'a dyn CompletionClient,
    settings: &'a Settings,
}

impl<'a> JudgeAgent<'a> {
    pub fn new(client: &'a dyn CompletionClient, settings: &'a Settings) -> Self {
        Self { client, settings }
    }

    /// Evaluate the six arguments (fixed order: emotional then logical per
    /// round) and extract a verdict. When only the heuristic fallback
    /// could reconstruct one, a single repair request asks the model to
    /// reformat its original output as strict JSON; the repaired verdict
    /// is adopted only if it parses without heuristics and carries both
    /// overall scores as integers.
    pub async fn evaluate(
        &self,
        case: &Case,
        arguments: &[&Argument],
    ) -> Result<Extraction, ServiceError> {
        let block = arguments
            .iter()
            .map(|a| {
                format!(
                    "[{} | Round {}]\n{}\n",
                    label(a.agent),
                    a.round_number,
                    a.content.trim()
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let system = prompts::judge_system_prompt(&case.description);
        let user = prompts::judge_user_prompt(&block);
        let options = GenerationOptions { format_json: true };

        let raw = self
            .client
            .generate(
                &user,
                &system,
                self.settings.judge_temperature,
                self.settings.max_tokens_verdict,
                &options,
            )
            .await?;

        let mut extraction = verdict::extract(&raw);
        if extraction.provenance.is_heuristic() {
            warn!("verdict required heuristic extraction; attempting one-shot repair");
            match self
                .client
                .generate(
                    &prompts::repair_prompt(&raw),
                    prompts::REPAIR_SYSTEM_PROMPT,
                    0.0,
                    self.settings.max_tokens_verdict,
                    &options,
                )
                .await
            {
                Ok(repaired_raw) => {
                    // Adopt the repaired verdict only when its object
                    // carried both overall scores as real integers; a
                    // parseable but score-less reply must not displace
                    // the reconstructed one.
                    let second = verdict::extract(&repaired_raw);
                    if !second.provenance.is_heuristic() && second.integer_scores {
                        extraction = second;
                    }
                }
                Err(e) => {
                    // Keep the heuristic verdict; a failed repair call must
                    // not discard a structurally valid result.
                    warn!("verdict repair call failed: {}", e);
                }
            }
        }

        if extraction.provenance == Provenance::Heuristic {
            warn!("returning heuristic verdict (degraded confidence)");
        }
        Ok(extraction)
    }
}

fn label(kind: AgentKind) -> &'static str {
    match kind {
        AgentKind::Emotional => "Emotional",
        AgentKind::Logical => "Logical",
    }
}
