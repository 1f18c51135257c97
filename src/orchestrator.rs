//! Debate runner — drives the three-round exchange and the judge.
//!
//! # Debate flow
//!
//! ```text
//! Round1 ──► Round2 ──► Round3 ──► Judging ──► Complete
//!    │          │          │          │
//!    └──────────┴──────────┴──────────┴──► Failed (retry budget exhausted)
//! ```
//!
//! Within a round the two lawyer calls are independent and run in
//! parallel; rounds themselves are strictly sequential because round N+1
//! cross-references round-N content. Each stage call is wrapped in a
//! bounded retry. The runner never returns an error: exhausted budgets
//! produce a `failed` transcript with the error text in the verdict
//! reasoning and all arguments produced so far preserved.

use std::time::Instant;

use tracing::{info, warn};
use uuid::Uuid;

use crate::agents::{JudgeAgent, LawyerAgent, PersonaConfig};
use crate::config::Settings;
use crate::ollama::CompletionClient;
use crate::retry::with_retry;
use crate::transcript::{
    AgentKind, Argument, Case, DebateStatus, DebateTranscript, RoleAssignment,
};

/// Generate a short prefixed id, e.g. `deb-1f2e3d4c`.
pub fn short_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &hex[..8])
}

/// Runs one complete debate for a case. Stateless between runs; multiple
/// runners over the same client can execute concurrently.
pub struct DebateRunner<'a> {
    emotional: LawyerAgent<'a>,
    logical: LawyerAgent<'a>,
    judge: JudgeAgent<'a>,
    settings: &'a Settings,
}

impl<'a> DebateRunner<'a> {
    pub fn new(
        client: &'a dyn CompletionClient,
        roles: RoleAssignment,
        settings: &'a Settings,
    ) -> Self {
        let persona = |kind: AgentKind| PersonaConfig {
            kind,
            role: roles.role_for(kind),
            temperature: settings.temperature_for(kind),
        };
        Self {
            emotional: LawyerAgent::new(client, persona(AgentKind::Emotional), settings),
            logical: LawyerAgent::new(client, persona(AgentKind::Logical), settings),
            judge: JudgeAgent::new(client, settings),
            settings,
        }
    }

    /// Run a debate with a fresh id.
    pub async fn run(&self, case: Case) -> DebateTranscript {
        let id = short_id("deb");
        self.run_with_id(&id, case).await
    }

    /// Run a debate under a caller-chosen id (used when a pending record
    /// was already persisted).
    pub async fn run_with_id(&self, debate_id: &str, case: Case) -> DebateTranscript {
        let start = Instant::now();
        info!("starting debate {} for case: {}", debate_id, case.title);
        let mut transcript = DebateTranscript::pending(debate_id, case.clone());

        let attempts = self.settings.stage_attempts;
        let backoff = self.settings.backoff_base;

        // Round 1: openings, no shared context.
        let (emo_r1, log_r1) = tokio::join!(
            with_retry("Emotional R1", attempts, backoff, || self
                .emotional
                .opening(&case)),
            with_retry("Logical R1", attempts, backoff, || self.logical.opening(&case)),
        );
        let (emo_r1, log_r1) =
            match self.record_round(&mut transcript, 1, emo_r1, log_r1) {
                Ok(pair) => pair,
                Err(reason) => return fail(transcript, reason),
            };
        info!("round 1 complete for {}", debate_id);

        // Round 2: counters, each sees the opponent's opening.
        let (emo_r2, log_r2) = tokio::join!(
            with_retry("Emotional R2", attempts, backoff, || self
                .emotional
                .counter(&case, &log_r1)),
            with_retry("Logical R2", attempts, backoff, || self
                .logical
                .counter(&case, &emo_r1)),
        );
        let (emo_r2, log_r2) =
            match self.record_round(&mut transcript, 2, emo_r2, log_r2) {
                Ok(pair) => pair,
                Err(reason) => return fail(transcript, reason),
            };
        info!("round 2 complete for {}", debate_id);

        // Round 3: rebuttals, each sees the opponent's counter and its own.
        let (emo_r3, log_r3) = tokio::join!(
            with_retry("Emotional R3", attempts, backoff, || self
                .emotional
                .rebuttal(&case, &log_r2, &emo_r2)),
            with_retry("Logical R3", attempts, backoff, || self
                .logical
                .rebuttal(&case, &emo_r2, &log_r2)),
        );
        if let Err(reason) = self.record_round(&mut transcript, 3, emo_r3, log_r3) {
            return fail(transcript, reason);
        }
        info!("round 3 complete for {}", debate_id);

        // Judging over the six arguments in fixed order:
        // (emotional, R1), (logical, R1), ..., (emotional, R3), (logical, R3).
        let ordered: Vec<&Argument> = transcript.rounds.iter().flatten().collect();
        let judged = with_retry("Judge Verdict", attempts, backoff, || {
            self.judge.evaluate(&case, &ordered)
        })
        .await;

        match judged {
            Ok(extraction) => {
                if extraction.provenance.is_heuristic() {
                    warn!("debate {} verdict is heuristic", debate_id);
                }
                info!(
                    "judge verdict ready for {}: winner={} (E:{} L:{}) in {:.1}s",
                    debate_id,
                    extraction.verdict.winner,
                    extraction.verdict.emotional_score,
                    extraction.verdict.logical_score,
                    start.elapsed().as_secs_f64(),
                );
                transcript.verdict = extraction.verdict;
                transcript.status = DebateStatus::Complete;
                transcript
            }
            Err(e) => fail(transcript, e.to_string()),
        }
    }

    /// Record both lawyer results for a round. Partial successes are
    /// preserved before the round as a whole is declared failed.
    fn record_round(
        &self,
        transcript: &mut DebateTranscript,
        round_number: u32,
        emotional: Result<String, impl std::fmt::Display>,
        logical: Result<String, impl std::fmt::Display>,
    ) -> Result<(String, String), String> {
        let idx = (round_number - 1) as usize;
        let mut push = |kind: AgentKind, content: &str| -> Result<(), String> {
            let arg = Argument::new(kind, round_number, content)
                .map_err(|e| format!("{} R{}: {}", kind, round_number, e))?;
            transcript.rounds[idx].push(arg);
            Ok(())
        };

        let emotional = emotional.map_err(|e| e.to_string());
        let logical = logical.map_err(|e| e.to_string());

        if let Ok(text) = &emotional {
            push(AgentKind::Emotional, text)?;
        }
        if let Ok(text) = &logical {
            push(AgentKind::Logical, text)?;
        }

        match (emotional, logical) {
            (Ok(e), Ok(l)) => Ok((e, l)),
            (Err(e), _) => Err(format!("Emotional R{}: {}", round_number, e)),
            (_, Err(e)) => Err(format!("Logical R{}: {}", round_number, e)),
        }
    }
}

fn fail(mut transcript: DebateTranscript, reason: String) -> DebateTranscript {
    warn!("debate {} failed: {}", transcript.id, reason);
    transcript.status = DebateStatus::Failed;
    transcript.verdict.reasoning = format!("Debate generation failed: {}", reason);
    transcript
}
