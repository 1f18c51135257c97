//! Core debate data model: cases, roles, arguments, and the transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{NUM_ROUNDS, WORD_LIMIT_MAX, WORD_LIMIT_MIN};
use crate::normalize::word_count;
use crate::verdict::Verdict;

/// The two lawyer personas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Narrative, high-temperature advocate.
    Emotional,
    /// Structured, low-temperature advocate.
    Logical,
}

impl AgentKind {
    pub fn opponent(self) -> Self {
        match self {
            Self::Emotional => Self::Logical,
            Self::Logical => Self::Emotional,
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Emotional => write!(f, "emotional"),
            Self::Logical => write!(f, "logical"),
        }
    }
}

/// Side of the dispute a lawyer argues for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Prosecution,
    Defense,
}

impl Role {
    pub fn opposite(self) -> Self {
        match self {
            Self::Prosecution => Self::Defense,
            Self::Defense => Self::Prosecution,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prosecution => write!(f, "prosecution"),
            Self::Defense => write!(f, "defense"),
        }
    }
}

/// Which side each persona takes for one debate. Exactly one persona is
/// prosecution and the other defense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Side taken by the emotional lawyer; the logical lawyer takes the other.
    pub emotional: Role,
}

impl RoleAssignment {
    pub fn role_for(&self, kind: AgentKind) -> Role {
        match kind {
            AgentKind::Emotional => self.emotional,
            AgentKind::Logical => self.emotional.opposite(),
        }
    }
}

impl Default for RoleAssignment {
    fn default() -> Self {
        Self {
            emotional: Role::Prosecution,
        }
    }
}

/// Error constructing a [`Case`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseError {
    TitleTooShort { length: usize },
    DescriptionTooShort { length: usize },
}

impl std::fmt::Display for CaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TitleTooShort { length } => {
                write!(f, "case title too short ({} chars, need 3)", length)
            }
            Self::DescriptionTooShort { length } => {
                write!(f, "case description too short ({} chars, need 10)", length)
            }
        }
    }
}

impl std::error::Error for CaseError {}

/// Input payload describing a case. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub title: String,
    pub description: String,
}

impl Case {
    /// Validated constructor: title at least 3 chars, description at least 10.
    pub fn new(title: &str, description: &str) -> Result<Self, CaseError> {
        let title = title.trim();
        let description = description.trim();
        if title.chars().count() < 3 {
            return Err(CaseError::TitleTooShort {
                length: title.chars().count(),
            });
        }
        if description.chars().count() < 10 {
            return Err(CaseError::DescriptionTooShort {
                length: description.chars().count(),
            });
        }
        Ok(Self {
            title: title.to_string(),
            description: description.to_string(),
        })
    }
}

/// Error constructing an [`Argument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    RoundOutOfRange { round: u32 },
    WordCountOutOfRange { found: usize, min: usize, max: usize },
}

impl std::fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RoundOutOfRange { round } => {
                write!(f, "round {} out of range 1-{}", round, NUM_ROUNDS)
            }
            Self::WordCountOutOfRange { found, min, max } => {
                write!(f, "argument word count {} out of range {}-{}", found, min, max)
            }
        }
    }
}

impl std::error::Error for ArgumentError {}

/// A single lawyer argument for one round. `word_count` is always
/// recomputed from the content, never trusted from input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub agent: AgentKind,
    /// Round index, 1-based.
    pub round_number: u32,
    pub content: String,
    pub word_count: usize,
}

impl Argument {
    /// Construct with the word-band invariant checked; a violation here is
    /// a construction error, not a runtime state.
    pub fn new(agent: AgentKind, round_number: u32, content: &str) -> Result<Self, ArgumentError> {
        if !(1..=NUM_ROUNDS).contains(&round_number) {
            return Err(ArgumentError::RoundOutOfRange {
                round: round_number,
            });
        }
        let wc = word_count(content);
        if !(WORD_LIMIT_MIN..=WORD_LIMIT_MAX).contains(&wc) {
            return Err(ArgumentError::WordCountOutOfRange {
                found: wc,
                min: WORD_LIMIT_MIN,
                max: WORD_LIMIT_MAX,
            });
        }
        Ok(Self {
            agent,
            round_number,
            content: content.to_string(),
            word_count: wc,
        })
    }
}

/// Lifecycle state of a debate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebateStatus {
    InProgress,
    Complete,
    Failed,
}

impl DebateStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

impl std::fmt::Display for DebateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InProgress => write!(f, "in_progress"),
            Self::Complete => write!(f, "complete"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Full debate record: case, three rounds of paired arguments, verdict,
/// and lifecycle status. Owned and mutated only by the runner for the
/// duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateTranscript {
    pub id: String,
    pub case: Case,
    /// Exactly `NUM_ROUNDS` entries; each completed round holds one
    /// argument per persona.
    pub rounds: Vec<Vec<Argument>>,
    pub verdict: Verdict,
    pub status: DebateStatus,
    pub timestamp: DateTime<Utc>,
}

impl DebateTranscript {
    /// Fresh in-progress transcript: empty rounds, placeholder verdict.
    pub fn pending(id: &str, case: Case) -> Self {
        Self {
            id: id.to_string(),
            case,
            rounds: (0..NUM_ROUNDS).map(|_| Vec::new()).collect(),
            verdict: Verdict::placeholder(),
            status: DebateStatus::InProgress,
            timestamp: Utc::now(),
        }
    }

    /// Number of rounds that hold both arguments.
    pub fn completed_rounds(&self) -> usize {
        self.rounds.iter().filter(|r| r.len() == 2).count()
    }

    /// Compact status line for logs.
    pub fn status_line(&self) -> String {
        format!(
            "[{}] {} | {}/{} rounds | winner={}",
            self.status,
            self.id,
            self.completed_rounds(),
            NUM_ROUNDS,
            self.verdict.winner
        )
    }
}
