//! AI courtroom: two LLM lawyer personas argue a case over three fixed
//! rounds and an LLM judge scores the exchange.
//!
//! # Architecture
//!
//! ```text
//!                  ┌────────────────┐
//!   Case ────────► │  DebateRunner  │ ──► DebateTranscript ──► DebateStore
//!                  └───────┬────────┘
//!            ┌─────────────┼─────────────┐
//!            ▼             ▼             ▼
//!      LawyerAgent   LawyerAgent    JudgeAgent
//!      (emotional)    (logical)         │
//!            │             │            ▼
//!            └──────┬──────┘     verdict::extract
//!                   ▼           (parse → repair → heuristic)
//!            CompletionClient
//!               (Ollama)
//! ```
//!
//! The runner never errs: retry-exhausted failures become a `failed`
//! transcript with whatever rounds did complete. The verdict extractor
//! is total over arbitrary model output.

pub mod agents;
pub mod config;
pub mod normalize;
pub mod ollama;
pub mod orchestrator;
pub mod prompts;
pub mod retry;
pub mod store;
pub mod transcript;
pub mod verdict;

pub use config::Settings;
pub use ollama::{CompletionClient, OllamaClient, ServiceError};
pub use orchestrator::DebateRunner;
pub use store::DebateStore;
pub use transcript::{AgentKind, Case, DebateStatus, DebateTranscript, Role, RoleAssignment};
pub use verdict::{Extraction, Provenance, Verdict, Winner};
