//! Prompt templates and assembly for the lawyer personas and the judge.
//!
//! Templates are opaque configuration as far as the orchestration core is
//! concerned; the helpers here only substitute case/context placeholders
//! and prepend the role-override block for the side a persona argues.

use crate::config::{JUDGE_WORD_LIMIT_MAX, JUDGE_WORD_LIMIT_MIN, WORD_LIMIT_MAX, WORD_LIMIT_MIN};
use crate::transcript::{AgentKind, Role};

/// Round labels carried into prompts.
pub const ROUND_LABELS: [&str; 3] = ["Opening", "Counter-Argument", "Rebuttal"];

const EMOTIONAL_SYSTEM_TEMPLATE: &str = "\
Persona: You are a passionate courtroom advocate who argues through narrative, empathy, and moral weight.
Context (Case): {case_description}
Opponent's previous argument (if any): {opponent_argument}
Your previous argument (if any): {your_previous_argument}

Style requirements:
- Emotional vocabulary above 10% (unfair, devastating, heartbreaking, cruel, justice).
- Personal pronouns above 12% (I, we, you, my, our).
- 2-4 rhetorical questions and 1-3 exclamation points per argument.
- A narrative or story structure must be present.

Output instructions:
- Stay strictly on topic; be professional yet passionate; no profanity.
- Maintain your assigned side at all times; do not switch sides.
- State the outcome you seek.
- Do not include meta commentary about being an AI.
- Target {min_words}-{max_words} words for the current round.
";

const LOGICAL_SYSTEM_TEMPLATE: &str = "\
Persona: You are a methodical courtroom advocate who argues through structure, evidence, and explicit logic.
Context (Case): {case_description}
Opponent's previous argument (if any): {opponent_argument}
Your previous argument (if any): {your_previous_argument}

Style requirements:
- Use structural markers 4-6 times (First, Second, Therefore, Hence, Because).
- Include 2-3 explicit if-then statements.
- Evidence words above 8% (fact, data, evidence, proven, demonstrates).
- Emotional words below 3%; at most one exclamation point.
- Prefer numbered points.

Output instructions:
- Maintain your assigned side at all times; do not switch sides.
- Keep tone precise and professional; avoid rhetorical flourishes.
- State the outcome you seek.
- Do not include meta commentary about being an AI.
- Target {min_words}-{max_words} words for the current round.
";

const JUDGE_SYSTEM_TEMPLATE: &str = "\
Role: You are an impartial judge evaluating a three-round debate between an Emotional and a Logical lawyer.
Context (Case): {case_description}

Evaluation rubric: allocate 0-20 points per criterion (total 0-100 per lawyer).
1) Relevance to case (0-20)
2) Logical coherence (0-20)
3) Evidence quality (0-20)
4) Persuasiveness (0-20)
5) Rebuttal strength (0-20)

Output format: return ONLY a compact JSON object with keys:
{
  \"emotional_score\": <int 0-100>,
  \"logical_score\": <int 0-100>,
  \"winner\": \"emotional\" or \"logical\" or \"tie\",
  \"reasoning\": \"{judge_min}-{judge_max} words of neutral analysis\",
  \"criteria_scores\": {
    \"relevance\": <0-20>,
    \"coherence\": <0-20>,
    \"evidence\": <0-20>,
    \"persuasiveness\": <0-20>,
    \"rebuttal\": <0-20>
  }
}

Constraints:
- Be strictly impartial. Do not reward verbosity over substance.
- Ground scoring in the rubric and the actual content of the arguments.
- Do not infer facts not presented.
- Output EXACTLY one JSON object: no backticks, Markdown, labels, or prose around it.
- Do NOT use trailing commas.
";

/// System prompt sent with the verdict repair request.
pub const REPAIR_SYSTEM_PROMPT: &str = "Return ONLY strict JSON per schema.";

fn role_block(role: Role) -> &'static str {
    match role {
        Role::Prosecution => {
            "Role override: You represent the Complainant (prosecution). \
             Your objective is to prove the Respondent is liable and argue for a strong remedy \
             (payment, refund, stop order, or sanction).\n\n"
        }
        Role::Defense => {
            "Role override: You represent the Respondent (defense). \
             Your objective is to defend the Respondent, challenge liability, and argue for \
             dismissal or mitigation.\n\n"
        }
    }
}

fn persona_template(kind: AgentKind) -> &'static str {
    match kind {
        AgentKind::Emotional => EMOTIONAL_SYSTEM_TEMPLATE,
        AgentKind::Logical => LOGICAL_SYSTEM_TEMPLATE,
    }
}

/// Assemble the system prompt for a lawyer call: role-override block plus
/// the persona template with case and round context substituted.
pub fn lawyer_system_prompt(
    kind: AgentKind,
    role: Role,
    case_description: &str,
    opponent_argument: &str,
    your_previous_argument: &str,
) -> String {
    let base = persona_template(kind)
        .replace("{case_description}", case_description)
        .replace("{opponent_argument}", opponent_argument)
        .replace("{your_previous_argument}", your_previous_argument)
        .replace("{min_words}", &WORD_LIMIT_MIN.to_string())
        .replace("{max_words}", &WORD_LIMIT_MAX.to_string());
    format!("{}{}", role_block(role), base)
}

/// User prompt for a round.
pub fn lawyer_user_prompt(kind: AgentKind, role: Role, round_label: &str) -> String {
    let side = match role {
        Role::Prosecution => "You represent the Complainant (prosecution).",
        Role::Defense => "You represent the Respondent (defense).",
    };
    let style = match kind {
        AgentKind::Emotional => {
            "Argue with emotional, narrative advocacy and clearly state the outcome you seek."
        }
        AgentKind::Logical => {
            "Present numbered points with explicit if-then logic and state the outcome you seek; avoid emotional language."
        }
    };
    format!(
        "Round: {}. {} {} Target {}-{} words. Do not include round headers or labels in the output. Do not switch sides.",
        round_label, side, style, WORD_LIMIT_MIN, WORD_LIMIT_MAX
    )
}

/// Escalated user prompt after a too-short response.
pub fn length_escalation_prompt(kind: AgentKind, role: Role, round_label: &str) -> String {
    let side = match role {
        Role::Prosecution => "You represent the Complainant (prosecution).",
        Role::Defense => "You represent the Respondent (defense).",
    };
    let style = match kind {
        AgentKind::Emotional => {
            "Produce a richer, narrative argument with rhetorical questions and a clear ask."
        }
        AgentKind::Logical => {
            "Provide precise, numbered points with 2-3 if-then statements and a clear ask."
        }
    };
    format!(
        "Round: {}. Your previous response was under {} words. {} {} Target {}-{} words.",
        round_label, WORD_LIMIT_MIN, side, style, WORD_LIMIT_MIN, WORD_LIMIT_MAX
    )
}

/// System prompt for the judge call.
pub fn judge_system_prompt(case_description: &str) -> String {
    JUDGE_SYSTEM_TEMPLATE
        .replace("{case_description}", case_description)
        .replace("{judge_min}", &JUDGE_WORD_LIMIT_MIN.to_string())
        .replace("{judge_max}", &JUDGE_WORD_LIMIT_MAX.to_string())
}

/// User prompt wrapping the ordered transcript block.
pub fn judge_user_prompt(debate_block: &str) -> String {
    format!(
        "Evaluate the following debate transcript according to the rubric and output ONLY the JSON object described.\n\nTranscript:\n{}\n",
        debate_block
    )
}

/// One-shot repair request: reformat earlier raw output as strict JSON.
pub fn repair_prompt(raw: &str) -> String {
    format!(
        "Reformat the following content as a STRICT JSON object using this schema with correct keys and types. \
         Output exactly one JSON object and nothing else.\n\n\
         Schema: {{\n  \"emotional_score\": int 0-100,\n  \"logical_score\": int 0-100,\n  \
         \"winner\": one of [\"emotional\", \"logical\", \"tie\"],\n  \"reasoning\": string,\n  \
         \"criteria_scores\": {{ \"relevance\":0-20, \"coherence\":0-20, \"evidence\":0-20, \
         \"persuasiveness\":0-20, \"rebuttal\":0-20 }}\n}}\n\nContent:\n{}\n",
        raw
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lawyer_system_prompt_substitution() {
        let prompt = lawyer_system_prompt(
            AgentKind::Emotional,
            Role::Prosecution,
            "A landlord withheld a deposit.",
            "opponent said X",
            "",
        );
        assert!(prompt.starts_with("Role override: You represent the Complainant"));
        assert!(prompt.contains("A landlord withheld a deposit."));
        assert!(prompt.contains("opponent said X"));
        assert!(!prompt.contains("{case_description}"));
        assert!(prompt.contains("250-350 words"));
    }

    #[test]
    fn test_personas_are_distinct() {
        let emo = lawyer_system_prompt(AgentKind::Emotional, Role::Defense, "case", "", "");
        let log = lawyer_system_prompt(AgentKind::Logical, Role::Defense, "case", "", "");
        assert!(emo.contains("passionate"));
        assert!(log.contains("methodical"));
        assert_ne!(emo, log);
    }

    #[test]
    fn test_user_prompt_round_label() {
        let p = lawyer_user_prompt(AgentKind::Logical, Role::Defense, ROUND_LABELS[1]);
        assert!(p.starts_with("Round: Counter-Argument."));
        assert!(p.contains("Respondent (defense)"));
    }

    #[test]
    fn test_escalation_prompt_mentions_minimum() {
        let p = length_escalation_prompt(AgentKind::Emotional, Role::Prosecution, "Opening");
        assert!(p.contains("under 250 words"));
    }

    #[test]
    fn test_judge_prompt_schema() {
        let p = judge_system_prompt("case text");
        assert!(p.contains("impartial judge"));
        assert!(p.contains("case text"));
        assert!(p.contains("\"criteria_scores\""));
        assert!(p.contains("300-400 words"));
    }

    #[test]
    fn test_repair_prompt_embeds_raw() {
        let p = repair_prompt("broken { output");
        assert!(p.contains("STRICT JSON"));
        assert!(p.contains("broken { output"));
    }
}
