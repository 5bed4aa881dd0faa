//! LLM Client — the single point of entry for all model calls in SeekJob.
//!
//! Handlers never talk to a model directly; they go through an `LlmBackend`
//! carried in `AppState`. The only backend shipped is `MockLlm`, which returns
//! canned replies so the assistant endpoints work without a provider.

use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

pub mod prompts;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A text-completion backend. Implement this to swap the mock for a real
/// provider without touching handlers.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Deserializes a structured model reply, tolerating markdown code fences.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let text = strip_json_fences(text);
    if text.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    serde_json::from_str(text).map_err(LlmError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MockLlm
// ────────────────────────────────────────────────────────────────────────────

const OPTIMIZED_RESUME_SNIPPET: &str = "As a full-stack engineer at XX Corp, delivered 3 \
    enterprise projects on a microservice architecture using React and Node.js; \
    introduced automated testing that cut the defect rate by 30% and improved \
    system performance by 25%.";

const RESUME_SUGGESTIONS: [&str; 4] = [
    "Quantify results with concrete numbers",
    "Describe project experience with the STAR method",
    "Add relevant technical keywords",
    "Group the skills list by technology stack",
];

const INTERVIEW_QUESTIONS: [&str; 4] = [
    "Describe the hardest technical challenge you faced on a project and how you solved it.",
    "What do you understand by RESTful API design principles? Please give an example.",
    "How do you handle technical disagreements with other team members?",
    "Explain what a closure is, when you would use one, and its trade-offs.",
];

struct CannedEvaluation {
    score: f64,
    evaluation: &'static str,
    suggestions: [&'static str; 3],
}

static EVALUATIONS: [CannedEvaluation; 2] = [
    CannedEvaluation {
        score: 8.5,
        evaluation: "A solid answer that covers most key points; the details could be sharper.",
        suggestions: [
            "Add concrete implementation details",
            "Back the answer with a real project example",
            "Watch the precision of technical terms",
        ],
    },
    CannedEvaluation {
        score: 7.0,
        evaluation: "Basically correct but lacks depth and shows little hands-on experience.",
        suggestions: [
            "Explain the underlying principles in more depth",
            "Describe where this applied in a real project",
            "Structure the answer more clearly",
        ],
    },
];

const FALLBACK_REPLY: &str =
    "This is a mock LLM response. A real deployment would return model-generated content here.";

/// Canned-response backend. Sleeps for `latency` to mimic a model round trip,
/// then picks a reply based on the prompt's instruction line.
#[derive(Debug, Clone)]
pub struct MockLlm {
    latency: Duration,
}

impl MockLlm {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl LlmBackend for MockLlm {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let reply = canned_reply(prompt);
        debug!(
            "Mock LLM replied: prompt_chars={}, reply_chars={}",
            prompt.len(),
            reply.len()
        );
        Ok(reply)
    }
}

/// Routes on the first line only, so user-supplied text further down the
/// prompt cannot change which canned reply is chosen.
fn canned_reply(prompt: &str) -> String {
    let instruction = prompt.lines().next().unwrap_or_default().to_lowercase();
    let mut rng = rand::thread_rng();

    if instruction.contains("resume") {
        let score = (rng.gen_range(6.5..=9.5_f64) * 10.0).round() / 10.0;
        json!({
            "optimized_resume": OPTIMIZED_RESUME_SNIPPET,
            "suggestions": RESUME_SUGGESTIONS,
            "score": score,
        })
        .to_string()
    } else if instruction.contains("evaluate") {
        let canned = &EVALUATIONS[rng.gen_range(0..EVALUATIONS.len())];
        json!({
            "score": canned.score,
            "evaluation": canned.evaluation,
            "suggestions": canned.suggestions,
        })
        .to_string()
    } else if instruction.contains("interview") {
        INTERVIEW_QUESTIONS
            .choose(&mut rng)
            .copied()
            .unwrap_or(FALLBACK_REPLY)
            .to_string()
    } else {
        FALLBACK_REPLY.to_string()
    }
}
