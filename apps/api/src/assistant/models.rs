use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ResumeOptimizeRequest {
    pub resume_text: String,
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResumeOptimizeResponse {
    pub original_resume: String,
    pub optimized_resume: String,
    pub suggestions: Vec<String>,
    pub score: f64, // 0 – 10
}

/// One exchange in a simulated interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user: String,
    pub ai: String,
    /// Unix time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct InterviewChatRequest {
    pub message: String,
    #[serde(default)]
    pub interview_topic: Option<String>,
    #[serde(default)]
    pub conversation_history: Option<Vec<ConversationTurn>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InterviewChatResponse {
    pub ai_message: String,
    pub conversation_history: Vec<ConversationTurn>,
    pub is_complete: bool,
}

#[derive(Debug, Deserialize)]
pub struct AnswerEvaluationRequest {
    /// Optional echo of the path id; must agree with it when present.
    #[serde(default)]
    pub question_id: Option<i64>,
    pub user_answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerEvaluationResponse {
    pub question_id: i64,
    pub user_answer: String,
    pub standard_answer: String,
    pub score: f64,
    pub evaluation: String,
    pub suggestions: Vec<String>,
}

/// Structured reply expected from the model for resume optimization.
#[derive(Debug, Deserialize)]
pub struct ResumeReply {
    pub optimized_resume: String,
    pub suggestions: Vec<String>,
    pub score: f64,
}

/// Structured reply expected from the model for answer evaluation.
#[derive(Debug, Deserialize)]
pub struct EvaluationReply {
    pub score: f64,
    pub evaluation: String,
    pub suggestions: Vec<String>,
}
