use chrono::Utc;
use tracing::info;

use crate::assistant::models::{
    AnswerEvaluationRequest, AnswerEvaluationResponse, ConversationTurn, EvaluationReply,
    InterviewChatRequest, InterviewChatResponse, ResumeOptimizeRequest, ResumeOptimizeResponse,
    ResumeReply,
};
use crate::errors::AppError;
use crate::llm_client::prompts::{
    answer_evaluation_prompt, interview_chat_prompt, resume_optimize_prompt,
};
use crate::llm_client::{parse_json_reply, LlmBackend};
use crate::models::question::QuestionRow;

pub const MIN_RESUME_CHARS: usize = 10;
/// The interview is considered finished once the history holds this many turns.
pub const INTERVIEW_TURN_LIMIT: usize = 5;
pub const MAX_EVALUATION_SUGGESTIONS: usize = 2;

pub async fn optimize_resume(
    llm: &dyn LlmBackend,
    req: ResumeOptimizeRequest,
) -> Result<ResumeOptimizeResponse, AppError> {
    if req.resume_text.trim().chars().count() < MIN_RESUME_CHARS {
        return Err(AppError::Validation(format!(
            "resume_text must be at least {MIN_RESUME_CHARS} characters"
        )));
    }

    let prompt = resume_optimize_prompt(&req.resume_text, req.position.as_deref());
    let reply: ResumeReply = parse_json_reply(&llm.complete(&prompt).await?)?;

    info!(
        "Resume optimized: {} suggestions, score {:.1}",
        reply.suggestions.len(),
        reply.score
    );

    Ok(ResumeOptimizeResponse {
        original_resume: req.resume_text,
        optimized_resume: reply.optimized_resume,
        suggestions: reply.suggestions,
        score: clamp_score(reply.score),
    })
}

pub async fn interview_turn(
    llm: &dyn LlmBackend,
    req: InterviewChatRequest,
) -> Result<InterviewChatResponse, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let mut history = req.conversation_history.unwrap_or_default();
    let prompt = interview_chat_prompt(&req.message, req.interview_topic.as_deref(), &history);
    let ai_message = llm.complete(&prompt).await?;

    history.push(ConversationTurn {
        user: req.message,
        ai: ai_message.clone(),
        timestamp: Some(Utc::now().timestamp_millis() as f64 / 1000.0),
    });
    let is_complete = history.len() >= INTERVIEW_TURN_LIMIT;

    Ok(InterviewChatResponse {
        ai_message,
        conversation_history: history,
        is_complete,
    })
}

pub async fn evaluate_answer(
    llm: &dyn LlmBackend,
    question: QuestionRow,
    req: AnswerEvaluationRequest,
) -> Result<AnswerEvaluationResponse, AppError> {
    if let Some(body_id) = req.question_id {
        if body_id != question.id {
            return Err(AppError::Validation(format!(
                "question_id {body_id} does not match path id {}",
                question.id
            )));
        }
    }
    if req.user_answer.trim().is_empty() {
        return Err(AppError::Validation("user_answer must not be empty".to_string()));
    }

    let prompt = answer_evaluation_prompt(&question.question, &question.answer, &req.user_answer);
    let mut reply: EvaluationReply = parse_json_reply(&llm.complete(&prompt).await?)?;
    reply.suggestions.truncate(MAX_EVALUATION_SUGGESTIONS);

    info!(
        "Evaluated answer for question {}: score {:.1}",
        question.id, reply.score
    );

    Ok(AnswerEvaluationResponse {
        question_id: question.id,
        user_answer: req.user_answer,
        standard_answer: question.answer,
        score: clamp_score(reply.score),
        evaluation: reply.evaluation,
        suggestions: reply.suggestions,
    })
}

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 10.0)
}
