use axum::{
    extract::{Path, State},
    Json,
};

use crate::assistant::models::{
    AnswerEvaluationRequest, AnswerEvaluationResponse, InterviewChatRequest,
    InterviewChatResponse, ResumeOptimizeRequest, ResumeOptimizeResponse,
};
use crate::assistant::service::{evaluate_answer, interview_turn, optimize_resume};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/resume/optimize
pub async fn handle_optimize_resume(
    State(state): State<AppState>,
    Json(req): Json<ResumeOptimizeRequest>,
) -> Result<Json<ResumeOptimizeResponse>, AppError> {
    Ok(Json(optimize_resume(state.llm.as_ref(), req).await?))
}

/// POST /api/interview/chat
pub async fn handle_interview_chat(
    State(state): State<AppState>,
    Json(req): Json<InterviewChatRequest>,
) -> Result<Json<InterviewChatResponse>, AppError> {
    Ok(Json(interview_turn(state.llm.as_ref(), req).await?))
}

/// POST /api/questions/:id/evaluate
pub async fn handle_evaluate_answer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AnswerEvaluationRequest>,
) -> Result<Json<AnswerEvaluationResponse>, AppError> {
    let question = state.questions.get_by_id(id).await?;
    Ok(Json(evaluate_answer(state.llm.as_ref(), question, req).await?))
}
