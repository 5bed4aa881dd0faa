// Prompt builders for the assistant endpoints.
// The first line of every prompt is the instruction; backends may route on it.

use crate::assistant::models::ConversationTurn;

pub const DEFAULT_POSITION: &str = "not specified";
pub const DEFAULT_INTERVIEW_TOPIC: &str = "full-stack developer";

/// Instruction appended to prompts whose replies are parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object.";

pub fn resume_optimize_prompt(resume_text: &str, position: Option<&str>) -> String {
    format!(
        "Analyze the following resume and suggest improvements based on the STAR method.\n\n\
         Target position: {position}\n\n\
         Resume:\n{resume_text}\n\n\
         Provide:\n\
         1. optimized_resume: the improved resume text\n\
         2. suggestions: at least 3 concrete improvements\n\
         3. score: a rating from 0 to 10\n\n\
         {JSON_ONLY_INSTRUCTION}",
        position = position.unwrap_or(DEFAULT_POSITION),
    )
}

pub fn interview_chat_prompt(
    message: &str,
    topic: Option<&str>,
    history: &[ConversationTurn],
) -> String {
    let context = history
        .iter()
        .map(|turn| format!("Candidate: {}\nInterviewer: {}", turn.user, turn.ai))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a technical interviewer conducting an interview with a candidate.\n\
         Interview topic: {topic}\n\n\
         Conversation so far:\n{context}\n\n\
         Candidate's latest message: {message}\n\n\
         Continue the interview: ask the next relevant technical question or give feedback.",
        topic = topic.unwrap_or(DEFAULT_INTERVIEW_TOPIC),
    )
}

pub fn answer_evaluation_prompt(question: &str, standard_answer: &str, user_answer: &str) -> String {
    format!(
        "Evaluate the candidate's answer to the question below.\n\n\
         Question: {question}\n\n\
         Reference answer: {standard_answer}\n\n\
         Candidate answer: {user_answer}\n\n\
         Provide:\n\
         1. score: a rating from 0 to 10\n\
         2. evaluation: a detailed assessment\n\
         3. suggestions: at least 2 concrete improvements\n\n\
         {JSON_ONLY_INSTRUCTION}"
    )
}
