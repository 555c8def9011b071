//! Prompt templates for the tutor.
//!
//! Two fixed templates, each interpolating the student's question exactly
//! once. [`render`] picks one from the question's [`QuestionContext`].

use crate::types::QuestionContext;

/// Role the model is asked to play in every prompt.
pub const DEFAULT_ROLE_PROMPT: &str =
    "You are a Math Professor helping students solve math problems";

/// Formatting instruction appended to every prompt.
pub const MARKDOWN_PROMPT: &str =
    "Please respond with latex syntax for math related equations in the answers";

/// Detailed step-by-step solution prompt.
pub fn solution_prompt(question: &str) -> String {
    format!(
        "{DEFAULT_ROLE_PROMPT}. Student needs your help in solving a math problem/equation that \
         student currently stuck on. Student requires a detailed step-by-step solution to guide \
         student through the process. The math problem/equation is as follows: {question} \
         Provide a comprehensive step-by-step solution, including formulas, concepts, and \
         techniques, to help me thoroughly understand the problem. {MARKDOWN_PROMPT}."
    )
}

/// Short, beginner friendly answer to a doubt.
pub fn doubt_prompt(question: &str) -> String {
    format!(
        "{DEFAULT_ROLE_PROMPT}. Student needs your help in solving a math problem/equation that \
         student currently stuck on. Student has this doubt: {question} Please provide short and \
         beginner friendly answer for the same. Note: {MARKDOWN_PROMPT}."
    )
}

pub fn render(context: QuestionContext, question: &str) -> String {
    match context {
        QuestionContext::Doubt => doubt_prompt(question),
        QuestionContext::General => solution_prompt(question),
    }
}
