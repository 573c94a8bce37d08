use crate::data_models::{Prompt, Question, SearchResult};

pub const ANSWERED_MARKER: char = '✓';
pub const UNANSWERED_MARKER: char = '✗';

const DIRECT_PREAMBLE: &str =
    "You are a helpful assistant. Answer the following question concisely and clearly.";

const AUGMENTED_PREAMBLE: &str = "Use the following Stack Overflow posts to answer the user's question concisely and clearly.";

/// Assemble the prompt for a question. Falls back to a direct prompt when
/// there are no search results.
pub fn build(question: &Question, search_results: &[SearchResult]) -> Prompt {
    let text = if search_results.is_empty() {
        build_direct(question)
    } else {
        build_augmented(question, search_results)
    };
    Prompt { text }
}

fn build_direct(question: &Question) -> String {
    let body = if question.has_context() {
        format!(
            "Context: {}\nQuestion: {}",
            indent_continuation(&question.context),
            question.text
        )
    } else {
        question.text.clone()
    };
    format!("{DIRECT_PREAMBLE}\n\n{body}\n")
}

fn build_augmented(question: &Question, search_results: &[SearchResult]) -> String {
    let summaries = search_results
        .iter()
        .map(summary_line)
        .collect::<Vec<String>>()
        .join("\n");

    let mut text = format!("{AUGMENTED_PREAMBLE}\n\nStack Overflow:\n{summaries}\n\n");
    if question.has_context() {
        text.push_str(&format!(
            "Context: {}\n",
            indent_continuation(&question.context)
        ));
    }
    // Kept on the label line so the question can never start a line.
    text.push_str(&format!("User Question: {}\n", question.text));
    text
}

/// Only summary lines may start at column 0 with a marker.
fn indent_continuation(text: &str) -> String {
    text.split('\n').collect::<Vec<&str>>().join("\n  ")
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

pub fn summary_line(result: &SearchResult) -> String {
    let marker = if result.is_answered {
        ANSWERED_MARKER
    } else {
        UNANSWERED_MARKER
    };
    format!(
        "{marker} {} ({})",
        one_line(&result.title),
        one_line(&result.url)
    )
}
