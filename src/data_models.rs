use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A user question, already validated: `text` is a single trimmed, non-empty line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub context: String,
}

impl Question {
    pub fn new(text: &str, context: Option<&str>) -> Result<Question, AppError> {
        let text = fold_lines(text);
        if text.is_empty() {
            return Err(AppError::InvalidInput(
                "Question cannot be empty".to_string(),
            ));
        }
        Ok(Question {
            text,
            context: context.map(str::trim).unwrap_or_default().to_string(),
        })
    }

    pub fn has_context(&self) -> bool {
        !self.context.is_empty()
    }
}

/// Joins the non-blank lines of `text` with single spaces.
fn fold_lines(text: &str) -> String {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<&str>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub is_answered: bool,
}

impl SearchResult {
    pub fn new(title: String, url: String, is_answered: bool) -> SearchResult {
        SearchResult {
            title,
            url,
            is_answered,
        }
    }
}

/// Flat text sent to the generation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
}

impl GenerationRequest {
    pub fn new(model: &str, prompt: &Prompt) -> GenerationRequest {
        GenerationRequest {
            model: model.to_string(),
            prompt: prompt.text.clone(),
            stream: false,
        }
    }
}

/// Body returned by the backend's `/api/generate` endpoint. Only `response` is read.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub response: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    Timeout,
    BackendError,
    MalformedResponse,
    Unreachable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::Timeout => "generation backend timed out",
            ErrorKind::BackendError => "generation backend returned an error",
            ErrorKind::MalformedResponse => "generation backend returned a malformed response",
            ErrorKind::Unreachable => "could not connect to the generation backend",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Success { answer: String },
    Failure { kind: ErrorKind, detail: String },
}

impl GenerationResult {
    pub fn failure(kind: ErrorKind, detail: impl Into<String>) -> GenerationResult {
        GenerationResult::Failure {
            kind,
            detail: detail.into(),
        }
    }
}
