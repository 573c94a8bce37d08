use serde::Serialize;

use crate::data_models::{ErrorKind, GenerationResult};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NormalizedAnswer {
    Answer { answer: String },
    Error { error: String, kind: ErrorKind },
}

impl NormalizedAnswer {
    pub fn into_result(self) -> Result<String, AppError> {
        match self {
            NormalizedAnswer::Answer { answer } => Ok(answer),
            NormalizedAnswer::Error { error, kind } => Err(AppError::Generation {
                kind,
                message: error,
            }),
        }
    }
}

/// Total over [`GenerationResult`]: every failure becomes a non-empty message.
pub fn normalize(result: GenerationResult) -> NormalizedAnswer {
    match result {
        GenerationResult::Success { answer } => NormalizedAnswer::Answer {
            answer: answer.trim().to_string(),
        },
        GenerationResult::Failure { kind, detail } => {
            let detail = detail.trim();
            let error = if detail.is_empty() {
                capitalize(&kind.to_string())
            } else {
                format!("{}: {detail}", capitalize(&kind.to_string()))
            };
            NormalizedAnswer::Error { error, kind }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
