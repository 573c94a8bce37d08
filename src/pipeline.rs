use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::Config;
use crate::data_models::{GenerationResult, Question, SearchResult};
use crate::error::AppError;
use crate::generation::GenerationClient;
use crate::normalizer::normalize;
use crate::prompt;
use crate::search::SearchClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub answer: String,
    pub question: String,
}

/// Question answering: validate, optionally search, generate, normalize.
///
/// Holds no per-request state; one instance is shared by every handler.
#[derive(Debug, Clone)]
pub struct QaPipeline {
    config: Arc<Config>,
    generator: GenerationClient,
    searcher: SearchClient,
}

impl QaPipeline {
    pub fn new(config: Arc<Config>) -> Result<QaPipeline> {
        let generator = GenerationClient::from_config(&config)?;
        let searcher = SearchClient::from_config(&config)?;
        Ok(QaPipeline {
            config,
            generator,
            searcher,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn searcher(&self) -> &SearchClient {
        &self.searcher
    }

    pub async fn ask(&self, text: &str, context: Option<&str>) -> Result<Answer, AppError> {
        let question = Question::new(text, context)?;
        info!(
            question_len = question.text.len(),
            has_context = question.has_context(),
            "question accepted"
        );

        let search_results = self.augment(&question).await;
        let prompt = prompt::build(&question, &search_results);

        let result = self.generator.generate(&prompt).await;
        if let GenerationResult::Failure { kind, detail } = &result {
            error!(%kind, detail = %detail, "generation failed");
        }

        let answer = normalize(result).into_result()?;
        Ok(Answer {
            answer,
            question: question.text,
        })
    }

    /// Empty when augmentation is disabled or the search fails.
    async fn augment(&self, question: &Question) -> Vec<SearchResult> {
        if !self.config.search_enabled {
            return Vec::new();
        }
        self.searcher
            .search(&question.text, self.config.search_max_results)
            .await
    }
}
