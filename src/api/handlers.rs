use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::error::AppError;
use crate::pipeline::QaPipeline;

use super::models::{AskRequest, AskResponse, HealthResponse, RootResponse, SearchQuery};

pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse { msg: "LLM FAQ API" })
}

/// Liveness only; does not touch either backend.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

pub async fn search_handler(
    State(pipeline): State<Arc<QaPipeline>>,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Query(params) = params.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let query = params.query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidInput("Query cannot be empty".to_string()));
    }

    let body = pipeline
        .searcher()
        .fetch_raw(query, pipeline.config().search_max_results)
        .await
        .map_err(|e| AppError::SearchProxy(format!("{:#}", e)))?;

    Ok(Json(body))
}

pub async fn ask_handler(
    State(pipeline): State<Arc<QaPipeline>>,
    request: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let start = Instant::now();

    // Undecodable bodies get the same error shape as failed validation.
    let Json(request) = request.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    let answer = pipeline
        .ask(&request.question, request.context.as_deref())
        .await?;

    info!(
        processing_time_ms = start.elapsed().as_millis() as u64,
        "question answered"
    );

    Ok(Json(AskResponse {
        answer: answer.answer,
        question: answer.question,
    }))
}
