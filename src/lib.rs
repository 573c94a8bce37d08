pub mod api;
pub mod config;
pub mod data_models;
pub mod error;
pub mod generation;
pub mod normalizer;
pub mod pipeline;
pub mod prompt;
pub mod search;
