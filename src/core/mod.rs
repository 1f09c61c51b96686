pub mod commands;
pub mod context_store;
pub mod document_parser;
pub mod entry_extractor;
pub mod errors;
pub mod field_extractor;
pub mod gemini;
pub mod models;
pub mod pdf;
pub mod prompt;
pub mod response_parser;
pub mod resume_parser;
pub mod segmenter;
pub mod service;
pub mod settings_store;
pub mod skill_extractor;
pub mod taxonomy;
pub mod text_utils;
