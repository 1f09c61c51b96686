use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Could not extract meaningful text from the file ({length} characters)")]
    EmptyOrTooShortInput { length: usize },
    #[error("Unsupported file format: {0}. Supported: .pdf, .docx")]
    UnsupportedFileType(String),
    #[error("File too large: {size} bytes (maximum {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },
    #[error("Gemini API key is not configured. Set GEMINI_API_KEY first.")]
    MissingApiKey,
    #[error("Gemini API request failed with status {status}: {body}")]
    GeminiApi { status: u16, body: String },
    #[error("No response generated from AI model")]
    EmptyModelResponse,
    #[error("Context entry not found: {0}")]
    ContextNotFound(i64),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl CoreError {
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::GeminiApi { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
