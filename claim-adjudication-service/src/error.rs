use thiserror::Error;

/// Request-level errors surfaced to API callers.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// A category string outside the three supported document types.
    #[error("invalid document category: {0}")]
    InvalidCategory(String),

    /// The adjudication payload carried no extracted data at all.
    #[error("no extracted data provided")]
    NoInputData,

    /// Stage 2 has no degrade path: any inference or parse failure fails the request.
    #[error("claim adjudication failed: {0}")]
    AdjudicationFailed(String),
}

/// Failures talking to the inference service or decoding its envelope.
///
/// During extraction these are consumed locally (the page degrades to schema
/// defaults); during adjudication they become [`ClaimError::AdjudicationFailed`].
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference request timed out")]
    Timeout,

    #[error("inference transport error: {0}")]
    Http(reqwest::Error),

    #[error("inference service returned status {0}")]
    Api(reqwest::StatusCode),

    #[error("malformed inference response: {0}")]
    MalformedResponse(String),
}

impl InferenceError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InferenceError::Timeout
        } else {
            InferenceError::Http(err)
        }
    }
}

/// Failures turning uploaded bytes into page images.
///
/// Always consumed locally: a file that cannot be rasterized contributes zero
/// pages and is omitted from the results.
#[derive(Debug, Error)]
pub enum RasterizeError {
    #[error("empty file contents")]
    EmptyInput,

    #[error("pdf rendering failed: {0}")]
    Render(String),

    #[error("pdf produced no pages")]
    NoPages,

    #[error("rasterizer task failed: {0}")]
    Join(String),
}
