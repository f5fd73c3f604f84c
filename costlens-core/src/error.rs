use thiserror::Error;

/// Errors raised while talking to the external collaborators (code lookup,
/// postal directory, language model).
#[derive(Error, Debug)]
pub enum CostError {
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("unexpected upstream response: {0}")]
    UnexpectedResponse(String),

    #[error("llm completion failed: {0}")]
    Completion(String),
}

pub type Result<T> = std::result::Result<T, CostError>;

/// Reportable outcomes of the end-to-end analysis. Returned as a value so
/// the boundary can map each condition to a stable response instead of
/// enumerating exception types.
#[derive(Error, Debug)]
pub enum AnalysisFailure {
    #[error("No matching ICD-10 codes found for the symptom")]
    NoCodesFound,

    #[error("Invalid selection index. Must be between 0 and {max}")]
    SelectionOutOfBounds { index: i64, max: usize },

    #[error("Failed to get CPT codes for the selected diagnosis")]
    CptMappingFailed,

    #[error("Invalid zip code provided")]
    InvalidZip,

    #[error("Failed to calculate cost analysis: {0}")]
    CostCalculationFailed(String),

    #[error("An error occurred: {0}")]
    Unexpected(#[from] CostError),
}
