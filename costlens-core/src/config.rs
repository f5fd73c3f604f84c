use crate::error::{CostError, Result};

const DEFAULT_ZIP_BASE_URL: &str = "https://api.zippopotam.us";
const DEFAULT_MODEL: &str = "openai/gpt-4.1";
const DEFAULT_MAX_RESULTS: u32 = 10;

/// Configuration for the cost analysis pipeline. Built once at startup and
/// passed into each component, never read from ambient state.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the ICD-10 autocomplete endpoint.
    pub icd_base_url: String,
    /// Base URL of the postal directory service.
    pub zip_base_url: String,
    pub openrouter_api_key: String,
    pub model: String,
    /// Upper bound on ICD-10 matches requested per symptom (maxList).
    pub icd_max_results: u32,
}

impl AppConfig {
    /// Read configuration from the environment. Missing required values fail
    /// here, at startup, not per request.
    pub fn from_env() -> Result<Self> {
        let icd_base_url = std::env::var("ICD_BASE_URL")
            .map_err(|_| CostError::MissingConfig("ICD_BASE_URL"))?;
        let openrouter_api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| CostError::MissingConfig("OPENROUTER_API_KEY"))?;
        let zip_base_url =
            std::env::var("ZIP_BASE_URL").unwrap_or_else(|_| DEFAULT_ZIP_BASE_URL.to_string());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let icd_max_results = std::env::var("ICD_MAX_RESULTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_RESULTS);

        Ok(Self {
            icd_base_url,
            zip_base_url,
            openrouter_api_key,
            model,
            icd_max_results,
        })
    }
}
