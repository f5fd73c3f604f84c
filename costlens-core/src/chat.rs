use rig::completion::Prompt;

use crate::config::AppConfig;
use crate::error::{CostError, Result};
use crate::llm;

const CHAT_PREAMBLE: &str = "You are a medical expert. Answer the user's question in a clear \
    and concise manner, providing accurate medical information without unnecessary jargon.";

/// Answer a free-form medical question. Single turn, no conversation memory:
/// each call is independent and stateless.
pub async fn ask(config: &AppConfig, query: &str) -> Result<String> {
    let agent = llm::agent(config)
        .preamble(CHAT_PREAMBLE)
        .temperature(0.5)
        .max_tokens(200)
        .build();

    let response = agent
        .prompt(query)
        .await
        .map_err(|e| CostError::Completion(e.to_string()))?;

    Ok(response.trim().to_string())
}
