use rig::agent::AgentBuilder;
use rig::client::CompletionClient;
use rig::providers::openrouter;

use crate::config::AppConfig;

/// Start an agent builder against the configured OpenRouter model. Callers
/// attach their own preamble, temperature and token limits.
pub(crate) fn agent(config: &AppConfig) -> AgentBuilder<openrouter::CompletionModel> {
    let client = openrouter::Client::new(&config.openrouter_api_key);
    client.agent(&config.model)
}

/// Strip the markdown code fences some models wrap around requested JSON.
pub(crate) fn clean_json_response(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("```json").unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix("```").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}
