use reqwest::Client;
use rig::completion::Prompt;
use serde_json::Value;
use tracing::warn;

use crate::config::AppConfig;
use crate::error::{CostError, Result};
use crate::llm;
use crate::models::DiagnosisCandidate;

/// Pull the [code, name] pairs out of the autocomplete response. The service
/// returns a 4-element array with the ordered match list at index 3; that
/// positional contract must be preserved against this endpoint.
fn extract_matches(data: &Value) -> Result<Vec<(String, String)>> {
    let pairs = data.get(3).and_then(Value::as_array).ok_or_else(|| {
        CostError::UnexpectedResponse("code lookup response has no match list at index 3".into())
    })?;

    Ok(pairs
        .iter()
        .filter_map(|pair| {
            let code = pair.get(0)?.as_str()?;
            let name = pair.get(1)?.as_str()?;
            Some((code.to_string(), name.to_string()))
        })
        .collect())
}

/// Query the ICD-10 autocomplete endpoint for codes matching a symptom.
pub async fn search_icd_codes(
    http: &Client,
    config: &AppConfig,
    symptom: &str,
) -> Result<Vec<(String, String)>> {
    let max_list = config.icd_max_results.to_string();
    let response = http
        .get(&config.icd_base_url)
        .query(&[
            ("sf", "code,name"),
            ("terms", symptom),
            ("maxList", &max_list),
        ])
        .send()
        .await?;

    let data: Value = response.json().await?;
    extract_matches(&data)
}

async fn generate_description(config: &AppConfig, code: &str, name: &str) -> Result<String> {
    let prompt = format!(
        "Explain the ICD-10 code {code}: {name} in simple, layman-friendly terms \
         in 1-2 sentences. Avoid medical jargon."
    );

    let agent = llm::agent(config).temperature(0.0).max_tokens(100).build();
    let response = agent
        .prompt(&prompt)
        .await
        .map_err(|e| CostError::Completion(e.to_string()))?;

    Ok(response.trim().to_string())
}

/// Resolve a symptom into diagnosis candidates, one plain-language
/// description per match. A failed description is substituted with a
/// placeholder rather than aborting the whole list; no matches is an empty
/// vector, not an error.
pub async fn diagnoses_with_descriptions(
    http: &Client,
    config: &AppConfig,
    symptom: &str,
) -> Result<Vec<DiagnosisCandidate>> {
    let matches = search_icd_codes(http, config, symptom).await?;
    if matches.is_empty() {
        return Ok(Vec::new());
    }

    let mut candidates = Vec::with_capacity(matches.len());
    for (code, name) in matches {
        let description = match generate_description(config, &code, &name).await {
            Ok(text) => text,
            Err(e) => {
                warn!(code = %code, error = %e, "description generation failed");
                "Description unavailable".to_string()
            }
        };
        candidates.push(DiagnosisCandidate {
            code,
            name,
            description,
        });
    }

    Ok(candidates)
}
