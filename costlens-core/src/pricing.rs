use rig::completion::Prompt;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::{CostError, Result};
use crate::llm;

const PRICING_PREAMBLE: &str = "You are an expert in medical coding and billing. \
    Your job is to provide accurate pricing for CPT codes based on a given zip code in the US. \
    You always respond in a precise JSON format without ranges or explanations.";

const UNDEFINED_PRICE: &str = "undefined";

fn undefined_price() -> String {
    UNDEFINED_PRICE.to_string()
}

/// The model's pricing answer, as raw dollar strings.
#[derive(Debug, Clone)]
pub struct PriceResponse {
    pub in_network_price: String,
    pub out_of_network_price: String,
}

impl PriceResponse {
    fn undefined() -> Self {
        Self {
            in_network_price: undefined_price(),
            out_of_network_price: undefined_price(),
        }
    }
}

fn price_field(object: &serde_json::Map<String, Value>, preferred: &str, variant: &str) -> String {
    object
        .get(preferred)
        .or_else(|| object.get(variant))
        .and_then(Value::as_str)
        .unwrap_or(UNDEFINED_PRICE)
        .to_string()
}

/// Best-effort decode of the model's pricing JSON. The underscored key is
/// preferred, with the hyphenated variant accepted to tolerate model
/// inconsistency; a missing key falls back to "undefined".
fn decode_price_response(raw: &str) -> Option<PriceResponse> {
    let value: Value = serde_json::from_str(llm::clean_json_response(raw)).ok()?;
    let object = value.as_object()?;
    Some(PriceResponse {
        in_network_price: price_field(object, "in_network_price", "in-network_price"),
        out_of_network_price: price_field(object, "out_of_network_price", "out-network_price"),
    })
}

/// Ask the model for in-network and out-of-network prices for one procedure
/// code. Output that fails to parse as JSON yields the "undefined" sentinel
/// rather than an error; only a failed completion is an error.
pub async fn procedure_prices(
    config: &AppConfig,
    cpt_code: &str,
    zip_code: &str,
) -> Result<PriceResponse> {
    let prompt = format!(
        r#"Provide the in-network and out-of-network prices for CPT code {cpt_code} in zip code {zip_code}.
Format the response strictly as:
{{
    "in_network_price": "$XXX.XX",
    "out_of_network_price": "$XXX.XX"
}}
Provide realistic prices in USD format with dollar signs."#
    );

    let agent = llm::agent(config)
        .preamble(PRICING_PREAMBLE)
        .temperature(0.0)
        .build();
    let raw = agent
        .prompt(&prompt)
        .await
        .map_err(|e| CostError::Completion(e.to_string()))?;

    match decode_price_response(&raw) {
        Some(parsed) => {
            debug!(code = %cpt_code, response = ?parsed, "price response");
            Ok(parsed)
        }
        None => {
            warn!(code = %cpt_code, raw = %raw, "price response was not valid JSON");
            Ok(PriceResponse::undefined())
        }
    }
}

/// Convert a dollar string to a number, stripping the currency symbol and
/// grouping separators. "undefined", empty, and other non-numeric text yield
/// None, never an error.
pub fn parse_price(price: &str) -> Option<f64> {
    if price == UNDEFINED_PRICE || price.is_empty() {
        return None;
    }
    price.replace('$', "").replace(',', "").parse::<f64>().ok()
}
