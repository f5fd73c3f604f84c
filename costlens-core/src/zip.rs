use reqwest::Client;

use crate::config::AppConfig;
use crate::error::Result;

/// Check a postal code against the external directory. Validity is purely
/// "the lookup succeeded": an HTTP success status means valid, any other
/// status means invalid. There is no local format check.
pub async fn is_valid_zip(http: &Client, config: &AppConfig, zip_code: &str) -> Result<bool> {
    let url = format!("{}/us/{}", config.zip_base_url, zip_code);
    let response = http.get(&url).send().await?;
    Ok(response.status().is_success())
}
