use rig::completion::Prompt;
use tracing::warn;

use crate::config::AppConfig;
use crate::error::{CostError, Result};
use crate::llm;
use crate::models::CptMapping;

async fn request_cpt_enumeration(
    config: &AppConfig,
    icd_code: &str,
    diagnosis: &str,
) -> Result<String> {
    let prompt = format!(
        r#"A patient is diagnosed with ICD-10 code {icd_code}: {diagnosis}.
List the most common CPT codes used for evaluation or treatment of this condition in an outpatient setting.
Provide a concise list of all codes without explanations.
Format the response in the following JSON format. DO NOT PROVIDE ANYTHING BUT THE JSON:
{{
    "diagnosis": "{{ICD-10 code}}: {{diagnosis}}",
    "CPT_categories": [
        {{"category": "{{Category Name}}", "codes": ["{{CPT code 1}}", "{{CPT code 2}}", "{{CPT code 3}}"]}},
        {{"category": "{{Category Name}}", "codes": ["{{CPT code 1}}", "{{CPT code 2}}", "{{CPT code 3}}"]}}
    ]
}}"#
    );

    let agent = llm::agent(config).temperature(0.0).build();
    let response = agent
        .prompt(&prompt)
        .await
        .map_err(|e| CostError::Completion(e.to_string()))?;

    Ok(response.trim().to_string())
}

/// Best-effort decode of the model's raw text as the requested JSON shape.
fn decode_cpt_mapping(raw: &str) -> Option<CptMapping> {
    serde_json::from_str(llm::clean_json_response(raw)).ok()
}

/// Ask the model which CPT codes apply to a diagnosis. Any failure, whether
/// the completion itself or parsing its output, means no CPT data for the
/// whole request; there is no partial recovery.
pub async fn cpt_codes_for_diagnosis(
    config: &AppConfig,
    icd_code: &str,
    diagnosis: &str,
) -> Option<CptMapping> {
    let raw = match request_cpt_enumeration(config, icd_code, diagnosis).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(code = %icd_code, error = %e, "CPT enumeration request failed");
            return None;
        }
    };

    let mapping = decode_cpt_mapping(&raw);
    if mapping.is_none() {
        warn!(code = %icd_code, raw = %raw, "CPT enumeration was not valid JSON");
    }
    mapping
}

#[cfg(test)]
mod tests {
    use super::decode_cpt_mapping;

    #[test]
    fn decodes_requested_shape() {
        let raw = r#"{
            "diagnosis": "R07.9: Chest pain, unspecified",
            "CPT_categories": [
                {"category": "Diagnostic Imaging", "codes": ["71046", "71250"]}
            ]
        }"#;
        let mapping = decode_cpt_mapping(raw).unwrap();
        assert_eq!(mapping.diagnosis, "R07.9: Chest pain, unspecified");
        assert_eq!(mapping.cpt_categories.len(), 1);
        assert_eq!(mapping.cpt_categories[0].category, "Diagnostic Imaging");
        assert_eq!(mapping.cpt_categories[0].codes, vec!["71046", "71250"]);
    }

    #[test]
    fn decodes_fenced_json() {
        let raw = "```json\n{\"diagnosis\": \"I10: Hypertension\", \"CPT_categories\": []}\n```";
        let mapping = decode_cpt_mapping(raw).unwrap();
        assert_eq!(mapping.diagnosis, "I10: Hypertension");
        assert!(mapping.cpt_categories.is_empty());
    }

    #[test]
    fn prose_wrapped_output_is_no_data() {
        let raw = "Sure! Here are the CPT codes you asked for: {\"diagnosis\": \"I10\"}";
        assert!(decode_cpt_mapping(raw).is_none());
    }

    #[test]
    fn malformed_json_is_no_data() {
        assert!(decode_cpt_mapping("not json at all").is_none());
        assert!(decode_cpt_mapping("{\"diagnosis\": \"I10\"").is_none());
    }
}
