use serde::{Deserialize, Serialize};

/// One ICD-10 match paired with its plain-language explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisCandidate {
    pub code: String,
    pub name: String,
    pub description: String,
}

/// A named group of billable procedure codes, as enumerated by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcedureCategory {
    pub category: String,
    pub codes: Vec<String>,
}

/// The JSON object the model is asked to return for a selected diagnosis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CptMapping {
    pub diagnosis: String,
    #[serde(rename = "CPT_categories")]
    pub cpt_categories: Vec<ProcedureCategory>,
}

/// Pricing outcome for a single procedure code. Parsed prices are None when
/// the raw string did not convert to a number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    pub code: String,
    pub in_network_price: Option<f64>,
    pub out_network_price: Option<f64>,
    pub in_network_raw: String,
    pub out_network_raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// Per-category pricing. A range is present only when at least one price of
/// that network kind parsed successfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: String,
    pub cpt_details: Vec<PriceQuote>,
    pub in_network_range: Option<PriceRange>,
    pub out_network_range: Option<PriceRange>,
}

/// Sum of the contributing category mins and maxes. Not a re-derived
/// min/max: this reads as a total expected cost across categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallRange {
    pub min: f64,
    pub max: f64,
    pub category_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostAnalysis {
    pub categories: Vec<CategoryResult>,
    pub overall_in_network_range: Option<OverallRange>,
    pub overall_out_network_range: Option<OverallRange>,
    pub zip_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteAnalysis {
    pub symptom: String,
    pub available_icd_codes: Vec<DiagnosisCandidate>,
    pub selected_icd: DiagnosisCandidate,
    pub cpt_data: CptMapping,
    pub cost_analysis: CostAnalysis,
}
