use reqwest::Client;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::{AnalysisFailure, CostError, Result};
use crate::models::{
    CategoryResult, CompleteAnalysis, CostAnalysis, OverallRange, PriceQuote, PriceRange,
    ProcedureCategory,
};
use crate::pricing::{self, PriceResponse, parse_price};
use crate::{cpt, icd, zip};

fn quote_from_response(code: &str, prices: &PriceResponse) -> PriceQuote {
    PriceQuote {
        code: code.to_string(),
        in_network_price: parse_price(&prices.in_network_price),
        out_network_price: parse_price(&prices.out_of_network_price),
        in_network_raw: prices.in_network_price.clone(),
        out_network_raw: prices.out_of_network_price.clone(),
        error: None,
    }
}

fn failed_quote(code: &str, detail: &str) -> PriceQuote {
    PriceQuote {
        code: code.to_string(),
        in_network_price: None,
        out_network_price: None,
        in_network_raw: "error".to_string(),
        out_network_raw: "error".to_string(),
        error: Some(detail.to_string()),
    }
}

fn range_of(prices: impl Iterator<Item = f64>) -> Option<PriceRange> {
    let mut range: Option<PriceRange> = None;
    for price in prices {
        range = Some(match range {
            None => PriceRange {
                min: price,
                max: price,
            },
            Some(r) => PriceRange {
                min: r.min.min(price),
                max: r.max.max(price),
            },
        });
    }
    range
}

/// Fold a category's quotes into min/max ranges over the prices that parsed.
/// Zero parsed prices of a kind means no range of that kind, never {0,0}.
fn summarize_category(name: &str, quotes: Vec<PriceQuote>) -> CategoryResult {
    let in_network_range = range_of(quotes.iter().filter_map(|q| q.in_network_price));
    let out_network_range = range_of(quotes.iter().filter_map(|q| q.out_network_price));
    CategoryResult {
        category: name.to_string(),
        cpt_details: quotes,
        in_network_range,
        out_network_range,
    }
}

/// Element-wise sum of the contributing category mins and maxes, restricted
/// to categories with a range of the picked kind.
fn overall_range<'a>(
    categories: &'a [CategoryResult],
    pick: impl Fn(&'a CategoryResult) -> Option<&'a PriceRange>,
) -> Option<OverallRange> {
    let ranges: Vec<&PriceRange> = categories.iter().filter_map(pick).collect();
    if ranges.is_empty() {
        return None;
    }
    Some(OverallRange {
        min: ranges.iter().map(|r| r.min).sum(),
        max: ranges.iter().map(|r| r.max).sum(),
        category_count: ranges.len(),
    })
}

fn validate_selection(index: i64, available: usize) -> std::result::Result<usize, AnalysisFailure> {
    if index < 0 || index as usize >= available {
        return Err(AnalysisFailure::SelectionOutOfBounds {
            index,
            max: available - 1,
        });
    }
    Ok(index as usize)
}

/// Price every procedure code and aggregate the results per category and
/// overall. The postal code is re-validated here as the mandatory gate even
/// when callers have already checked it; no price lookups happen for an
/// invalid code. Pricing is strictly sequential, one code at a time, and a
/// single failed lookup is captured into its quote without aborting siblings.
pub async fn calculate_cost_analysis(
    http: &Client,
    config: &AppConfig,
    categories: &[ProcedureCategory],
    zip_code: &str,
) -> Result<CostAnalysis> {
    if !zip::is_valid_zip(http, config, zip_code).await? {
        return Err(CostError::InvalidInput("Invalid zip code provided".into()));
    }

    let mut category_results = Vec::with_capacity(categories.len());
    for category in categories {
        let mut quotes = Vec::with_capacity(category.codes.len());
        for code in &category.codes {
            let quote = match pricing::procedure_prices(config, code, zip_code).await {
                Ok(prices) => quote_from_response(code, &prices),
                Err(e) => {
                    warn!(code = %code, error = %e, "price lookup failed");
                    failed_quote(code, &e.to_string())
                }
            };
            quotes.push(quote);
        }
        category_results.push(summarize_category(&category.category, quotes));
    }

    let overall_in_network_range = overall_range(&category_results, |c| c.in_network_range.as_ref());
    let overall_out_network_range =
        overall_range(&category_results, |c| c.out_network_range.as_ref());

    Ok(CostAnalysis {
        categories: category_results,
        overall_in_network_range,
        overall_out_network_range,
        zip_code: zip_code.to_string(),
    })
}

/// Run the whole pipeline: resolve the symptom, apply the user's selection,
/// map the diagnosis to procedure codes, then price and aggregate. Every
/// reportable condition comes back as an [`AnalysisFailure`] value.
pub async fn complete_cost_analysis(
    http: &Client,
    config: &AppConfig,
    symptom: &str,
    selection_index: i64,
    zip_code: &str,
) -> std::result::Result<CompleteAnalysis, AnalysisFailure> {
    let available = icd::diagnoses_with_descriptions(http, config, symptom).await?;
    if available.is_empty() {
        return Err(AnalysisFailure::NoCodesFound);
    }

    let selected = available[validate_selection(selection_index, available.len())?].clone();
    info!(code = %selected.code, name = %selected.name, "diagnosis selected");

    let cpt_data = cpt::cpt_codes_for_diagnosis(config, &selected.code, &selected.name)
        .await
        .ok_or(AnalysisFailure::CptMappingFailed)?;

    let cost_analysis =
        match calculate_cost_analysis(http, config, &cpt_data.cpt_categories, zip_code).await {
            Ok(analysis) => analysis,
            Err(CostError::InvalidInput(_)) => return Err(AnalysisFailure::InvalidZip),
            Err(e) => return Err(AnalysisFailure::CostCalculationFailed(e.to_string())),
        };

    Ok(CompleteAnalysis {
        symptom: symptom.to_string(),
        available_icd_codes: available,
        selected_icd: selected,
        cpt_data,
        cost_analysis,
    })
}
