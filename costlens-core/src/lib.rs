pub mod analysis;
pub mod chat;
pub mod config;
pub mod cpt;
pub mod error;
pub mod icd;
mod llm;
pub mod models;
pub mod pricing;
pub mod zip;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AnalysisFailure, CostError, Result};
pub use models::{
    CategoryResult, CompleteAnalysis, CostAnalysis, CptMapping, DiagnosisCandidate, OverallRange,
    PriceQuote, PriceRange, ProcedureCategory,
};
