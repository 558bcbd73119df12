//! Threat Risk & Relevance Scoring Engine
//!
//! Turns raw threat records into decision-ready annotations: composite risk
//! scores, company relevance, business impact, remediation priority, attack
//! technique correlations and threat actor attribution.

pub mod cli;
pub mod engine;
pub mod errors;
pub mod models;
pub mod relevance;
pub mod scoring;
pub mod taxonomy;
pub mod threat_intel;
pub mod utils;

pub use engine::{BatchSummary, RiskEngine, ThreatAnnotation};
pub use errors::{ScoringError, ScoringResult};
pub use relevance::RelevanceAnalyzer;
pub use taxonomy::Taxonomy;
pub use threat_intel::TechniqueMapper;
