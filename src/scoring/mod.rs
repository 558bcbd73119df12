//! Risk Scoring Module
//!
//! Turns raw numeric risk factors into normalised sub-scores:
//! - `weighted_risk_score`: five-factor weighted sum on a 0-10 scale
//! - `annual_loss_expectancy`: monetary ALE, unbounded
//! - `cvss_adjusted_risk`: CVSS base score scaled by context modifiers
//!
//! Composite aggregation and classification live in `composite`.

pub mod composite;

pub use composite::{classify_score, composite_risk, risk_breakdown, LevelBreakdown};

use crate::models::{RiskFactorInput, RiskWeights};
use crate::utils::{clamp_score, finite_or_zero};
use serde::{Deserialize, Serialize};

/// Upper bound of every 0-10 risk score
pub const MAX_RISK_SCORE: f64 = 10.0;

/// Weighted sum of the five standard factors, clamped to `[0, 10]`.
///
/// Weights are used as given; a set that does not sum to 1 is not rescaled.
pub fn weighted_risk_score(factors: &RiskFactorInput, weights: &RiskWeights) -> f64 {
    let terms = [
        (factors.probability, weights.probability),
        (factors.impact, weights.impact),
        (factors.velocity, weights.velocity),
        (factors.detectability, weights.detectability),
        (factors.controllability, weights.controllability),
    ];

    let score: f64 = terms
        .iter()
        .map(|(value, weight)| finite_or_zero(*value) * finite_or_zero(Some(*weight)))
        .sum();

    clamp_score(score, 0.0, MAX_RISK_SCORE)
}

/// `asset_value * exposure_factor * annual_rate_of_occurrence`.
///
/// Missing inputs count as zero. Monetary magnitude is not clamped.
pub fn annual_loss_expectancy(
    asset_value: Option<f64>,
    exposure_factor: Option<f64>,
    annual_rate_of_occurrence: Option<f64>,
) -> f64 {
    let ale = finite_or_zero(asset_value)
        * finite_or_zero(exposure_factor)
        * finite_or_zero(annual_rate_of_occurrence);
    if ale.is_finite() {
        ale
    } else {
        0.0
    }
}

/// Context multipliers applied to a CVSS base score. Expected to be >= 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvssModifiers {
    pub exploitability: f64,
    pub business_criticality: f64,
    pub environmental_modifier: f64,
}

impl Default for CvssModifiers {
    fn default() -> Self {
        Self {
            exploitability: 1.0,
            business_criticality: 1.0,
            environmental_modifier: 1.0,
        }
    }
}

/// CVSS base score times the three modifiers, capped at 10.
///
/// Only the upper bound is enforced; negative modifiers are a caller error.
pub fn cvss_adjusted_risk(cvss_score: f64, modifiers: &CvssModifiers) -> f64 {
    let adjusted = finite_or_zero(Some(cvss_score))
        * finite_or_zero(Some(modifiers.exploitability))
        * finite_or_zero(Some(modifiers.business_criticality))
        * finite_or_zero(Some(modifiers.environmental_modifier));
    if adjusted.is_nan() {
        return 0.0;
    }
    adjusted.min(MAX_RISK_SCORE)
}

/// CVSS v3 qualitative severity rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CvssSeverity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

pub fn cvss_severity(score: f64) -> CvssSeverity {
    let score = finite_or_zero(Some(score));
    if score < 0.1 {
        CvssSeverity::None
    } else if score < 4.0 {
        CvssSeverity::Low
    } else if score < 7.0 {
        CvssSeverity::Medium
    } else if score < 9.0 {
        CvssSeverity::High
    } else {
        CvssSeverity::Critical
    }
}
