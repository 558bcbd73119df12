//! Composite risk aggregation and classification.

use crate::models::{ClassifiedRisk, RiskAssessment, RiskLevel, ScoredRiskFactor};
use crate::utils::{clamp_score, finite_or_zero};
use serde::{Deserialize, Serialize};

use super::MAX_RISK_SCORE;

pub const CRITICAL_THRESHOLD: f64 = 8.5;
pub const HIGH_THRESHOLD: f64 = 7.0;
pub const MEDIUM_THRESHOLD: f64 = 4.0;
pub const LOW_THRESHOLD: f64 = 2.0;

/// Data quality assumed for a factor that does not report one
pub const DEFAULT_DATA_QUALITY: f64 = 50.0;

/// Classify a 0-10 score. Bands are closed at their lower bound.
pub fn classify_score(score: f64) -> RiskLevel {
    if score >= CRITICAL_THRESHOLD {
        RiskLevel::Critical
    } else if score >= HIGH_THRESHOLD {
        RiskLevel::High
    } else if score >= MEDIUM_THRESHOLD {
        RiskLevel::Medium
    } else if score >= LOW_THRESHOLD {
        RiskLevel::Low
    } else {
        RiskLevel::Minimal
    }
}

/// Aggregate scored factors into one weighted composite assessment.
///
/// An empty list yields `RiskAssessment::unknown()`.
pub fn composite_risk(factors: &[ScoredRiskFactor]) -> RiskAssessment {
    if factors.is_empty() {
        return RiskAssessment::unknown();
    }

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut quality_sum = 0.0;
    let mut scored = 0usize;

    for factor in factors {
        // Unweighted factors count as weight 1
        let weight = match factor.weight {
            Some(w) if w.is_finite() => w,
            _ => 1.0,
        };
        if factor.score.map_or(false, f64::is_finite) {
            scored += 1;
        }
        weighted_sum += finite_or_zero(factor.score) * weight;
        total_weight += weight;
        quality_sum += match factor.data_quality {
            Some(q) if q.is_finite() => q,
            _ => DEFAULT_DATA_QUALITY,
        };
    }

    let raw_score = if total_weight != 0.0 {
        weighted_sum / total_weight
    } else {
        0.0
    };
    let composite_score = clamp_score(raw_score, 0.0, MAX_RISK_SCORE);

    let count = factors.len() as f64;
    let avg_data_quality = quality_sum / count;
    let completeness = scored as f64 / count;
    let confidence = clamp_score(avg_data_quality * completeness, 0.0, 100.0);

    log::debug!(
        "Composite risk over {} factors: score={:.3} confidence={:.1}",
        factors.len(),
        composite_score,
        confidence
    );

    RiskAssessment::Classified(ClassifiedRisk {
        composite_score,
        level: classify_score(composite_score),
        confidence,
        factors: factors.to_vec(),
    })
}

/// Count of assessments per level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelBreakdown {
    pub unknown: usize,
    pub minimal: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

/// Calculate the breakdown of risk levels across assessments
pub fn risk_breakdown(assessments: &[RiskAssessment]) -> LevelBreakdown {
    let mut breakdown = LevelBreakdown::default();

    for assessment in assessments {
        match assessment.level() {
            None => breakdown.unknown += 1,
            Some(RiskLevel::Minimal) => breakdown.minimal += 1,
            Some(RiskLevel::Low) => breakdown.low += 1,
            Some(RiskLevel::Medium) => breakdown.medium += 1,
            Some(RiskLevel::High) => breakdown.high += 1,
            Some(RiskLevel::Critical) => breakdown.critical += 1,
        }
    }

    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_unknown() {
        let assessment = composite_risk(&[]);
        assert_eq!(assessment, RiskAssessment::unknown());
        assert_eq!(assessment.score(), 0.0);
        assert_eq!(assessment.level(), None);
        assert!(assessment.factors().is_empty());
    }

    #[test]
    fn test_single_critical_factor() {
        let assessment = composite_risk(&[ScoredRiskFactor::new(9.0, 1.0, 100.0)]);
        assert_eq!(assessment.score(), 9.0);
        assert_eq!(assessment.level(), Some(RiskLevel::Critical));
        assert_eq!(assessment.confidence(), 100.0);
        assert_eq!(assessment.factors().len(), 1);
    }

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(classify_score(8.5), RiskLevel::Critical);
        assert_eq!(classify_score(8.4999), RiskLevel::High);
        assert_eq!(classify_score(7.0), RiskLevel::High);
        assert_eq!(classify_score(6.999), RiskLevel::Medium);
        assert_eq!(classify_score(4.0), RiskLevel::Medium);
        assert_eq!(classify_score(3.999), RiskLevel::Low);
        assert_eq!(classify_score(2.0), RiskLevel::Low);
        assert_eq!(classify_score(1.999), RiskLevel::Minimal);
        assert_eq!(classify_score(0.0), RiskLevel::Minimal);
    }

    #[test]
    fn test_weighted_average() {
        let assessment = composite_risk(&[
            ScoredRiskFactor::new(8.0, 3.0, 80.0),
            ScoredRiskFactor::new(4.0, 1.0, 60.0),
        ]);
        // (24 + 4) / 4
        assert!((assessment.score() - 7.0).abs() < 1e-9);
        assert_eq!(assessment.level(), Some(RiskLevel::High));
        assert!((assessment.confidence() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_weight_counts_as_one() {
        let unweighted = ScoredRiskFactor {
            score: Some(2.0),
            weight: None,
            data_quality: Some(100.0),
        };
        let assessment = composite_risk(&[unweighted, ScoredRiskFactor::new(6.0, 1.0, 100.0)]);
        assert!((assessment.score() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_uses_defaults_and_completeness() {
        let assessment = composite_risk(&[
            ScoredRiskFactor {
                score: Some(5.0),
                weight: None,
                data_quality: None,
            },
            ScoredRiskFactor {
                score: None,
                weight: None,
                data_quality: Some(90.0),
            },
        ]);
        // avg quality (50 + 90) / 2 = 70, completeness 0.5
        assert!((assessment.confidence() - 35.0).abs() < 1e-9);
        assert!((assessment.score() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_total_weight_scores_zero() {
        let assessment = composite_risk(&[ScoredRiskFactor::new(9.0, 0.0, 100.0)]);
        assert_eq!(assessment.score(), 0.0);
        assert_eq!(assessment.level(), Some(RiskLevel::Minimal));
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let assessment = composite_risk(&[ScoredRiskFactor::new(42.0, 1.0, 250.0)]);
        assert_eq!(assessment.score(), 10.0);
        assert_eq!(assessment.confidence(), 100.0);

        let assessment = composite_risk(&[ScoredRiskFactor::new(-3.0, 1.0, -10.0)]);
        assert_eq!(assessment.score(), 0.0);
        assert_eq!(assessment.confidence(), 0.0);
    }

    #[test]
    fn test_risk_breakdown() {
        let assessments = vec![
            composite_risk(&[]),
            composite_risk(&[ScoredRiskFactor::new(9.0, 1.0, 100.0)]),
            composite_risk(&[ScoredRiskFactor::new(9.5, 1.0, 100.0)]),
            composite_risk(&[ScoredRiskFactor::new(1.0, 1.0, 100.0)]),
        ];
        let breakdown = risk_breakdown(&assessments);
        assert_eq!(breakdown.unknown, 1);
        assert_eq!(breakdown.critical, 2);
        assert_eq!(breakdown.minimal, 1);
        assert_eq!(breakdown.high, 0);
    }

    #[test]
    fn test_composite_is_deterministic() {
        let factors = vec![
            ScoredRiskFactor::new(3.3, 0.7, 40.0),
            ScoredRiskFactor::new(7.7, 0.3, 90.0),
        ];
        let first = serde_json::to_string(&composite_risk(&factors)).unwrap();
        let second = serde_json::to_string(&composite_risk(&factors)).unwrap();
        assert_eq!(first, second);
    }
}
