//! Business impact, relevance risk level and remediation priority.

use crate::models::{AssetRef, BusinessImpact, Criticality, Exposure, ImpactLevel, ThreatLevel};
use crate::scoring::MAX_RISK_SCORE;
use crate::taxonomy::Taxonomy;

/// Asset type treated as externally reachable regardless of declared exposure
pub const WEB_SERVICE_TYPE: &str = "web_service";

/// Derive business impact from the affected assets and the company's industry.
///
/// Independent of the relevance score. Reputational impact has no rule and
/// stays at its default.
pub fn assess_business_impact(
    assets: &[AssetRef],
    industry: &str,
    taxonomy: &Taxonomy,
) -> BusinessImpact {
    let mut impact = BusinessImpact::default();

    for asset in assets {
        if asset.criticality >= Criticality::High {
            impact.financial.level = ImpactLevel::High;
            impact
                .financial
                .factors
                .push(format!("{} asset affected: {}", criticality_label(asset.criticality), asset.name));
        }

        let web_service = asset
            .asset_type
            .as_deref()
            .map_or(false, |t| t.eq_ignore_ascii_case(WEB_SERVICE_TYPE));
        if asset.exposure == Exposure::External || web_service {
            impact.operational.level = ImpactLevel::High;
            impact
                .operational
                .factors
                .push(format!("Externally exposed service affected: {}", asset.name));
        }
    }

    if taxonomy.is_regulated(industry) {
        impact.regulatory.level = ImpactLevel::Medium;
        impact
            .regulatory
            .factors
            .push(format!("Regulated industry: {}", industry.trim()));
    }

    impact
}

fn criticality_label(criticality: Criticality) -> &'static str {
    match criticality {
        Criticality::Critical => "Critical",
        Criticality::High => "High-criticality",
        Criticality::Medium => "Medium-criticality",
        Criticality::Low => "Low-criticality",
    }
}

/// Blend relevance (0-1) with the feed risk score (0-10) and classify.
pub fn classify_relevance_risk(relevance_score: f64, threat_risk_score: f64) -> ThreatLevel {
    let combined = (relevance_score + threat_risk_score / MAX_RISK_SCORE) / 2.0;
    if combined >= 0.8 {
        ThreatLevel::Critical
    } else if combined >= 0.6 {
        ThreatLevel::High
    } else if combined >= 0.4 {
        ThreatLevel::Medium
    } else {
        ThreatLevel::Low
    }
}

/// Sum of the risk level weight (1-4) and the highest impact weight (1-3).
pub fn remediation_priority(risk_level: ThreatLevel, impact: &BusinessImpact) -> ThreatLevel {
    let total = risk_level.weight() + impact.max_level().weight();
    match total {
        t if t >= 6 => ThreatLevel::Critical,
        5 => ThreatLevel::High,
        3 | 4 => ThreatLevel::Medium,
        _ => ThreatLevel::Low,
    }
}
