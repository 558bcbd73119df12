//! Company-Threat Relevance Module
//!
//! Scores how applicable an external threat is to one organisation across
//! four independent dimensions (industry, technology stack, geography and
//! company size), then derives affected assets, business impact and a
//! remediation priority.
//!
//! The analyzer never fails past its boundary: any internal error becomes a
//! `RelevanceAssessment::Degraded` carrying the neutral 0.5/medium fallback.

pub mod impact;

use crate::errors::{ScoringError, ScoringResult};
use crate::models::{
    AssetRef, CompanyProfile, ContextFactor, ContextFactorKind, RelevanceAssessment,
    RelevanceDetails, ThreatRecord,
};
use crate::scoring::MAX_RISK_SCORE;
use crate::taxonomy::Taxonomy;
use crate::utils::{clamp_score, contains_term, normalize};
use serde::Deserialize;
use std::sync::Arc;

/// Number of sub-analyses summed into the raw relevance total.
/// The total is divided by this to normalise into `[0, 1]`.
pub const RELEVANCE_DIMENSIONS: f64 = 4.0;

/// Increment per matched keyword, technology, location or size phrase
pub const MATCH_INCREMENT: f64 = 0.3;

/// Cap for the industry and geography sub-scores.
/// Technology matches are deliberately left uncapped.
pub const SUBSCORE_CAP: f64 = 1.0;

/// Relevance analyzer bound to one taxonomy
#[derive(Debug, Clone)]
pub struct RelevanceAnalyzer {
    taxonomy: Arc<Taxonomy>,
}

/// Accumulates matches across the four dimensions
#[derive(Debug, Default)]
struct Findings {
    affected_assets: Vec<AssetRef>,
    context_factors: Vec<ContextFactor>,
}

impl Findings {
    fn note(&mut self, kind: ContextFactorKind, description: String, contribution: f64) {
        self.context_factors.push(ContextFactor {
            kind,
            description,
            contribution,
        });
    }
}

impl RelevanceAnalyzer {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Analyse one threat against one company profile.
    pub fn analyze(&self, threat: &ThreatRecord, profile: &CompanyProfile) -> RelevanceAssessment {
        match self.try_analyze(threat, profile) {
            Ok(details) => RelevanceAssessment::Assessed(details),
            Err(e) => {
                log::warn!(
                    "Relevance analysis of '{}' degraded to neutral fallback: {}",
                    threat.title,
                    e
                );
                RelevanceAssessment::degraded(e.to_string())
            }
        }
    }

    /// Analyse untyped feed and profile documents.
    ///
    /// Documents that do not match the expected shape yield a degraded result.
    pub fn analyze_json(
        &self,
        threat: &serde_json::Value,
        profile: &serde_json::Value,
    ) -> RelevanceAssessment {
        let parsed = ThreatRecord::deserialize(threat)
            .and_then(|t| CompanyProfile::deserialize(profile).map(|p| (t, p)));

        match parsed {
            Ok((threat, profile)) => self.analyze(&threat, &profile),
            Err(e) => {
                log::warn!("Relevance input rejected: {}", e);
                RelevanceAssessment::degraded(ScoringError::from(e).to_string())
            }
        }
    }

    fn try_analyze(
        &self,
        threat: &ThreatRecord,
        profile: &CompanyProfile,
    ) -> ScoringResult<RelevanceDetails> {
        let risk_score = threat_risk_score(threat)?;
        let text = threat.text();
        let mut findings = Findings::default();

        let industry = self.industry_relevance(&text, profile, &mut findings);
        let technology = technology_relevance(threat, &text, profile, &mut findings);
        let geography = geographic_relevance(threat, &text, profile, &mut findings);
        let size = self.size_relevance(&text, profile, &mut findings);

        let total = industry + technology + geography + size;
        let relevance_score = clamp_score(total / RELEVANCE_DIMENSIONS, 0.0, 1.0);

        log::debug!(
            "Relevance of '{}': industry={:.2} technology={:.2} geography={:.2} size={:.2} -> {:.3}",
            threat.title,
            industry,
            technology,
            geography,
            size,
            relevance_score
        );

        let business_impact =
            impact::assess_business_impact(&findings.affected_assets, &profile.industry, &self.taxonomy);
        let risk_level = impact::classify_relevance_risk(relevance_score, risk_score);
        let remediation_priority = impact::remediation_priority(risk_level, &business_impact);

        Ok(RelevanceDetails {
            relevance_score,
            risk_level,
            affected_assets: findings.affected_assets,
            business_impact,
            remediation_priority,
            context_factors: findings.context_factors,
        })
    }

    fn industry_relevance(&self, text: &str, profile: &CompanyProfile, findings: &mut Findings) -> f64 {
        let keywords = self.taxonomy.industry_keywords(&profile.industry);
        let matches: Vec<&String> = keywords.iter().filter(|k| contains_term(text, k)).collect();
        if matches.is_empty() {
            return 0.0;
        }

        let score = (matches.len() as f64 * MATCH_INCREMENT).min(SUBSCORE_CAP);
        findings.note(
            ContextFactorKind::Industry,
            format!(
                "Industry-specific threat for {} ({})",
                profile.industry,
                matches.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ")
            ),
            score,
        );
        score
    }

    fn size_relevance(&self, text: &str, profile: &CompanyProfile, findings: &mut Findings) -> f64 {
        let phrases = self.taxonomy.size_phrases(&profile.company_size);
        match phrases.iter().find(|p| contains_term(text, p)) {
            Some(phrase) => {
                findings.note(
                    ContextFactorKind::Size,
                    format!("Targets {} organizations ('{}')", profile.company_size, phrase),
                    MATCH_INCREMENT,
                );
                MATCH_INCREMENT
            }
            None => 0.0,
        }
    }
}

fn threat_risk_score(threat: &ThreatRecord) -> ScoringResult<f64> {
    match threat.risk_score {
        None => Ok(0.0),
        Some(score) if score.is_finite() => Ok(clamp_score(score, 0.0, MAX_RISK_SCORE)),
        Some(score) => Err(ScoringError::invalid_input(format!(
            "non-finite threat risk score {}",
            score
        ))),
    }
}

/// Each stack entry named in the affected systems or the threat text adds
/// `MATCH_INCREMENT` and becomes an affected asset.
fn technology_relevance(
    threat: &ThreatRecord,
    text: &str,
    profile: &CompanyProfile,
    findings: &mut Findings,
) -> f64 {
    let affected: Vec<String> = threat.affected_systems.iter().map(|s| s.to_lowercase()).collect();
    let mut score = 0.0;

    for entry in &profile.technology_stack {
        let name = entry.name();
        if normalize(name).is_empty() {
            continue;
        }
        let in_affected = affected.iter().any(|system| contains_term(system, name));
        if !in_affected && !contains_term(text, name) {
            continue;
        }

        score += MATCH_INCREMENT;
        findings.affected_assets.push(entry.to_asset_ref());
        findings.note(
            ContextFactorKind::Technology,
            format!("Uses affected technology {}", name.trim()),
            MATCH_INCREMENT,
        );
    }

    score
}

fn geographic_relevance(
    threat: &ThreatRecord,
    text: &str,
    profile: &CompanyProfile,
    findings: &mut Findings,
) -> f64 {
    let targeted: Vec<String> = threat
        .targeted_countries
        .iter()
        .chain(threat.geolocation.countries.iter())
        .map(|c| normalize(c))
        .collect();
    let mut score = 0.0;

    for location in profile.locations() {
        let wanted = normalize(location);
        if !contains_term(text, location) && !targeted.contains(&wanted) {
            continue;
        }
        score += MATCH_INCREMENT;
        findings.note(
            ContextFactorKind::Geography,
            format!("Threat targets {}", location.trim()),
            MATCH_INCREMENT,
        );
    }

    score.min(SUBSCORE_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Criticality, ImpactLevel, TechnologyEntry, ThreatLevel};
    use serde_json::json;

    fn analyzer() -> RelevanceAnalyzer {
        RelevanceAnalyzer::new(Arc::new(Taxonomy::builtin()))
    }

    fn bank_profile() -> CompanyProfile {
        serde_json::from_value(json!({
            "industry": "financial",
            "technologyStack": [
                { "name": "Windows Server", "criticality": "critical", "exposure": "internal" },
                { "name": "Apache", "type": "web_service" }
            ],
            "country": "Germany",
            "region": "Europe",
            "companySize": "large"
        }))
        .unwrap()
    }

    #[test]
    fn test_full_relevance_analysis() {
        let threat = ThreatRecord {
            title: "SWIFT attack campaign".to_string(),
            description: "Banking trojan targets Windows Server hosts at enterprise banks in Germany"
                .to_string(),
            risk_score: Some(9.0),
            affected_systems: vec!["Windows Server 2019".to_string()],
            ..Default::default()
        };

        let assessment = analyzer().analyze(&threat, &bank_profile());
        let details = assessment.details().expect("assessed");

        // industry 0.6 + technology 0.3 + geography 0.3 + size 0.3
        assert!((details.relevance_score - 0.375).abs() < 1e-9);
        assert_eq!(details.risk_level, ThreatLevel::High);
        assert_eq!(details.affected_assets.len(), 1);
        assert_eq!(details.affected_assets[0].name, "Windows Server");
        assert_eq!(details.affected_assets[0].criticality, Criticality::Critical);
        assert_eq!(details.business_impact.financial.level, ImpactLevel::High);
        assert_eq!(details.business_impact.operational.level, ImpactLevel::Low);
        assert_eq!(details.business_impact.regulatory.level, ImpactLevel::Medium);
        assert_eq!(details.remediation_priority, ThreatLevel::Critical);

        let kinds: Vec<ContextFactorKind> = details.context_factors.iter().map(|f| f.kind).collect();
        assert!(kinds.contains(&ContextFactorKind::Industry));
        assert!(kinds.contains(&ContextFactorKind::Technology));
        assert!(kinds.contains(&ContextFactorKind::Geography));
        assert!(kinds.contains(&ContextFactorKind::Size));
    }

    #[test]
    fn test_irrelevant_threat_scores_zero() {
        let profile = CompanyProfile {
            industry: "financial".to_string(),
            country: "Germany".to_string(),
            company_size: "large".to_string(),
            ..Default::default()
        };

        for (risk, expected) in [(9.0, ThreatLevel::Medium), (6.0, ThreatLevel::Low), (10.0, ThreatLevel::Medium)] {
            let threat = ThreatRecord {
                title: "Generic malware update".to_string(),
                description: "New variant observed in the wild".to_string(),
                risk_score: Some(risk),
                ..Default::default()
            };
            let assessment = analyzer().analyze(&threat, &profile);
            let details = assessment.details().unwrap();
            assert_eq!(details.relevance_score, 0.0);
            assert_eq!(details.risk_level, expected, "riskScore {}", risk);
            assert!(details.affected_assets.is_empty());
            assert!(details.context_factors.is_empty());
        }
    }

    #[test]
    fn test_technology_matches_are_uncapped_before_normalization() {
        let names = [
            "Exchange", "Outlook", "SharePoint", "Teams", "Active Directory", "IIS", "Defender",
            "PowerShell", "SQL Server", "Hyper-V", "OneDrive", "Intune", "Entra", "Azure",
        ];
        let profile = CompanyProfile {
            technology_stack: names.iter().map(|n| TechnologyEntry::from(*n)).collect(),
            ..Default::default()
        };
        let threat = ThreatRecord {
            title: "Mass exploitation".to_string(),
            affected_systems: names.iter().map(|n| n.to_string()).collect(),
            risk_score: Some(5.0),
            ..Default::default()
        };

        let assessment = analyzer().analyze(&threat, &profile);
        let details = assessment.details().unwrap();
        // 14 * 0.3 = 4.2 raw, 1.05 after the divide, clamped to 1
        assert_eq!(details.relevance_score, 1.0);
        assert_eq!(details.affected_assets.len(), names.len());
    }

    #[test]
    fn test_geography_uses_targeted_country_lists() {
        let profile = CompanyProfile {
            country: "Japan".to_string(),
            region: "APAC".to_string(),
            subsidiary_locations: vec!["Brazil".to_string()],
            ..Default::default()
        };
        let threat = ThreatRecord {
            title: "Regional campaign".to_string(),
            targeted_countries: vec!["JAPAN".to_string()],
            geolocation: crate::models::Geolocation {
                countries: vec!["brazil".to_string()],
            },
            ..Default::default()
        };

        let assessment = analyzer().analyze(&threat, &profile);
        let details = assessment.details().unwrap();
        // two location matches
        assert!((details.relevance_score - 0.15).abs() < 1e-9);
        assert_eq!(
            details
                .context_factors
                .iter()
                .filter(|f| f.kind == ContextFactorKind::Geography)
                .count(),
            2
        );
    }

    #[test]
    fn test_industry_capped_at_one() {
        let profile = CompanyProfile {
            industry: "Financial".to_string(),
            ..Default::default()
        };
        let threat = ThreatRecord {
            title: "Banking trojan and ATM malware".to_string(),
            description: "Payment fraud, SWIFT attack and card skimming at a financial institution".to_string(),
            ..Default::default()
        };
        let assessment = analyzer().analyze(&threat, &profile);
        // six keyword hits, capped at 1.0 before the divide
        assert!((assessment.relevance_score() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_blank_technology_names_are_ignored() {
        let profile = CompanyProfile {
            technology_stack: vec![TechnologyEntry::from("  "), TechnologyEntry::from("")],
            ..Default::default()
        };
        let threat = ThreatRecord {
            title: "Anything".to_string(),
            affected_systems: vec!["Linux".to_string()],
            ..Default::default()
        };
        let assessment = analyzer().analyze(&threat, &profile);
        assert!(assessment.details().unwrap().affected_assets.is_empty());
    }

    #[test]
    fn test_non_finite_risk_score_degrades() {
        let threat = ThreatRecord {
            title: "Broken feed item".to_string(),
            risk_score: Some(f64::NAN),
            ..Default::default()
        };
        let assessment = analyzer().analyze(&threat, &bank_profile());
        assert_eq!(assessment.relevance_score(), 0.5);
        assert_eq!(assessment.risk_level(), ThreatLevel::Medium);
        assert!(assessment.error().unwrap().contains("non-finite"));
    }

    #[test]
    fn test_out_of_range_risk_score_is_clamped() {
        let threat = ThreatRecord {
            title: "Overflowing severity".to_string(),
            risk_score: Some(45.0),
            ..Default::default()
        };
        let assessment = analyzer().analyze(&threat, &CompanyProfile::default());
        // combined = (0 + 1.0) / 2
        assert_eq!(assessment.risk_level(), ThreatLevel::Medium);
    }

    #[test]
    fn test_analyze_json_degrades_on_unexpected_types() {
        let threat = json!({ "title": "Feed item", "riskScore": 7 });

        let bad_stack = json!({ "industry": "retail", "technologyStack": 42 });
        let assessment = analyzer().analyze_json(&threat, &bad_stack);
        assert!(assessment.error().is_some());
        assert_eq!(assessment.relevance_score(), 0.5);

        let bad_label_type = json!({
            "technologyStack": [{ "name": "Nginx", "criticality": 5 }]
        });
        assert!(analyzer().analyze_json(&threat, &bad_label_type).error().is_some());

        let bad_threat = json!({ "title": ["not", "a", "string"] });
        assert!(analyzer().analyze_json(&bad_threat, &json!({})).error().is_some());
    }

    #[test]
    fn test_analyze_json_recovers_unrecognised_stack_labels() {
        let threat = json!({ "title": "Apache servers exploited in the wild", "riskScore": 7 });
        let profile = json!({
            "industry": "retail",
            "technologyStack": [
                { "name": "Apache", "criticality": "High", "exposure": "public" },
                { "name": "Nginx", "criticality": "extreme" },
                { "type": "web_service" }
            ]
        });

        let assessment = analyzer().analyze_json(&threat, &profile);
        assert!(assessment.error().is_none());
        let details = assessment.details().expect("assessed");
        assert_eq!(details.affected_assets.len(), 1);
        let apache = &details.affected_assets[0];
        assert_eq!(apache.name, "Apache");
        assert_eq!(apache.criticality, crate::models::Criticality::High);
        assert_eq!(apache.exposure, crate::models::Exposure::External);
        assert_eq!(details.business_impact.financial.level, ImpactLevel::High);
        assert_eq!(details.business_impact.operational.level, ImpactLevel::High);
    }

    #[test]
    fn test_analyze_json_accepts_partial_documents() {
        let threat = json!({ "title": "Ransomware hits hospital networks", "riskScore": 8 });
        let profile = json!({ "industry": "healthcare" });
        let assessment = analyzer().analyze_json(&threat, &profile);
        let details = assessment.details().expect("assessed");
        // "hospital" keyword only
        assert!((details.relevance_score - 0.075).abs() < 1e-9);
        assert_eq!(details.business_impact.regulatory.level, ImpactLevel::Medium);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let threat = ThreatRecord {
            title: "SWIFT attack".to_string(),
            description: "Apache servers in Germany".to_string(),
            risk_score: Some(7.0),
            ..Default::default()
        };
        let first = serde_json::to_string(&analyzer().analyze(&threat, &bank_profile())).unwrap();
        let second = serde_json::to_string(&analyzer().analyze(&threat, &bank_profile())).unwrap();
        assert_eq!(first, second);
    }
}
