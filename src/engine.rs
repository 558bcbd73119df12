//! Engine facade
//!
//! Binds the scoring components to one taxonomy so callers can annotate a
//! single threat or a batch of threats in one call. Every operation is a pure
//! function of its inputs; batches fan out over rayon and keep input order.

use crate::errors::{ScoringError, ScoringResult};
use crate::models::{
    CompanyProfile, RelevanceAssessment, RiskAssessment, ScoredRiskFactor, ThreatLevel, ThreatRecord,
};
use crate::relevance::RelevanceAnalyzer;
use crate::scoring;
use crate::taxonomy::Taxonomy;
use crate::threat_intel::{ActorMatch, TechniqueCorrelation, TechniqueMapper};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything the engine derives about one threat for one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatAnnotation {
    pub title: String,
    pub relevance: RelevanceAssessment,
    pub techniques: Vec<TechniqueCorrelation>,
}

/// Per-level counts over a batch of annotations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub degraded: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl BatchSummary {
    /// Count remediation priorities; degraded results are counted apart.
    pub fn from_annotations(annotations: &[ThreatAnnotation]) -> Self {
        let mut summary = BatchSummary {
            total: annotations.len(),
            ..Default::default()
        };
        for annotation in annotations {
            let Some(details) = annotation.relevance.details() else {
                summary.degraded += 1;
                continue;
            };
            match details.remediation_priority {
                ThreatLevel::Low => summary.low += 1,
                ThreatLevel::Medium => summary.medium += 1,
                ThreatLevel::High => summary.high += 1,
                ThreatLevel::Critical => summary.critical += 1,
            }
        }
        summary
    }
}

pub struct RiskEngine {
    taxonomy: Arc<Taxonomy>,
    relevance: RelevanceAnalyzer,
    mapper: TechniqueMapper,
}

impl RiskEngine {
    pub fn new(taxonomy: Arc<Taxonomy>) -> ScoringResult<Self> {
        log::debug!("Initializing risk engine with taxonomy {}", taxonomy.version);
        Ok(Self {
            relevance: RelevanceAnalyzer::new(Arc::clone(&taxonomy)),
            mapper: TechniqueMapper::new(Arc::clone(&taxonomy))?,
            taxonomy,
        })
    }

    /// Engine over the compiled-in taxonomy
    pub fn builtin() -> ScoringResult<Self> {
        Self::new(Arc::new(Taxonomy::builtin()))
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn relevance(&self) -> &RelevanceAnalyzer {
        &self.relevance
    }

    pub fn mapper(&self) -> &TechniqueMapper {
        &self.mapper
    }

    pub fn assess_threat(&self, threat: &ThreatRecord, profile: &CompanyProfile) -> ThreatAnnotation {
        let text = format!("{} {}", threat.title, threat.description);
        ThreatAnnotation {
            title: threat.title.clone(),
            relevance: self.relevance.analyze(threat, profile),
            techniques: self.mapper.map_to_techniques(&text, &[]),
        }
    }

    /// Annotate many threats in parallel; output order matches input order.
    pub fn assess_batch(&self, threats: &[ThreatRecord], profile: &CompanyProfile) -> Vec<ThreatAnnotation> {
        log::info!("Assessing {} threats for {} profile", threats.len(), profile.industry);
        threats
            .par_iter()
            .map(|threat| self.assess_threat(threat, profile))
            .collect()
    }

    /// Annotate an untyped feed record. A record that does not deserialize
    /// yields a degraded annotation with no techniques.
    pub fn assess_value(&self, threat: &serde_json::Value, profile: &CompanyProfile) -> ThreatAnnotation {
        match ThreatRecord::deserialize(threat) {
            Ok(record) => self.assess_threat(&record, profile),
            Err(e) => {
                log::warn!("Threat record rejected: {}", e);
                ThreatAnnotation {
                    title: threat
                        .get("title")
                        .and_then(serde_json::Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    relevance: RelevanceAssessment::degraded(ScoringError::from(e).to_string()),
                    techniques: Vec::new(),
                }
            }
        }
    }

    /// Parallel `assess_value`; output order matches input order.
    pub fn assess_value_batch(
        &self,
        threats: &[serde_json::Value],
        profile: &CompanyProfile,
    ) -> Vec<ThreatAnnotation> {
        log::info!("Assessing {} raw threat records for {} profile", threats.len(), profile.industry);
        threats
            .par_iter()
            .map(|threat| self.assess_value(threat, profile))
            .collect()
    }

    pub fn composite_risk(&self, factors: &[ScoredRiskFactor]) -> RiskAssessment {
        scoring::composite_risk(factors)
    }

    pub fn map_to_techniques(&self, description: &str, iocs: &[String]) -> Vec<TechniqueCorrelation> {
        self.mapper.map_to_techniques(description, iocs)
    }

    pub fn match_actor(&self, name: &str) -> ActorMatch {
        self.mapper.match_actor(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> CompanyProfile {
        serde_json::from_value(serde_json::json!({
            "industry": "healthcare",
            "technologyStack": [{ "name": "Citrix", "exposure": "external", "criticality": "high" }],
            "country": "United States",
            "companySize": "large"
        }))
        .unwrap()
    }

    fn threats() -> Vec<ThreatRecord> {
        vec![
            ThreatRecord {
                title: "Ransomware hits hospital Citrix gateways".to_string(),
                description: "Operators exploit Citrix appliances, then encrypt patient data across the United States"
                    .to_string(),
                risk_score: Some(9.5),
                affected_systems: vec!["Citrix ADC".to_string()],
                ..Default::default()
            },
            ThreatRecord {
                title: "Phishing kit sold on forums".to_string(),
                risk_score: Some(3.0),
                ..Default::default()
            },
            ThreatRecord {
                title: "Corrupted feed item".to_string(),
                risk_score: Some(f64::INFINITY),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_assess_threat_combines_components() {
        let engine = RiskEngine::builtin().unwrap();
        let annotation = engine.assess_threat(&threats()[0], &profile());

        assert_eq!(annotation.title, "Ransomware hits hospital Citrix gateways");
        let details = annotation.relevance.details().unwrap();
        assert_eq!(details.affected_assets.len(), 1);
        assert_eq!(details.remediation_priority, ThreatLevel::Critical);
        assert!(annotation.techniques.iter().any(|t| t.id == "T1486"));
        assert!(annotation.techniques.iter().any(|t| t.id == "T1133"));
    }

    #[test]
    fn test_batch_preserves_order_and_matches_sequential() {
        let engine = RiskEngine::builtin().unwrap();
        let threats = threats();
        let profile = profile();

        let batch = engine.assess_batch(&threats, &profile);
        let sequential: Vec<ThreatAnnotation> =
            threats.iter().map(|t| engine.assess_threat(t, &profile)).collect();

        assert_eq!(batch.len(), threats.len());
        assert_eq!(batch, sequential);
        assert_eq!(batch[2].title, "Corrupted feed item");
    }

    #[test]
    fn test_batch_summary() {
        let engine = RiskEngine::builtin().unwrap();
        let batch = engine.assess_batch(&threats(), &profile());
        let summary = BatchSummary::from_annotations(&batch);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.degraded, 1);
        assert_eq!(summary.critical, 1);
        assert_eq!(
            summary.low + summary.medium + summary.high + summary.critical + summary.degraded,
            summary.total
        );
    }

    #[test]
    fn test_assess_value_degrades_only_the_bad_record() {
        let engine = RiskEngine::builtin().unwrap();
        let records = vec![
            serde_json::json!({ "title": "Ransomware hits hospital Citrix gateways", "riskScore": 9.5 }),
            serde_json::json!({ "title": 5, "riskScore": 3 }),
            serde_json::json!({ "title": "Phishing kit sold on forums", "riskScore": "high" }),
        ];

        let batch = engine.assess_value_batch(&records, &profile());
        assert_eq!(batch.len(), 3);
        assert!(batch[0].relevance.details().is_some());
        assert!(!batch[0].techniques.is_empty());

        assert!(batch[1].relevance.error().is_some());
        assert_eq!(batch[1].title, "");
        assert!(batch[1].techniques.is_empty());

        assert_eq!(batch[2].title, "Phishing kit sold on forums");
        assert_eq!(batch[2].relevance.relevance_score(), 0.5);
    }

    #[test]
    fn test_pass_throughs() {
        let engine = RiskEngine::builtin().unwrap();
        assert_eq!(engine.composite_risk(&[]), RiskAssessment::unknown());
        assert_eq!(engine.match_actor("Carbanak").name, "FIN7");
        assert!(!engine.map_to_techniques("mimikatz", &[]).is_empty());
        assert_eq!(engine.taxonomy().version, "builtin-1");
    }
}
