//! Threat Intelligence Module
//!
//! Correlates free-text threat descriptions and IoCs against the technique
//! taxonomy, and resolves named threat actors against the actor registry.

mod actors;
mod ioc;

pub use actors::{ActorMatch, MatchType, ALIAS_CONFIDENCE_FACTOR};
pub use ioc::{IocClassifier, IocKind};

use crate::errors::ScoringResult;
use crate::taxonomy::{IocRule, Taxonomy, TechniqueDefinition};
use crate::utils::contains_term;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Confidence of a technique inferred from description keywords
pub const KEYWORD_MAPPING_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationSource {
    KeywordMapping,
    IocAnalysis,
}

/// Mapped attack technique result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueCorrelation {
    /// Technique ID (e.g., T1055)
    pub id: String,
    pub name: String,
    /// 0-1
    pub confidence: f64,
    pub source: CorrelationSource,
    /// Matched keywords or IoCs
    pub evidence: Vec<String>,
}

/// Technique correlation engine
#[derive(Debug, Clone)]
pub struct TechniqueMapper {
    taxonomy: Arc<Taxonomy>,
    classifier: IocClassifier,
}

impl TechniqueMapper {
    pub fn new(taxonomy: Arc<Taxonomy>) -> ScoringResult<Self> {
        Ok(Self {
            taxonomy,
            classifier: IocClassifier::new()?,
        })
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn classify_ioc(&self, ioc: &str) -> IocKind {
        self.classifier.classify(ioc)
    }

    /// Map a description and optional IoCs to techniques.
    ///
    /// Keyword hits yield at most one correlation per technique. IoC rules
    /// only add techniques not already present.
    pub fn map_to_techniques(&self, description: &str, iocs: &[String]) -> Vec<TechniqueCorrelation> {
        let text = description.to_lowercase();
        let mut correlations: Vec<TechniqueCorrelation> = self
            .taxonomy
            .techniques
            .iter()
            .filter_map(|technique| keyword_correlation(technique, &text))
            .collect();

        let rules = &self.taxonomy.ioc_rules;
        let ioc_rules = [
            (IocKind::FileHash, &rules.file_hash),
            (IocKind::IpAddress, &rules.ip_address),
            (IocKind::Url, &rules.url),
        ];

        for (kind, rule) in ioc_rules {
            let Some(rule) = rule else { continue };
            if correlations.iter().any(|c| c.id == rule.technique) {
                continue;
            }
            let evidence: Vec<String> = iocs
                .iter()
                .filter(|ioc| self.classifier.classify(ioc) == kind)
                .map(|ioc| format!("{}: {}", kind, ioc.trim()))
                .collect();
            if !evidence.is_empty() {
                correlations.push(self.ioc_correlation(rule, evidence));
            }
        }

        log::debug!(
            "Mapped description ({} chars, {} IoCs) to {} techniques",
            description.len(),
            iocs.len(),
            correlations.len()
        );
        correlations
    }

    fn ioc_correlation(&self, rule: &IocRule, evidence: Vec<String>) -> TechniqueCorrelation {
        TechniqueCorrelation {
            id: rule.technique.clone(),
            name: self
                .taxonomy
                .technique(&rule.technique)
                .map(|t| t.name.clone())
                .unwrap_or_default(),
            confidence: rule.confidence,
            source: CorrelationSource::IocAnalysis,
            evidence,
        }
    }

    /// Get technique by ID
    pub fn get_technique(&self, id: &str) -> Option<&TechniqueDefinition> {
        self.taxonomy.technique(id)
    }

    /// Get all tactics
    pub fn get_tactics(&self) -> Vec<String> {
        self.taxonomy.tactics()
    }

    /// Get techniques for a tactic
    pub fn get_techniques_for_tactic(&self, tactic: &str) -> Vec<&TechniqueDefinition> {
        self.taxonomy.techniques_for_tactic(tactic)
    }
}

fn keyword_correlation(technique: &TechniqueDefinition, text: &str) -> Option<TechniqueCorrelation> {
    let evidence: Vec<String> = technique
        .keywords
        .iter()
        .filter(|k| contains_term(text, k))
        .cloned()
        .collect();
    if evidence.is_empty() {
        return None;
    }
    Some(TechniqueCorrelation {
        id: technique.id.clone(),
        name: technique.name.clone(),
        confidence: KEYWORD_MAPPING_CONFIDENCE,
        source: CorrelationSource::KeywordMapping,
        evidence,
    })
}
