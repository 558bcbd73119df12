//! Threat Taxonomy
//!
//! Versioned lookup tables consumed by the scoring components: the technique
//! keyword taxonomy, IOC shape rules, the known-actor registry and the
//! industry/company-size phrase sets. Tables ship compiled in (`builtin`) and
//! can be replaced from a JSON or TOML file without touching the algorithms.

mod builtin;

use crate::errors::{ScoringError, ScoringResult};
use crate::utils::normalize;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// Environment variable naming a taxonomy file to load instead of the builtin tables
pub const ENV_TAXONOMY_PATH: &str = "THREATSCORE_TAXONOMY";

/// Technique definition with the phrases that indicate it in free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueDefinition {
    /// Technique ID (e.g., T1055)
    pub id: String,
    pub name: String,
    /// Parent tactic (e.g., Defense Evasion)
    pub tactic: String,
    pub keywords: Vec<String>,
}

/// Technique added when an IOC of a given shape is present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IocRule {
    pub technique: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IocRules {
    pub file_hash: Option<IocRule>,
    pub ip_address: Option<IocRule>,
    pub url: Option<IocRule>,
}

/// Known threat actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatActor {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Attribution confidence for a direct name match (0-1)
    pub confidence: f64,
    #[serde(default)]
    pub techniques: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taxonomy {
    pub version: String,
    pub techniques: Vec<TechniqueDefinition>,
    #[serde(default)]
    pub ioc_rules: IocRules,
    #[serde(default)]
    pub actors: Vec<ThreatActor>,
    /// Industry -> indicative keywords
    #[serde(default)]
    pub industries: BTreeMap<String, Vec<String>>,
    /// Company size -> indicative phrases
    #[serde(default)]
    pub company_sizes: BTreeMap<String, Vec<String>>,
    /// Industries whose exposure raises regulatory impact
    #[serde(default)]
    pub regulated_industries: Vec<String>,
}

impl Taxonomy {
    /// Compiled-in default tables
    pub fn builtin() -> Self {
        builtin::builtin_taxonomy()
    }

    pub fn from_json_str(content: &str) -> ScoringResult<Self> {
        let taxonomy: Taxonomy = serde_json::from_str(content)?;
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    pub fn from_toml_str(content: &str) -> ScoringResult<Self> {
        let taxonomy: Taxonomy = toml::from_str(content)?;
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    /// Load from a `.toml` file, or JSON for any other extension.
    pub fn load_from(path: &Path) -> ScoringResult<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| ScoringError::io(e, path.to_path_buf()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let taxonomy = if ext == "toml" {
            Self::from_toml_str(&content)?
        } else {
            Self::from_json_str(&content)?
        };

        log::info!(
            "Loaded taxonomy {} from {} ({} techniques, {} actors)",
            taxonomy.version,
            path.display(),
            taxonomy.techniques.len(),
            taxonomy.actors.len()
        );
        Ok(taxonomy)
    }

    /// `$THREATSCORE_TAXONOMY` when set, builtin tables otherwise.
    pub fn load_default() -> ScoringResult<Self> {
        match std::env::var(ENV_TAXONOMY_PATH) {
            Ok(p) if !p.trim().is_empty() => Self::load_from(Path::new(&p)),
            _ => Ok(Self::builtin()),
        }
    }

    pub fn validate(&self) -> ScoringResult<()> {
        if self.version.trim().is_empty() {
            return Err(ScoringError::invalid_taxonomy("version must not be empty"));
        }

        let mut seen = HashSet::new();
        for technique in &self.techniques {
            if technique.id.trim().is_empty() {
                return Err(ScoringError::invalid_taxonomy("technique with empty id"));
            }
            if !seen.insert(technique.id.as_str()) {
                return Err(ScoringError::invalid_taxonomy(format!(
                    "duplicate technique id {}",
                    technique.id
                )));
            }
            if technique.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(ScoringError::invalid_taxonomy(format!(
                    "technique {} has no keywords",
                    technique.id
                )));
            }
        }

        let rules = [
            ("fileHash", &self.ioc_rules.file_hash),
            ("ipAddress", &self.ioc_rules.ip_address),
            ("url", &self.ioc_rules.url),
        ];
        for (label, rule) in rules {
            if let Some(rule) = rule {
                if rule.technique.trim().is_empty() {
                    return Err(ScoringError::invalid_taxonomy(format!(
                        "IOC rule {} has no technique",
                        label
                    )));
                }
                check_confidence(&format!("IOC rule {}", label), rule.confidence)?;
            }
        }

        for actor in &self.actors {
            if actor.name.trim().is_empty() {
                return Err(ScoringError::invalid_taxonomy("actor with empty name"));
            }
            check_confidence(&format!("actor {}", actor.name), actor.confidence)?;
        }

        Ok(())
    }

    /// Hex SHA-256 of the canonical JSON encoding.
    pub fn fingerprint(&self) -> ScoringResult<String> {
        let canonical = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Get technique by ID
    pub fn technique(&self, id: &str) -> Option<&TechniqueDefinition> {
        self.techniques.iter().find(|t| t.id.eq_ignore_ascii_case(id.trim()))
    }

    /// Get all tactics, sorted and deduplicated
    pub fn tactics(&self) -> Vec<String> {
        let mut tactics: Vec<String> = self.techniques.iter().map(|t| t.tactic.clone()).collect();
        tactics.sort();
        tactics.dedup();
        tactics
    }

    /// Get techniques for a tactic
    pub fn techniques_for_tactic(&self, tactic: &str) -> Vec<&TechniqueDefinition> {
        let wanted = normalize(tactic);
        self.techniques
            .iter()
            .filter(|t| normalize(&t.tactic) == wanted)
            .collect()
    }

    pub fn industry_keywords(&self, industry: &str) -> &[String] {
        lookup_ci(&self.industries, industry)
    }

    pub fn size_phrases(&self, size: &str) -> &[String] {
        lookup_ci(&self.company_sizes, size)
    }

    pub fn is_regulated(&self, industry: &str) -> bool {
        let wanted = normalize(industry);
        !wanted.is_empty() && self.regulated_industries.iter().any(|i| normalize(i) == wanted)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::builtin()
    }
}

fn check_confidence(label: &str, confidence: f64) -> ScoringResult<()> {
    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return Err(ScoringError::invalid_taxonomy(format!(
            "{} confidence {} outside [0, 1]",
            label, confidence
        )));
    }
    Ok(())
}

fn lookup_ci<'a>(table: &'a BTreeMap<String, Vec<String>>, key: &str) -> &'a [String] {
    let wanted = normalize(key);
    if wanted.is_empty() {
        return &[];
    }
    table
        .iter()
        .find(|(k, _)| normalize(k) == wanted)
        .map(|(_, v)| v.as_slice())
        .unwrap_or(&[])
}
