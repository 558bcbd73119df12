use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ---- Inputs ----

/// A threat item as produced by the feed layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThreatRecord {
    pub title: String,
    pub description: String,
    /// Feed severity on a 0-10 scale
    pub risk_score: Option<f64>,
    pub affected_systems: Vec<String>,
    pub geolocation: Geolocation,
    pub targeted_countries: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geolocation {
    pub countries: Vec<String>,
}

impl ThreatRecord {
    /// Lowercased title and description joined by a space.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.description).to_lowercase()
    }
}

/// Organisational context the relevance analyzer scores against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyProfile {
    pub industry: String,
    pub technology_stack: Vec<TechnologyEntry>,
    pub country: String,
    pub region: String,
    pub subsidiary_locations: Vec<String>,
    pub company_size: String,
}

impl CompanyProfile {
    /// Country, region and subsidiary locations, skipping blanks.
    pub fn locations(&self) -> Vec<&str> {
        std::iter::once(self.country.as_str())
            .chain(std::iter::once(self.region.as_str()))
            .chain(self.subsidiary_locations.iter().map(String::as_str))
            .filter(|l| !l.trim().is_empty())
            .collect()
    }
}

/// Technology stack entries come either as bare names or as described assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TechnologyEntry {
    Asset(TechnologyAsset),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyAsset {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criticality: Option<Criticality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure: Option<Exposure>,
}

impl TechnologyEntry {
    pub fn name(&self) -> &str {
        match self {
            TechnologyEntry::Asset(asset) => &asset.name,
            TechnologyEntry::Name(name) => name,
        }
    }

    /// Asset reference with `medium`/`internal` filled in when undeclared.
    pub fn to_asset_ref(&self) -> AssetRef {
        match self {
            TechnologyEntry::Asset(asset) => AssetRef {
                name: asset.name.clone(),
                asset_type: asset.asset_type.clone(),
                criticality: asset.criticality.unwrap_or_default(),
                exposure: asset.exposure.unwrap_or_default(),
            },
            TechnologyEntry::Name(name) => AssetRef {
                name: name.clone(),
                asset_type: None,
                criticality: Criticality::default(),
                exposure: Exposure::default(),
            },
        }
    }
}

impl From<&str> for TechnologyEntry {
    fn from(name: &str) -> Self {
        TechnologyEntry::Name(name.to_string())
    }
}

/// Profile labels are matched case-insensitively; unrecognised labels fall
/// back to `Medium`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl From<&str> for Criticality {
    fn from(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Criticality::Low,
            "high" => Criticality::High,
            "critical" => Criticality::Critical,
            _ => Criticality::Medium,
        }
    }
}

impl<'de> Deserialize<'de> for Criticality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Criticality::from(label.as_str()))
    }
}

/// Internet-facing labels map to `External`; anything else is `Internal`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Exposure {
    #[default]
    Internal,
    External,
}

impl From<&str> for Exposure {
    fn from(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "external" | "public" | "internet" | "internet-facing" | "internet_facing" => {
                Exposure::External
            }
            _ => Exposure::Internal,
        }
    }
}

impl<'de> Deserialize<'de> for Exposure {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Exposure::from(label.as_str()))
    }
}

/// Raw factors for the weighted risk score, each on a 0-10 scale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskFactorInput {
    pub probability: Option<f64>,
    pub impact: Option<f64>,
    pub velocity: Option<f64>,
    pub detectability: Option<f64>,
    pub controllability: Option<f64>,
}

/// Per-factor weights. Not renormalised; callers supply a sensible set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub probability: f64,
    pub impact: f64,
    pub velocity: f64,
    pub detectability: f64,
    pub controllability: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            probability: 0.25,
            impact: 0.35,
            velocity: 0.15,
            detectability: 0.15,
            controllability: 0.10,
        }
    }
}

/// Unit consumed by the composite aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoredRiskFactor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Defaults to 1 when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// 0-100, defaults to 50 when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_quality: Option<f64>,
}

impl ScoredRiskFactor {
    pub fn new(score: f64, weight: f64, data_quality: f64) -> Self {
        Self {
            score: Some(score),
            weight: Some(weight),
            data_quality: Some(data_quality),
        }
    }
}

// ---- Outputs: composite risk ----

/// Five-band classification of a 0-10 composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Minimal => write!(f, "minimal"),
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedRisk {
    /// 0-10
    pub composite_score: f64,
    pub level: RiskLevel,
    /// 0-100
    pub confidence: f64,
    pub factors: Vec<ScoredRiskFactor>,
}

/// Result of composite aggregation.
///
/// `Unknown` is the outcome for an empty factor list and is never one of the
/// five production levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RiskAssessment {
    Unknown {
        score: f64,
        level: UnclassifiedLevel,
        factors: Vec<ScoredRiskFactor>,
    },
    Classified(ClassifiedRisk),
}

/// Level label carried by an unclassified assessment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnclassifiedLevel {
    #[default]
    Unknown,
}

impl RiskAssessment {
    /// `{score: 0, level: "unknown", factors: []}`
    pub fn unknown() -> Self {
        RiskAssessment::Unknown {
            score: 0.0,
            level: UnclassifiedLevel::Unknown,
            factors: Vec::new(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, RiskAssessment::Unknown { .. })
    }

    pub fn score(&self) -> f64 {
        match self {
            RiskAssessment::Unknown { score, .. } => *score,
            RiskAssessment::Classified(risk) => risk.composite_score,
        }
    }

    pub fn level(&self) -> Option<RiskLevel> {
        match self {
            RiskAssessment::Unknown { .. } => None,
            RiskAssessment::Classified(risk) => Some(risk.level),
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            RiskAssessment::Unknown { .. } => 0.0,
            RiskAssessment::Classified(risk) => risk.confidence,
        }
    }

    pub fn factors(&self) -> &[ScoredRiskFactor] {
        match self {
            RiskAssessment::Unknown { factors, .. } => factors,
            RiskAssessment::Classified(risk) => &risk.factors,
        }
    }
}

// ---- Outputs: relevance ----

/// Four-band level used for relevance risk and remediation priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatLevel {
    /// `low=1` .. `critical=4`
    pub fn weight(self) -> u8 {
        match self {
            ThreatLevel::Low => 1,
            ThreatLevel::Medium => 2,
            ThreatLevel::High => 3,
            ThreatLevel::Critical => 4,
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreatLevel::Low => write!(f, "low"),
            ThreatLevel::Medium => write!(f, "medium"),
            ThreatLevel::High => write!(f, "high"),
            ThreatLevel::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl ImpactLevel {
    /// `low=1` .. `high=3`
    pub fn weight(self) -> u8 {
        match self {
            ImpactLevel::Low => 1,
            ImpactLevel::Medium => 2,
            ImpactLevel::High => 3,
        }
    }
}

/// A technology from the company's stack that the threat touches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
    pub criticality: Criticality,
    pub exposure: Exposure,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactDimension {
    pub level: ImpactLevel,
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessImpact {
    pub financial: ImpactDimension,
    pub operational: ImpactDimension,
    pub reputational: ImpactDimension,
    pub regulatory: ImpactDimension,
}

impl BusinessImpact {
    /// Highest level across the financial, operational and regulatory dimensions.
    pub fn max_level(&self) -> ImpactLevel {
        [
            self.financial.level,
            self.operational.level,
            self.regulatory.level,
        ]
        .into_iter()
        .max()
        .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextFactorKind {
    Industry,
    Technology,
    Geography,
    Size,
}

/// Why a threat was considered relevant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextFactor {
    pub kind: ContextFactorKind,
    pub description: String,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceDetails {
    /// 0-1
    pub relevance_score: f64,
    pub risk_level: ThreatLevel,
    pub affected_assets: Vec<AssetRef>,
    pub business_impact: BusinessImpact,
    pub remediation_priority: ThreatLevel,
    pub context_factors: Vec<ContextFactor>,
}

/// Result of company-threat relevance analysis.
///
/// `Degraded` carries the neutral fallback (0.5 / medium) and the reason the
/// analysis could not run, so it is never mistaken for a real assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RelevanceAssessment {
    Assessed(RelevanceDetails),
    #[serde(rename_all = "camelCase")]
    Degraded {
        relevance_score: f64,
        risk_level: ThreatLevel,
        error: String,
    },
}

pub const NEUTRAL_RELEVANCE: f64 = 0.5;

impl RelevanceAssessment {
    pub fn degraded(error: impl Into<String>) -> Self {
        RelevanceAssessment::Degraded {
            relevance_score: NEUTRAL_RELEVANCE,
            risk_level: ThreatLevel::Medium,
            error: error.into(),
        }
    }

    pub fn relevance_score(&self) -> f64 {
        match self {
            RelevanceAssessment::Assessed(details) => details.relevance_score,
            RelevanceAssessment::Degraded { relevance_score, .. } => *relevance_score,
        }
    }

    pub fn risk_level(&self) -> ThreatLevel {
        match self {
            RelevanceAssessment::Assessed(details) => details.risk_level,
            RelevanceAssessment::Degraded { risk_level, .. } => *risk_level,
        }
    }

    pub fn details(&self) -> Option<&RelevanceDetails> {
        match self {
            RelevanceAssessment::Assessed(details) => Some(details),
            RelevanceAssessment::Degraded { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RelevanceAssessment::Assessed(_) => None,
            RelevanceAssessment::Degraded { error, .. } => Some(error),
        }
    }
}
