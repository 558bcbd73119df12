//! Threat actor attribution

use super::TechniqueMapper;
use crate::taxonomy::ThreatActor;
use crate::utils::normalize;
use serde::{Deserialize, Serialize};

/// Discount applied to an actor's confidence when only an alias matched
pub const ALIAS_CONFIDENCE_FACTOR: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Direct,
    Alias,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorMatch {
    pub name: String,
    pub aliases: Vec<String>,
    /// 0-1
    pub confidence: f64,
    pub techniques: Vec<String>,
    pub match_type: MatchType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_alias: Option<String>,
}

impl ActorMatch {
    fn from_actor(actor: &ThreatActor, confidence: f64, match_type: MatchType) -> Self {
        Self {
            name: actor.name.clone(),
            aliases: actor.aliases.clone(),
            confidence,
            techniques: actor.techniques.clone(),
            match_type,
            matched_alias: None,
        }
    }

    fn unknown(query: &str) -> Self {
        Self {
            name: query.trim().to_string(),
            aliases: Vec::new(),
            confidence: 0.0,
            techniques: Vec::new(),
            match_type: MatchType::Unknown,
            matched_alias: None,
        }
    }
}

impl TechniqueMapper {
    /// Resolve an actor name: exact registry name first, then the first alias
    /// that contains or is contained in the query. Misses return `Unknown`.
    pub fn match_actor(&self, name: &str) -> ActorMatch {
        let query = normalize(name);
        if query.is_empty() {
            return ActorMatch::unknown(name);
        }
        let actors = &self.taxonomy().actors;

        if let Some(actor) = actors.iter().find(|a| normalize(&a.name) == query) {
            return ActorMatch::from_actor(actor, actor.confidence, MatchType::Direct);
        }

        for actor in actors {
            for alias in &actor.aliases {
                let candidate = normalize(alias);
                if candidate.is_empty() {
                    continue;
                }
                if candidate.contains(&query) || query.contains(&candidate) {
                    log::debug!("Actor '{}' resolved to {} via alias '{}'", name, actor.name, alias);
                    let mut matched = ActorMatch::from_actor(
                        actor,
                        actor.confidence * ALIAS_CONFIDENCE_FACTOR,
                        MatchType::Alias,
                    );
                    matched.matched_alias = Some(alias.clone());
                    return matched;
                }
            }
        }

        ActorMatch::unknown(name)
    }
}
