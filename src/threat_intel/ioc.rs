//! IoC shape classification

use crate::errors::{ScoringError, ScoringResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

const FILE_HASH_PATTERN: &str = r"^[A-Fa-f0-9]{32,64}$";
const IPV4_PATTERN: &str =
    r"^(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)$";
const URL_PATTERN: &str = r"(?i)^(?:https?|hxxps?|ftp)://[^\s/$.?#][^\s]*$";

/// Shape of an indicator of compromise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IocKind {
    /// 32-64 hex characters (MD5 through SHA-256)
    FileHash,
    IpAddress,
    Url,
    Other,
}

impl fmt::Display for IocKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IocKind::FileHash => write!(f, "file_hash"),
            IocKind::IpAddress => write!(f, "ip_address"),
            IocKind::Url => write!(f, "url"),
            IocKind::Other => write!(f, "other"),
        }
    }
}

/// Compiled IoC shape patterns
#[derive(Debug, Clone)]
pub struct IocClassifier {
    file_hash: Regex,
    ip_address: Regex,
    url: Regex,
}

impl IocClassifier {
    pub fn new() -> ScoringResult<Self> {
        Ok(Self {
            file_hash: compile(FILE_HASH_PATTERN)?,
            ip_address: compile(IPV4_PATTERN)?,
            url: compile(URL_PATTERN)?,
        })
    }

    pub fn classify(&self, ioc: &str) -> IocKind {
        let ioc = ioc.trim();
        if self.file_hash.is_match(ioc) {
            IocKind::FileHash
        } else if self.ip_address.is_match(ioc) {
            IocKind::IpAddress
        } else if self.url.is_match(ioc) {
            IocKind::Url
        } else {
            IocKind::Other
        }
    }
}

fn compile(pattern: &str) -> ScoringResult<Regex> {
    log::debug!("Compiling IoC pattern: {}", pattern);
    Regex::new(pattern).map_err(|e| ScoringError::regex(e, pattern))
}
