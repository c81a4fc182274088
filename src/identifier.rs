use std::fmt;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::JoinKey;
use crate::error::JoinError;

const ACCESSION_PATTERN: &str = r"^([^.]+\.\d+)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KeyRule {
    /// `MG559732.1.<1.>690` -> `MG559732.1`
    #[default]
    Accession,
    /// `MG559732.1` -> `MG559732`
    Unversioned,
    Verbatim,
    /// First capture group of a user supplied regex.
    Pattern,
}

impl fmt::Display for KeyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRule::Accession => write!(f, "accession"),
            KeyRule::Unversioned => write!(f, "unversioned"),
            KeyRule::Verbatim => write!(f, "verbatim"),
            KeyRule::Pattern => write!(f, "pattern"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IdentifierNormalizer {
    rule: KeyRule,
    pattern: Option<Regex>,
}

impl IdentifierNormalizer {
    pub fn new(rule: KeyRule, pattern: Option<&str>) -> Result<Self, JoinError> {
        let pattern = match (rule, pattern) {
            (KeyRule::Accession, _) => Some(compile(ACCESSION_PATTERN)?),
            (KeyRule::Pattern, Some(pattern)) => Some(compile(pattern)?),
            (KeyRule::Pattern, None) => {
                return Err(JoinError::InvalidKeyPattern(
                    "key rule `pattern` requires a regular expression".to_string(),
                ));
            }
            (KeyRule::Unversioned | KeyRule::Verbatim, _) => None,
        };
        Ok(Self { rule, pattern })
    }

    pub fn accession() -> Result<Self, JoinError> {
        Self::new(KeyRule::Accession, None)
    }

    pub fn rule(&self) -> KeyRule {
        self.rule
    }

    pub fn key(&self, raw: &str) -> JoinKey {
        let id = raw.trim().trim_start_matches('>').trim();
        let key = match self.rule {
            KeyRule::Verbatim => id,
            KeyRule::Unversioned => before_first_dot(id),
            KeyRule::Accession => match self.captured(id) {
                Some(found) => found,
                None => before_first_dot(id),
            },
            KeyRule::Pattern => self.captured(id).unwrap_or(id),
        };
        // an empty base would merge unrelated ids such as `.1` and `.2`
        if key.is_empty() {
            JoinKey::new(id)
        } else {
            JoinKey::new(key)
        }
    }

    fn captured<'a>(&self, id: &'a str) -> Option<&'a str> {
        let captures = self.pattern.as_ref()?.captures(id)?;
        captures
            .get(1)
            .or_else(|| captures.get(0))
            .map(|found| found.as_str())
            .filter(|found| !found.is_empty())
    }
}

fn before_first_dot(id: &str) -> &str {
    id.split('.').next().unwrap_or(id)
}

fn compile(pattern: &str) -> Result<Regex, JoinError> {
    Regex::new(pattern).map_err(|err| JoinError::InvalidKeyPattern(err.to_string()))
}
