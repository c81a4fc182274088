use crate::domain::RankSet;
use crate::error::JoinError;

pub const DEFAULT_SEPARATOR: char = '_';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelNormalizer {
    enabled: bool,
    separator: char,
}

impl LabelNormalizer {
    pub fn new(enabled: bool, separator: char) -> Result<Self, JoinError> {
        check_separator(separator)?;
        Ok(Self { enabled, separator })
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn normalize(&self, value: &str) -> String {
        if !self.enabled {
            return value.to_string();
        }
        let lowered = value.to_lowercase();
        let mut out = String::with_capacity(lowered.len());
        for word in lowered.split_whitespace() {
            if !out.is_empty() {
                out.push(self.separator);
            }
            out.push_str(word);
        }
        out
    }

    pub fn normalize_ranks(&self, ranks: &mut RankSet) {
        if !self.enabled {
            return;
        }
        for entry in ranks.entries_mut() {
            entry.value = self.normalize(&entry.value);
        }
    }
}

impl Default for LabelNormalizer {
    fn default() -> Self {
        Self {
            enabled: true,
            separator: DEFAULT_SEPARATOR,
        }
    }
}

pub fn check_separator(separator: char) -> Result<(), JoinError> {
    let mut lowered = separator.to_lowercase();
    let stable = lowered.next() == Some(separator) && lowered.next().is_none();
    if separator.is_whitespace() || !stable {
        return Err(JoinError::InvalidSeparator(separator));
    }
    Ok(())
}
