use std::fmt;

use serde::Serialize;

/// Value stored for a rank the taxon label does not provide.
pub const UNCLASSIFIED: &str = "unclassified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

impl Rank {
    pub const ALL: [Rank; 7] = [
        Rank::Kingdom,
        Rank::Phylum,
        Rank::Class,
        Rank::Order,
        Rank::Family,
        Rank::Genus,
        Rank::Species,
    ];

    pub fn prefix(self) -> char {
        match self {
            Rank::Kingdom => 'k',
            Rank::Phylum => 'p',
            Rank::Class => 'c',
            Rank::Order => 'o',
            Rank::Family => 'f',
            Rank::Genus => 'g',
            Rank::Species => 's',
        }
    }

    pub fn from_prefix(prefix: char) -> Option<Rank> {
        Rank::ALL.into_iter().find(|rank| rank.prefix() == prefix)
    }

    pub fn column(self) -> &'static str {
        match self {
            Rank::Kingdom => "kingdom",
            Rank::Phylum => "phylum",
            Rank::Class => "class",
            Rank::Order => "order",
            Rank::Family => "family",
            Rank::Genus => "genus",
            Rank::Species => "species",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankEntry {
    pub rank: Rank,
    pub value: String,
    pub taxid: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RankSet(Vec<RankEntry>);

impl RankSet {
    pub fn unclassified() -> Self {
        Self(
            Rank::ALL
                .into_iter()
                .map(|rank| RankEntry {
                    rank,
                    value: UNCLASSIFIED.to_string(),
                    taxid: None,
                })
                .collect(),
        )
    }

    pub fn from_entries(entries: Vec<RankEntry>) -> Self {
        Self(entries)
    }

    pub fn set(&mut self, rank: Rank, value: impl Into<String>, taxid: Option<u32>) {
        let value = value.into();
        let value = if value.trim().is_empty() {
            UNCLASSIFIED.to_string()
        } else {
            value
        };
        match self.0.iter_mut().find(|entry| entry.rank == rank) {
            Some(entry) => {
                entry.value = value;
                entry.taxid = taxid;
            }
            None => self.0.push(RankEntry { rank, value, taxid }),
        }
    }

    pub fn get(&self, rank: Rank) -> Option<&str> {
        self.0
            .iter()
            .find(|entry| entry.rank == rank)
            .map(|entry| entry.value.as_str())
    }

    pub fn entry(&self, rank: Rank) -> Option<&RankEntry> {
        self.0.iter().find(|entry| entry.rank == rank)
    }

    pub fn entries(&self) -> &[RankEntry] {
        &self.0
    }

    pub fn entries_mut(&mut self) -> &mut [RankEntry] {
        &mut self.0
    }

    pub fn is_classified(&self, rank: Rank) -> bool {
        self.get(rank).is_some_and(|value| value != UNCLASSIFIED)
    }

    pub fn schema_violation(&self) -> Option<String> {
        if self.0.len() != Rank::ALL.len() {
            return Some(format!(
                "expected {} ranks, found {}",
                Rank::ALL.len(),
                self.0.len()
            ));
        }
        self.0
            .iter()
            .zip(Rank::ALL)
            .find(|(entry, expected)| entry.rank != *expected)
            .map(|(entry, expected)| format!("expected {expected} but found {}", entry.rank))
    }
}

impl Default for RankSet {
    fn default() -> Self {
        Self::unclassified()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct JoinKey(String);

impl JoinKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonRecord {
    pub id: String,
    pub line: usize,
    pub ranks: RankSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub id: String,
    pub description: Option<String>,
    pub line: usize,
    pub sequence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnifiedRow {
    pub key: JoinKey,
    pub ranks: RankSet,
    pub sequence: String,
    pub taxon_line: usize,
    pub fasta_line: usize,
}

impl UnifiedRow {
    pub fn sequence_length(&self) -> usize {
        self.sequence.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    rows: Vec<UnifiedRow>,
}

impl Dataset {
    pub fn new(rows: Vec<UnifiedRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[UnifiedRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<UnifiedRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnifiedRow> {
        self.rows.iter()
    }

    pub fn get(&self, key: &str) -> Option<&UnifiedRow> {
        self.rows.iter().find(|row| row.key.as_str() == key)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a UnifiedRow;
    type IntoIter = std::slice::Iter<'a, UnifiedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
