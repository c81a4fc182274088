use serde::Serialize;

use crate::domain::JoinKey;

pub const SKIPPED_SAMPLE_LIMIT: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkippedLines {
    pub count: usize,
    pub sample: Vec<usize>,
}

impl SkippedLines {
    pub fn record(&mut self, line: usize) {
        self.count += 1;
        if self.sample.len() < SKIPPED_SAMPLE_LIMIT {
            self.sample.push(line);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinLoss {
    pub taxon_only: Vec<JoinKey>,
    pub fasta_only: Vec<JoinKey>,
}

impl JoinLoss {
    pub fn total(&self) -> usize {
        self.taxon_only.len() + self.fasta_only.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub rows_checked: usize,
    pub rows_kept: usize,
    pub empty_sequences: Vec<JoinKey>,
}

impl ValidationReport {
    pub fn excluded(&self) -> usize {
        self.empty_sequences.len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub taxon_path: String,
    pub fasta_path: String,
    pub normalized_labels: bool,
    pub key_rule: String,
    pub taxon_records: usize,
    pub fasta_records: usize,
    pub skipped_taxon_lines: SkippedLines,
    pub skipped_fasta_lines: SkippedLines,
    pub joined_rows: usize,
    pub join_loss: JoinLoss,
    pub validation: ValidationReport,
    pub generated_at: String,
}
