use std::io::{BufRead, Lines};

use tracing::warn;

use crate::domain::{Rank, RankSet, TaxonRecord};
use crate::error::JoinError;
use crate::report::SkippedLines;

/// Streams [`TaxonRecord`]s out of a MIDORI2 `.taxon` file.
///
/// Each line holds an identifier and a label separated by a tab:
///
/// ```text
/// MG559732.1.<1.>690	k__Eukaryota_2759;p__Arthropoda_6656;...;s__Aedes aegypti_7159
/// ```
///
/// Lines that cannot be split are skipped and counted in [`TaxonReader::skipped`].
pub struct TaxonReader<R> {
    lines: Lines<R>,
    source: String,
    line_no: usize,
    skipped: SkippedLines,
    finished: bool,
}

impl<R: BufRead> TaxonReader<R> {
    pub fn new(reader: R, source: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            source: source.into(),
            line_no: 0,
            skipped: SkippedLines::default(),
            finished: false,
        }
    }

    pub fn skipped(&self) -> &SkippedLines {
        &self.skipped
    }

    pub fn into_skipped(self) -> SkippedLines {
        self.skipped
    }
}

impl<R: BufRead> Iterator for TaxonReader<R> {
    type Item = Result<TaxonRecord, JoinError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(err)) => {
                    self.finished = true;
                    return Some(Err(JoinError::io(self.source.as_str(), err)));
                }
                None => {
                    self.finished = true;
                    break;
                }
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match parse_taxon_line(trimmed, self.line_no) {
                Ok(record) => return Some(Ok(record)),
                Err(err) => {
                    warn!(source = %self.source, "{err}");
                    self.skipped.record(self.line_no);
                }
            }
        }
        None
    }
}

pub fn parse_taxon_line(line: &str, line_no: usize) -> Result<TaxonRecord, JoinError> {
    let mut fields = line.split('\t');
    let id = fields.next().unwrap_or_default().trim();
    let label = fields.next().ok_or_else(|| JoinError::MalformedTaxonLine {
        line: line_no,
        reason: "missing tab between identifier and taxonomy".to_string(),
    })?;
    let label = label.trim();
    if id.is_empty() {
        return Err(JoinError::MalformedTaxonLine {
            line: line_no,
            reason: "empty identifier".to_string(),
        });
    }
    if label.is_empty() {
        return Err(JoinError::MalformedTaxonLine {
            line: line_no,
            reason: "empty taxonomy label".to_string(),
        });
    }
    Ok(TaxonRecord {
        id: id.to_string(),
        line: line_no,
        ranks: parse_rank_label(label),
    })
}

/// Decomposes `k__Name_123;p__Name_456;...` into a full [`RankSet`].
pub fn parse_rank_label(label: &str) -> RankSet {
    let mut ranks = RankSet::unclassified();
    for part in label.split(';') {
        let part = part.trim();
        let mut chars = part.chars();
        let Some(rank) = chars.next().and_then(Rank::from_prefix) else {
            continue;
        };
        let Some(rest) = chars.as_str().strip_prefix("__") else {
            continue;
        };
        let (name, taxid) = split_taxid(rest);
        ranks.set(rank, name.trim(), taxid);
    }
    ranks
}

fn split_taxid(value: &str) -> (&str, Option<u32>) {
    match value.rsplit_once('_') {
        Some((name, digits))
            if !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit()) =>
        {
            (name, digits.parse().ok())
        }
        _ => (value, None),
    }
}
