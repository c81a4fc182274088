use std::thread;
use std::time::{Duration, Instant};

use camino::Utf8Path;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ResolvedConfig;
use crate::domain::{Dataset, FastaRecord, TaxonRecord};
use crate::error::JoinError;
use crate::fasta::FastaReader;
use crate::fs_util::open_input;
use crate::identifier::{IdentifierNormalizer, KeyRule};
use crate::join::DatasetJoiner;
use crate::label::{DEFAULT_SEPARATOR, LabelNormalizer};
use crate::report::{LoadReport, SkippedLines};
use crate::taxon::TaxonReader;
use crate::validate::DatasetValidator;

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub normalize: bool,
    pub separator: char,
    pub key_rule: KeyRule,
    pub key_pattern: Option<String>,
    pub parallel: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            separator: DEFAULT_SEPARATOR,
            key_rule: KeyRule::Accession,
            key_pattern: None,
            parallel: false,
        }
    }
}

impl From<&ResolvedConfig> for LoadOptions {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            normalize: config.normalize,
            separator: config.separator,
            key_rule: config.key_rule,
            key_pattern: config.key_pattern.clone(),
            parallel: config.parallel,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub report: LoadReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub path: String,
    pub key_rule: String,
    pub records: Vec<QueryEntry>,
    pub skipped_lines: SkippedLines,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryEntry {
    pub key: String,
    pub id: String,
    pub description: Option<String>,
    pub length: usize,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => debug!(elapsed_ms = elapsed.as_millis() as u64, "{}", event.message),
            None => debug!("{}", event.message),
        }
    }
}

pub fn load_dataset(
    taxon_path: impl AsRef<Utf8Path>,
    fasta_path: impl AsRef<Utf8Path>,
    normalize: bool,
) -> Result<LoadedDataset, JoinError> {
    let options = LoadOptions {
        normalize,
        ..LoadOptions::default()
    };
    Loader::new(options)?.load(taxon_path.as_ref(), fasta_path.as_ref(), &TracingSink)
}

#[derive(Debug)]
pub struct Loader {
    options: LoadOptions,
    identifiers: IdentifierNormalizer,
    labels: LabelNormalizer,
}

impl Loader {
    pub fn new(options: LoadOptions) -> Result<Self, JoinError> {
        let identifiers =
            IdentifierNormalizer::new(options.key_rule, options.key_pattern.as_deref())?;
        let labels = LabelNormalizer::new(options.normalize, options.separator)?;
        Ok(Self {
            options,
            identifiers,
            labels,
        })
    }

    pub fn load(
        &self,
        taxon_path: &Utf8Path,
        fasta_path: &Utf8Path,
        sink: &dyn ProgressSink,
    ) -> Result<LoadedDataset, JoinError> {
        let start = Instant::now();
        sink.event(ProgressEvent {
            message: format!("phase=Parse; reading {taxon_path} and {fasta_path}"),
            elapsed: None,
        });

        let ((taxa, skipped_taxon), (sequences, skipped_fasta)) = if self.options.parallel {
            parse_both_parallel(taxon_path, fasta_path)?
        } else {
            (read_taxa(taxon_path)?, read_fasta(fasta_path)?)
        };
        sink.event(ProgressEvent {
            message: format!(
                "phase=Parse; {} taxon records, {} sequences",
                taxa.len(),
                sequences.len()
            ),
            elapsed: Some(start.elapsed()),
        });

        if taxa.is_empty() {
            return Err(JoinError::EmptyInput(format!("taxon file {taxon_path}")));
        }
        if sequences.is_empty() {
            return Err(JoinError::EmptyInput(format!("FASTA file {fasta_path}")));
        }
        let taxon_records = taxa.len();
        let fasta_records = sequences.len();

        sink.event(ProgressEvent {
            message: "phase=Join; indexing records by key".to_string(),
            elapsed: None,
        });
        let outcome = DatasetJoiner::new(&self.identifiers).join(taxa, sequences)?;
        let joined_rows = outcome.dataset.len();
        if outcome.loss.total() > 0 {
            warn!(
                taxon_only = outcome.loss.taxon_only.len(),
                fasta_only = outcome.loss.fasta_only.len(),
                "{} keys found in only one input",
                outcome.loss.total()
            );
        }

        let mut rows = outcome.dataset.into_rows();
        for row in &mut rows {
            self.labels.normalize_ranks(&mut row.ranks);
        }

        sink.event(ProgressEvent {
            message: "phase=Verify; validating joined rows".to_string(),
            elapsed: None,
        });
        let (dataset, validation) = DatasetValidator.validate(Dataset::new(rows))?;

        info!(
            rows = dataset.len(),
            skipped_taxon = skipped_taxon.count,
            skipped_fasta = skipped_fasta.count,
            taxon_only = outcome.loss.taxon_only.len(),
            fasta_only = outcome.loss.fasta_only.len(),
            excluded = validation.excluded(),
            "dataset loaded"
        );
        sink.event(ProgressEvent {
            message: format!("phase=Done; {} rows", dataset.len()),
            elapsed: Some(start.elapsed()),
        });

        let report = LoadReport {
            taxon_path: taxon_path.to_string(),
            fasta_path: fasta_path.to_string(),
            normalized_labels: self.labels.enabled(),
            key_rule: self.identifiers.rule().to_string(),
            taxon_records,
            fasta_records,
            skipped_taxon_lines: skipped_taxon,
            skipped_fasta_lines: skipped_fasta,
            joined_rows,
            join_loss: outcome.loss,
            validation,
            generated_at: chrono::Utc::now().to_rfc3339(),
        };
        Ok(LoadedDataset { dataset, report })
    }

    pub fn load_query(&self, path: &Utf8Path) -> Result<QueryResult, JoinError> {
        let (sequences, skipped_lines) = read_fasta(path)?;
        let records = sequences
            .into_iter()
            .map(|record| QueryEntry {
                key: self.identifiers.key(&record.id).to_string(),
                length: record.sequence.len(),
                id: record.id,
                description: record.description,
            })
            .collect();
        Ok(QueryResult {
            path: path.to_string(),
            key_rule: self.identifiers.rule().to_string(),
            records,
            skipped_lines,
        })
    }
}

pub fn read_taxa(path: &Utf8Path) -> Result<(Vec<TaxonRecord>, SkippedLines), JoinError> {
    let mut reader = TaxonReader::new(open_input(path)?, path.as_str());
    let records = reader.by_ref().collect::<Result<Vec<_>, _>>()?;
    debug!(
        path = %path,
        records = records.len(),
        skipped = reader.skipped().count,
        "parsed taxon file"
    );
    Ok((records, reader.into_skipped()))
}

pub fn read_fasta(path: &Utf8Path) -> Result<(Vec<FastaRecord>, SkippedLines), JoinError> {
    let mut reader = FastaReader::new(open_input(path)?, path.as_str());
    let records = reader.by_ref().collect::<Result<Vec<_>, _>>()?;
    debug!(
        path = %path,
        records = records.len(),
        skipped = reader.skipped().count,
        "parsed FASTA file"
    );
    Ok((records, reader.into_skipped()))
}

type Parsed<T> = (Vec<T>, SkippedLines);

fn parse_both_parallel(
    taxon_path: &Utf8Path,
    fasta_path: &Utf8Path,
) -> Result<(Parsed<TaxonRecord>, Parsed<FastaRecord>), JoinError> {
    thread::scope(|scope| {
        let taxa = scope.spawn(|| read_taxa(taxon_path));
        let sequences = scope.spawn(|| read_fasta(fasta_path));
        let taxa = taxa
            .join()
            .map_err(|_| JoinError::Worker("taxon parser panicked".to_string()))??;
        let sequences = sequences
            .join()
            .map_err(|_| JoinError::Worker("FASTA parser panicked".to_string()))??;
        Ok((taxa, sequences))
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn default_options_normalize_with_accession_keys() {
        let options = LoadOptions::default();
        assert!(options.normalize);
        assert_eq!(options.key_rule, KeyRule::Accession);
        assert!(Loader::new(options).is_ok());
    }

    #[test]
    fn uppercase_separator_is_rejected() {
        let options = LoadOptions {
            separator: 'X',
            ..LoadOptions::default()
        };
        assert_matches!(Loader::new(options), Err(JoinError::InvalidSeparator('X')));
    }

    #[test]
    fn pattern_rule_without_regex_is_rejected() {
        let options = LoadOptions {
            key_rule: KeyRule::Pattern,
            ..LoadOptions::default()
        };
        assert!(Loader::new(options).is_err());
    }
}
