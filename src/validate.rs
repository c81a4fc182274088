use tracing::warn;

use crate::domain::Dataset;
use crate::error::JoinError;
use crate::report::ValidationReport;

#[derive(Debug, Default, Clone, Copy)]
pub struct DatasetValidator;

impl DatasetValidator {
    pub fn validate(&self, dataset: Dataset) -> Result<(Dataset, ValidationReport), JoinError> {
        if dataset.is_empty() {
            return Err(JoinError::EmptyInput("joined dataset".to_string()));
        }

        let mut report = ValidationReport {
            rows_checked: dataset.len(),
            ..ValidationReport::default()
        };
        let mut kept = Vec::with_capacity(dataset.len());
        for row in dataset.into_rows() {
            if let Some(reason) = row.ranks.schema_violation() {
                return Err(JoinError::SchemaInconsistency {
                    key: row.key.to_string(),
                    reason,
                });
            }
            if row.sequence.is_empty() {
                warn!(
                    key = %row.key,
                    fasta_line = row.fasta_line,
                    "excluding row with empty sequence"
                );
                report.empty_sequences.push(row.key);
                continue;
            }
            kept.push(row);
        }

        if kept.is_empty() {
            return Err(JoinError::EmptyInput(
                "joined dataset after excluding empty sequences".to_string(),
            ));
        }
        report.rows_kept = kept.len();
        Ok((Dataset::new(kept), report))
    }
}
