use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use crate::domain::{Dataset, FastaRecord, JoinKey, TaxonRecord, UnifiedRow};
use crate::error::JoinError;
use crate::identifier::IdentifierNormalizer;
use crate::report::JoinLoss;

#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub dataset: Dataset,
    pub loss: JoinLoss,
}

pub struct DatasetJoiner<'a> {
    normalizer: &'a IdentifierNormalizer,
}

impl<'a> DatasetJoiner<'a> {
    pub fn new(normalizer: &'a IdentifierNormalizer) -> Self {
        Self { normalizer }
    }

    // rows follow FASTA order, loss keys follow their own file's order
    pub fn join(
        &self,
        taxa: Vec<TaxonRecord>,
        sequences: Vec<FastaRecord>,
    ) -> Result<JoinOutcome, JoinError> {
        let mut taxon_order = Vec::with_capacity(taxa.len());
        let mut taxon_index: HashMap<JoinKey, TaxonRecord> = HashMap::with_capacity(taxa.len());
        for record in taxa {
            let key = self.normalizer.key(&record.id);
            match taxon_index.entry(key) {
                Entry::Occupied(existing) => {
                    return Err(JoinError::DuplicateTaxonKey {
                        key: existing.key().to_string(),
                        first_line: existing.get().line,
                        second_line: record.line,
                    });
                }
                Entry::Vacant(slot) => {
                    taxon_order.push(slot.key().clone());
                    slot.insert(record);
                }
            }
        }

        let mut fasta_index: HashMap<JoinKey, usize> = HashMap::with_capacity(sequences.len());
        let mut keyed = Vec::with_capacity(sequences.len());
        for record in sequences {
            let key = self.normalizer.key(&record.id);
            match fasta_index.entry(key.clone()) {
                Entry::Occupied(existing) => {
                    let first: &(JoinKey, FastaRecord) = &keyed[*existing.get()];
                    return Err(JoinError::DuplicateFastaKey {
                        key: key.to_string(),
                        first_line: first.1.line,
                        second_line: record.line,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(keyed.len());
                    keyed.push((key, record));
                }
            }
        }

        let mut rows = Vec::new();
        let mut loss = JoinLoss::default();
        for (key, fasta) in keyed {
            match taxon_index.remove(&key) {
                Some(taxon) => rows.push(UnifiedRow {
                    key,
                    ranks: taxon.ranks,
                    sequence: fasta.sequence,
                    taxon_line: taxon.line,
                    fasta_line: fasta.line,
                }),
                None => loss.fasta_only.push(key),
            }
        }
        loss.taxon_only = taxon_order
            .into_iter()
            .filter(|key| taxon_index.contains_key(key))
            .collect();

        debug!(
            rows = rows.len(),
            taxon_only = loss.taxon_only.len(),
            fasta_only = loss.fasta_only.len(),
            "joined records"
        );

        Ok(JoinOutcome {
            dataset: Dataset::new(rows),
            loss,
        })
    }
}
