use std::io::{self, Write};

use camino::Utf8Path;
use serde::Serialize;

use crate::app::{ProgressEvent, ProgressSink, QueryResult};
use crate::domain::{Dataset, Rank};
use crate::error::JoinError;
use crate::fs_util::write_atomic;
use crate::report::LoadReport;
use crate::summary::DatasetSummary;

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_report(report: &LoadReport) -> io::Result<()> {
        Self::print_json(report)
    }

    pub fn print_summary(summary: &DatasetSummary) -> io::Result<()> {
        Self::print_json(summary)
    }

    pub fn print_query(result: &QueryResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

/// Writes one tab-separated row per dataset entry:
/// `sequence_id`, `dna_sequence`, then one column per rank.
pub fn write_tsv<W: Write>(dataset: &Dataset, writer: W) -> Result<(), csv::Error> {
    let mut tsv = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);

    let mut header = vec!["sequence_id", "dna_sequence"];
    header.extend(Rank::ALL.iter().map(|rank| rank.column()));
    tsv.write_record(&header)?;

    for row in dataset {
        let mut record = vec![row.key.as_str(), row.sequence.as_str()];
        record.extend(
            Rank::ALL
                .iter()
                .map(|rank| row.ranks.get(*rank).unwrap_or_default()),
        );
        tsv.write_record(&record)?;
    }
    tsv.flush()?;
    Ok(())
}

pub fn export_tsv(dataset: &Dataset, path: &Utf8Path) -> Result<(), JoinError> {
    write_atomic(path, |writer| {
        write_tsv(dataset, writer).map_err(io::Error::other)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JoinKey, RankSet, UnifiedRow};

    #[test]
    fn tsv_has_header_and_rank_columns() {
        let mut ranks = RankSet::unclassified();
        ranks.set(Rank::Species, "aedes_aegypti", None);
        let dataset = Dataset::new(vec![UnifiedRow {
            key: JoinKey::new("MG559732.1"),
            ranks,
            sequence: "ACGT".to_string(),
            taxon_line: 1,
            fasta_line: 1,
        }]);

        let mut buffer = Vec::new();
        write_tsv(&dataset, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("sequence_id\tdna_sequence\tkingdom\tphylum\tclass\torder\tfamily\tgenus\tspecies")
        );
        assert_eq!(
            lines.next(),
            Some("MG559732.1\tACGT\tunclassified\tunclassified\tunclassified\tunclassified\tunclassified\tunclassified\taedes_aegypti")
        );
        assert_eq!(lines.next(), None);
    }
}
