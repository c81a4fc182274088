use std::fs;
use std::io::Write;

use assert_matches::assert_matches;
use camino::{Utf8Path, Utf8PathBuf};
use flate2::Compression;
use flate2::write::GzEncoder;

use midori_join::app::{LoadOptions, Loader};
use midori_join::domain::{JoinKey, Rank, UNCLASSIFIED};
use midori_join::error::JoinError;
use midori_join::load_dataset;
use midori_join::output::JsonOutput;

fn write_file(dir: &Utf8Path, name: &str, content: &str) -> Utf8PathBuf {
    let path = dir.join(name);
    fs::write(path.as_std_path(), content).unwrap();
    path
}

fn temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    (temp, root)
}

#[test]
fn loads_fixture_pair() {
    let loaded = load_dataset(
        "tests/fixtures/sample.taxon",
        "tests/fixtures/sample.fasta",
        true,
    )
    .unwrap();

    assert_eq!(loaded.dataset.len(), 2);
    let aedes = loaded.dataset.get("MG559732.1").unwrap();
    assert_eq!(aedes.sequence, "ACGTACGTACGTACGTACGTACGT");
    assert_eq!(aedes.sequence_length(), 24);
    assert_eq!(aedes.ranks.get(Rank::Species), Some("aedes_aegypti"));
    assert_eq!(aedes.ranks.get(Rank::Family), Some("culicidae"));
    assert_eq!(aedes.taxon_line, 1);
    assert_eq!(aedes.fasta_line, 1);

    let report = &loaded.report;
    assert_eq!(report.taxon_records, 3);
    assert_eq!(report.fasta_records, 3);
    assert_eq!(report.skipped_taxon_lines.count, 1);
    assert_eq!(report.skipped_taxon_lines.sample, vec![3]);
    assert_eq!(report.join_loss.taxon_only, vec![JoinKey::new("OQ123456.2")]);
    assert_eq!(report.join_loss.fasta_only, vec![JoinKey::new("ZZ000001.1")]);
    assert_eq!(report.key_rule, "accession");
}

#[test]
fn labels_pass_through_when_normalization_is_off() {
    let loaded = load_dataset(
        "tests/fixtures/sample.taxon",
        "tests/fixtures/sample.fasta",
        false,
    )
    .unwrap();
    let human = loaded.dataset.get("KX369553.1").unwrap();
    assert_eq!(human.ranks.get(Rank::Species), Some("Homo sapiens"));
    assert!(!loaded.report.normalized_labels);
}

#[test]
fn end_to_end_join_loss_scenario() {
    let (_guard, root) = temp_dir();
    let taxon = write_file(
        &root,
        "set.taxon",
        "K1\tk__Eukaryota_2759;p__Arthropoda_6656;c__Insecta_50557;o__Diptera_7147;f__Culicidae_7157;g__Aedes_7158;s__Aedes aegypti_7159\n\
         K2\tk__Eukaryota_2759;p__Chordata_7711;c__Mammalia_40674;o__Primates_9443;s__Homo sapiens_9606\n",
    );
    let fasta = write_file(&root, "set.fasta", ">K1\nACGT\n>K3\nGGCC\n");

    let loaded = load_dataset(&taxon, &fasta, true).unwrap();
    assert_eq!(loaded.dataset.len(), 1);
    let row = &loaded.dataset.rows()[0];
    assert_eq!(row.key.as_str(), "K1");
    assert_eq!(row.ranks.get(Rank::Genus), Some("aedes"));
    assert_eq!(loaded.report.join_loss.taxon_only, vec![JoinKey::new("K2")]);
    assert_eq!(loaded.report.join_loss.fasta_only, vec![JoinKey::new("K3")]);
}

#[test]
fn missing_ranks_are_filled_with_sentinel_after_join() {
    let (_guard, root) = temp_dir();
    let taxon = write_file(
        &root,
        "set.taxon",
        "K2\tk__Eukaryota_2759;p__Chordata_7711;c__Mammalia_40674;o__Primates_9443;s__Homo sapiens_9606\n",
    );
    let fasta = write_file(&root, "set.fasta", ">K2 partial label\nACGT\n");

    let loaded = load_dataset(&taxon, &fasta, true).unwrap();
    let row = loaded.dataset.get("K2").unwrap();
    assert_eq!(row.ranks.get(Rank::Family), Some(UNCLASSIFIED));
    assert_eq!(row.ranks.get(Rank::Genus), Some(UNCLASSIFIED));
    assert_eq!(row.ranks.entries().len(), Rank::ALL.len());
}

#[test]
fn duplicate_taxon_key_aborts_load() {
    let (_guard, root) = temp_dir();
    let taxon = write_file(
        &root,
        "dup.taxon",
        "A.1.<1.>10\tk__Eukaryota_2759\nA.1.<20.>90\tk__Eukaryota_2759\n",
    );
    let fasta = write_file(&root, "dup.fasta", ">A.1\nACGT\n");

    let err = load_dataset(&taxon, &fasta, true).unwrap_err();
    assert_matches!(err, JoinError::DuplicateTaxonKey { key, .. } if key == "A.1");
}

#[test]
fn empty_sequences_are_excluded_and_reported() {
    let (_guard, root) = temp_dir();
    let taxon = write_file(
        &root,
        "set.taxon",
        "A.1\tk__Eukaryota_2759\nB.1\tk__Eukaryota_2759\n",
    );
    let fasta = write_file(&root, "set.fasta", ">A.1\n>B.1\nACGT\n");

    let loaded = load_dataset(&taxon, &fasta, true).unwrap();
    assert_eq!(loaded.dataset.len(), 1);
    assert_eq!(loaded.report.joined_rows, 2);
    assert_eq!(
        loaded.report.validation.empty_sequences,
        vec![JoinKey::new("A.1")]
    );
}

#[test]
fn empty_inputs_are_fatal() {
    let (_guard, root) = temp_dir();
    let taxon = write_file(&root, "empty.taxon", "\n\n");
    let fasta = write_file(&root, "set.fasta", ">A.1\nACGT\n");
    let err = load_dataset(&taxon, &fasta, true).unwrap_err();
    assert_matches!(err, JoinError::EmptyInput(_));

    let taxon = write_file(&root, "set.taxon", "A.1\tk__Eukaryota_2759\n");
    let fasta = write_file(&root, "empty.fasta", "");
    let err = load_dataset(&taxon, &fasta, true).unwrap_err();
    assert_matches!(err, JoinError::EmptyInput(_));

    let fasta = write_file(&root, "other.fasta", ">B.1\nACGT\n");
    let err = load_dataset(&taxon, &fasta, true).unwrap_err();
    assert_matches!(err, JoinError::EmptyInput(_));
}

#[test]
fn ids_without_accession_base_do_not_collide() {
    let (_guard, root) = temp_dir();
    let taxon = write_file(&root, "dots.taxon", ".1\tk__Eukaryota_2759\nA.1\tk__Eukaryota_2759\n");
    let fasta = write_file(&root, "dots.fasta", ">.2\nACGT\n>A.1\nTTTT\n");

    let loaded = load_dataset(&taxon, &fasta, true).unwrap();
    assert_eq!(loaded.dataset.len(), 1);
    assert_eq!(loaded.dataset.rows()[0].key.as_str(), "A.1");
    assert_eq!(loaded.report.join_loss.taxon_only, vec![JoinKey::new(".1")]);
    assert_eq!(loaded.report.join_loss.fasta_only, vec![JoinKey::new(".2")]);
}

#[test]
fn missing_file_is_reported() {
    let err = load_dataset("tests/fixtures/nope.taxon", "tests/fixtures/sample.fasta", true)
        .unwrap_err();
    assert_matches!(err, JoinError::MissingInput(_));
}

#[test]
fn parallel_parse_matches_sequential() {
    let sequential = Loader::new(LoadOptions::default())
        .unwrap()
        .load(
            Utf8Path::new("tests/fixtures/sample.taxon"),
            Utf8Path::new("tests/fixtures/sample.fasta"),
            &JsonOutput,
        )
        .unwrap();
    let parallel = Loader::new(LoadOptions {
        parallel: true,
        ..LoadOptions::default()
    })
    .unwrap()
    .load(
        Utf8Path::new("tests/fixtures/sample.taxon"),
        Utf8Path::new("tests/fixtures/sample.fasta"),
        &JsonOutput,
    )
    .unwrap();

    assert_eq!(sequential.dataset, parallel.dataset);
    assert_eq!(sequential.report.join_loss, parallel.report.join_loss);
}

#[test]
fn gzip_fasta_parses_like_plain_text() {
    let (_guard, root) = temp_dir();
    let plain = fs::read("tests/fixtures/sample.fasta").unwrap();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&plain).unwrap();
    let gz_path = root.join("sample.fasta.gz");
    fs::write(gz_path.as_std_path(), encoder.finish().unwrap()).unwrap();

    let plain = load_dataset("tests/fixtures/sample.taxon", "tests/fixtures/sample.fasta", true)
        .unwrap();
    let gz = load_dataset("tests/fixtures/sample.taxon", &gz_path, true).unwrap();
    assert_eq!(plain.dataset, gz.dataset);
}

#[test]
fn query_fasta_is_parsed_without_join() {
    let loader = Loader::new(LoadOptions::default()).unwrap();
    let result = loader
        .load_query(Utf8Path::new("tests/fixtures/sample.fasta"))
        .unwrap();
    assert_eq!(result.records.len(), 3);
    assert_eq!(result.records[1].key, "KX369553.1");
    assert_eq!(
        result.records[1].description.as_deref(),
        Some("Homo sapiens mitochondrion")
    );
    assert_eq!(result.records[2].length, 8);
    assert!(result.skipped_lines.is_empty());
}
