use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum JoinError {
    #[error("malformed taxon line {line}: {reason}")]
    MalformedTaxonLine { line: usize, reason: String },

    #[error("malformed FASTA line {line}: {reason}")]
    MalformedFastaLine { line: usize, reason: String },

    #[error("duplicate taxon key {key} (lines {first_line} and {second_line})")]
    #[diagnostic(help("each accession must appear once in the taxon file after key normalization"))]
    DuplicateTaxonKey {
        key: String,
        first_line: usize,
        second_line: usize,
    },

    #[error("duplicate FASTA key {key} (lines {first_line} and {second_line})")]
    #[diagnostic(help("each accession must appear once in the FASTA file after key normalization"))]
    DuplicateFastaKey {
        key: String,
        first_line: usize,
        second_line: usize,
    },

    #[error("no records in {0}")]
    EmptyInput(String),

    #[error("inconsistent rank columns for {key}: {reason}")]
    SchemaInconsistency { key: String, reason: String },

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid label separator {0:?}")]
    #[diagnostic(help("use a single character that is neither whitespace nor uppercase, such as '_'"))]
    InvalidSeparator(char),

    #[error("invalid key pattern: {0}")]
    InvalidKeyPattern(String),

    #[error("missing config file midori-join.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("parser worker failed: {0}")]
    Worker(String),
}

impl JoinError {
    pub(crate) fn io(path: impl Into<String>, err: std::io::Error) -> Self {
        JoinError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
