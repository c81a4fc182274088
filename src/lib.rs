pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod fasta;
pub mod fs_util;
pub mod identifier;
pub mod join;
pub mod label;
pub mod output;
pub mod report;
pub mod summary;
pub mod taxon;
pub mod validate;

pub use app::{LoadOptions, LoadedDataset, Loader, load_dataset};
pub use domain::{Dataset, FastaRecord, JoinKey, Rank, RankSet, TaxonRecord, UnifiedRow};
pub use error::JoinError;
