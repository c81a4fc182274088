use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use midori_join::app::{LoadOptions, LoadedDataset, Loader, TracingSink};
use midori_join::config::{ConfigLoader, ResolvedConfig};
use midori_join::error::JoinError;
use midori_join::identifier::KeyRule;
use midori_join::output::{JsonOutput, export_tsv};
use midori_join::summary::DatasetSummary;

#[derive(Parser)]
#[command(name = "midori-join")]
#[command(about = "Join MIDORI2 CO1 taxonomy labels with their FASTA sequences")]
#[command(version, author)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Load, join and validate a taxon/FASTA pair; prints the load report")]
    Load(LoadArgs),
    #[command(about = "Print descriptive statistics of the joined dataset")]
    Summary(InputArgs),
    #[command(about = "Parse a query FASTA file without joining it")]
    Query(QueryArgs),
}

#[derive(Args, Clone)]
struct InputArgs {
    #[arg(long)]
    taxon: Option<Utf8PathBuf>,

    #[arg(long)]
    fasta: Option<Utf8PathBuf>,

    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    no_normalize: bool,

    #[arg(long, value_enum)]
    key_rule: Option<KeyRule>,

    #[arg(long)]
    key_pattern: Option<String>,

    #[arg(long)]
    parallel: bool,
}

#[derive(Args)]
struct LoadArgs {
    #[command(flatten)]
    input: InputArgs,

    #[arg(long)]
    output: Option<Utf8PathBuf>,
}

#[derive(Args)]
struct QueryArgs {
    #[arg(long)]
    fasta: Utf8PathBuf,

    #[arg(long, value_enum)]
    key_rule: Option<KeyRule>,

    #[arg(long)]
    key_pattern: Option<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<JoinError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &JoinError) -> u8 {
    match error {
        JoinError::MissingConfig
        | JoinError::ConfigRead(_)
        | JoinError::ConfigParse(_)
        | JoinError::MissingInput(_)
        | JoinError::InvalidSeparator(_)
        | JoinError::InvalidKeyPattern(_)
        | JoinError::Io { .. } => 2,
        JoinError::DuplicateTaxonKey { .. }
        | JoinError::DuplicateFastaKey { .. }
        | JoinError::EmptyInput(_)
        | JoinError::SchemaInconsistency { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Load(args) => run_load(args),
        Commands::Summary(args) => run_summary(args),
        Commands::Query(args) => run_query(args),
    }
}

fn run_load(args: LoadArgs) -> miette::Result<()> {
    let loaded = load(&args.input)?;
    if let Some(path) = &args.output {
        export_tsv(&loaded.dataset, path)?;
        tracing::info!(path = %path, rows = loaded.dataset.len(), "wrote dataset");
    }
    JsonOutput::print_report(&loaded.report).into_diagnostic()?;
    Ok(())
}

fn run_summary(args: InputArgs) -> miette::Result<()> {
    let loaded = load(&args)?;
    let summary = DatasetSummary::from_dataset(&loaded.dataset);
    JsonOutput::print_summary(&summary).into_diagnostic()?;
    Ok(())
}

fn run_query(args: QueryArgs) -> miette::Result<()> {
    let default_rule = if args.key_pattern.is_some() {
        KeyRule::Pattern
    } else {
        KeyRule::Accession
    };
    let options = LoadOptions {
        key_rule: args.key_rule.unwrap_or(default_rule),
        key_pattern: args.key_pattern,
        ..LoadOptions::default()
    };
    let loader = Loader::new(options)?;
    let result = loader.load_query(&args.fasta)?;
    JsonOutput::print_query(&result).into_diagnostic()?;
    Ok(())
}

fn load(args: &InputArgs) -> miette::Result<LoadedDataset> {
    let resolved = resolve_config(args)?;
    let (taxon, fasta) = resolve_inputs(args, resolved.as_ref())?;
    let options = build_options(args, resolved.as_ref());
    let loader = Loader::new(options)?;
    Ok(loader.load(&taxon, &fasta, &TracingSink)?)
}

fn resolve_config(args: &InputArgs) -> miette::Result<Option<ResolvedConfig>> {
    match ConfigLoader::resolve(args.config.as_deref()) {
        Ok(resolved) => Ok(Some(resolved)),
        Err(JoinError::MissingConfig) if args.taxon.is_some() && args.fasta.is_some() => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn resolve_inputs(
    args: &InputArgs,
    config: Option<&ResolvedConfig>,
) -> miette::Result<(Utf8PathBuf, Utf8PathBuf)> {
    let taxon = args
        .taxon
        .clone()
        .or_else(|| config.and_then(|c| c.taxon.clone()))
        .ok_or(JoinError::MissingInput("taxon file (use --taxon)".to_string()))?;
    let fasta = args
        .fasta
        .clone()
        .or_else(|| config.and_then(|c| c.fasta.clone()))
        .ok_or(JoinError::MissingInput("FASTA file (use --fasta)".to_string()))?;
    Ok((taxon, fasta))
}

fn build_options(args: &InputArgs, config: Option<&ResolvedConfig>) -> LoadOptions {
    let mut options = config.map(LoadOptions::from).unwrap_or_default();
    if args.no_normalize {
        options.normalize = false;
    }
    if let Some(rule) = args.key_rule {
        options.key_rule = rule;
    }
    if args.key_pattern.is_some() {
        options.key_pattern = args.key_pattern.clone();
        if args.key_rule.is_none() {
            options.key_rule = KeyRule::Pattern;
        }
    }
    if args.parallel {
        options.parallel = true;
    }
    options
}
