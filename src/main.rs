//! litscreen command-line entrypoint.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use mimalloc::MiMalloc;
use tokio::signal;

use litscreen::config::Config;
use litscreen::export::OutputDir;
use litscreen::oracle::{AnthropicOracle, OracleAdapter, ScoringOracle, ScreeningPrompt};
use litscreen::orchestrator::Orchestrator;
use litscreen::record::load_candidates;
use litscreen::review::{ConsoleReviewer, HumanDecision, ReviewSession, human_review_queue};
use litscreen::screening::{ProgressLog, ProgressOptions, ScreeningDecision, classify};
use litscreen::validation::{stratified_sample, validate};
use litscreen::{deduplicate, export};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(
    name = "litscreen",
    version,
    about = "Deduplicate, screen and validate systematic-review candidates",
    after_help = "Remaining settings are read from LITSCREEN_* environment variables."
)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

/// Settings that can also be given on the command line.
#[derive(Args)]
struct Overrides {
    /// Question the oracle scores relevance against
    #[arg(long, global = true, env = "LITSCREEN_RESEARCH_QUESTION")]
    research_question: Option<String>,

    /// Concurrent oracle calls
    #[arg(long, global = true, env = "LITSCREEN_WORKERS")]
    workers: Option<usize>,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(question) = self.research_question.filter(|q| !q.trim().is_empty()) {
            config.research_question = Some(question.trim().to_string());
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Load candidates and remove duplicates
    Dedup {
        /// Candidate list (.csv, .json or .jsonl)
        input: PathBuf,
        /// Output directory
        out_dir: String,
    },
    /// Score the deduplicated corpus and route records to zones
    Screen {
        out_dir: String,
        /// Discard the screening progress log and score everything again
        #[arg(long)]
        restart: bool,
    },
    /// Adjudicate records on the console
    Review(ReviewArgs),
    /// Compare screening zones with human decisions
    Validate { out_dir: String },
}

#[derive(Args)]
struct ReviewArgs {
    out_dir: String,
    /// Review a stratified validation sample instead of the human-review queue
    #[arg(long)]
    sample: bool,
    /// Validation sample size
    #[arg(long, env = "LITSCREEN_SAMPLE_SIZE")]
    sample_size: Option<usize>,
    /// Validation sample seed
    #[arg(long, env = "LITSCREEN_SAMPLE_SEED")]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    cli.overrides.apply(&mut config);
    config.validate()?;

    match cli.command {
        Command::Dedup { input, out_dir } => run_dedup(&config, &input, &out_dir),
        Command::Screen { out_dir, restart } => run_screen(&config, &out_dir, restart).await,
        Command::Review(args) => {
            if let Some(size) = args.sample_size {
                config.sample_size = size;
            }
            if let Some(seed) = args.seed {
                config.sample_seed = seed;
            }
            run_review(&config, &args.out_dir, args.sample).await
        }
        Command::Validate { out_dir } => run_validate(&out_dir),
    }
}

fn run_dedup(config: &Config, input: &Path, out: &str) -> anyhow::Result<()> {
    let records = load_candidates(input)?;
    tracing::info!(path = %input.display(), records = records.len(), "Loaded candidates");

    let outcome = deduplicate(records, &config.dedup_config());
    let dir = OutputDir::create(out)?;
    dir.write_dedup(&outcome)?;

    let report = &outcome.report;
    println!(
        "Deduplicated {} records to {} ({} identifier, {} secondary identifier, {} fuzzy title)",
        report.input,
        report.unique,
        report.primary_identifier_removed,
        report.secondary_identifier_removed,
        report.fuzzy_title_removed
    );
    Ok(())
}

async fn run_screen(config: &Config, out: &str, restart: bool) -> anyhow::Result<()> {
    let dir = OutputDir::create(out)?;
    let corpus_path = dir.path(export::DEDUPLICATED_CSV);
    let corpus = load_candidates(&corpus_path)
        .with_context(|| format!("run `litscreen dedup` into {out} first"))?;

    let question = config.require_research_question()?;
    let adapter = OracleAdapter::new(
        build_oracle(config)?,
        ScreeningPrompt::new(question),
        config.oracle.clone(),
    );

    let orchestrator = Orchestrator::new(config.workers);
    let stop = orchestrator.stop_signal();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::warn!("Stop requested, finishing in-flight records");
            stop.stop();
        }
    });

    let log_path = dir.screening_log();
    if restart && log_path.exists() {
        std::fs::remove_file(&log_path)
            .with_context(|| format!("removing {}", log_path.display()))?;
        tracing::warn!(path = %log_path.display(), "Discarded screening progress log");
    }
    let progress = ProgressOptions {
        path: &log_path,
        flush_every: config.flush_every,
    };

    tracing::info!(
        records = corpus.len(),
        workers = config.workers,
        include_threshold = config.policy.include_threshold,
        exclude_threshold = config.policy.exclude_threshold,
        "Screening starting"
    );
    let result = classify(&corpus, &adapter, &config.policy, &orchestrator, Some(progress)).await?;

    dir.write_screening(&result.decisions)?;
    println!("{}", result.summary);
    Ok(())
}

fn build_oracle(config: &Config) -> anyhow::Result<Arc<dyn ScoringOracle>> {
    if config.mock_oracle {
        return mock_oracle();
    }
    let api_key = config.require_api_key()?;
    let oracle = AnthropicOracle::new(api_key, &config.oracle_url, &config.oracle_model)?;
    tracing::info!(model = %config.oracle_model, "Using HTTP oracle");
    Ok(Arc::new(oracle))
}

#[cfg(feature = "mock")]
fn mock_oracle() -> anyhow::Result<Arc<dyn ScoringOracle>> {
    use litscreen::oracle::{MockOracle, OracleResponse};

    tracing::warn!("LITSCREEN_MOCK_ORACLE set, every record gets the same stub score");
    Ok(Arc::new(
        MockOracle::new().with_default(OracleResponse::from_scores(5, 5, 2, 5, 0, 0)),
    ))
}

#[cfg(not(feature = "mock"))]
fn mock_oracle() -> anyhow::Result<Arc<dyn ScoringOracle>> {
    bail!("LITSCREEN_MOCK_ORACLE requires a build with the `mock` feature")
}

fn load_screening(dir: &OutputDir) -> anyhow::Result<Vec<ScreeningDecision>> {
    let decisions = ProgressLog::<ScreeningDecision>::load(&dir.screening_log())?;
    if decisions.is_empty() {
        bail!("no screening decisions in {}; run `litscreen screen` first", dir.root().display());
    }
    Ok(decisions)
}

async fn run_review(config: &Config, out: &str, sample: bool) -> anyhow::Result<()> {
    let dir = OutputDir::create(out)?;
    let decisions = load_screening(&dir)?;

    let queue = if sample {
        let sample = stratified_sample(&decisions, config.sample_size, config.sample_seed);
        dir.write_validation_sample(&sample)?;
        sample
    } else {
        human_review_queue(&decisions)
    };

    let log_path: PathBuf = dir.review_log();
    let saved = tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<HumanDecision>> {
        let mut session = ReviewSession::open(&log_path, queue)?;
        let mut reviewer = ConsoleReviewer::new(io::stdin().lock(), io::stdout());
        let summary = session.run(&mut reviewer)?;
        println!("\n{summary}");
        Ok(session.into_decisions())
    })
    .await??;

    dir.write_human_decisions(&saved)?;
    Ok(())
}

fn run_validate(out: &str) -> anyhow::Result<()> {
    let dir = OutputDir::create(out)?;
    let decisions = load_screening(&dir)?;
    let human = ProgressLog::<HumanDecision>::load(&dir.review_log())?;

    let report = validate(&decisions, &human)?;
    dir.write_human_decisions(&human)?;
    dir.write_agreement(&report)?;

    println!(
        "Cohen's Kappa {:.3} ({}) over {} paired records",
        report.kappa, report.band, report.compared
    );
    for recommendation in &report.recommendations {
        println!("  - {recommendation}");
    }
    Ok(())
}
