pub mod config;
pub mod error;
pub mod evaluator;
pub mod extract;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod sampler;
pub mod scoring;

use std::{fs::File, io::Write, sync::Arc};

use anyhow::Context;
use clap::Parser;
use gitfetcher::OctocrabService;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

pub use crate::config::{Cli, OutputFormat};
pub use crate::evaluator::{Evaluator, GeminiEvaluator};
pub use crate::pipeline::{Pipeline, RankSettings};
pub use crate::scoring::{Ranking, RepositoryScore, ScoreStatus};

use crate::report::{ChartSink, JsonSink, ResultSink, TableSink};

/// Runs the command line interface.
pub async fn run_cli() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    run(cli).await
}

fn init_tracing() {
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let org = cli.organization()?;
    let evaluator_key = cli.evaluator_key()?;
    let settings = cli.settings()?;

    let token = cli.github_token();
    if token.is_none() {
        warn!("GITHUB_TOKEN is not set, requests are subject to anonymous rate limits");
    }
    let github = OctocrabService::new(token).context("failed to create GitHub client")?;

    let diff_line_limit = settings.diff_line_limit;
    let mut pipeline = Pipeline::new(Arc::new(github), settings);
    match evaluator_key {
        Some(key) => {
            let evaluator = GeminiEvaluator::new(cli.gemini_model.clone(), key)
                .with_diff_line_limit(diff_line_limit);
            pipeline = pipeline.with_evaluator(Arc::new(evaluator));
        }
        None => info!("Evaluation disabled, ranking on commit volume only"),
    }

    let ranking = pipeline
        .run(&org)
        .await
        .with_context(|| format!("failed to rank repositories of {org}"))?;

    let sink: Box<dyn ResultSink> = match cli.format {
        OutputFormat::Table => Box::new(TableSink),
        OutputFormat::Chart => Box::new(ChartSink),
        OutputFormat::Json => Box::new(JsonSink::new(org.clone())),
    };

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };

    sink.render(&ranking, out.as_mut())
        .context("failed to write report")?;
    if cli.show_samples > 0 && cli.format != OutputFormat::Json {
        report::write_top_samples(&ranking, cli.show_samples, out.as_mut())
            .context("failed to write sample details")?;
    }
    out.flush().context("failed to flush report")?;

    if let Some(path) = &cli.output {
        info!("Report written to {}", path.display());
    }
    Ok(())
}
