use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::error::{RankError, Result};
use crate::evaluator::DEFAULT_GEMINI_MODEL;
use crate::pipeline::RankSettings;
use crate::scoring::{ScoreWeights, DEFAULT_COMMIT_CAP};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Chart,
    Json,
}

/// Rank the repositories of a GitHub organization by commit volume and sampled commit quality.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// GitHub organization whose repositories are ranked
    #[arg(long, env = "REPORANK_ORG")]
    pub org: Option<String>,

    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Gemini API key used to evaluate sampled commits
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    /// Commits sampled per repository
    #[arg(long, default_value_t = 5)]
    pub sample_size: usize,

    /// Diff lines kept per sampled commit (0 keeps the whole diff)
    #[arg(long, default_value_t = 100)]
    pub diff_line_limit: usize,

    /// Commit count at which the volume score saturates
    #[arg(long, default_value_t = DEFAULT_COMMIT_CAP)]
    pub commit_cap: u64,

    #[arg(long, default_value_t = 0.2)]
    pub commit_weight: f64,

    #[arg(long, default_value_t = 0.4)]
    pub technical_weight: f64,

    #[arg(long, default_value_t = 0.4)]
    pub message_weight: f64,

    /// Sample only from this many of the most recent commits when sampling 10 or fewer.
    /// The commit count still covers the whole history.
    #[arg(long)]
    pub scan_limit: Option<usize>,

    /// Rank on commit volume alone, without sampling or evaluation
    #[arg(long, default_value_t = false)]
    pub no_evaluate: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write the report to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Print the sampled commits of the N best repositories after the table
    #[arg(long, default_value_t = 0)]
    pub show_samples: usize,
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

impl Cli {
    pub fn organization(&self) -> Result<String> {
        non_blank(self.org.as_ref())
            .ok_or_else(|| RankError::Config("organization name is required (--org or REPORANK_ORG)".into()))
    }

    pub fn github_token(&self) -> Option<String> {
        non_blank(self.github_token.as_ref())
    }

    /// The evaluator credential, or `None` when evaluation is disabled.
    pub fn evaluator_key(&self) -> Result<Option<String>> {
        if self.no_evaluate {
            return Ok(None);
        }
        non_blank(self.gemini_api_key.as_ref())
            .map(Some)
            .ok_or_else(|| {
                RankError::Config(
                    "GEMINI_API_KEY is required unless --no-evaluate is given".into(),
                )
            })
    }

    pub fn settings(&self) -> Result<RankSettings> {
        if self.commit_cap == 0 {
            return Err(RankError::Config("--commit-cap must be at least 1".into()));
        }
        if self.scan_limit == Some(0) {
            return Err(RankError::Config("--scan-limit must be at least 1".into()));
        }

        let weights = ScoreWeights {
            commits: self.commit_weight,
            technical: self.technical_weight,
            message: self.message_weight,
        };
        for (flag, weight) in [
            ("--commit-weight", weights.commits),
            ("--technical-weight", weights.technical),
            ("--message-weight", weights.message),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(RankError::Config(format!(
                    "{flag} must be a non-negative number, got {weight}"
                )));
            }
        }

        Ok(RankSettings {
            sample_size: self.sample_size,
            diff_line_limit: self.diff_line_limit,
            commit_cap: self.commit_cap,
            weights,
            scan_limit: self.scan_limit,
        })
    }
}
