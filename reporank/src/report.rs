use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::scoring::{Ranking, RepositoryScore, ScoreStatus};

const TABLE_WIDTH: usize = 120;
const CHART_WIDTH: usize = 50;
const NAME_WIDTH: usize = 40;
const SAMPLE_DIFF_LINES: usize = 3;

/// Presents a finished ranking.
pub trait ResultSink {
    fn render(&self, ranking: &Ranking, out: &mut dyn Write) -> Result<()>;
}

pub struct TableSink;

impl TableSink {
    fn write_row(score: &RepositoryScore, out: &mut dyn Write) -> Result<()> {
        if score.status == ScoreStatus::CountFailed {
            writeln!(
                out,
                "{:<40} | {:<10} | {:<10} | {:<10} | {:<10} | {:<15}",
                score.name, "ERROR", "N/A", "N/A", "N/A", "N/A"
            )?;
            return Ok(());
        }

        let overall = match score.status {
            ScoreStatus::EvaluationFailed => format!("{:.2}!", score.overall_score),
            _ => format!("{:.2}", score.overall_score),
        };
        writeln!(
            out,
            "{:<40} | {:<10} | {:<10} | {:<10} | {:<10} | {:<15}",
            score.name,
            score.commit_count,
            score.technical_score,
            score.message_score,
            overall,
            score.analyzed_count
        )?;
        Ok(())
    }
}

impl ResultSink for TableSink {
    fn render(&self, ranking: &Ranking, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", "=".repeat(TABLE_WIDTH))?;
        writeln!(
            out,
            "{:<40} | {:<10} | {:<10} | {:<10} | {:<10} | {:<15}",
            "Repository", "Commits", "Tech Score", "Msg Score", "Overall", "Analyzed Smpls"
        )?;
        writeln!(out, "{}", "-".repeat(TABLE_WIDTH))?;
        for score in ranking.scores() {
            Self::write_row(score, out)?;
        }
        writeln!(out, "{}", "=".repeat(TABLE_WIDTH))?;

        if ranking
            .scores()
            .iter()
            .any(|score| score.status == ScoreStatus::EvaluationFailed)
        {
            writeln!(out, "! evaluation failed, qualitative scores recorded as 0")?;
        }
        Ok(())
    }
}

/// Horizontal bar chart of overall scores, scaled to the ranking's best score.
pub struct ChartSink;

impl ChartSink {
    fn bar_len(value: f64, max: f64) -> usize {
        if max <= 0.0 || value <= 0.0 {
            return 0;
        }
        ((value / max) * CHART_WIDTH as f64).round() as usize
    }
}

impl ResultSink for ChartSink {
    fn render(&self, ranking: &Ranking, out: &mut dyn Write) -> Result<()> {
        let max = ranking.max_overall();
        for score in ranking.scores() {
            let name = truncate_name(&score.name);
            if score.status == ScoreStatus::CountFailed {
                writeln!(out, "{name:<40} | ERROR")?;
                continue;
            }
            let bar = "#".repeat(Self::bar_len(score.overall_score, max));
            writeln!(out, "{name:<40} | {bar:<50} {:.2}", score.overall_score)?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    organization: &'a str,
    generated_at: DateTime<Utc>,
    repositories: &'a [RepositoryScore],
}

pub struct JsonSink {
    organization: String,
}

impl JsonSink {
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
        }
    }
}

impl ResultSink for JsonSink {
    fn render(&self, ranking: &Ranking, out: &mut dyn Write) -> Result<()> {
        let report = JsonReport {
            organization: &self.organization,
            generated_at: Utc::now(),
            repositories: ranking.scores(),
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        Ok(())
    }
}

fn truncate_name(name: &str) -> String {
    if name.chars().count() <= NAME_WIDTH {
        return name.to_string();
    }
    let kept: String = name.chars().take(NAME_WIDTH - 3).collect();
    format!("{kept}...")
}

/// Prints the commits sampled for the `top_n` best repositories.
pub fn write_top_samples(ranking: &Ranking, top_n: usize, out: &mut dyn Write) -> Result<()> {
    let shown = ranking
        .scores()
        .iter()
        .filter(|score| score.commit_count >= 0 && !score.samples.is_empty())
        .take(top_n);

    for score in shown {
        writeln!(
            out,
            "\nRepository: {} (Overall Score: {:.2})",
            score.name, score.overall_score
        )?;
        writeln!(out, "Analyzed {} sampled commits:", score.analyzed_count)?;
        for (index, commit) in score.samples.iter().enumerate() {
            writeln!(out, "  Sample {} (SHA: {}):", index + 1, commit.sha)?;
            writeln!(
                out,
                "    Message: {}",
                commit.message.lines().next().unwrap_or_default()
            )?;
            let head: Vec<&str> = commit.diff.lines().take(SAMPLE_DIFF_LINES).collect();
            writeln!(out, "    Diff Snippet (first {SAMPLE_DIFF_LINES} lines):")?;
            for line in head {
                writeln!(out, "      {line}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{QualitativeScore, ScoreWeights};
    use gitfetcher::SampledCommit;

    fn sample_ranking() -> Ranking {
        let weights = ScoreWeights::default();
        let mut ranking = Ranking::new();
        ranking.record(RepositoryScore::scored(
            "core",
            1000,
            QualitativeScore::new(10, 10),
            vec![SampledCommit {
                sha: "abc".into(),
                message: "Add scheduler\n\nLong body".into(),
                diff: "+a\n+b\n+c\n+d".into(),
            }],
            &weights,
            1000,
        ));
        ranking.record(RepositoryScore::count_failed("broken"));
        ranking.record(RepositoryScore::evaluation_failed("opaque", 12, Vec::new()));
        ranking.record(RepositoryScore::empty("fresh"));
        ranking.finish()
    }

    fn render_to_string(sink: &dyn ResultSink, ranking: &Ranking) -> String {
        let mut buffer = Vec::new();
        sink.render(ranking, &mut buffer).expect("render succeeds");
        String::from_utf8(buffer).expect("utf8 output")
    }

    #[test]
    fn table_marks_failures() {
        let output = render_to_string(&TableSink, &sample_ranking());
        let core = output.lines().find(|l| l.starts_with("core")).expect("core row");
        assert!(core.contains("10.00"));
        let broken = output.lines().find(|l| l.starts_with("broken")).expect("broken row");
        assert!(broken.contains("ERROR"));
        assert!(broken.contains("N/A"));
        let opaque = output.lines().find(|l| l.starts_with("opaque")).expect("opaque row");
        assert!(opaque.contains("0.00!"));
        assert!(output.contains("! evaluation failed"));
    }

    #[test]
    fn chart_scales_bars_to_best_score() {
        let output = render_to_string(&ChartSink, &sample_ranking());
        let core = output.lines().find(|l| l.starts_with("core")).expect("core row");
        assert_eq!(core.matches('#').count(), CHART_WIDTH);
        let fresh = output.lines().find(|l| l.starts_with("fresh")).expect("fresh row");
        assert_eq!(fresh.matches('#').count(), 0);
    }

    #[test]
    fn json_report_lists_repositories_in_rank_order() {
        let output = render_to_string(&JsonSink::new("acme"), &sample_ranking());
        let value: serde_json::Value = serde_json::from_str(&output).expect("valid json");
        assert_eq!(value["organization"], "acme");
        let repos = value["repositories"].as_array().expect("repositories array");
        assert_eq!(repos.len(), 4);
        assert_eq!(repos[0]["name"], "core");
        assert_eq!(repos[0]["status"], "scored");
        assert_eq!(repos[0]["samples"][0]["sha"], "abc");
        let broken = repos.iter().find(|r| r["name"] == "broken").expect("broken entry");
        assert_eq!(broken["commit_count"], -1);
    }

    #[test]
    fn top_samples_show_first_message_line_and_diff_head() {
        let mut buffer = Vec::new();
        write_top_samples(&sample_ranking(), 3, &mut buffer).expect("write succeeds");
        let output = String::from_utf8(buffer).expect("utf8 output");
        assert!(output.contains("Repository: core (Overall Score: 10.00)"));
        assert!(output.contains("Message: Add scheduler\n"));
        assert!(output.contains("      +c"));
        assert!(!output.contains("+d"));
        assert!(!output.contains("opaque"));
    }

    #[test]
    fn long_names_are_shortened() {
        let name = "x".repeat(60);
        let shortened = truncate_name(&name);
        assert_eq!(shortened.chars().count(), NAME_WIDTH);
        assert!(shortened.ends_with("..."));
    }
}
