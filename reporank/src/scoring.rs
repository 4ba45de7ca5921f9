//! Composite repository score and the ranking accumulator.
//!
//! The commit volume is capped and scaled onto the same 0-10 range as the two
//! qualitative scores, then the three are blended with fixed weights.

use gitfetcher::SampledCommit;
use serde::Serialize;

pub const DEFAULT_COMMIT_CAP: u64 = 1000;

/// Commit count recorded when counting or listing failed.
pub const COUNT_FAILED: i64 = -1;

const SCORE_SCALE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub commits: f64,
    pub technical: f64,
    pub message: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            commits: 0.2,
            technical: 0.4,
            message: 0.4,
        }
    }
}

/// Evaluator verdict on a repository's sampled commits, each on a 0-10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualitativeScore {
    pub technical: u8,
    pub message: u8,
}

impl QualitativeScore {
    pub const ZERO: Self = Self {
        technical: 0,
        message: 0,
    };

    /// Assigned when a repository has commits but none of them could be sampled.
    pub const FLOOR: Self = Self {
        technical: 1,
        message: 0,
    };

    pub fn new(technical: u8, message: u8) -> Self {
        Self { technical, message }
    }
}

/// Maps a commit count onto 0-10, saturating at `cap`.
pub fn normalized_commit_score(commit_count: u64, cap: u64) -> f64 {
    let cap = cap.max(1);
    commit_count.min(cap) as f64 / cap as f64 * SCORE_SCALE
}

pub fn overall_score(
    commit_count: u64,
    quality: QualitativeScore,
    weights: &ScoreWeights,
    cap: u64,
) -> f64 {
    normalized_commit_score(commit_count, cap) * weights.commits
        + f64::from(quality.technical) * weights.technical
        + f64::from(quality.message) * weights.message
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreStatus {
    /// Scored from commit volume and an evaluator verdict (or the no-sample floor).
    Scored,
    /// No commits; every score is zero and no evaluation took place.
    Empty,
    /// Commit counting failed; the commit count is [`COUNT_FAILED`].
    CountFailed,
    /// The evaluator call or its result extraction failed.
    EvaluationFailed,
    /// Ranked on commit volume alone, no evaluator configured.
    Unevaluated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryScore {
    pub name: String,
    pub commit_count: i64,
    pub technical_score: u8,
    pub message_score: u8,
    pub overall_score: f64,
    pub analyzed_count: usize,
    pub status: ScoreStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<SampledCommit>,
}

impl RepositoryScore {
    pub fn count_failed(name: impl Into<String>) -> Self {
        Self::blank(name, COUNT_FAILED, ScoreStatus::CountFailed)
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self::blank(name, 0, ScoreStatus::Empty)
    }

    pub fn unevaluated(
        name: impl Into<String>,
        commit_count: u64,
        weights: &ScoreWeights,
        cap: u64,
    ) -> Self {
        let mut score = Self::blank(name, commit_count as i64, ScoreStatus::Unevaluated);
        score.overall_score = overall_score(commit_count, QualitativeScore::ZERO, weights, cap);
        score
    }

    pub fn scored(
        name: impl Into<String>,
        commit_count: u64,
        quality: QualitativeScore,
        samples: Vec<SampledCommit>,
        weights: &ScoreWeights,
        cap: u64,
    ) -> Self {
        Self {
            name: name.into(),
            commit_count: commit_count as i64,
            technical_score: quality.technical,
            message_score: quality.message,
            overall_score: overall_score(commit_count, quality, weights, cap),
            analyzed_count: samples.len(),
            status: ScoreStatus::Scored,
            samples,
        }
    }

    pub fn evaluation_failed(
        name: impl Into<String>,
        commit_count: u64,
        samples: Vec<SampledCommit>,
    ) -> Self {
        let mut score = Self::blank(name, commit_count as i64, ScoreStatus::EvaluationFailed);
        score.analyzed_count = samples.len();
        score.samples = samples;
        score
    }

    fn blank(name: impl Into<String>, commit_count: i64, status: ScoreStatus) -> Self {
        Self {
            name: name.into(),
            commit_count,
            technical_score: 0,
            message_score: 0,
            overall_score: 0.0,
            analyzed_count: 0,
            status,
            samples: Vec::new(),
        }
    }
}

/// Accumulates repository scores over a run.
///
/// Scores are kept in the order they were recorded until [`Ranking::finish`]
/// sorts them. The running maximum overall score is tracked for chart scaling.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ranking {
    scores: Vec<RepositoryScore>,
    max_overall: f64,
}

impl Ranking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, score: RepositoryScore) {
        if score.overall_score > self.max_overall {
            self.max_overall = score.overall_score;
        }
        self.scores.push(score);
    }

    /// Sorts by overall score, highest first. Ties keep their recording order.
    pub fn finish(mut self) -> Self {
        self.scores
            .sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
        self
    }

    pub fn scores(&self) -> &[RepositoryScore] {
        &self.scores
    }

    pub fn max_overall(&self) -> f64 {
        self.max_overall
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
