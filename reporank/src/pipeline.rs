use std::sync::Arc;

use gitfetcher::{
    count_commits, package_sample, CommitHistory, GitHubService, Pager, RepositoryIdentity,
    SampledCommit,
};
use tracing::{info, warn};

use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::sampler;
use crate::scoring::{QualitativeScore, Ranking, RepositoryScore, ScoreWeights, DEFAULT_COMMIT_CAP};

/// The scan limit only applies when this few samples are requested.
pub const SCAN_LIMIT_MAX_SAMPLE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct RankSettings {
    pub sample_size: usize,
    /// Patch lines kept per sampled commit; 0 keeps whole diffs.
    pub diff_line_limit: usize,
    pub commit_cap: u64,
    pub weights: ScoreWeights,
    /// Sample only from this many of the most recent commits when the sample is small.
    pub scan_limit: Option<usize>,
}

impl Default for RankSettings {
    fn default() -> Self {
        Self {
            sample_size: 5,
            diff_line_limit: 100,
            commit_cap: DEFAULT_COMMIT_CAP,
            weights: ScoreWeights::default(),
            scan_limit: None,
        }
    }
}

/// Ranks the repositories of an organization.
///
/// Repositories are handled one at a time. Every failure below the repository
/// listing is contained to the repository it happened in.
pub struct Pipeline {
    github: Arc<dyn GitHubService>,
    evaluator: Option<Arc<dyn Evaluator>>,
    settings: RankSettings,
}

impl Pipeline {
    pub fn new(github: Arc<dyn GitHubService>, settings: RankSettings) -> Self {
        Self {
            github,
            evaluator: None,
            settings,
        }
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub async fn list_repositories(&self, org: &str) -> Result<Vec<RepositoryIdentity>> {
        let github = self.github.as_ref();
        let repos = Pager::default()
            .collect(move |page, per_page| github.list_org_repos(org, page, per_page))
            .await?;
        Ok(repos)
    }

    /// Lists and scores every repository of `org`, returning the sorted ranking.
    pub async fn run(&self, org: &str) -> Result<Ranking> {
        info!("Fetching repositories for organization: {org}");
        let repos = self.list_repositories(org).await?;
        if repos.is_empty() {
            info!("No repositories found for organization {org}.");
            return Ok(Ranking::new());
        }

        info!("Found {} repositories. Analyzing each repository...", repos.len());
        let ranking = self.accumulate(&repos, Ranking::new()).await;
        Ok(ranking.finish())
    }

    /// Scores `repos` in order and records each result into `ranking`.
    pub async fn accumulate(&self, repos: &[RepositoryIdentity], mut ranking: Ranking) -> Ranking {
        let total = repos.len();
        for (index, repo) in repos.iter().enumerate() {
            if repo.name.is_empty() {
                warn!("Skipping repository with no name (index {index})");
                continue;
            }
            info!("Analyzing repository: {} ({}/{total})", repo.name, index + 1);
            ranking.record(self.score_repository(repo).await);
        }
        ranking
    }

    pub async fn score_repository(&self, repo: &RepositoryIdentity) -> RepositoryScore {
        let settings = &self.settings;
        let name = repo.name.as_str();

        let history = match count_commits(self.github.as_ref(), &repo.owner, name).await {
            Ok(history) => history,
            Err(err) => {
                warn!("Error counting commits for {}: {err}. Recording as failed.", repo.full_name());
                return RepositoryScore::count_failed(name);
            }
        };

        let total = history.total();
        if total == 0 {
            info!("Repository {name} has 0 commits. Skipping evaluation.");
            return RepositoryScore::empty(name);
        }

        let Some(evaluator) = &self.evaluator else {
            return RepositoryScore::unevaluated(name, total, &settings.weights, settings.commit_cap);
        };

        let samples = self.draw_sample(repo, &history).await;
        if samples.is_empty() {
            warn!("No sampled commits to analyze for {name}, assigning low scores.");
            return RepositoryScore::scored(
                name,
                total,
                QualitativeScore::FLOOR,
                samples,
                &settings.weights,
                settings.commit_cap,
            );
        }

        match evaluator.evaluate(name, total, &samples).await {
            Ok(quality) => RepositoryScore::scored(
                name,
                total,
                quality,
                samples,
                &settings.weights,
                settings.commit_cap,
            ),
            Err(err) => {
                warn!("Error analyzing commits for {name}: {err}. Assigning default scores.");
                RepositoryScore::evaluation_failed(name, total, samples)
            }
        }
    }

    fn scan_limit(&self) -> Option<usize> {
        self.settings
            .scan_limit
            .filter(|_| self.settings.sample_size <= SCAN_LIMIT_MAX_SAMPLE)
    }

    async fn draw_sample(
        &self,
        repo: &RepositoryIdentity,
        history: &CommitHistory,
    ) -> Vec<SampledCommit> {
        let population = history.population(self.scan_limit());
        if (population.len() as u64) < history.total() {
            info!(
                "Sampling {} from the {} most recent of {} commits (scan limit)",
                repo.full_name(),
                population.len(),
                history.total()
            );
        }

        let picked = sampler::sample(population, self.settings.sample_size);
        package_sample(
            self.github.as_ref(),
            &repo.owner,
            &repo.name,
            &picked,
            self.settings.diff_line_limit,
        )
        .await
    }
}
