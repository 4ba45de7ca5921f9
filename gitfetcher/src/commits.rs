use crate::client::GitHubService;
use crate::error::Result;
use crate::pager::Pager;

/// Every commit SHA reachable from the default branch, in the API's traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitHistory {
    shas: Vec<String>,
}

impl CommitHistory {
    pub fn new(shas: Vec<String>) -> Self {
        Self { shas }
    }

    /// Exact commit count.
    pub fn total(&self) -> u64 {
        self.shas.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.shas.is_empty()
    }

    /// SHAs to sample from. With `scan_limit` set only the first `scan_limit`
    /// entries (the most recent commits) are offered, so the draw is no longer
    /// population-wide.
    pub fn population(&self, scan_limit: Option<usize>) -> &[String] {
        match scan_limit {
            Some(limit) if limit < self.shas.len() => &self.shas[..limit],
            _ => &self.shas,
        }
    }
}

/// Counts every commit by walking the full listing once.
///
/// The walked SHAs are kept so sampling needs no second pass. A repository
/// GitHub reports as empty has an empty history.
pub async fn count_commits(
    service: &dyn GitHubService,
    owner: &str,
    repo: &str,
) -> Result<CommitHistory> {
    match Pager::default()
        .collect(move |page, per_page| service.list_commits(owner, repo, page, per_page))
        .await
    {
        Ok(shas) => Ok(CommitHistory::new(shas)),
        Err(err) if err.is_empty_repository() => {
            log::debug!("{owner}/{repo} is empty, counting zero commits");
            Ok(CommitHistory::default())
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(count: usize) -> CommitHistory {
        CommitHistory::new((0..count).map(|n| format!("sha{n}")).collect())
    }

    #[test]
    fn population_is_whole_history_without_limit() {
        let history = history(250);
        assert_eq!(history.total(), 250);
        assert_eq!(history.population(None).len(), 250);
    }

    #[test]
    fn scan_limit_keeps_most_recent_prefix() {
        let history = history(250);
        let population = history.population(Some(40));
        assert_eq!(population.len(), 40);
        assert_eq!(population[0], "sha0");
        assert_eq!(population[39], "sha39");
        // the count is unaffected
        assert_eq!(history.total(), 250);
    }

    #[test]
    fn scan_limit_above_history_keeps_everything() {
        assert_eq!(history(12).population(Some(500)).len(), 12);
    }
}
