use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use gitfetcher::{
    client::GitHubService,
    count_commits,
    error::{GitFetcherError, Result},
    models::{CommitDetail, PageChunk, RepositoryIdentity},
    package_sample,
    packager::TRUNCATION_MARKER,
};

enum MockHistory {
    Commits(Vec<String>),
    Empty,
    FailsOnPage(Vec<String>, u32),
}

#[derive(Default)]
struct MockGitHubService {
    histories: HashMap<String, MockHistory>,
    details: HashMap<String, CommitDetail>,
    broken_details: HashSet<String>,
    requested_pages: Mutex<Vec<(String, u32)>>,
}

impl MockGitHubService {
    fn with_history(mut self, repo: &str, history: MockHistory) -> Self {
        self.histories.insert(repo.to_string(), history);
        self
    }

    fn with_detail(mut self, sha: &str, message: Option<&str>, patches: &[&str]) -> Self {
        self.details.insert(
            sha.to_string(),
            CommitDetail {
                message: message.map(str::to_string),
                patches: patches.iter().map(|p| p.to_string()).collect(),
            },
        );
        self
    }

    fn with_broken_detail(mut self, sha: &str) -> Self {
        self.broken_details.insert(sha.to_string());
        self
    }

    fn pages_requested(&self, repo: &str) -> Vec<u32> {
        self.requested_pages
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == repo)
            .map(|(_, page)| *page)
            .collect()
    }
}

fn page_of(shas: &[String], page: u32, per_page: u8) -> PageChunk<String> {
    let per_page = per_page as usize;
    let start = (page as usize - 1) * per_page;
    let end = (start + per_page).min(shas.len());
    let items = shas.get(start..end).map(<[String]>::to_vec).unwrap_or_default();
    let next = (end < shas.len()).then_some(page + 1);
    PageChunk { items, next }
}

#[async_trait]
impl GitHubService for MockGitHubService {
    async fn list_org_repos(
        &self,
        org: &str,
        _page: u32,
        _per_page: u8,
    ) -> Result<PageChunk<RepositoryIdentity>> {
        let mut names: Vec<_> = self.histories.keys().cloned().collect();
        names.sort();
        Ok(PageChunk::last(
            names
                .into_iter()
                .map(|name| RepositoryIdentity::new(org, name))
                .collect(),
        ))
    }

    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u8,
    ) -> Result<PageChunk<String>> {
        self.requested_pages
            .lock()
            .unwrap()
            .push((repo.to_string(), page));

        match self.histories.get(repo) {
            Some(MockHistory::Commits(shas)) => Ok(page_of(shas, page, per_page)),
            Some(MockHistory::Empty) => Err(GitFetcherError::EmptyRepository {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            Some(MockHistory::FailsOnPage(shas, failing)) => {
                if page == *failing {
                    Err(GitFetcherError::Internal("connection reset".into()))
                } else {
                    Ok(page_of(shas, page, per_page))
                }
            }
            None => Err(GitFetcherError::Internal(format!("unknown repo {repo}"))),
        }
    }

    async fn get_commit(&self, _owner: &str, _repo: &str, sha: &str) -> Result<CommitDetail> {
        if self.broken_details.contains(sha) {
            return Err(GitFetcherError::Internal(format!("detail for {sha} unavailable")));
        }
        self.details
            .get(sha)
            .cloned()
            .ok_or_else(|| GitFetcherError::Internal(format!("no commit {sha}")))
    }
}

fn shas(count: usize) -> Vec<String> {
    (0..count).map(|n| format!("sha{n:04}")).collect()
}

#[tokio::test]
async fn count_walks_every_page_once() {
    let history = shas(250);
    let service =
        MockGitHubService::default().with_history("big", MockHistory::Commits(history.clone()));

    let counted = count_commits(&service, "acme", "big")
        .await
        .expect("count should succeed");

    assert_eq!(counted.total(), 250);
    assert_eq!(counted.population(None), history.as_slice());
    assert_eq!(service.pages_requested("big"), vec![1, 2, 3]);
}

#[tokio::test]
async fn empty_repository_counts_zero() {
    let service = MockGitHubService::default().with_history("fresh", MockHistory::Empty);

    let counted = count_commits(&service, "acme", "fresh")
        .await
        .expect("empty repository is not an error");

    assert_eq!(counted.total(), 0);
    assert!(counted.is_empty());
    assert!(counted.population(Some(500)).is_empty());
}

#[tokio::test]
async fn failing_page_aborts_the_count() {
    let service = MockGitHubService::default()
        .with_history("flaky", MockHistory::FailsOnPage(shas(350), 3));

    let err = count_commits(&service, "acme", "flaky")
        .await
        .expect_err("page failure must surface");

    assert!(matches!(err, GitFetcherError::Internal(_)));
    assert!(!err.is_empty_repository());
    assert_eq!(service.pages_requested("flaky"), vec![1, 2, 3]);
}

#[tokio::test]
async fn scan_limit_narrows_population_not_count() {
    let history = shas(5000);
    let service =
        MockGitHubService::default().with_history("huge", MockHistory::Commits(history.clone()));

    let counted = count_commits(&service, "acme", "huge")
        .await
        .expect("count should succeed");

    assert_eq!(counted.total(), 5000);
    assert_eq!(counted.population(Some(500)), &history[..500]);
    assert_eq!(service.pages_requested("huge").len(), 50);
}

#[tokio::test]
async fn failed_detail_fetch_shrinks_the_sample() {
    let picked: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
    let service = MockGitHubService::default()
        .with_detail("a", Some("Add cache"), &["+cache"])
        .with_detail("b", Some("Fix typo"), &["-teh\n+the"])
        .with_broken_detail("c")
        .with_detail("d", None, &[])
        .with_detail("e", Some("Refactor"), &["+x1\n+x2\n+x3"]);

    let sample = package_sample(&service, "acme", "repo", &picked, 2).await;

    assert_eq!(sample.len(), 4);
    let order: Vec<_> = sample.iter().map(|c| c.sha.as_str()).collect();
    assert_eq!(order, vec!["a", "b", "d", "e"]);

    let missing_message = &sample[2];
    assert_eq!(missing_message.message, "");
    assert_eq!(missing_message.diff, "");

    let truncated = &sample[3];
    assert_eq!(truncated.diff, format!("+x1\n+x2\n{TRUNCATION_MARKER}"));
}
