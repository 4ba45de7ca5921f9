use async_trait::async_trait;
use octocrab::{Octocrab, Page};
use serde::Deserialize;

use crate::error::{GitFetcherError, Result};
use crate::models::{CommitDetail, PageChunk, RepositoryIdentity};

/// The slice of the GitHub API the ranking pipeline depends on.
///
/// Listing operations take a 1-based page number and a page size and report the
/// next page number, if any. `list_commits` must return
/// [`GitFetcherError::EmptyRepository`] for repositories without any commits.
#[async_trait]
pub trait GitHubService: Send + Sync {
    async fn list_org_repos(
        &self,
        org: &str,
        page: u32,
        per_page: u8,
    ) -> Result<PageChunk<RepositoryIdentity>>;

    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u8,
    ) -> Result<PageChunk<String>>;

    async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<CommitDetail>;
}

/// `GitHubService` backed by Octocrab, responsible for authentication and the REST calls.
pub struct OctocrabService {
    octocrab: Octocrab,
}

impl OctocrabService {
    /// Creates a new client instance.
    ///
    /// Optionally uses a personal access token for authentication to increase rate limits.
    pub fn new(token: Option<String>) -> Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }
        let octocrab = builder.build()?;
        Ok(Self { octocrab })
    }
}

#[derive(Debug, Deserialize)]
struct CommitDetailResponse {
    commit: CommitBody,
    #[serde(default)]
    files: Option<Vec<CommitFile>>,
}

#[derive(Debug, Deserialize)]
struct CommitBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitFile {
    #[serde(default)]
    patch: Option<String>,
}

impl From<CommitDetailResponse> for CommitDetail {
    fn from(response: CommitDetailResponse) -> Self {
        let patches = response
            .files
            .unwrap_or_default()
            .into_iter()
            .filter_map(|file| file.patch)
            .filter(|patch| !patch.is_empty())
            .collect();
        CommitDetail {
            message: response.commit.message,
            patches,
        }
    }
}

fn next_page<T>(page: &Page<T>, current: u32) -> Option<u32> {
    page.next.as_ref().map(|_| current + 1)
}

// GitHub answers 409 Conflict when listing commits of a repository with no history.
fn is_conflict(err: &octocrab::Error) -> bool {
    matches!(err, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 409)
}

#[async_trait]
impl GitHubService for OctocrabService {
    async fn list_org_repos(
        &self,
        org: &str,
        page: u32,
        per_page: u8,
    ) -> Result<PageChunk<RepositoryIdentity>> {
        let listing = self
            .octocrab
            .orgs(org)
            .list_repos()
            .per_page(per_page)
            .page(page)
            .send()
            .await?;

        let next = next_page(&listing, page);
        let items = listing
            .items
            .into_iter()
            .map(|repo| {
                let owner = repo
                    .owner
                    .map(|owner| owner.login)
                    .unwrap_or_else(|| org.to_string());
                RepositoryIdentity::new(owner, repo.name)
            })
            .collect();

        Ok(PageChunk { items, next })
    }

    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u8,
    ) -> Result<PageChunk<String>> {
        let listing = match self
            .octocrab
            .repos(owner, repo)
            .list_commits()
            .per_page(per_page)
            .page(page)
            .send()
            .await
        {
            Ok(listing) => listing,
            Err(err) if is_conflict(&err) => {
                return Err(GitFetcherError::EmptyRepository {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                })
            }
            Err(err) => return Err(err.into()),
        };

        let next = next_page(&listing, page);
        let items = listing.items.into_iter().map(|commit| commit.sha).collect();
        Ok(PageChunk { items, next })
    }

    async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<CommitDetail> {
        let route = format!("/repos/{owner}/{repo}/commits/{sha}");
        let response: CommitDetailResponse = self.octocrab.get(route, None::<&()>).await?;
        Ok(response.into())
    }
}
