use serde::Serialize;

/// An organization-owned repository as reported by the repository listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryIdentity {
    pub owner: String,
    pub name: String,
}

impl RepositoryIdentity {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// One page of a paginated listing together with the cursor of the page after it.
#[derive(Debug, Clone)]
pub struct PageChunk<T> {
    pub items: Vec<T>,
    pub next: Option<u32>,
}

impl<T> PageChunk<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

/// Message and per-file patches of a single commit.
#[derive(Debug, Clone, Default)]
pub struct CommitDetail {
    pub message: Option<String>,
    pub patches: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampledCommit {
    pub sha: String,
    pub message: String,
    pub diff: String,
}
