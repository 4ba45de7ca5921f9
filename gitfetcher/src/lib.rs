pub mod client;
pub mod commits;
pub mod error;
pub mod models;
pub mod packager;
pub mod pager;

pub use crate::client::{GitHubService, OctocrabService};
pub use crate::commits::{count_commits, CommitHistory};
pub use crate::models::{CommitDetail, PageChunk, RepositoryIdentity, SampledCommit};
pub use crate::packager::{package_commit, package_sample};
pub use crate::pager::{Pager, DEFAULT_PAGE_SIZE};
