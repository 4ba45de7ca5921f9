use crate::client::GitHubService;
use crate::error::Result;
use crate::models::SampledCommit;

pub const FILE_SEPARATOR: &str = "---";
pub const TRUNCATION_MARKER: &str = "... (diff truncated due to line limit)";

/// Joins per-file patches into one snippet, keeping at most `line_limit` patch lines.
///
/// Files are separated by a `---` line which does not count against the budget.
/// When the budget is spent and patch content remains, the snippet ends with
/// [`TRUNCATION_MARKER`]. A `line_limit` of zero disables truncation.
pub fn render_patches<S: AsRef<str>>(patches: &[S], line_limit: usize) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut emitted = 0usize;

    for (index, patch) in patches.iter().enumerate() {
        let patch = patch.as_ref();
        if patch.is_empty() {
            continue;
        }
        if index > 0 && !out.is_empty() {
            out.push(FILE_SEPARATOR);
        }
        for line in patch.lines() {
            if line_limit > 0 && emitted >= line_limit {
                // the separator pushed for this file carries no content
                if out.last() == Some(&FILE_SEPARATOR) {
                    out.pop();
                }
                out.push(TRUNCATION_MARKER);
                return out.join("\n");
            }
            out.push(line);
            emitted += 1;
        }
    }

    out.join("\n")
}

/// Fetches one commit and packages its message with a bounded diff snippet.
pub async fn package_commit(
    service: &dyn GitHubService,
    owner: &str,
    repo: &str,
    sha: &str,
    line_limit: usize,
) -> Result<SampledCommit> {
    let detail = service.get_commit(owner, repo, sha).await?;
    Ok(SampledCommit {
        sha: sha.to_string(),
        message: detail.message.unwrap_or_default(),
        diff: render_patches(&detail.patches, line_limit),
    })
}

/// Packages each SHA in order. Commits whose detail cannot be fetched are logged and
/// left out, so the result may be shorter than `shas`.
pub async fn package_sample(
    service: &dyn GitHubService,
    owner: &str,
    repo: &str,
    shas: &[String],
    line_limit: usize,
) -> Vec<SampledCommit> {
    let mut packaged = Vec::with_capacity(shas.len());
    for sha in shas {
        match package_commit(service, owner, repo, sha, line_limit).await {
            Ok(commit) => packaged.push(commit),
            Err(err) => {
                log::warn!("Error getting commit details for {repo} (SHA: {sha}): {err}. Skipping this commit.");
            }
        }
    }
    log::info!(
        "Fetched {} commit details for analysis for repo {owner}/{repo}",
        packaged.len()
    );
    packaged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch_of(lines: usize, prefix: &str) -> String {
        (1..=lines)
            .map(|n| format!("{prefix}{n}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn truncates_exactly_at_the_line_limit() {
        let patch = patch_of(10, "+line ");
        let snippet = render_patches(&[patch], 4);
        let lines: Vec<&str> = snippet.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(&lines[..4], &["+line 1", "+line 2", "+line 3", "+line 4"]);
        assert_eq!(lines[4], TRUNCATION_MARKER);
        assert!(!snippet.contains("+line 5"));
    }

    #[test]
    fn separates_files_and_counts_only_patch_lines() {
        let snippet = render_patches(&[patch_of(2, "+a"), patch_of(2, "+b")], 3);
        assert_eq!(
            snippet,
            ["+a1", "+a2", FILE_SEPARATOR, "+b1", TRUNCATION_MARKER].join("\n")
        );
    }

    #[test]
    fn budget_spent_at_file_boundary_drops_dangling_separator() {
        let snippet = render_patches(&[patch_of(2, "+a"), patch_of(2, "+b")], 2);
        assert_eq!(snippet, ["+a1", "+a2", TRUNCATION_MARKER].join("\n"));
    }

    #[test]
    fn content_that_fits_has_no_marker() {
        let snippet = render_patches(&[patch_of(3, "+a")], 3);
        assert_eq!(snippet, "+a1\n+a2\n+a3");
    }

    #[test]
    fn zero_limit_keeps_everything() {
        let patches = vec![patch_of(150, "+a"), patch_of(150, "+b")];
        let snippet = render_patches(&patches, 0);
        assert_eq!(snippet.lines().count(), 301);
        assert!(!snippet.contains(TRUNCATION_MARKER));
    }

    #[test]
    fn empty_patches_are_skipped() {
        let snippet = render_patches(&["", "+only", ""], 10);
        assert_eq!(snippet, "+only");
        assert_eq!(render_patches::<&str>(&[], 10), "");
    }
}
