use std::fmt::Write;

use gitfetcher::SampledCommit;

/// Prompts above this size are logged as likely to hit model limits.
pub const PROMPT_WARN_CHARS: usize = 30_000;

const RUBRIC: &str = r#"Based ONLY on the provided information for these sampled commits, evaluate the following:

1.  **Technical Sophistication (1-10 points):**
    From the diff snippets of the sampled commits, assess the complexity of the changes, the use of advanced techniques or technologies, and the ingenuity in problem-solving.
    A score of 1 means very simple changes (e.g., typo fixes, minor documentation updates).
    A score of 10 means highly complex changes involving significant architectural work, advanced algorithms, or novel technology applications.
    If diffs are empty or uninformative, assign a low score.

2.  **Commit Message Appropriateness (1-10 points):**
    For each sampled commit, evaluate how well its commit message aligns with its corresponding diff snippet.
    Does the message accurately and concisely describe what was changed in the diff?
    A score of 1 means the message is irrelevant, misleading, or completely uninformative regarding the diff.
    A score of 10 means the message perfectly and clearly describes the changes shown in the diff.
    Consider the average appropriateness across all sampled commits.

Please provide your evaluation STRICTLY in the following JSON format, with no other text before or after the JSON block:
{
  "technical_sophistication": <integer_score_1_to_10_for_overall_repo_based_on_samples>,
  "message_appropriateness": <integer_score_1_to_10_for_average_message_quality_based_on_samples>
}"#;

fn diff_caption(line_limit: usize) -> String {
    if line_limit == 0 {
        "Commit Diff:".to_string()
    } else {
        format!("Commit Diff (first {line_limit} lines or less):")
    }
}

/// Renders the sampled commits as the analysis section of the prompt.
pub fn analysis_data(
    repo: &str,
    total_commits: u64,
    samples: &[SampledCommit],
    line_limit: usize,
) -> String {
    let caption = diff_caption(line_limit);
    let mut data = String::new();
    let _ = writeln!(data, "Repository: {repo}");
    let _ = writeln!(data, "Total Commits in Repository: {total_commits}\n");
    let _ = writeln!(data, "Analyzing {} randomly sampled commits:", samples.len());

    for (index, commit) in samples.iter().enumerate() {
        let _ = writeln!(data, "\n--- Sampled Commit {} ---", index + 1);
        let _ = writeln!(data, "Commit Message:\n{}\n", commit.message);
        let _ = writeln!(data, "{caption}\n{}", commit.diff);
    }
    data
}

pub fn build_prompt(
    repo: &str,
    total_commits: u64,
    samples: &[SampledCommit],
    line_limit: usize,
) -> String {
    let snippet = if line_limit == 0 {
        "a snippet of its diff".to_string()
    } else {
        format!("a snippet of its diff (up to the first {line_limit} lines)")
    };

    format!(
        "You are an expert code reviewer. Analyze the provided commit data for the repository named '{repo}'.\n\
         The data includes the total number of commits in the repository and a sample of {count} individual commits, each with its commit message and {snippet}.\n\n\
         {RUBRIC}\n\n\
         Analysis Data:\n{data}",
        count = samples.len(),
        data = analysis_data(repo, total_commits, samples, line_limit),
    )
}
