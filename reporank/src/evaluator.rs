use async_trait::async_trait;
use gitfetcher::SampledCommit;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::extract::{extract_score, ExtractError};
use crate::prompt::{build_prompt, PROMPT_WARN_CHARS};
use crate::scoring::QualitativeScore;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("evaluator request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("evaluator API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("evaluator response is empty")]
    EmptyResponse,

    #[error(transparent)]
    Extraction(#[from] ExtractError),
}

/// Opaque scoring oracle for a repository's sampled commits.
///
/// Callers only invoke it with a non-zero commit count and at least one sample.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(
        &self,
        repo: &str,
        total_commits: u64,
        samples: &[SampledCommit],
    ) -> Result<QualitativeScore, EvaluatorError>;
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String, EvaluatorError> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or(EvaluatorError::EmptyResponse)
    }
}

/// Evaluator backed by the Gemini `generateContent` REST endpoint.
pub struct GeminiEvaluator {
    api_key: String,
    model: String,
    base_url: String,
    diff_line_limit: usize,
    client: reqwest::Client,
}

impl GeminiEvaluator {
    pub fn new(model: String, api_key: String) -> Self {
        Self {
            api_key,
            model,
            base_url: GEMINI_BASE_URL.to_string(),
            diff_line_limit: 0,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Line budget the diff snippets were cut to, quoted in the prompt.
    pub fn with_diff_line_limit(mut self, diff_line_limit: usize) -> Self {
        self.diff_line_limit = diff_line_limit;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    // The key travels in a header so it never shows up in a logged request URL.
    fn request(&self, prompt: String) -> reqwest::RequestBuilder {
        let request_payload = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        self.client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request_payload)
    }

    async fn generate(&self, prompt: String) -> Result<String, EvaluatorError> {
        let response = self.request(prompt).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EvaluatorError::Api { status, body });
        }

        response.json::<GenerateResponse>().await?.into_text()
    }
}

#[async_trait]
impl Evaluator for GeminiEvaluator {
    async fn evaluate(
        &self,
        repo: &str,
        total_commits: u64,
        samples: &[SampledCommit],
    ) -> Result<QualitativeScore, EvaluatorError> {
        let prompt = build_prompt(repo, total_commits, samples, self.diff_line_limit);
        debug!(
            "Sending prompt to Gemini for repo {repo} (Total commits: {total_commits}, Sampled: {}). Prompt length: {} chars.",
            samples.len(),
            prompt.len()
        );
        if prompt.len() > PROMPT_WARN_CHARS {
            warn!(
                "Prompt for {repo} is very long ({} chars), may exceed API limits or be slow.",
                prompt.len()
            );
        }

        let reply = self.generate(prompt).await?;
        debug!("Gemini raw response for {repo}: {reply}");

        Ok(extract_score(&reply)?)
    }
}
