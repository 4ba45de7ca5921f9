//! Pulls a structured score out of free-form evaluator text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::scoring::QualitativeScore;

pub const MAX_SCORE: i64 = 10;

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?[ \t]*\r?\n(.*?)\r?\n[ \t]*```").expect("valid fenced block regex")
});

static SCORE_OBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)\{[^{}]*"(?:technical_sophistication|message_appropriateness)"[^{}]*\}"#)
        .expect("valid score object regex")
});

#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    #[error("no structured score found in evaluator output")]
    NoStructuredData,

    #[error("malformed score object '{json}': {reason}")]
    Malformed { json: String, reason: String },

    #[error("{field} = {value} is outside 0..=10")]
    OutOfRange { field: &'static str, value: i64 },
}

#[derive(Debug, Deserialize)]
struct RawScore {
    technical_sophistication: i64,
    message_appropriateness: i64,
}

/// Finds the JSON score object in `text`.
///
/// A fenced code block wins; otherwise the first flat object that mentions one
/// of the score keys is used.
pub fn locate_json(text: &str) -> Option<&str> {
    if let Some(block) = FENCED_BLOCK
        .captures(text)
        .and_then(|captures| captures.get(1))
    {
        let block = block.as_str().trim();
        if block.starts_with('{') {
            return Some(block);
        }
    }
    SCORE_OBJECT.find(text).map(|found| found.as_str().trim())
}

pub fn extract_score(text: &str) -> Result<QualitativeScore, ExtractError> {
    let json = locate_json(text).ok_or(ExtractError::NoStructuredData)?;
    let raw: RawScore = serde_json::from_str(json).map_err(|err| ExtractError::Malformed {
        json: json.to_string(),
        reason: err.to_string(),
    })?;

    Ok(QualitativeScore {
        technical: bounded("technical_sophistication", raw.technical_sophistication)?,
        message: bounded("message_appropriateness", raw.message_appropriateness)?,
    })
}

fn bounded(field: &'static str, value: i64) -> Result<u8, ExtractError> {
    if (0..=MAX_SCORE).contains(&value) {
        Ok(value as u8)
    } else {
        Err(ExtractError::OutOfRange { field, value })
    }
}
