//! Free-form AI query port
//!
//! The interpreter forwards unmatched commands here and speaks whatever
//! comes back. Any failure (network, model, or an empty answer) surfaces
//! to the caller as an error so the interpreter can apologize.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Gemini generateContent endpoint root
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Instruction prepended to every prompt to keep spoken answers short
const BREVITY_PREFIX: &str = "Please provide a brief response in 3-4 lines maximum: ";

/// Maximum non-empty lines kept from an answer
const MAX_ANSWER_LINES: usize = 4;

/// Expected shape of a Gemini API key
static API_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^AIza[0-9A-Za-z_-]{35}$").expect("valid regex"));

/// Answers free-form prompts
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Ask the backing model
    ///
    /// # Errors
    ///
    /// Returns error if the model is unreachable, misconfigured, or returns
    /// an empty answer
    async fn query(&self, prompt: &str) -> Result<String>;
}

/// Gemini REST client
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "Gemini API key required for AI queries".to_string(),
            ));
        }

        if !API_KEY_RE.is_match(&api_key) {
            tracing::warn!("Gemini API key does not match the expected shape");
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        })
    }
}

#[async_trait]
impl AiClient for GeminiClient {
    async fn query(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: format!("{BREVITY_PREFIX}{prompt}"),
                }],
            }],
        };

        let url = format!(
            "{GEMINI_API_BASE}/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::AiQuery(format!("Gemini error {status}: {body}")));
        }

        let body: GenerateResponse = response.json().await?;
        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::AiQuery("empty response from model".to_string()));
        }

        Ok(concise(&text))
    }
}

/// Placeholder client used when no API key is configured
///
/// Every query fails, so the interpreter falls back to its standard apology.
pub struct UnconfiguredAi;

#[async_trait]
impl AiClient for UnconfiguredAi {
    async fn query(&self, _prompt: &str) -> Result<String> {
        Err(Error::AiQuery("no API key configured".to_string()))
    }
}

/// Keep answers speakable: at most four non-empty lines
fn concise(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_ANSWER_LINES)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}
