//! LLM rewrite of a commit set into a polished changelog.
//!
//! The summarizer never fails outright: every problem is reported as a
//! [`Summary::Unavailable`] value and the caller decides what to fall back to.

use changecast_core::config::ANTHROPIC_API_URL;
use changecast_core::{ChangelogDocument, Commit, Config, DateRange, Error, Layout, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_TITLE: &str = "Changelog";

const MAX_TOKENS: u32 = 4000;
const TEMPERATURE: f32 = 0.3;
const SYSTEM_PROMPT: &str = "You are a technical writer who turns raw commit logs into clear, \
well-organized release notes written in Markdown.";

#[derive(Debug, Clone, PartialEq)]
pub enum Summary {
    Generated(ChangelogDocument),
    Unavailable(Unavailable),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    NoApiKey,
    RateLimited,
    EmptyResponse,
    RequestFailed(String),
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::NoApiKey => write!(f, "no API key configured"),
            Unavailable::RateLimited => write!(f, "rate limit or quota exceeded"),
            Unavailable::EmptyResponse => write!(f, "the model returned no text"),
            Unavailable::RequestFailed(reason) => write!(f, "request failed: {}", reason),
        }
    }
}

#[derive(Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone)]
pub struct Summarizer {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl Summarizer {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model: model.into(),
            base_url: ANTHROPIC_API_URL.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(
            Self::new(config.anthropic_api_key.clone(), config.model.clone())?
                .with_base_url(&config.anthropic_api_url),
        )
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn summarize(
        &self,
        commits: &[Commit],
        layout: Layout,
        repo_name: &str,
        date_range: &DateRange,
    ) -> Summary {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("No LLM API key configured, skipping summarizer");
            return Summary::Unavailable(Unavailable::NoApiKey);
        };

        let prompt = build_prompt(commits, layout, repo_name, date_range);

        match self.complete(api_key, prompt).await {
            Ok(markdown) => {
                info!("Generated {} changelog for {} with {}", layout.as_str(), repo_name, self.model);
                Summary::Generated(parse_response(&markdown, date_range))
            }
            Err(reason) => Summary::Unavailable(reason),
        }
    }

    async fn complete(&self, api_key: &str, prompt: String) -> std::result::Result<String, Unavailable> {
        let request = MessageRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            system: SYSTEM_PROMPT,
            messages: vec![ApiMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("LLM request failed: {}", e);
                Unavailable::RequestFailed(e.to_string())
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("LLM rate limit or quota exceeded; falling back to the standard changelog");
            return Err(Unavailable::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            return Err(Unavailable::RequestFailed(format!("{}: {}", status, body)));
        }

        let parsed: MessageResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse LLM response: {}", e);
            Unavailable::RequestFailed(format!("malformed response: {}", e))
        })?;

        match parsed.content.into_iter().next() {
            Some(ContentBlock::Text { text }) if !text.trim().is_empty() => Ok(text),
            _ => {
                warn!("LLM response contained no text");
                Err(Unavailable::EmptyResponse)
            }
        }
    }
}

pub fn build_prompt(
    commits: &[Commit],
    layout: Layout,
    repo_name: &str,
    date_range: &DateRange,
) -> String {
    let (audience, provenance) = match layout {
        Layout::Internal => (
            "The audience is the development team, so technical detail is welcome.",
            "Do not include commit hashes, author names or dates; describe the changes themselves.",
        ),
        Layout::External => (
            "The audience is end users of the product, so focus on user-visible impact and avoid internal jargon.",
            "Never mention commit hashes, author names, dates or internal implementation details.",
        ),
    };

    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "Write a changelog for the repository \"{}\" covering {}.",
        repo_name, date_range
    );
    let _ = writeln!(prompt, "{}", audience);
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Instructions:");
    let _ = writeln!(
        prompt,
        "1. Start with a single `# ` heading holding a version-style title, for example `# v1.4.0 - Faster Search`."
    );
    let _ = writeln!(
        prompt,
        "2. Follow it with a one to two sentence summary of the changes."
    );
    let _ = writeln!(
        prompt,
        "3. Group the changes under exactly these headings, in this order, omitting any heading with nothing under it:"
    );
    for heading in ["Added", "Changed", "Fixed", "Removed", "Security"] {
        let _ = writeln!(prompt, "   ## {}", heading);
    }
    let _ = writeln!(prompt, "4. {}", provenance);
    let _ = writeln!(
        prompt,
        "5. Rewrite commit messages as concise descriptions, merging duplicates and skipping merge commits."
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Commits:");

    for commit in commits {
        let message: Vec<&str> = commit
            .message
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let _ = writeln!(
            prompt,
            "- hash: {} | message: {} | author: {} | date: {}",
            commit.hash,
            message.join(" "),
            commit.author,
            commit.timestamp.format("%Y-%m-%d")
        );
    }

    prompt
}

pub fn parse_response(markdown: &str, date_range: &DateRange) -> ChangelogDocument {
    ChangelogDocument::new(extract_title(markdown), markdown.trim(), date_range.to_string())
}

/// Title from the first `# ` heading, minus any ` - Changelog` suffix.
pub fn extract_title(markdown: &str) -> String {
    markdown
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| {
            let title = title.trim();
            title.strip_suffix(" - Changelog").unwrap_or(title).trim().to_string()
        })
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}
