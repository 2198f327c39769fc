//! Meme caption text from a language model, with a fixed fallback set.
//!
//! Callers go through [`captions_for`], which never fails: a timeout, a
//! transport error or output we can't make sense of all turn into
//! [`FALLBACK_CAPTIONS`] sized to the template.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::BoxFuture;
use crate::constants::{
    ANTHROPIC_VERSION, CAPTION_MAX_TOKENS, CAPTION_TEMPERATURE, FALLBACK_CAPTIONS,
    MAX_CAPTION_WORDS,
};
use crate::render::MemeTemplate;

/// First bracketed list in a reply that wraps its JSON in prose.
static EMBEDDED_ARRAY: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?s)\[.*\]").ok());

/// Reasons a caption source produced nothing usable.
#[derive(Debug)]
pub enum CaptionSourceError {
    /// No credentials were configured.
    NotConfigured,
    /// The request could not be sent or its body read.
    Transport(reqwest::Error),
    /// The service answered with a non-success status.
    Status(u16, String),
    /// The response was not the expected JSON.
    Parse(String),
    /// The response contained no caption text.
    Empty,
    /// The service did not answer in time.
    Timeout(Duration),
}

impl std::fmt::Display for CaptionSourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "Caption service is not configured"),
            Self::Transport(err) => write!(f, "Caption request failed: {err}"),
            Self::Status(status, body) => write!(f, "Caption service error {status}: {body}"),
            Self::Parse(err) => write!(f, "Failed to parse caption response: {err}"),
            Self::Empty => write!(f, "Caption service returned no text"),
            Self::Timeout(after) => write!(f, "Caption service timed out after {after:?}"),
        }
    }
}

impl std::error::Error for CaptionSourceError {}

impl From<reqwest::Error> for CaptionSourceError {
    fn from(err: reqwest::Error) -> Self {
        CaptionSourceError::Transport(err)
    }
}

/// Produces one short caption per text area of a template.
pub trait CaptionSource: Send + Sync + std::fmt::Debug {
    /// Captions for `prompt`, in text-area order.
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        template: &'static MemeTemplate,
    ) -> BoxFuture<'a, Result<Vec<String>, CaptionSourceError>>;
}

/// Source used when no caption service is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineCaptions;

impl CaptionSource for OfflineCaptions {
    fn generate<'a>(
        &'a self,
        _prompt: &'a str,
        _template: &'static MemeTemplate,
    ) -> BoxFuture<'a, Result<Vec<String>, CaptionSourceError>> {
        Box::pin(async { Err(CaptionSourceError::NotConfigured) })
    }
}

#[derive(Serialize, Debug)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize, Debug)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Captions from a Messages API endpoint.
#[derive(Clone, Debug)]
pub struct MessagesApiCaptions {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl MessagesApiCaptions {
    /// Client for `endpoint` using `model`.
    pub fn new(client: reqwest::Client, endpoint: Url, api_key: String, model: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
            model,
        }
    }

    async fn request(
        &self,
        prompt: &str,
        template: &MemeTemplate,
    ) -> Result<Vec<String>, CaptionSourceError> {
        let instructions = caption_instructions(prompt, template);
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: CAPTION_MAX_TOKENS,
            temperature: CAPTION_TEMPERATURE,
            messages: vec![Message {
                role: "user",
                content: &instructions,
            }],
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(CaptionSourceError::Status(
                status.as_u16(),
                String::from_utf8_lossy(&bytes).into_owned(),
            ));
        }

        let parsed: MessagesResponse = serde_json::from_slice(&bytes)
            .map_err(|err| CaptionSourceError::Parse(err.to_string()))?;
        let text = parsed
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .ok_or(CaptionSourceError::Empty)?;
        debug!("Caption model replied: {}", text);

        Ok(parse_caption_text(&text, template.text_areas.len()))
    }
}

impl CaptionSource for MessagesApiCaptions {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        template: &'static MemeTemplate,
    ) -> BoxFuture<'a, Result<Vec<String>, CaptionSourceError>> {
        Box::pin(self.request(prompt, template))
    }
}

fn caption_instructions(prompt: &str, template: &MemeTemplate) -> String {
    format!(
        r#"Create a funny meme using the {name} template.

User request: {prompt}

Generate {count} short, punchy text snippets that would work well for this meme template.
Each text should be maximum {MAX_CAPTION_WORDS} words.
Return as JSON array: ["text1", "text2", ...]

Make it funny and relevant to: {prompt}"#,
        name = template.name,
        count = template.text_areas.len(),
    )
}

/// Reads captions out of model output: a JSON array of strings, a JSON array
/// embedded in prose, or failing both the first `count` non-empty lines.
pub fn parse_caption_text(text: &str, count: usize) -> Vec<String> {
    if let Ok(captions) = serde_json::from_str::<Vec<String>>(text.trim()) {
        return captions;
    }
    if let Some(found) = EMBEDDED_ARRAY.as_ref().and_then(|pattern| pattern.find(text))
        && let Ok(captions) = serde_json::from_str::<Vec<String>>(found.as_str())
    {
        return captions;
    }
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(count)
        .map(str::to_string)
        .collect()
}

/// The fallback set trimmed, or cycled, to `count` entries.
pub fn fallback_captions(count: usize) -> Vec<String> {
    FALLBACK_CAPTIONS
        .iter()
        .cycle()
        .take(count)
        .map(|caption| caption.to_string())
        .collect()
}

fn tidy(captions: Vec<String>, count: usize) -> Vec<String> {
    captions
        .into_iter()
        .take(count)
        .map(|caption| {
            caption
                .split_whitespace()
                .take(MAX_CAPTION_WORDS)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Captions for `template`, never failing. At most one per text area, each
/// capped at [`MAX_CAPTION_WORDS`] words.
pub async fn captions_for(
    source: &dyn CaptionSource,
    prompt: &str,
    template: &'static MemeTemplate,
    timeout: Duration,
) -> Vec<String> {
    let count = template.text_areas.len();
    let outcome = tokio::time::timeout(timeout, source.generate(prompt, template))
        .await
        .unwrap_or(Err(CaptionSourceError::Timeout(timeout)))
        .map(|captions| tidy(captions, count))
        .and_then(|captions| {
            if captions.iter().any(|caption| !caption.is_empty()) {
                Ok(captions)
            } else {
                Err(CaptionSourceError::Empty)
            }
        });
    match outcome {
        Ok(captions) => captions,
        Err(err) => {
            warn!("Using fallback captions for {}: {}", template.id, err);
            fallback_captions(count)
        }
    }
}
