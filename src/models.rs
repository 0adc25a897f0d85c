//! Data models and structures
//!
//! Defines the history records kept for each generation mode, the request
//! payloads accepted by the API, and environment configuration.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Format of `createdAt` on every history record.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Which generation mode a record (and its log) belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Text,
    Image,
}

impl HistoryKind {
    pub const ALL: [HistoryKind; 2] = [HistoryKind::Text, HistoryKind::Image];

    /// Backing store key holding this kind's log.
    pub fn store_key(self) -> &'static str {
        match self {
            HistoryKind::Text => "ai_history",
            HistoryKind::Image => "ai_image_history",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HistoryKind::Text => "text",
            HistoryKind::Image => "image",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextRecord {
    pub id: Option<String>,
    pub prompt: String,
    pub response: String,
    pub model: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageRecord {
    pub id: Option<String>,
    pub prompt: String,
    pub image_url: Option<String>,
    pub model: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// One logged generation event, tagged by `mode` in its stored JSON form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum HistoryRecord {
    Text(TextRecord),
    Image(ImageRecord),
}

impl HistoryRecord {
    pub fn kind(&self) -> HistoryKind {
        match self {
            HistoryRecord::Text(_) => HistoryKind::Text,
            HistoryRecord::Image(_) => HistoryKind::Image,
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            HistoryRecord::Text(record) => &record.prompt,
            HistoryRecord::Image(record) => &record.prompt,
        }
    }

    pub fn created_at(&self) -> &str {
        match self {
            HistoryRecord::Text(record) => &record.created_at,
            HistoryRecord::Image(record) => &record.created_at,
        }
    }

    pub fn encode(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a stored entry, rejecting a `createdAt` that is not in
    /// [`CREATED_AT_FORMAT`].
    pub fn decode(raw: &str) -> crate::Result<Self> {
        let record: HistoryRecord = serde_json::from_str(raw)?;
        if parse_created_at(record.created_at()).is_none() {
            return Err(crate::Error::Serialization(serde::de::Error::custom(
                format!(
                    "createdAt '{}' is not in YYYY-MM-DD HH:MM:SS format",
                    record.created_at()
                ),
            )));
        }
        Ok(record)
    }
}

impl From<TextRecord> for HistoryRecord {
    fn from(record: TextRecord) -> Self {
        HistoryRecord::Text(record)
    }
}

impl From<ImageRecord> for HistoryRecord {
    fn from(record: ImageRecord) -> Self {
        HistoryRecord::Image(record)
    }
}

/// Current local time formatted for `createdAt`.
pub fn created_at_now() -> String {
    Local::now().format(CREATED_AT_FORMAT).to_string()
}

pub fn parse_created_at(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, CREATED_AT_FORMAT).ok()
}

/// Body accepted by both generation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl PromptRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub redis_url: Option<String>,
    pub store_timeout: Duration,
    pub ai_timeout: Duration,
    pub bind_addr: String,
    pub cors_allow_origins: Vec<String>,
    pub chat_model: String,
    pub image_model: String,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").map_err(|_| {
                crate::Error::Config("OPENAI_API_KEY environment variable not set".to_string())
            })?,
            openai_base_url: non_empty_var("OPENAI_BASE_URL"),
            redis_url: non_empty_var("REDIS_URL"),
            store_timeout: Duration::from_millis(parse_var("STORE_TIMEOUT_MS", 2000)?),
            ai_timeout: Duration::from_secs(parse_var("AI_TIMEOUT_SECS", 60)?),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            cors_allow_origins: parse_origins(
                &std::env::var("CORS_ALLOW_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:5173,*".to_string()),
            ),
            chat_model: std::env::var("DEFAULT_CHAT_MODEL")
                .unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string()),
            image_model: std::env::var("DEFAULT_IMAGE_MODEL")
                .unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string()),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var(name: &str, default: u64) -> crate::Result<u64> {
    match non_empty_var(name) {
        Some(value) => value.parse().map_err(|_| {
            crate::Error::Config(format!("{} must be a whole number, got '{}'", name, value))
        }),
        None => Ok(default),
    }
}

pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
