//! Application orchestration: provider calls plus history bookkeeping.

use crate::ai::{
    ChatRequest, ChatService, ImageGenerationService, OpenAiChatClient, OpenAiImageClient,
};
use crate::history::HistoryLog;
use crate::models::{
    created_at_now, Config, HistoryRecord, ImageRecord, PromptRequest, TextRecord,
    DEFAULT_CHAT_MODEL, DEFAULT_IMAGE_MODEL, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};
use crate::store::{ListStore, MemoryListStore, RedisListStore};
use crate::{Error, Result};
use std::sync::Arc;
use tokio_retry::{strategy::FixedInterval, Retry};
use tracing::{error, info, warn};

/// Forwards prompts to the AI provider and records successful results in the
/// per-mode history logs.
pub struct App {
    chat: Box<dyn ChatService>,
    image_gen: Box<dyn ImageGenerationService>,
    history: HistoryLog,
    chat_model: String,
    image_model: String,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub chat: Box<dyn ChatService>,
    pub image_gen: Box<dyn ImageGenerationService>,
    pub store: Arc<dyn ListStore>,
}

impl App {
    pub fn with_services(services: AppServices) -> Self {
        Self {
            chat: services.chat,
            image_gen: services.image_gen,
            history: HistoryLog::new(services.store),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }

    /// Models used when a request does not name one.
    pub fn with_default_models(mut self, chat_model: String, image_model: String) -> Self {
        self.chat_model = chat_model;
        self.image_model = image_model;
        self
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub async fn new(config: &Config) -> Result<Self> {
        // Reuse one HTTP connection pool across provider clients.
        let http_client = reqwest::Client::builder()
            .timeout(config.ai_timeout)
            .build()?;

        let mut chat = OpenAiChatClient::new(config.openai_api_key.clone(), http_client.clone());
        let mut image_gen = OpenAiImageClient::new(config.openai_api_key.clone(), http_client);
        if let Some(base_url) = &config.openai_base_url {
            info!("Using OpenAI base URL {}", base_url);
            chat = chat.with_base_url(base_url.clone());
            image_gen = image_gen.with_base_url(base_url.clone());
        }

        let store = Self::connect_store(config).await?;

        Ok(Self::with_services(AppServices {
            chat: Box::new(chat),
            image_gen: Box::new(image_gen),
            store,
        })
        .with_default_models(config.chat_model.clone(), config.image_model.clone()))
    }

    async fn connect_store(config: &Config) -> Result<Arc<dyn ListStore>> {
        let Some(url) = config.redis_url.as_deref() else {
            warn!("REDIS_URL not set; history is kept in process memory only");
            return Ok(Arc::new(MemoryListStore::new()));
        };

        let retry_strategy = FixedInterval::from_millis(1000).take(3);
        let timeout = config.store_timeout;

        let store = Retry::spawn(retry_strategy, || async move {
            RedisListStore::connect(url, timeout).await.map_err(|e| {
                warn!("Redis connection attempt failed: {}. Will retry...", e);
                e
            })
        })
        .await
        .map_err(|e| {
            error!("Could not connect to Redis after retries: {}", e);
            e
        })?;

        Ok(Arc::new(store))
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Run a chat completion and log it to the text history.
    pub async fn generate_text(&self, request: PromptRequest) -> Result<TextRecord> {
        let prompt = validated_prompt(&request.prompt)?;
        let model = request.model.unwrap_or_else(|| self.chat_model.clone());

        info!("Generating text with model {} ({} chars)", model, prompt.len());

        let completion = self
            .chat
            .complete(&ChatRequest {
                prompt: prompt.clone(),
                model: model.clone(),
                max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
                temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            })
            .await
            .map_err(|e| {
                error!("Text generation failed: {}", e);
                e
            })?;

        let record = TextRecord {
            id: completion.id,
            prompt,
            response: completion.text,
            model: Some(model),
            created_at: created_at_now(),
        };

        self.record(HistoryRecord::Text(record.clone())).await;
        Ok(record)
    }

    /// Generate an image and log it to the image history.
    pub async fn generate_image(&self, request: PromptRequest) -> Result<ImageRecord> {
        let prompt = validated_prompt(&request.prompt)?;
        let model = request.model.unwrap_or_else(|| self.image_model.clone());

        info!("Generating image with model {}", model);

        let image = self
            .image_gen
            .generate_image(&prompt, &model)
            .await
            .map_err(|e| {
                error!("Image generation failed: {}", e);
                e
            })?;

        let record = ImageRecord {
            id: image.id,
            prompt,
            image_url: image.url,
            model: Some(model),
            created_at: created_at_now(),
        };

        self.record(HistoryRecord::Image(record.clone())).await;
        Ok(record)
    }

    /// Append failures are logged, never returned.
    async fn record(&self, record: HistoryRecord) {
        if let Err(e) = self.history.append(&record).await {
            warn!(
                "Failed to record {} history entry: {}",
                record.kind().as_str(),
                e
            );
        }
    }
}

fn validated_prompt(prompt: &str) -> Result<String> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(Error::InvalidRequest("Prompt empty".to_string()));
    }
    Ok(prompt.to_string())
}
