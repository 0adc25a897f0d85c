//! Authenticated JSON transport shared by the chat and image clients.

use crate::{Error, Result};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Raw bodies longer than this are cut before they reach an error detail.
const MAX_RAW_DETAIL_CHARS: usize = 200;

/// `{"error": {...}}` envelope OpenAI returns with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

pub struct OpenAiHttpClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiHttpClient {
    /// `client` carries the request timeout; one pool is shared by all
    /// provider clients.
    pub fn new(api_key: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// POST `payload` to `path` and decode a 2xx body as `Resp`.
    pub async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        path: &str,
        payload: &Req,
    ) -> Result<Resp> {
        let response = self.send(path, payload).await?;
        decode_response(path, response).await
    }

    async fn send<Req: Serialize>(&self, path: &str, payload: &Req) -> Result<Response> {
        tracing::debug!("POST {}{}", self.base_url, path);

        self.client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("OpenAI {} unreachable: {}", path, e);
                Error::AiProvider(format!("request to {} failed: {}", path, e))
            })
    }
}

async fn decode_response<Resp: DeserializeOwned>(path: &str, response: Response) -> Result<Resp> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let detail = error_detail(status, &body);
        tracing::error!("OpenAI {} rejected: {}", path, detail);
        return Err(Error::AiProvider(detail));
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!("Unexpected OpenAI {} payload ({}): {}", path, e, body);
        Error::AiProvider(format!("unexpected response from {}: {}", path, e))
    })
}

/// Short, user-facing text for a failed call, e.g.
/// `status 429 (rate_limit_exceeded): Rate limit reached`.
fn error_detail(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => {
            let label = match (error.code, error.kind) {
                (Some(serde_json::Value::String(code)), _) => Some(code),
                (Some(serde_json::Value::Number(code)), _) => Some(code.to_string()),
                (_, kind) => kind,
            };
            match label {
                Some(label) => format!("status {} ({}): {}", status.as_u16(), label, error.message),
                None => format!("status {}: {}", status.as_u16(), error.message),
            }
        }
        Err(_) => {
            let raw = body.trim();
            if raw.is_empty() {
                format!("status {}", status.as_u16())
            } else {
                let cut: String = raw.chars().take(MAX_RAW_DETAIL_CHARS).collect();
                format!("status {}: {}", status.as_u16(), cut)
            }
        }
    }
}
