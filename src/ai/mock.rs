use super::{ChatCompletion, ChatRequest, ChatService, GeneratedImage, ImageGenerationService};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockChatClient {
    responses: Arc<Mutex<Vec<String>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    /// Every call fails with `Error::AiProvider(message)`.
    pub fn with_failure(self, message: String) -> Self {
        *self.failure.lock().unwrap() = Some(message);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn get_requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatService for MockChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        let count = requests.len();

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::AiProvider(message));
        }

        let responses = self.responses.lock().unwrap();
        let text = if responses.is_empty() {
            format!("Echo: {}", request.prompt)
        } else {
            responses[(count - 1) % responses.len()].clone()
        };

        Ok(ChatCompletion {
            id: Some(format!("mock-chat-{}", count)),
            text,
        })
    }
}

#[derive(Clone)]
pub struct MockImageGenerationClient {
    urls: Arc<Mutex<Vec<Option<String>>>>,
    call_count: Arc<Mutex<usize>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            urls: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_url_response(self, url: Option<String>) -> Self {
        self.urls.lock().unwrap().push(url);
        self
    }

    pub fn with_failure(self, message: String) -> Self {
        *self.failure.lock().unwrap() = Some(message);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_image(&self, _prompt: &str, _model: &str) -> Result<GeneratedImage> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::AiProvider(message));
        }

        let urls = self.urls.lock().unwrap();
        let url = if urls.is_empty() {
            Some(format!("https://mock-images.example.com/{}.png", *count))
        } else {
            urls[(*count - 1) % urls.len()].clone()
        };

        Ok(GeneratedImage { id: None, url })
    }
}
