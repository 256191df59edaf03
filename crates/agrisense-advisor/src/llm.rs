use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Image sent inline with a prompt, already base64 encoded by the uploader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    pub fn jpeg(data: impl Into<String>) -> Self {
        Self {
            mime_type: "image/jpeg".to_string(),
            data: data.into(),
        }
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// One prompt for the completion service
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub prompt: String,
    pub images: Vec<InlineImage>,
}

impl CompletionRequest {
    pub fn new(system_prompt: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            prompt: prompt.into(),
            images: Vec::new(),
        }
    }

    pub fn with_images(mut self, images: impl IntoIterator<Item = InlineImage>) -> Self {
        self.images.extend(images);
        self
    }
}

/// Free-text answer from a provider
#[derive(Debug, Clone)]
pub struct Completion {
    pub provider: String,
    pub text: String,
    pub token_cost: u32,
}

/// Text/vision completion collaborator
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;
}
