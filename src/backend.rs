use std::path::Path;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct AskRequest<'a> {
    user_id: &'a str,
    message: &'a str,
}

#[derive(Deserialize)]
struct AskResponse {
    reply: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    message: String,
}

/// Client for the assistant backend. Three endpoints: `/chat` answers from
/// the model alone, `/ask-doc` answers grounded in uploaded documents,
/// `/upload-doc` accepts a document for later retrieval.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    user_id: String,
}

impl BackendClient {
    pub fn new(base_url: &str, user_id: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
        }
    }

    pub async fn chat(&self, message: &str) -> Result<String> {
        self.ask("/chat", message).await
    }

    pub async fn ask_document(&self, message: &str) -> Result<String> {
        self.ask("/ask-doc", message).await
    }

    async fn ask(&self, endpoint: &str, message: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, endpoint);

        let request = AskRequest {
            user_id: &self.user_id,
            message,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("could not reach {url}"))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "request to {} failed with status: {}",
                endpoint,
                response.status()
            ));
        }

        // A body without a `reply` string is a parse failure, not a blank reply
        let body: AskResponse = response
            .json()
            .await
            .context("backend returned an unexpected response body")?;
        Ok(body.reply)
    }

    pub async fn upload_document(&self, path: &Path) -> Result<String> {
        let url = format!("{}/upload-doc", self.base_url);

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("could not read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("could not reach {url}"))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "upload failed with status: {}",
                response.status()
            ));
        }

        let body: UploadResponse = response
            .json()
            .await
            .context("backend returned an unexpected response body")?;
        Ok(body.message)
    }
}
