use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde_json::Value;

/// Thin JSON client for a running Laponia API.
pub struct ChatClient {
    client: Client,
    base_url: String,
}

/// Status plus parsed body, for asserting on error responses.
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn chat(&self, message: &str) -> Result<String> {
        let raw = self
            .post_json("/api/chat", serde_json::json!({ "message": message }))
            .await?;
        if !raw.status.is_success() {
            anyhow::bail!("Chat failed ({}): {}", raw.status, raw.body);
        }
        raw.body["response"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Chat response without 'response': {}", raw.body))
    }

    pub async fn post_json(&self, path: &str, body: Value) -> Result<RawResponse> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await?;
        Self::raw(response).await
    }

    pub async fn post_text(&self, path: &str, body: &str) -> Result<RawResponse> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("content-type", "text/plain")
            .body(body.to_string())
            .send()
            .await?;
        Self::raw(response).await
    }

    pub async fn get(&self, path: &str) -> Result<RawResponse> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        Self::raw(response).await
    }

    /// `(user_message, ai_response)` pairs as returned by `/api/history`.
    pub async fn history(&self, limit: Option<i64>) -> Result<Vec<(String, String)>> {
        let path = match limit {
            Some(n) => format!("/api/history?limit={n}"),
            None => "/api/history".to_string(),
        };
        let raw = self.get(&path).await?;
        if !raw.status.is_success() {
            anyhow::bail!("History failed ({}): {}", raw.status, raw.body);
        }
        let entries = raw.body["history"]
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("History response without 'history': {}", raw.body))?;
        Ok(entries
            .iter()
            .map(|e| {
                (
                    e["user_message"].as_str().unwrap_or_default().to_string(),
                    e["ai_response"].as_str().unwrap_or_default().to_string(),
                )
            })
            .collect())
    }

    pub async fn metrics_text(&self) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/metrics", self.base_url))
            .send()
            .await?;
        Ok(response.text().await?)
    }

    async fn raw(response: reqwest::Response) -> Result<RawResponse> {
        let status = response.status();
        let text = response.text().await?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        Ok(RawResponse { status, body })
    }
}
