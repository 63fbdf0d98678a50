#[cfg(test)]
#[path = "groq_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use serde::Deserialize;
use serde::Serialize;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio_util::io::StreamReader;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::CompletionRequest;
use crate::domain::models::Event;

fn convert_err(err: reqwest::Error) -> std::io::Error {
    let err_msg = err.to_string();
    return std::io::Error::new(std::io::ErrorKind::Interrupted, err_msg);
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DeltaResponse {
    content: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StreamChoiceResponse {
    delta: DeltaResponse,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StreamResponse {
    choices: Vec<StreamChoiceResponse>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MessageResponse {
    content: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct BatchChoiceResponse {
    message: MessageResponse,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct BatchResponse {
    choices: Vec<BatchChoiceResponse>,
}

pub struct Groq {
    url: String,
    token: String,
    timeout: String,
    models: Vec<String>,
}

impl Default for Groq {
    fn default() -> Groq {
        return Groq {
            url: Config::get(ConfigKey::ApiUrl),
            token: Config::get(ConfigKey::ApiToken),
            timeout: Config::get(ConfigKey::HealthCheckTimeout),
            models: Config::models(),
        };
    }
}

#[async_trait]
impl Backend for Groq {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Groq API URL is not defined");
        }
        if self.token.is_empty() {
            bail!("Groq API token is not defined");
        }

        // The hosted API index returns a 404 rather than anything useful.
        // Don't bother health checking it, auth problems surface on the first
        // turn anyway.
        if self.url == "https://api.groq.com/openai" {
            return Ok(());
        }

        let res = reqwest::Client::new()
            .get(&self.url)
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        if res.is_err() {
            tracing::error!(error = ?res.unwrap_err(), "Groq is not reachable");
            bail!("Groq is not reachable");
        }

        let status = res?.status().as_u16();
        if status >= 400 {
            tracing::error!(status = status, "Groq health check failed");
            bail!("Groq health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn list_models<'a>(&'a self) -> Result<Vec<String>> {
        // The switchable models are an enumerated allow-list rather than a
        // remote query, so `/model` validation works without a network trip.
        let mut models = self.models.clone();
        models.sort();

        return Ok(models);
    }

    #[allow(clippy::implicit_return)]
    async fn complete<'a>(
        &self,
        request: CompletionRequest,
        tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<String> {
        let streaming = request.stream;
        let model = request.model.to_string();

        let res = reqwest::Client::new()
            .post(format!("{url}/v1/chat/completions", url = self.url))
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&request)
            .send()
            .await?;

        let status = res.status().as_u16();
        if status >= 400 {
            let detail = res.text().await.unwrap_or_default();
            tracing::error!(
                status = status,
                model = model,
                detail = detail,
                "Completion request failed"
            );
            bail!(format!("Completion request failed with status {status}: {detail}"));
        }

        if !streaming {
            let body: BatchResponse = res.json().await?;
            if body.choices.is_empty() {
                bail!("Completion response carried no choices");
            }

            return Ok(body.choices[0].message.content.to_string());
        }

        let stream = res.bytes_stream().map_err(convert_err);
        let mut lines_reader = StreamReader::new(stream).lines();

        let mut accumulator = "".to_string();
        while let Some(line) = lines_reader.next_line().await? {
            let mut cleaned_line = line.trim().to_string();
            if cleaned_line.starts_with("data:") {
                cleaned_line = cleaned_line.split_off(5).trim().to_string();
            }
            if cleaned_line.is_empty() || cleaned_line == "[DONE]" {
                continue;
            }

            let chunk: StreamResponse = serde_json::from_str(&cleaned_line)?;
            tracing::debug!(body = ?chunk, "Completion fragment");

            if chunk.choices.is_empty() {
                continue;
            }

            // A fragment carrying no text is a no-op, not an error.
            let text = match &chunk.choices[0].delta.content {
                Some(text) if !text.is_empty() => text.to_string(),
                _ => continue,
            };

            accumulator += &text;
            tx.send(Event::CompletionDelta(text))?;
        }

        return Ok(accumulator);
    }
}
