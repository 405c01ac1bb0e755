//! Question bank fetched over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use mockexam_core::parser::parse_bank_str;
use mockexam_core::traits::QuestionSource;
use mockexam_core::Question;

use crate::error::SourceError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// GETs a JSON array of questions from a URL.
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpSource {
    pub fn new(url: &str) -> Result<Self, SourceError> {
        Self::with_timeout(url, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(url: &str, timeout_secs: u64) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SourceError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: url.to_string(),
            client,
            timeout_secs,
        })
    }
}

#[async_trait]
impl QuestionSource for HttpSource {
    fn name(&self) -> &str {
        &self.url
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> anyhow::Result<Vec<Question>> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                SourceError::Network(format!("{} not reachable", self.url))
            } else {
                SourceError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: self.url.clone(),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let questions = parse_bank_str(&body, &self.url).map_err(|e| SourceError::Parse {
            origin: self.url.clone(),
            message: format!("{e:#}"),
        })?;

        tracing::debug!(count = questions.len(), "downloaded question bank");
        Ok(questions)
    }
}
