use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::errors::AppResult;
use crate::view::SelectedFile;

/// Seam for submitting a resume and retrieving the raw analysis payload.
/// The controller only sees this trait, so tests drive the state machine
/// without a network.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    async fn submit(&self, file: &SelectedFile) -> AppResult<Value>;
}

/// Transport against the backend `/analyze` endpoint. The file goes up as
/// the `resume` part of a multipart form; the response body is parsed as
/// JSON whatever the HTTP status, because the backend reports failures as
/// `{"error": ...}` bodies with 4xx codes. No request timeout is imposed.
pub struct HttpAnalysisTransport {
    http: Client,
    endpoint: String,
    access_token: SecretString,
}

impl HttpAnalysisTransport {
    pub fn new(http: Client, endpoint: String, access_token: SecretString) -> Self {
        Self {
            http,
            endpoint,
            access_token,
        }
    }
}

#[async_trait]
impl AnalysisTransport for HttpAnalysisTransport {
    async fn submit(&self, file: &SelectedFile) -> AppResult<Value> {
        let bytes = tokio::fs::read(&file.path).await?;
        let form = Form::new().part(
            "resume",
            Part::bytes(bytes).file_name(file.file_name.clone()),
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.access_token.expose_secret())
            .multipart(form)
            .send()
            .await?;

        Ok(response.json().await?)
    }
}
