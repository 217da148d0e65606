//! Blocking HTTP transport on `reqwest`

use super::{text_body, AnalysisRequest, Transport, IMAGE_FIELD};
use crate::config::Config;
use crate::error::NetworkError;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

pub struct HttpTransport {
    client: Client,
    config: Config,
}

impl HttpTransport {
    pub fn new(config: Config) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NetworkError::Transport(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &AnalysisRequest) -> Result<Value, NetworkError> {
        let url = self.config.url(request.path());
        debug!(%url, "POST");

        let builder = match request {
            AnalysisRequest::Text { text } => self.client.post(&url).json(&text_body(text)),
            AnalysisRequest::Image(image) => {
                let part = Part::bytes(image.bytes.clone())
                    .file_name(image.name.clone())
                    .mime_str(&image.mime)
                    .map_err(|e| NetworkError::Transport(e.to_string()))?;
                self.client
                    .post(&url)
                    .multipart(Form::new().part(IMAGE_FIELD, part))
            }
        };

        let response = builder
            .send()
            .map_err(|e| NetworkError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(%url, status = status.as_u16(), "response");
        if !status.is_success() {
            return Err(NetworkError::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .map_err(|e| NetworkError::Decode(e.to_string()))
    }
}
