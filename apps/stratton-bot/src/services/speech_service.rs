use crate::error::{BotError, BotResult};
use crate::services::audio_service::Waveform;
use crate::services::gemini_service::API_KEY_HEADER;
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use stratton_shared::api::speech::{
    RecognitionAudio, RecognitionConfig, RecognizeRequest, RecognizeResponse,
};

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// `SpeechNotRecognized` when the service heard nothing it could turn into
    /// text, `TranscriptionServiceError` for everything else.
    async fn transcribe(&self, waveform: &Waveform, language: &str) -> BotResult<String>;
}

/// Google Cloud Speech-to-Text `speech:recognize`.
pub struct GoogleSpeechClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl GoogleSpeechClient {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn request_body(waveform: &Waveform, language: &str) -> RecognizeRequest {
        RecognizeRequest {
            config: RecognitionConfig {
                encoding: "LINEAR16".to_string(),
                sample_rate_hertz: waveform.sample_rate,
                language_code: language.to_string(),
            },
            audio: RecognitionAudio {
                content: base64::engine::general_purpose::STANDARD.encode(waveform.to_le_bytes()),
            },
        }
    }
}

// reqwest errors print the request URL; strip it before the text reaches a log.
fn service_err(e: reqwest::Error) -> BotError {
    BotError::TranscriptionServiceError(e.without_url().to_string())
}

#[async_trait]
impl Transcriber for GoogleSpeechClient {
    async fn transcribe(&self, waveform: &Waveform, language: &str) -> BotResult<String> {
        let resp = self
            .client
            .post(format!("{}/speech:recognize", self.api_url))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&Self::request_body(waveform, language))
            .send()
            .await
            .map_err(service_err)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BotError::TranscriptionServiceError(format!(
                "speech API returned {}: {}",
                status, body
            )));
        }

        let parsed: RecognizeResponse = resp.json().await.map_err(service_err)?;
        parsed.transcript().ok_or(BotError::SpeechNotRecognized)
    }
}
