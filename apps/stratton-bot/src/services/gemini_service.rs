use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use stratton_shared::api::gemini::{GenerateContentRequest, GenerateContentResponse};
use tracing::error;

/// Shown when the model answered but the reply carried no text.
pub const NO_ANSWER_FALLBACK: &str = "Извините, не удалось получить ответ.";
/// Header both Google APIs accept in place of the `key` query parameter.
pub const API_KEY_HEADER: &str = "x-goog-api-key";
/// Shown when the API refused the request or could not be reached.
pub const SERVICE_ERROR_FALLBACK: &str = "Произошла ошибка при получении ответа от ИИ.";

/// Result of a best-effort generation call. Never an error: the two degraded
/// variants carry the text to show instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Answered(String),
    /// The service responded, but not with a usable answer.
    Degraded(String),
    /// The service could not be reached at all.
    Unavailable(String),
}

impl GenerationOutcome {
    pub fn text(&self) -> &str {
        match self {
            GenerationOutcome::Answered(text)
            | GenerationOutcome::Degraded(text)
            | GenerationOutcome::Unavailable(text) => text,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, GenerationOutcome::Answered(_))
    }

    /// Maps a raw HTTP response of `generateContent` onto an outcome.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        if status != StatusCode::OK {
            error!("Gemini API error: {}, {}", status, body);
            return GenerationOutcome::Degraded(SERVICE_ERROR_FALLBACK.to_string());
        }

        match serde_json::from_str::<GenerateContentResponse>(body) {
            Ok(parsed) => match parsed.first_text() {
                Some(text) => GenerationOutcome::Answered(text.to_string()),
                None => GenerationOutcome::Degraded(NO_ANSWER_FALLBACK.to_string()),
            },
            Err(e) => {
                error!("Gemini API returned unexpected body: {}", e);
                GenerationOutcome::Degraded(NO_ANSWER_FALLBACK.to_string())
            }
        }
    }
}

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> GenerationOutcome;
}

pub struct GeminiClient {
    client: Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_url: String, model: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_url, self.model)
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, prompt: &str) -> GenerationOutcome {
        let sent = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await;

        let resp = match sent {
            Ok(resp) => resp,
            Err(e) => {
                error!("Gemini API unreachable: {}", e.without_url());
                return GenerationOutcome::Unavailable(SERVICE_ERROR_FALLBACK.to_string());
            }
        };

        let status = resp.status();
        match resp.text().await {
            Ok(body) => GenerationOutcome::from_response(status, &body),
            Err(e) => {
                error!("Failed to read Gemini response: {}", e.without_url());
                GenerationOutcome::Unavailable(SERVICE_ERROR_FALLBACK.to_string())
            }
        }
    }
}
