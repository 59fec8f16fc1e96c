use thiserror::Error;

pub type BotResult<T> = std::result::Result<T, BotError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BotError {
    #[error("Unknown plan: {0}")]
    UnknownPlan(String),

    #[error("Malformed deep link: {0}")]
    MalformedDeepLink(String),

    #[error("An active subscription is required")]
    SubscriptionRequired,

    #[error("Audio decode error: {0}")]
    AudioDecodeError(String),

    #[error("Speech was not recognized")]
    SpeechNotRecognized,

    #[error("Transcription service error: {0}")]
    TranscriptionServiceError(String),

    #[error("Invalid plan catalog: {0}")]
    InvalidCatalog(String),
}
